use std::time::{Duration, Instant};

use tracing::debug;

use crate::model::link::LinkTable;
use crate::model::message::Message;
use crate::model::routing::RoutingTable;

/// Neighbor keep-alives expire after this many missed periods (spec §3, §4.6).
pub const AGING_FACTOR: u32 = 4;

pub fn aging_window(period: Duration) -> Duration {
    period * AGING_FACTOR
}

/// Expires stale links, purges their routes, then builds one `update` per
/// surviving neighbor. Order matters: a neighbor must never be handed a
/// vector that still credits a hop this node just expired (spec §4.6, §5).
pub fn tick(
    links: &mut LinkTable,
    rt: &mut RoutingTable,
    self_address: &str,
    now: Instant,
    period: Duration,
) -> Vec<(String, Message)> {
    let dead = links.expire(now, aging_window(period));
    for ip in &dead {
        debug!(neighbor = %ip, "link expired, purging routes");
        rt.purge_hop(ip);
    }

    links
        .neighbors()
        .into_iter()
        .map(|neighbor| {
            let distances = rt.export(&neighbor);
            let message = Message::Update {
                source: self_address.to_string(),
                destination: neighbor.clone(),
                distances,
            };
            (neighbor, message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn dead_link_is_purged_before_broadcast_is_built() {
        let mut links = LinkTable::new();
        let mut rt = RoutingTable::new("A");
        let t0 = Instant::now();
        links.add("B", 5, t0);
        links.add("C", 5, t0);
        rt.add_direct("B", 5);
        rt.add_direct("C", 5);
        rt.learn_neighbor_vector("B", 5, &BTreeMap::from([("D".to_string(), 1)]));

        // B goes silent long enough to expire; C keeps refreshing.
        let period = Duration::from_secs(5);
        links.touch("C", t0 + Duration::from_secs(15));

        let outbound = tick(&mut links, &mut rt, "A", t0 + Duration::from_secs(21), period);

        assert_eq!(rt.distance("B"), None);
        assert_eq!(rt.distance("D"), None);
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].0, "C");
        match &outbound[0].1 {
            Message::Update { distances, .. } => assert!(!distances.contains_key("D")),
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn each_surviving_neighbor_gets_its_own_split_horizon_view() {
        let mut links = LinkTable::new();
        let mut rt = RoutingTable::new("A");
        let t0 = Instant::now();
        links.add("B", 1, t0);
        links.add("C", 1, t0);
        rt.add_direct("B", 1);
        rt.add_direct("C", 1);

        let outbound = tick(&mut links, &mut rt, "A", t0, Duration::from_secs(5));
        assert_eq!(outbound.len(), 2);
        for (neighbor, message) in &outbound {
            match message {
                Message::Update { distances, .. } => {
                    assert!(!distances.contains_key(neighbor));
                }
                _ => panic!("expected update"),
            }
        }
    }

    #[test]
    fn nothing_expires_before_the_aging_window_elapses() {
        let mut links = LinkTable::new();
        let mut rt = RoutingTable::new("A");
        let t0 = Instant::now();
        links.add("B", 5, t0);
        rt.add_direct("B", 5);

        let outbound = tick(&mut links, &mut rt, "A", t0 + Duration::from_secs(19), Duration::from_secs(5));
        assert_eq!(rt.distance("B"), Some(5));
        assert_eq!(outbound.len(), 1);
    }
}
