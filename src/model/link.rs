use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A directly configured neighbor and the last time it was heard from.
#[derive(Debug, Clone)]
pub struct Link {
    pub weight: u32,
    last_seen: Instant,
}

impl Link {
    fn new(weight: u32, now: Instant) -> Self {
        Self {
            weight,
            last_seen: now,
        }
    }
}

/// Tracks configured neighbors and ages them out when keep-alives stop
/// arriving. Neighbors are installed/removed only through `add`/`remove`;
/// updates from addresses that were never added are never promoted to
/// links (see `touch`).
#[derive(Debug, Default)]
pub struct LinkTable {
    links: BTreeMap<String, Link>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or overwrites the neighbor, resetting its keep-alive clock.
    pub fn add(&mut self, address: &str, weight: u32, now: Instant) {
        self.links
            .insert(address.to_string(), Link::new(weight, now));
    }

    pub fn remove(&mut self, address: &str) {
        self.links.remove(address);
    }

    pub fn weight(&self, address: &str) -> Option<u32> {
        self.links.get(address).map(|link| link.weight)
    }

    /// Refreshes the keep-alive clock for a known neighbor. No-op for any
    /// address that was never `add`ed.
    pub fn touch(&mut self, address: &str, now: Instant) {
        if let Some(link) = self.links.get_mut(address) {
            link.last_seen = now;
        }
    }

    /// Removes every neighbor whose last keep-alive is older than `aging`
    /// and returns the removed addresses.
    pub fn expire(&mut self, now: Instant, aging: Duration) -> Vec<String> {
        let dead: Vec<String> = self
            .links
            .iter()
            .filter(|(_, link)| now.duration_since(link.last_seen) > aging)
            .map(|(address, _)| address.clone())
            .collect();
        for address in &dead {
            self.links.remove(address);
        }
        dead
    }

    pub fn neighbors(&self) -> Vec<String> {
        self.links.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_is_a_silent_no_op_for_unknown_neighbors() {
        let mut table = LinkTable::new();
        let now = Instant::now();
        table.touch("10.0.0.9", now);
        assert!(table.neighbors().is_empty());
    }

    #[test]
    fn expire_removes_only_stale_links() {
        let mut table = LinkTable::new();
        let t0 = Instant::now();
        table.add("10.0.0.1", 1, t0);
        table.add("10.0.0.2", 1, t0);
        table.touch("10.0.0.2", t0 + Duration::from_secs(30));

        let dead = table.expire(t0 + Duration::from_secs(40), Duration::from_secs(20));
        assert_eq!(dead, vec!["10.0.0.1".to_string()]);
        assert_eq!(table.neighbors(), vec!["10.0.0.2".to_string()]);
    }

    #[test]
    fn add_overwrites_existing_weight_and_resets_clock() {
        let mut table = LinkTable::new();
        let t0 = Instant::now();
        table.add("10.0.0.1", 5, t0);
        table.add("10.0.0.1", 9, t0 + Duration::from_secs(1));
        assert_eq!(table.weight("10.0.0.1"), Some(9));
    }

    #[test]
    fn remove_of_absent_ip_is_not_an_error() {
        let mut table = LinkTable::new();
        table.remove("10.0.0.1");
        assert!(table.neighbors().is_empty());
    }
}
