use std::collections::{BTreeMap, BTreeSet};

use rand::seq::IteratorRandom;

/// Conventional unreachable-cost sentinel. Never emitted by this
/// implementation (no poison-reverse), kept only as a documented constant
/// for callers that want one; see the reference source's behavior.
pub const INF: u64 = 1_000_000;

/// `(cost, hop_set)` for a single destination. `hop_set` is always
/// non-empty for any entry that exists in the table; an entry whose hop
/// set would become empty is removed instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub cost: u64,
    pub hops: BTreeSet<String>,
}

/// Distributed Bellman-Ford routing table with equal-cost multi-path.
///
/// Invariants held after every public method returns (see spec §3, §8):
/// - every route's hop set is non-empty
/// - every hop is `self` or a neighbor the caller is expected to track
///   via the link table (this table does not itself know about links; it
///   trusts the caller to route `learn_neighbor_vector`/`purge_hop` calls
///   only for known neighbors)
/// - `cost == 0` iff destination is `self`
#[derive(Debug)]
pub struct RoutingTable {
    routes: BTreeMap<String, Route>,
}

impl RoutingTable {
    pub fn new(self_address: impl Into<String>) -> Self {
        let self_address = self_address.into();
        let mut routes = BTreeMap::new();
        routes.insert(
            self_address.clone(),
            Route {
                cost: 0,
                hops: BTreeSet::from([self_address]),
            },
        );
        Self { routes }
    }

    /// Relax/join every destination in `vector` against the current
    /// table, then withdraw `nbr` from any route it no longer supports at
    /// the current cost. See SPEC_FULL.md §B for why this must be two
    /// passes in this order.
    pub fn learn_neighbor_vector(&mut self, nbr: &str, w_nbr: u64, vector: &BTreeMap<String, u64>) {
        for (dst, advertised) in vector {
            let total = w_nbr + advertised;
            match self.routes.get_mut(dst) {
                None => {
                    self.routes.insert(
                        dst.clone(),
                        Route {
                            cost: total,
                            hops: BTreeSet::from([nbr.to_string()]),
                        },
                    );
                }
                Some(route) if total < route.cost => {
                    route.cost = total;
                    route.hops = BTreeSet::from([nbr.to_string()]);
                }
                Some(route) if total == route.cost => {
                    route.hops.insert(nbr.to_string());
                }
                _ => {}
            }
        }

        let mut emptied = Vec::new();
        for (dst, route) in self.routes.iter_mut() {
            if !route.hops.contains(nbr) {
                continue;
            }
            let Some(advertised) = vector.get(dst) else {
                continue;
            };
            let new_cost = w_nbr + advertised;
            if new_cost > route.cost {
                route.hops.remove(nbr);
                if route.hops.is_empty() {
                    emptied.push(dst.clone());
                }
            }
        }
        for dst in emptied {
            self.routes.remove(&dst);
        }
    }

    /// Removes `broken_nh` from every hop set, dropping destinations that
    /// have no remaining hop. Called on operator `del` and on link expiry.
    pub fn purge_hop(&mut self, broken_nh: &str) {
        let mut emptied = Vec::new();
        for (dst, route) in self.routes.iter_mut() {
            if route.hops.remove(broken_nh) && route.hops.is_empty() {
                emptied.push(dst.clone());
            }
        }
        for dst in emptied {
            self.routes.remove(&dst);
        }
    }

    /// Unconditionally installs `(weight, {ip})` as the route to `ip`,
    /// overwriting any existing route — including a lower-cost indirect
    /// one. Operator intent wins; split horizon then hides this direct
    /// cost from `ip` itself on export.
    pub fn add_direct(&mut self, ip: &str, weight: u32) {
        self.routes.insert(
            ip.to_string(),
            Route {
                cost: u64::from(weight),
                hops: BTreeSet::from([ip.to_string()]),
            },
        );
    }

    /// Every route whose hop set does not contain `to_neighbor`.
    pub fn export(&self, to_neighbor: &str) -> BTreeMap<String, u64> {
        self.routes
            .iter()
            .filter(|(_, route)| !route.hops.contains(to_neighbor))
            .map(|(dst, route)| (dst.clone(), route.cost))
            .collect()
    }

    /// One hop chosen uniformly at random from the current hop set; each
    /// call is an independent draw, realizing per-packet ECMP spreading.
    pub fn next_hop(&self, dst: &str) -> Option<String> {
        let route = self.routes.get(dst)?;
        route.hops.iter().choose(&mut rand::thread_rng()).cloned()
    }

    pub fn distance(&self, dst: &str) -> Option<u64> {
        self.routes.get(dst).map(|route| route.cost)
    }

    pub fn hops(&self, dst: &str) -> Option<&BTreeSet<String>> {
        self.routes.get(dst).map(|route| &route.hops)
    }

    #[cfg(test)]
    fn snapshot(&self) -> &BTreeMap<String, Route> {
        &self.routes
    }
}
