use crate::{endpoint::EndpointSpec, types::Outcome};
use dashmap::DashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub up: u64,
    pub down: u64,
}

impl Counters {
    pub fn total(&self) -> u64 {
        self.up + self.down
    }

    pub fn availability(&self) -> Availability {
        let total = self.total();
        if total == 0 {
            return Availability::NoData;
        }
        // round half up, in integers: floor((200*up + total) / (2*total))
        let percent = (200 * u128::from(self.up) + u128::from(total)) / (2 * u128::from(total));
        Availability::Percent(percent as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Percent(u8),
    NoData,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Percent(p) => write!(f, "{}%", p),
            Availability::NoData => f.write_str("no data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSnapshot {
    pub domain: String,
    pub counters: Counters,
}

impl DomainSnapshot {
    pub fn availability(&self) -> Availability {
        self.counters.availability()
    }
}

/// Per-domain up/down counters. Domains are fixed at construction, counters only grow.
pub struct DomainStats {
    counters: DashMap<String, Counters>,
    order: Vec<String>,
}

impl DomainStats {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let counters = DashMap::new();
        let mut order = Vec::new();
        for domain in domains {
            let domain = domain.into();
            if counters.insert(domain.clone(), Counters::default()).is_none() {
                order.push(domain);
            }
        }
        Self { counters, order }
    }

    pub fn for_endpoints(endpoints: &[EndpointSpec]) -> Self {
        Self::new(endpoints.iter().map(|e| e.domain().to_string()))
    }

    /// Increments exactly one counter for `domain`. Unknown domains are ignored
    /// and reported back as `false`.
    pub fn record(&self, domain: &str, outcome: Outcome) -> bool {
        match self.counters.get_mut(domain) {
            Some(mut entry) => {
                match outcome {
                    Outcome::Up => entry.up += 1,
                    Outcome::Down => entry.down += 1,
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, domain: &str) -> Option<Counters> {
        self.counters.get(domain).map(|c| *c)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Domains in first-configured order.
    pub fn snapshot(&self) -> Vec<DomainSnapshot> {
        self.order
            .iter()
            .map(|domain| DomainSnapshot {
                domain: domain.clone(),
                counters: self.get(domain).unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(up: u64, down: u64) -> Counters {
        Counters { up, down }
    }

    #[test]
    fn availability_rounds_half_up() {
        assert_eq!(counters(1, 2).availability(), Availability::Percent(33));
        assert_eq!(counters(2, 1).availability(), Availability::Percent(67));
        assert_eq!(counters(1, 7).availability(), Availability::Percent(13));
        assert_eq!(counters(1, 1).availability(), Availability::Percent(50));
        assert_eq!(counters(5, 0).availability(), Availability::Percent(100));
        assert_eq!(counters(0, 5).availability(), Availability::Percent(0));
        assert_eq!(counters(199, 1).availability(), Availability::Percent(100));
        assert_eq!(counters(1, 199).availability(), Availability::Percent(1));
    }

    #[test]
    fn zero_observations_is_no_data() {
        assert_eq!(counters(0, 0).availability(), Availability::NoData);
        assert_eq!(Availability::NoData.to_string(), "no data");
        assert_eq!(Availability::Percent(42).to_string(), "42%");
    }

    #[test]
    fn shared_domain_accumulates_into_one_entry() {
        let stats = DomainStats::new(["fetch.com", "www.fetchrewards.com", "fetch.com"]);
        assert_eq!(stats.len(), 2);

        stats.record("fetch.com", Outcome::Up);
        stats.record("fetch.com", Outcome::Down);
        stats.record("fetch.com", Outcome::Up);
        stats.record("www.fetchrewards.com", Outcome::Down);

        assert_eq!(stats.get("fetch.com"), Some(counters(2, 1)));
        assert_eq!(stats.get("www.fetchrewards.com"), Some(counters(0, 1)));
    }

    #[test]
    fn unknown_domain_is_not_added() {
        let stats = DomainStats::new(["fetch.com"]);
        assert!(!stats.record("other.example", Outcome::Up));
        assert_eq!(stats.get("other.example"), None);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn snapshot_keeps_configured_order() {
        let stats = DomainStats::new(["b.example", "a.example", "c.example"]);
        stats.record("a.example", Outcome::Up);

        let snapshot = stats.snapshot();
        let domains: Vec<_> = snapshot.iter().map(|s| s.domain.as_str()).collect();
        assert_eq!(domains, ["b.example", "a.example", "c.example"]);
        assert_eq!(snapshot[0].availability(), Availability::NoData);
        assert_eq!(snapshot[1].availability(), Availability::Percent(100));
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let stats = std::sync::Arc::new(DomainStats::new(["fetch.com"]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let outcome = if i % 2 == 0 { Outcome::Up } else { Outcome::Down };
                        stats.record("fetch.com", outcome);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.get("fetch.com"), Some(counters(4000, 4000)));
    }
}
