use crate::stats::{Availability, DomainSnapshot};
use tracing::info;

pub trait Reporter: Send + Sync {
    fn report(&self, snapshot: &[DomainSnapshot]);
}

/// Writes one `info` line per domain.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, snapshot: &[DomainSnapshot]) {
        for line in render(snapshot) {
            info!("{}", line);
        }
    }
}

pub fn render_line(entry: &DomainSnapshot) -> String {
    match entry.availability() {
        Availability::Percent(p) => format!("{} has {}% availability", entry.domain, p),
        Availability::NoData => format!("{} has no availability data yet", entry.domain),
    }
}

pub fn render(snapshot: &[DomainSnapshot]) -> Vec<String> {
    snapshot.iter().map(render_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Counters;

    fn entry(domain: &str, up: u64, down: u64) -> DomainSnapshot {
        DomainSnapshot {
            domain: domain.to_string(),
            counters: Counters { up, down },
        }
    }

    #[test]
    fn renders_availability_lines() {
        let lines = render(&[
            entry("fetch.com", 1, 2),
            entry("www.fetchrewards.com", 2, 1),
            entry("fresh.example", 0, 0),
        ]);
        assert_eq!(
            lines,
            [
                "fetch.com has 33% availability",
                "www.fetchrewards.com has 67% availability",
                "fresh.example has no availability data yet",
            ]
        );
    }
}
