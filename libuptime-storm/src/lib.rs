mod checker;
pub mod endpoint;
mod http;
mod monitor;
pub mod report;
mod stats;
mod types;

pub use checker::{check_and_record, check_endpoint};
pub use endpoint::{load_endpoints, parse_endpoints, ConfigError, EndpointError, EndpointSpec};
pub use monitor::{Monitor, MonitorError};
pub use report::{LogReporter, Reporter};
pub use stats::{Availability, Counters, DomainSnapshot, DomainStats};
pub use types::{CheckResult, MonitorConfig, MonitorState, Outcome, RunSummary};

/// Runs a single cycle over `endpoints` and returns the resulting stats.
pub async fn check_once(endpoints: Vec<EndpointSpec>) -> Result<Vec<DomainSnapshot>, MonitorError> {
    let monitor = Monitor::new(endpoints)?;
    monitor.run_cycle().await;
    Ok(monitor.stats().snapshot())
}
