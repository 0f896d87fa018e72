use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Up,
    Down,
}

impl Outcome {
    /// 2xx is up, everything else is down.
    pub fn from_status(status: u16) -> Self {
        if (200..=299).contains(&status) {
            Outcome::Up
        } else {
            Outcome::Down
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Outcome::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Outcome::Down)
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub url: String,
    pub domain: String,
    pub outcome: Outcome,
    pub status: Option<u16>,
    pub failure: Option<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
            max_concurrency: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub state: MonitorState,
}
