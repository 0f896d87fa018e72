use crate::{
    checker::check_and_record,
    endpoint::EndpointSpec,
    http::create_http_pool,
    report::{LogReporter, Reporter},
    stats::DomainStats,
    types::{CheckResult, MonitorConfig, MonitorState, RunSummary},
};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::{future::Future, sync::Arc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Owns the endpoints, stats and HTTP client for the whole run.
pub struct Monitor {
    client: Client,
    endpoints: Arc<[EndpointSpec]>,
    stats: Arc<DomainStats>,
    reporter: Box<dyn Reporter>,
    config: MonitorConfig,
    state: watch::Sender<MonitorState>,
}

impl Monitor {
    pub fn new(endpoints: Vec<EndpointSpec>) -> Result<Self, MonitorError> {
        Self::with_config(endpoints, MonitorConfig::default())
    }

    pub fn with_config(endpoints: Vec<EndpointSpec>, mut config: MonitorConfig) -> Result<Self, MonitorError> {
        config.max_concurrency = config.max_concurrency.max(1);
        let client = create_http_pool(config.request_timeout, config.max_concurrency)?;
        let stats = Arc::new(DomainStats::for_endpoints(&endpoints));
        let (state, _) = watch::channel(MonitorState::Running);

        Ok(Self {
            client,
            endpoints: endpoints.into(),
            stats,
            reporter: Box::new(LogReporter),
            config,
            state,
        })
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn stats(&self) -> Arc<DomainStats> {
        Arc::clone(&self.stats)
    }

    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Checks every endpoint once and returns after the last one finishes.
    pub async fn run_cycle(&self) -> Vec<CheckResult> {
        let timeout = self.config.request_timeout;

        stream::iter(self.endpoints.iter())
            .map(|endpoint| check_and_record(&self.client, endpoint, timeout, &self.stats))
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await
    }

    /// Runs cycles until `shutdown` completes. In-flight checks and the idle
    /// sleep are dropped on shutdown, then the client is released.
    pub async fn run<F>(self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        info!(
            endpoints = self.endpoints.len(),
            domains = self.stats.len(),
            interval_secs = self.config.interval.as_secs_f64(),
            "Monitor running"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                results = self.run_cycle() => {
                    cycles += 1;
                    let up = results.iter().filter(|r| r.outcome.is_up()).count();
                    debug!(cycle = cycles, up, down = results.len() - up, "Cycle complete");
                }
            }

            self.reporter.report(&self.stats.snapshot());

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        self.state.send_replace(MonitorState::ShuttingDown);
        info!("Shutting down gracefully");

        let Monitor { client, state, .. } = self;
        drop(client);

        state.send_replace(MonitorState::Stopped);
        info!(cycles, "Monitor stopped");

        RunSummary {
            cycles,
            state: MonitorState::Stopped,
        }
    }
}
