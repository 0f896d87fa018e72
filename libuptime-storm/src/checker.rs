use crate::{
    endpoint::EndpointSpec,
    stats::DomainStats,
    types::{CheckResult, Outcome},
};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sends one request and classifies it. Transport failures are `Down`, never errors.
pub async fn check_endpoint(client: &Client, endpoint: &EndpointSpec, timeout: Duration) -> CheckResult {
    let start = Instant::now();

    let mut request = client
        .request(endpoint.method().clone(), endpoint.url().clone())
        .headers(endpoint.headers().clone());
    if let Some(body) = endpoint.body() {
        request = request.json(body);
    }

    let result = tokio::time::timeout(timeout, request.send()).await;

    let (outcome, status, failure) = match result {
        Ok(Ok(response)) => {
            let status = response.status().as_u16();
            (Outcome::from_status(status), Some(status), None)
        }
        Ok(Err(e)) => (Outcome::Down, None, Some(format!("Request failed: {}", e))),
        Err(_) => (Outcome::Down, None, Some("Timeout".to_string())),
    };

    CheckResult {
        url: endpoint.url().to_string(),
        domain: endpoint.domain().to_string(),
        outcome,
        status,
        failure,
        duration: start.elapsed(),
    }
}

/// Runs a check and folds its outcome into the shared stats.
pub async fn check_and_record(
    client: &Client,
    endpoint: &EndpointSpec,
    timeout: Duration,
    stats: &DomainStats,
) -> CheckResult {
    let result = check_endpoint(client, endpoint, timeout).await;

    match (&result.status, &result.failure) {
        (Some(status), _) => debug!(
            url = %result.url,
            status,
            elapsed_ms = result.duration.as_millis() as u64,
            "{:?}",
            result.outcome
        ),
        (None, Some(reason)) => debug!(url = %result.url, %reason, "Down"),
        (None, None) => {}
    }

    if !stats.record(&result.domain, result.outcome) {
        warn!(domain = %result.domain, "check result for a domain with no stats entry");
    }

    result
}
