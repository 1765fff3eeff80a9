use anyhow::{bail, Context, Result};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ScrapingConfig;
use crate::metrics::MetricsCollector;

pub fn build_client(config: &ScrapingConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to create HTTP client")
}

/// GET a page and return its body, failing on any non-success status.
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    metrics: &MetricsCollector,
) -> Result<String> {
    let tracker = metrics.record_request_start();
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracker.finish(false);
            return Err(e).with_context(|| format!("Request to {} failed", url));
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracker.finish(false);
        bail!("HTTP error! status: {} for {}", status, url);
    }

    let body = response.text().await;
    tracker.finish(body.is_ok());
    let body = body.with_context(|| format!("Failed to read body of {}", url))?;
    debug!("Fetched {} ({} bytes)", url, body.len());
    Ok(body)
}

/// Spaces out consecutive requests to one upstream. A zero period disables it.
pub struct Throttle {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Throttle {
    pub fn new(period: Duration) -> Self {
        Self {
            limiter: Quota::with_period(period).map(RateLimiter::direct),
        }
    }

    pub async fn wait(&self, metrics: &MetricsCollector) {
        if let Some(limiter) = &self.limiter {
            let started = Instant::now();
            limiter.until_ready().await;
            metrics.record_rate_limit_wait(started.elapsed());
        }
    }
}
