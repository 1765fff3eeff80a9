use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub avg_response_time_ms: f64,
    pub rate_limiter_wait_time_ms: f64,
    pub rows_parsed: u64,
    pub rows_skipped: u64,
    pub last_error: Option<String>,
    pub last_error_time: Option<DateTime<Utc>>,
}

/// Per-run counters shared by the adapters of one stage.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<IngestMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IngestMetrics> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_request_start(&self) -> RequestTracker {
        RequestTracker {
            start_time: Instant::now(),
            collector: self.clone(),
        }
    }

    pub fn record_rate_limit_wait(&self, duration: Duration) {
        self.lock().rate_limiter_wait_time_ms += duration.as_secs_f64() * 1000.0;
    }

    pub fn record_rate_limited(&self) {
        self.lock().rate_limited_requests += 1;
    }

    pub fn record_error(&self, error: String) {
        let mut metrics = self.lock();
        metrics.last_error = Some(error);
        metrics.last_error_time = Some(Utc::now());
    }

    pub fn record_rows(&self, parsed: usize, skipped: usize) {
        let mut metrics = self.lock();
        metrics.rows_parsed += parsed as u64;
        metrics.rows_skipped += skipped as u64;
    }

    pub fn get_metrics(&self) -> IngestMetrics {
        self.lock().clone()
    }

    pub fn log_summary(&self, stage: &str) {
        let m = self.get_metrics();
        info!(
            "{} metrics: requests={} ok={} failed={} rate_limited={} avg_response={:.0}ms throttle_wait={:.0}ms rows_parsed={} rows_skipped={}",
            stage,
            m.total_requests,
            m.successful_requests,
            m.failed_requests,
            m.rate_limited_requests,
            m.avg_response_time_ms,
            m.rate_limiter_wait_time_ms,
            m.rows_parsed,
            m.rows_skipped,
        );
        if let Some(error) = &m.last_error {
            info!("{} last error: {}", stage, error);
        }
    }
}

pub struct RequestTracker {
    start_time: Instant,
    collector: MetricsCollector,
}

impl RequestTracker {
    pub fn finish(self, success: bool) {
        let duration = self.start_time.elapsed();
        let mut metrics = self.collector.lock();

        metrics.total_requests += 1;
        if success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
        }

        // Exponential moving average, seeded by the first sample.
        let sample = duration.as_secs_f64() * 1000.0;
        metrics.avg_response_time_ms = if metrics.total_requests == 1 {
            sample
        } else {
            let alpha = 0.1;
            metrics.avg_response_time_ms * (1.0 - alpha) + sample * alpha
        };
    }
}
