use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics collector for the application.
///
/// Tracks facts/overlay API usage, upload and overlay counts, and per-endpoint
/// request totals. Thread-safe and cheap to clone.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Facts API
    facts_calls_total: AtomicUsize,
    facts_calls_success: AtomicUsize,
    facts_calls_failed: AtomicUsize,
    facts_tokens_input: AtomicU64,
    facts_tokens_output: AtomicU64,
    facts_latency_ms: RwLock<Vec<u64>>,

    // Overlay API
    overlay_calls_total: AtomicUsize,
    overlay_calls_success: AtomicUsize,
    overlay_calls_failed: AtomicUsize,
    overlay_latency_ms: RwLock<Vec<u64>>,

    // Storage
    uploads_stored: AtomicUsize,
    overlays_generated: AtomicUsize,

    // Per-endpoint request counters
    endpoint_counters: DashMap<String, AtomicUsize>,

    // Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                facts_calls_total: AtomicUsize::new(0),
                facts_calls_success: AtomicUsize::new(0),
                facts_calls_failed: AtomicUsize::new(0),
                facts_tokens_input: AtomicU64::new(0),
                facts_tokens_output: AtomicU64::new(0),
                facts_latency_ms: RwLock::new(Vec::new()),
                overlay_calls_total: AtomicUsize::new(0),
                overlay_calls_success: AtomicUsize::new(0),
                overlay_calls_failed: AtomicUsize::new(0),
                overlay_latency_ms: RwLock::new(Vec::new()),
                uploads_stored: AtomicUsize::new(0),
                overlays_generated: AtomicUsize::new(0),
                endpoint_counters: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    pub fn record_facts_call(
        &self,
        success: bool,
        duration: Duration,
        input_tokens: u64,
        output_tokens: u64,
    ) {
        self.inner.facts_calls_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.inner.facts_calls_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.facts_calls_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .facts_tokens_input
            .fetch_add(input_tokens, Ordering::Relaxed);
        self.inner
            .facts_tokens_output
            .fetch_add(output_tokens, Ordering::Relaxed);
        self.inner
            .facts_latency_ms
            .write()
            .push(duration.as_millis() as u64);
    }

    pub fn record_overlay_call(&self, success: bool, duration: Duration) {
        self.inner.overlay_calls_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.inner
                .overlay_calls_success
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner
                .overlay_calls_failed
                .fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .overlay_latency_ms
            .write()
            .push(duration.as_millis() as u64);
    }

    pub fn record_upload_stored(&self) {
        self.inner.uploads_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overlay_generated(&self) {
        self.inner.overlays_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_endpoint_request(&self, endpoint: &str) {
        self.inner
            .endpoint_counters
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let facts_latency = self.inner.facts_latency_ms.read();
        let facts_latency_avg = avg(&facts_latency);
        let facts_latency_p95 = percentile(&facts_latency, 0.95);
        drop(facts_latency);

        let overlay_latency = self.inner.overlay_latency_ms.read();
        let overlay_latency_avg = avg(&overlay_latency);
        let overlay_latency_p95 = percentile(&overlay_latency, 0.95);
        drop(overlay_latency);

        let endpoints = self
            .inner
            .endpoint_counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            facts_calls_total: self.inner.facts_calls_total.load(Ordering::Relaxed),
            facts_calls_success: self.inner.facts_calls_success.load(Ordering::Relaxed),
            facts_calls_failed: self.inner.facts_calls_failed.load(Ordering::Relaxed),
            facts_tokens_input: self.inner.facts_tokens_input.load(Ordering::Relaxed),
            facts_tokens_output: self.inner.facts_tokens_output.load(Ordering::Relaxed),
            facts_latency_avg_ms: facts_latency_avg,
            facts_latency_p95_ms: facts_latency_p95,
            overlay_calls_total: self.inner.overlay_calls_total.load(Ordering::Relaxed),
            overlay_calls_success: self.inner.overlay_calls_success.load(Ordering::Relaxed),
            overlay_calls_failed: self.inner.overlay_calls_failed.load(Ordering::Relaxed),
            overlay_latency_avg_ms: overlay_latency_avg,
            overlay_latency_p95_ms: overlay_latency_p95,
            uploads_stored: self.inner.uploads_stored.load(Ordering::Relaxed),
            overlays_generated: self.inner.overlays_generated.load(Ordering::Relaxed),
            endpoints,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP facts_calls_total Total number of facts API calls made
# TYPE facts_calls_total counter
facts_calls_total {{}} {}

# HELP facts_calls_success Number of successful facts API calls
# TYPE facts_calls_success counter
facts_calls_success {{}} {}

# HELP facts_calls_failed Number of failed facts API calls
# TYPE facts_calls_failed counter
facts_calls_failed {{}} {}

# HELP facts_tokens_input_total Total input tokens consumed
# TYPE facts_tokens_input_total counter
facts_tokens_input_total {{}} {}

# HELP facts_tokens_output_total Total output tokens generated
# TYPE facts_tokens_output_total counter
facts_tokens_output_total {{}} {}

# HELP facts_latency_avg_ms Average facts API latency in milliseconds
# TYPE facts_latency_avg_ms gauge
facts_latency_avg_ms {{}} {}

# HELP overlay_calls_total Total number of overlay API calls made
# TYPE overlay_calls_total counter
overlay_calls_total {{}} {}

# HELP overlay_calls_failed Number of failed overlay API calls
# TYPE overlay_calls_failed counter
overlay_calls_failed {{}} {}

# HELP overlay_latency_avg_ms Average overlay API latency in milliseconds
# TYPE overlay_latency_avg_ms gauge
overlay_latency_avg_ms {{}} {}

# HELP uploads_stored_total Total uploaded images persisted
# TYPE uploads_stored_total counter
uploads_stored_total {{}} {}

# HELP overlays_generated_total Total overlay images generated
# TYPE overlays_generated_total counter
overlays_generated_total {{}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            snapshot.facts_calls_total,
            snapshot.facts_calls_success,
            snapshot.facts_calls_failed,
            snapshot.facts_tokens_input,
            snapshot.facts_tokens_output,
            snapshot.facts_latency_avg_ms,
            snapshot.overlay_calls_total,
            snapshot.overlay_calls_failed,
            snapshot.overlay_latency_avg_ms,
            snapshot.uploads_stored,
            snapshot.overlays_generated,
            snapshot.uptime_seconds,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub facts_calls_total: usize,
    pub facts_calls_success: usize,
    pub facts_calls_failed: usize,
    pub facts_tokens_input: u64,
    pub facts_tokens_output: u64,
    pub facts_latency_avg_ms: u64,
    pub facts_latency_p95_ms: u64,
    pub overlay_calls_total: usize,
    pub overlay_calls_success: usize,
    pub overlay_calls_failed: usize,
    pub overlay_latency_avg_ms: u64,
    pub overlay_latency_p95_ms: u64,
    pub uploads_stored: usize,
    pub overlays_generated: usize,
    pub endpoints: std::collections::HashMap<String, usize>,
    pub uptime_seconds: u64,
}

fn percentile(values: &[u64], p: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((values.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_facts_call(true, Duration::from_millis(100), 500, 200);
        metrics.record_facts_call(false, Duration::from_millis(50), 0, 0);
        metrics.record_overlay_call(true, Duration::from_millis(900));
        metrics.record_upload_stored();
        metrics.record_overlay_generated();
        metrics.record_endpoint_request("/api/objects");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.facts_calls_total, 2);
        assert_eq!(snapshot.facts_calls_success, 1);
        assert_eq!(snapshot.facts_calls_failed, 1);
        assert_eq!(snapshot.facts_tokens_input, 500);
        assert_eq!(snapshot.facts_tokens_output, 200);
        assert_eq!(snapshot.overlay_calls_total, 1);
        assert_eq!(snapshot.uploads_stored, 1);
        assert_eq!(snapshot.overlays_generated, 1);
        assert_eq!(snapshot.endpoints.get("/api/objects"), Some(&1));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_facts_call(true, Duration::from_millis(100), 500, 200);

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("facts_calls_total {} 1"));
        assert!(prometheus.contains("facts_tokens_input_total {} 500"));
    }
}
