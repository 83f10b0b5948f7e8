//! Metrics for the sealing service
//!
//! A fixed set of instruments, updated synchronously from handlers and
//! rendered in Prometheus text format on `/metrics`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::domain::LedgerStats;

/// Predefined metric names
pub mod metric_names {
    pub const SEALS_ACCEPTED: &str = "docseal.seals.accepted";
    pub const SEALS_REJECTED: &str = "docseal.seals.rejected";
    pub const VERIFY_REQUESTS: &str = "docseal.verify.requests";
    pub const SEAL_LATENCY: &str = "docseal.seal.latency_seconds";
    pub const DOCUMENTS: &str = "docseal.documents";
    pub const SEALS_TOTAL: &str = "docseal.seals.total";
    pub const UPTIME: &str = "docseal.uptime_seconds";
}

/// Latency buckets in seconds
const LATENCY_BUCKETS: [f64; 10] = [
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5,
];

/// Service metrics
pub struct MetricsRegistry {
    seals_accepted: AtomicU64,
    /// Rejections keyed by error code
    seals_rejected: Mutex<BTreeMap<&'static str, u64>>,
    /// Verification requests keyed by mode
    verify_requests: Mutex<BTreeMap<&'static str, u64>>,
    documents: AtomicU64,
    seals_total: AtomicU64,
    seal_latency: Histogram,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            seals_accepted: AtomicU64::new(0),
            seals_rejected: Mutex::new(BTreeMap::new()),
            verify_requests: Mutex::new(BTreeMap::new()),
            documents: AtomicU64::new(0),
            seals_total: AtomicU64::new(0),
            seal_latency: Histogram::new(&LATENCY_BUCKETS),
            start_time: Instant::now(),
        }
    }

    pub fn record_seal_accepted(&self) {
        self.seals_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_seal_rejected(&self, code: &'static str) {
        bump(&self.seals_rejected, code);
    }

    pub fn record_verify(&self, mode: &'static str) {
        bump(&self.verify_requests, mode);
    }

    /// Start timing one seal; call [`SealTimer::finish`] when it completes.
    pub fn start_seal_timer(&self) -> SealTimer<'_> {
        SealTimer {
            metrics: self,
            start: Instant::now(),
        }
    }

    /// Refresh the ledger-size gauges.
    pub fn set_ledger_stats(&self, stats: LedgerStats) {
        self.documents.store(stats.documents as u64, Ordering::Relaxed);
        self.seals_total.store(stats.seals as u64, Ordering::Relaxed);
    }

    pub fn seals_accepted(&self) -> u64 {
        self.seals_accepted.load(Ordering::Relaxed)
    }

    /// Rejections with `code`, or across all codes when `None`.
    pub fn seals_rejected(&self, code: Option<&str>) -> u64 {
        let rejected = lock(&self.seals_rejected);
        match code {
            Some(code) => rejected.get(code).copied().unwrap_or(0),
            None => rejected.values().sum(),
        }
    }

    pub fn verify_requests(&self, mode: &str) -> u64 {
        lock(&self.verify_requests).get(mode).copied().unwrap_or(0)
    }

    pub fn seal_latency_count(&self) -> u64 {
        self.seal_latency.count()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        use metric_names::*;

        let mut out = String::new();

        write_single(&mut out, UPTIME, "gauge", self.uptime_seconds());
        write_single(&mut out, SEALS_ACCEPTED, "counter", self.seals_accepted());
        write_labeled(&mut out, SEALS_REJECTED, "code", &lock(&self.seals_rejected));
        write_labeled(&mut out, VERIFY_REQUESTS, "mode", &lock(&self.verify_requests));
        write_single(
            &mut out,
            DOCUMENTS,
            "gauge",
            self.documents.load(Ordering::Relaxed),
        );
        write_single(
            &mut out,
            SEALS_TOTAL,
            "gauge",
            self.seals_total.load(Ordering::Relaxed),
        );
        self.seal_latency.write_prometheus(&mut out, SEAL_LATENCY);

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Records elapsed seal time into the latency histogram
pub struct SealTimer<'a> {
    metrics: &'a MetricsRegistry,
    start: Instant,
}

impl SealTimer<'_> {
    pub fn finish(self) {
        self.metrics
            .seal_latency
            .observe(self.start.elapsed().as_secs_f64());
    }
}

/// Fixed-bucket histogram; the sum is kept in microseconds.
struct Histogram {
    bounds: &'static [f64],
    buckets: Vec<AtomicU64>,
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    fn new(bounds: &'static [f64]) -> Self {
        Self {
            bounds,
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    fn observe(&self, seconds: f64) {
        self.sum_micros
            .fetch_add((seconds * 1_000_000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        if let Some(i) = self.bounds.iter().position(|bound| seconds <= *bound) {
            self.buckets[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn write_prometheus(&self, out: &mut String, name: &str) {
        let name = prometheus_name(name);
        out.push_str(&format!("# TYPE {name} histogram\n"));

        let mut cumulative = 0u64;
        for (bound, bucket) in self.bounds.iter().zip(&self.buckets) {
            cumulative += bucket.load(Ordering::Relaxed);
            out.push_str(&format!("{name}_bucket{{le=\"{bound}\"}} {cumulative}\n"));
        }
        let count = self.count();
        out.push_str(&format!("{name}_bucket{{le=\"+Inf\"}} {count}\n"));
        out.push_str(&format!(
            "{name}_sum {}\n",
            self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));
        out.push_str(&format!("{name}_count {count}\n"));
    }
}

fn prometheus_name(name: &str) -> String {
    name.replace(['.', '-'], "_")
}

fn write_single(out: &mut String, name: &str, kind: &str, value: u64) {
    let name = prometheus_name(name);
    out.push_str(&format!("# TYPE {name} {kind}\n{name} {value}\n"));
}

fn write_labeled(out: &mut String, name: &str, label: &str, values: &BTreeMap<&'static str, u64>) {
    let name = prometheus_name(name);
    out.push_str(&format!("# TYPE {name} counter\n"));
    for (key, value) in values {
        out.push_str(&format!("{name}{{{label}=\"{key}\"}} {value}\n"));
    }
}

fn bump(map: &Mutex<BTreeMap<&'static str, u64>>, key: &'static str) {
    *lock(map).entry(key).or_insert(0) += 1;
}

// Counters stay usable after a panic elsewhere.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
