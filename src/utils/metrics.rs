//! Metrics collection for the redaction pipeline

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Counter and timer collector shared across pipeline stages.
#[derive(Debug, Default)]
pub struct Metrics {
    counters: RwLock<HashMap<String, u64>>,
    timers: RwLock<HashMap<String, Duration>>,
    start_times: RwLock<HashMap<String, Instant>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, delta: u64) {
        let mut counters = self.counters.write();
        *counters.entry(name.to_string()).or_insert(0) += delta;
    }

    pub fn start_timer(&self, name: &str) {
        self.start_times.write().insert(name.to_string(), Instant::now());
    }

    pub fn end_timer(&self, name: &str) {
        if let Some(started) = self.start_times.write().remove(name) {
            self.timers.write().insert(name.to_string(), started.elapsed());
        }
    }

    pub fn get_counter(&self, name: &str) -> u64 {
        self.counters.read().get(name).copied().unwrap_or(0)
    }

    pub fn get_timer(&self, name: &str) -> Option<Duration> {
        self.timers.read().get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.increment_counter("pages_processed");
        metrics.add_to_counter("pages_processed", 2);
        assert_eq!(metrics.get_counter("pages_processed"), 3);
        assert_eq!(metrics.get_counter("unknown"), 0);
    }

    #[test]
    fn timers_record_elapsed_time() {
        let metrics = Metrics::new();
        metrics.start_timer("document");
        metrics.end_timer("document");
        assert!(metrics.get_timer("document").is_some());
        assert!(metrics.get_timer("never_started").is_none());
    }
}
