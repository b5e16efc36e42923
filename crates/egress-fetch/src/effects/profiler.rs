use std::time::{Duration, Instant};

use tracing::debug;

/// Tag for time spent waiting on remote servers.
pub const NETWORK: &str = "network";

/// Sink for timing measurements.
pub trait Profiler: Send + Sync {
    fn record(&self, tag: &'static str, elapsed: Duration);
}

/// Reports every measurement as a `debug` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProfiler;

impl Profiler for TracingProfiler {
    fn record(&self, tag: &'static str, elapsed: Duration) {
        debug!(tag, elapsed_ms = elapsed.as_millis() as u64, "timing");
    }
}

/// Running measurement, reported to the profiler when dropped.
#[must_use = "the measurement ends when the guard is dropped"]
pub struct Recording<'a> {
    profiler: &'a dyn Profiler,
    tag:      &'static str,
    started:  Instant,
}

impl<'a> Recording<'a> {
    pub fn start(profiler: &'a dyn Profiler, tag: &'static str) -> Self {
        Self {
            profiler,
            tag,
            started: Instant::now(),
        }
    }
}

impl Drop for Recording<'_> {
    fn drop(&mut self) { self.profiler.record(self.tag, self.started.elapsed()); }
}
