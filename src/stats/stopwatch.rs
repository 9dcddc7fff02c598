use std::time::{Duration, Instant};

/// Wall-clock timer that can be paused.
///
/// Time spent while paused (logging, user callbacks) is not counted towards
/// [`elapsed`](Self::elapsed), so time limits only charge the search itself.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    running_since: Option<Instant>,
    accumulated: Duration,
}

impl Stopwatch {
    /// A stopped watch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to zero and starts running.
    pub fn start() -> Self {
        Self {
            running_since: Some(Instant::now()),
            accumulated: Duration::ZERO,
        }
    }

    /// Stops counting until [`resume`](Self::resume). No-op when paused.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    /// Continues counting. No-op when running.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Counted time so far.
    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.running_since.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Runs `action` with the watch paused.
    pub fn excluding<R>(&mut self, action: impl FnOnce() -> R) -> R {
        let was_running = self.is_running();
        self.pause();
        let result = action();
        if was_running {
            self.resume();
        }
        result
    }
}
