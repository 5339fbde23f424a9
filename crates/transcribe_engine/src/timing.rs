use std::future::Future;
use std::time::{Duration, Instant};

/// Measures wall-clock time from [`Stopwatch::start`].
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Awaits `future` and returns its output with the time it took.
pub async fn timed<F: Future>(future: F) -> (F::Output, Duration) {
    let stopwatch = Stopwatch::start();
    let output = future.await;
    (output, stopwatch.elapsed())
}

/// `1.234s` → `"1.23"`, the way elapsed time is reported to users.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}
