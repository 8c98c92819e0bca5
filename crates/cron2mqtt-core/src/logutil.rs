//! Timing helpers for logs.

use std::time::Instant;

use tracing::Level;

/// Logs `"<what> (1/2)"` when started and `"<what> (2/2)"` with the elapsed
/// time when dropped.
pub struct TimerLog {
    level: Level,
    what: String,
    start: Instant,
}

impl TimerLog {
    pub fn start(level: Level, what: impl Into<String>) -> Self {
        let what = what.into();
        emit(level, &what, "(1/2)", None);
        Self {
            level,
            what,
            start: Instant::now(),
        }
    }

    /// Stop the timer now rather than at the end of the scope.
    pub fn stop(self) {}
}

impl Drop for TimerLog {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        emit(self.level, &self.what, "(2/2)", Some(elapsed_ms));
    }
}

fn emit(level: Level, what: &str, step: &str, elapsed_ms: Option<f64>) {
    macro_rules! at {
        ($mac:ident) => {
            match elapsed_ms {
                Some(ms) => tracing::$mac!(duration_ms = ms, "{} {}", what, step),
                None => tracing::$mac!("{} {}", what, step),
            }
        };
    }

    if level == Level::ERROR {
        at!(error)
    } else if level == Level::WARN {
        at!(warn)
    } else if level == Level::INFO {
        at!(info)
    } else if level == Level::DEBUG {
        at!(debug)
    } else {
        at!(trace)
    }
}
