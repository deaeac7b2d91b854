use std::{
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Wall-clock and sleep source for the throttle.
///
/// The rate policy works on fractional Unix timestamps, so `now` returns
/// seconds since the epoch as an `f64`. Implementors must be thread-safe;
/// `sleep` must block the calling thread for the full duration.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> f64;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by the system time and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
