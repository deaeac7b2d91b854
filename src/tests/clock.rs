use std::{sync::Mutex, time::Duration};

use crate::Clock;

/// Virtual clock: `sleep` advances time instead of waiting, and every
/// requested sleep is recorded for assertions.
pub struct MockClock {
    now: Mutex<f64>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockClock {
    pub fn new(initial: f64) -> Self {
        Self {
            now: Mutex::new(initial),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap() += seconds;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> f64 {
        self.sleeps
            .lock()
            .unwrap()
            .iter()
            .map(|duration| duration.as_secs_f64())
            .sum()
    }
}

impl Clock for MockClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration.as_secs_f64();
        self.sleeps.lock().unwrap().push(duration);
    }
}
