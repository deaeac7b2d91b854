use std::{sync::Arc, time::Duration};

use crate::{
    Clock, Namespace, Permits, Rpm, Semaphore, SemaphoreOptions, Store, StoreKey, SystemClock,
    TollgateError,
};

const DEFAULT_COUNT_KEY: &str = "t:count";
const DEFAULT_TIMER_KEY: &str = "t:timer";
const DEFAULT_MUTEX_KEY: &str = "t:mutex";
const DEFAULT_MUTEX_INIT_KEY: &str = "t:mutex:init";
const DEFAULT_RESET_THRESHOLD: u64 = 1_000_000;

/// Configuration for a [`Throttle`].
///
/// Only the rate is required; every other field falls back to a documented
/// default, so all processes that construct a throttle with plain
/// [`ThrottleOptions::new`] over the same store share one budget.
#[derive(Debug, Clone)]
pub struct ThrottleOptions {
    /// Requests-per-minute ceiling shared by all participants. Required.
    pub rpm: Rpm,
    /// Key of the shared call counter. Defaults to `"t:count"`.
    pub count_key: Option<StoreKey>,
    /// Key of the shared last-call timestamp. Defaults to `"t:timer"`.
    pub timer_key: Option<StoreKey>,
    /// Store partition for all of the throttle's keys. Defaults to `0`.
    pub namespace: Option<Namespace>,
    /// Multiplier bounding the shared counter: it resets to zero once it
    /// reaches `reset_threshold × rpm`. Defaults to `1_000_000`.
    pub reset_threshold: Option<u64>,
    /// Gate key of the internal mutex. Defaults to `"t:mutex"`.
    pub mutex_key: Option<StoreKey>,
    /// Init-flag key of the internal mutex. Defaults to `"t:mutex:init"`.
    pub mutex_key_init: Option<StoreKey>,
}

impl ThrottleOptions {
    /// Options for `rpm` with every other field at its default.
    pub fn new(rpm: Rpm) -> Self {
        Self {
            rpm,
            count_key: None,
            timer_key: None,
            namespace: None,
            reset_threshold: None,
            mutex_key: None,
            mutex_key_init: None,
        }
    }
}

/// A cross-process rate limiter over one shared budget.
///
/// Every call to [`throttle`](Throttle::throttle) reads the shared call
/// counter and last-call timestamp, sleeps out the remainder of the minimum
/// spacing (`60 / rpm` seconds) if the last recorded call is too recent,
/// then updates both. The whole sequence runs inside a critical section
/// guarded by a distributed mutex, so overlapping callers from any process
/// are serialized one interval-wait at a time.
///
/// The shared counter and timer persist in the store across process
/// lifetimes; a throttle instance carries no shared state of its own beyond
/// its mutex bookkeeping.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tollgate::{RedisStore, Rpm, Throttle, ThrottleOptions};
///
/// let store = Arc::new(RedisStore::open("redis://127.0.0.1:6379/")?);
/// let throttle = Throttle::new(store, ThrottleOptions::new(Rpm::try_from(240.0)?));
///
/// // Returns no earlier than the shared rate policy allows.
/// throttle.throttle()?;
/// # Ok::<(), tollgate::TollgateError>(())
/// ```
pub struct Throttle<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    rpm: Rpm,
    count_key: StoreKey,
    timer_key: StoreKey,
    namespace: Namespace,
    reset_threshold: u64,
    /// Used only while the store has never recorded a timer: each instance
    /// falls back to its own construction time, not a shared first-call
    /// moment, so concurrent first use by several processes can
    /// under-throttle the first window.
    fallback_timer: f64,
    mutex: Semaphore<S>,
}

impl<S: Store> Throttle<S> {
    /// Create a throttle over `store` using the system clock.
    pub fn new(store: Arc<S>, options: ThrottleOptions) -> Self {
        Self::with_clock(store, options, Arc::new(SystemClock))
    }

    /// Create a throttle with an explicit [`Clock`], e.g. a virtual clock
    /// in tests or simulations.
    pub fn with_clock(store: Arc<S>, options: ThrottleOptions, clock: Arc<dyn Clock>) -> Self {
        let namespace = options.namespace.unwrap_or_default();

        let mutex = Semaphore::new(
            store.clone(),
            SemaphoreOptions {
                permits: Permits::one(),
                namespace,
                gate_key: options
                    .mutex_key
                    .unwrap_or_else(|| StoreKey::from_static(DEFAULT_MUTEX_KEY)),
                init_key: options
                    .mutex_key_init
                    .unwrap_or_else(|| StoreKey::from_static(DEFAULT_MUTEX_INIT_KEY)),
            },
        );

        let fallback_timer = clock.now();

        Self {
            store,
            clock,
            rpm: options.rpm,
            count_key: options
                .count_key
                .unwrap_or_else(|| StoreKey::from_static(DEFAULT_COUNT_KEY)),
            timer_key: options
                .timer_key
                .unwrap_or_else(|| StoreKey::from_static(DEFAULT_TIMER_KEY)),
            namespace,
            reset_threshold: options.reset_threshold.unwrap_or(DEFAULT_RESET_THRESHOLD),
            fallback_timer,
            mutex,
        }
    }

    /// Block until the shared rate policy allows another call.
    ///
    /// Acquires the internal mutex (blocking until it is available), then:
    /// reads the shared counter and timer, resets the counter once it has
    /// reached `reset_threshold × rpm`, sleeps out `interval - window` when
    /// the elapsed window since the last recorded call is shorter than the
    /// minimum spacing, increments the counter, stamps the timer with the
    /// post-sleep time, and releases the mutex.
    ///
    /// The sleep happens while still holding the mutex: that is what makes
    /// the read-check-sleep-update sequence a true critical section across
    /// processes, and it serializes overlapping callers one interval-wait
    /// at a time.
    ///
    /// A store failure mid-sequence is fatal to the call and propagates;
    /// the mutex is left held (see the liveness caveat on [`Semaphore`]).
    pub fn throttle(&self) -> Result<(), TollgateError> {
        self.mutex.acquire()?;

        let count = self
            .store
            .get(self.namespace, &self.count_key)?
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(0);
        let last = self
            .store
            .get(self.namespace, &self.timer_key)?
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(self.fallback_timer);

        let interval = 60.0 / *self.rpm;
        let window = self.clock.now() - last;

        if count as f64 >= self.reset_threshold as f64 * *self.rpm {
            self.store.set(self.namespace, &self.count_key, "0")?;
        }

        if window < interval {
            let wait = Duration::try_from_secs_f64(interval - window).unwrap_or(Duration::MAX);
            self.clock.sleep(wait);
        }

        self.store.increment(self.namespace, &self.count_key)?;
        let now = self.clock.now();
        self.store
            .set(self.namespace, &self.timer_key, &now.to_string())?;

        self.mutex.release()
    }

    /// Delete the shared counter, timer, and the internal mutex's keys.
    ///
    /// Destructive: this resets global throttling state for every
    /// participant. Intended for resetting between independent runs (e.g.
    /// test fixtures), not for use by a live participant.
    pub fn cleanup(&self) -> Result<(), TollgateError> {
        self.mutex.cleanup()?;
        self.store.delete(
            self.namespace,
            &[self.count_key.as_str(), self.timer_key.as_str()],
        )
    }

    /// Configured requests-per-minute ceiling.
    pub fn rpm(&self) -> Rpm {
        self.rpm
    }

    /// Key of the shared call counter.
    pub fn count_key(&self) -> &StoreKey {
        &self.count_key
    }

    /// Key of the shared last-call timestamp.
    pub fn timer_key(&self) -> &StoreKey {
        &self.timer_key
    }

    /// Store partition for all of the throttle's keys.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Multiplier bounding the shared counter's growth.
    pub fn reset_threshold(&self) -> u64 {
        self.reset_threshold
    }

    /// The internal mutex guarding the critical section, e.g. for
    /// inspecting its configured keys.
    pub fn mutex(&self) -> &Semaphore<S> {
        &self.mutex
    }
}
