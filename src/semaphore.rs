use std::{
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{Namespace, Permits, Store, StoreKey, TollgateError};

/// Configuration for a [`Semaphore`]. All fields are required.
#[derive(Debug, Clone)]
pub struct SemaphoreOptions {
    /// Number of simultaneous holders the gate is configured for.
    ///
    /// Note the seeding caveat on [`Semaphore`]: only `permits = 1` gives a
    /// correct gate.
    pub permits: Permits,
    /// Store partition holding the gate's keys.
    pub namespace: Namespace,
    /// Key of the list holding available tokens.
    pub gate_key: StoreKey,
    /// Key of the flag marking whether the gate has been seeded.
    pub init_key: StoreKey,
}

/// A distributed mutual-exclusion gate coordinated through the shared
/// store's blocking-list primitives.
///
/// Any number of instances across unrelated processes may coordinate on the
/// same `gate_key`/`init_key` pair; whichever instance first calls
/// [`acquire`](Semaphore::acquire) wins a race to seed the gate with its
/// token. Acquiring pops a token from the gate list, blocking indefinitely
/// until one is available; releasing pushes one back.
///
/// # Caveats
///
/// - The seeding path pushes exactly **one** token regardless of the
///   configured permit count (the count is carried as that token's value),
///   so the primitive only behaves as a true gate with `permits = 1`.
/// - There is no lease or expiry on a held token. A process that dies
///   between acquire and release starves every other participant until the
///   keys are repaired externally.
/// - Global correctness depends on every participant pairing exactly one
///   acquire with one release. The release guard only stops a single
///   instance from over-releasing, not the union of all instances.
pub struct Semaphore<S> {
    store: Arc<S>,
    permits: Permits,
    namespace: Namespace,
    gate_key: StoreKey,
    init_key: StoreKey,
    initialized: AtomicBool,
    /// Number of permits this instance may still legally release. Starts at
    /// `permits`, decremented on acquire, incremented on release; may go
    /// negative when paired instances release on each other's behalf.
    outstanding_releases: AtomicI64,
}

impl<S: Store> Semaphore<S> {
    /// Create a semaphore over `store` with the given options.
    pub fn new(store: Arc<S>, options: SemaphoreOptions) -> Self {
        Self {
            store,
            permits: options.permits,
            namespace: options.namespace,
            gate_key: options.gate_key,
            init_key: options.init_key,
            initialized: AtomicBool::new(false),
            outstanding_releases: AtomicI64::new(i64::from(*options.permits)),
        }
    }

    /// Remove one token from the gate, blocking the calling thread
    /// indefinitely until one is available.
    ///
    /// The first call on each instance lazily seeds the gate (see the type
    /// docs). Returns the popped token value; it is informational and
    /// callers do not need to interpret it.
    ///
    /// There is no timeout or cancellation: a caller stays blocked until
    /// some participant releases.
    pub fn acquire(&self) -> Result<String, TollgateError> {
        self.initialize()?;

        let token = loop {
            // An infinite-timeout pop only yields empty on stores that
            // time out anyway; retry rather than fail.
            if let Some(token) =
                self.store
                    .blocking_list_pop_left(self.namespace, &self.gate_key, Duration::ZERO)?
            {
                break token;
            }
        };

        self.outstanding_releases.fetch_sub(1, Ordering::SeqCst);
        Ok(token)
    }

    /// Push one token back onto the gate.
    ///
    /// If this instance holds nothing (every acquire already paired with a
    /// release), the call is reported at warning level and ignored, so a
    /// single instance cannot push more tokens than it popped.
    pub fn release(&self) -> Result<(), TollgateError> {
        if self.outstanding_releases.load(Ordering::SeqCst) >= i64::from(*self.permits) {
            tracing::warn!(gate = %self.gate_key, "release without a matching acquire, ignoring");
            return Ok(());
        }

        self.store
            .list_push_left(self.namespace, &self.gate_key, "1")?;
        self.outstanding_releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Delete the gate's keys from the store.
    ///
    /// Destructive: this invalidates the gate for every current holder and
    /// waiter. Intended for a supervisory or reset process, never for a
    /// normal participant mid-lifecycle.
    pub fn cleanup(&self) -> Result<(), TollgateError> {
        self.store.delete(
            self.namespace,
            &[self.gate_key.as_str(), self.init_key.as_str()],
        )
    }

    /// Configured number of simultaneous holders.
    pub fn permits(&self) -> Permits {
        self.permits
    }

    /// Store partition holding the gate's keys.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Key of the list holding available tokens.
    pub fn gate_key(&self) -> &StoreKey {
        &self.gate_key
    }

    /// Key of the flag marking whether the gate has been seeded.
    pub fn init_key(&self) -> &StoreKey {
        &self.init_key
    }

    /// Seed the gate exactly once across all coordinating instances.
    ///
    /// Atomically replaces the init flag with `1`; the instance that read
    /// anything else back is the seeder and pushes a single token carrying
    /// the configured permit count. Repeat calls on the same instance are
    /// no-ops via a local flag.
    fn initialize(&self) -> Result<(), TollgateError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let previous = self
            .store
            .get_and_replace(self.namespace, &self.init_key, "1")?;

        if previous.as_deref() != Some("1") {
            let seed = (*self.permits).to_string();
            self.store
                .list_push_left(self.namespace, &self.gate_key, &seed)?;
        }

        Ok(())
    }
}
