use std::time::Duration;

use crate::{Namespace, TollgateError};

/// Atomic primitives of the shared store that all participating processes
/// coordinate through.
///
/// Every call is scoped to one [`Namespace`]. Values are opaque scalars;
/// numeric fields are parsed and formatted by the callers. Implementations
/// must map each method onto a command that is atomic on the store side:
/// the coordination algorithms rely on command-level atomicity (atomic
/// increment, atomic get-and-replace) rather than any client-side locking.
pub trait Store: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, TollgateError>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<(), TollgateError>;

    /// Atomically store `value` under `key` and return the previous value,
    /// if any.
    fn get_and_replace(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, TollgateError>;

    /// Atomically increment the integer stored under `key` (treating an
    /// absent value as 0) and return the new value.
    fn increment(&self, namespace: Namespace, key: &str) -> Result<i64, TollgateError>;

    /// Delete every listed key. Absent keys are not an error.
    fn delete(&self, namespace: Namespace, keys: &[&str]) -> Result<(), TollgateError>;

    /// Push `value` onto the left end of the list stored under `key`,
    /// creating the list if absent.
    fn list_push_left(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> Result<(), TollgateError>;

    /// Pop the leftmost element of the list stored under `key`, blocking the
    /// calling thread until an element is available.
    ///
    /// A zero `timeout` means wait indefinitely; `None` is only returned
    /// when a non-zero timeout expires first.
    fn blocking_list_pop_left(
        &self,
        namespace: Namespace,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>, TollgateError>;
}
