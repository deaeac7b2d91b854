#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod semaphore;
pub use semaphore::*;

mod throttle;
pub use throttle::*;

mod store;
pub use store::*;

#[cfg(feature = "redis-store")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis-store")))]
mod redis;
#[cfg(feature = "redis-store")]
pub use redis::*;

mod clock;
pub use clock::*;

mod error;
pub use error::*;

mod common;
pub use common::{Namespace, Permits, Rpm, StoreKey};

#[cfg(test)]
mod tests;
