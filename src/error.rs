/// Error type for this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TollgateError {
    /// A store key failed validation.
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// A rate failed validation.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// A permit count failed validation.
    #[error("invalid permit count: {0}")]
    InvalidPermits(String),

    /// Redis error.
    #[cfg(feature = "redis-store")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis-store")))]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
