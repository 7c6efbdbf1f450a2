//! Error types for the lhdkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when engine configuration parameters are
//!   invalid (e.g. zero histogram length, out-of-range decay factor).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use lhdkit::config::LhdConfig;
//! use lhdkit::error::ConfigError;
//! use lhdkit::policy::lhd::Lhd;
//!
//! // Fallible constructor for user-configurable parameters
//! let engine: Result<Lhd<u64>, ConfigError> = Lhd::new(LhdConfig::default());
//! assert!(engine.is_ok());
//!
//! // Invalid decay is caught without panicking
//! let bad = Lhd::<u64>::new(LhdConfig {
//!     ewma_decay: 1.5,
//!     ..LhdConfig::default()
//! });
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when engine configuration parameters are invalid.
///
/// Produced by [`LhdConfig::validate`](crate::config::LhdConfig::validate)
/// and the fallible [`Lhd::new`](crate::policy::lhd::Lhd::new) constructor.
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use lhdkit::config::LhdConfig;
///
/// let err = LhdConfig { max_age: 0, ..LhdConfig::default() }
///     .validate()
///     .unwrap_err();
/// assert!(err.to_string().contains("max_age"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal engine invariants are violated.
///
/// Produced by debug-only `check_invariants` methods on the tag store and the
/// engine. Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
