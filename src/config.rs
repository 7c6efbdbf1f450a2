//! Engine tuning parameters.
//!
//! Every tunable of the LHD engine lives in [`LhdConfig`] rather than in
//! compile-time constants, so one binary can run engines with different
//! histogram lengths or reconfiguration cadences (shorter cadences are also
//! what make the scenario tests tractable). Defaults follow the values
//! published with LHD (Beckmann et al., NSDI 2018).
//!
//! | Field | Meaning | Default |
//! |-------|---------|---------|
//! | `max_age` | histogram length in coarsened ticks | 20000 |
//! | `app_classes` | number of application strata | 16 |
//! | `hit_age_classes` | number of recency strata | 16 |
//! | `accs_per_reconfiguration` | accesses between model refits | 500000 |
//! | `ewma_decay` | histogram decay factor per refit | 0.9 |
//! | `age_coarsening_error_tolerance` | target ratio of objects to buckets | 0.01 |
//! | `associativity` | eviction candidates sampled after warm-up | 64 |

use crate::error::ConfigError;

/// Tuning parameters for an [`Lhd`](crate::policy::lhd::Lhd) engine.
///
/// Construct via struct update syntax over [`Default`] and validate with
/// [`validate`](Self::validate) (the engine constructor does this for you).
///
/// # Example
///
/// ```
/// use lhdkit::config::LhdConfig;
///
/// let config = LhdConfig {
///     accs_per_reconfiguration: 10_000,
///     ..LhdConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_classes(), 256);
/// ```
#[derive(Debug, Clone)]
pub struct LhdConfig {
    /// Histogram length in coarsened ticks. Ages at or beyond this are
    /// clamped to `max_age - 1` and counted as overflows.
    pub max_age: usize,

    /// Number of application strata; a request's `app_id` is reduced modulo
    /// this value.
    pub app_classes: u32,

    /// Number of recency strata derived from the last two hit ages.
    pub hit_age_classes: usize,

    /// Accesses between reconfigurations (decay, refit, possible rescale).
    pub accs_per_reconfiguration: u64,

    /// Geometric decay applied to every histogram bucket at each
    /// reconfiguration. Must lie in `(0, 1)`.
    pub ewma_decay: f64,

    /// Target ratio of live objects to histogram buckets used when choosing
    /// the age-coarsening shift.
    pub age_coarsening_error_tolerance: f64,

    /// Eviction candidates sampled per `rank` call once the model has seen
    /// more than 50 reconfigurations. The warm-up width of 8 is fixed.
    pub associativity: u32,
}

impl Default for LhdConfig {
    fn default() -> Self {
        Self {
            max_age: 20_000,
            app_classes: 16,
            hit_age_classes: 16,
            accs_per_reconfiguration: 500_000,
            ewma_decay: 0.9,
            age_coarsening_error_tolerance: 0.01,
            associativity: 64,
        }
    }
}

impl LhdConfig {
    /// Total number of statistical classes, `app_classes * hit_age_classes`.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.app_classes as usize * self.hit_age_classes
    }

    /// Checks every parameter, returning a [`ConfigError`] naming the first
    /// offending field.
    ///
    /// # Example
    ///
    /// ```
    /// use lhdkit::config::LhdConfig;
    ///
    /// let bad = LhdConfig { ewma_decay: 0.0, ..LhdConfig::default() };
    /// assert!(bad.validate().unwrap_err().to_string().contains("ewma_decay"));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age < 2 {
            return Err(ConfigError::new(format!(
                "max_age must be >= 2, got {}",
                self.max_age
            )));
        }
        if self.app_classes == 0 {
            return Err(ConfigError::new("app_classes must be > 0"));
        }
        if self.hit_age_classes == 0 {
            return Err(ConfigError::new("hit_age_classes must be > 0"));
        }
        if self.accs_per_reconfiguration == 0 {
            return Err(ConfigError::new("accs_per_reconfiguration must be > 0"));
        }
        if !(self.ewma_decay > 0.0 && self.ewma_decay < 1.0) {
            return Err(ConfigError::new(format!(
                "ewma_decay must lie in (0, 1), got {}",
                self.ewma_decay
            )));
        }
        if !(self.age_coarsening_error_tolerance > 0.0) {
            return Err(ConfigError::new(
                "age_coarsening_error_tolerance must be > 0",
            ));
        }
        if self.associativity == 0 {
            return Err(ConfigError::new("associativity must be > 0"));
        }
        Ok(())
    }
}
