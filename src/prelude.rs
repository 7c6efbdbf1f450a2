pub use crate::config::LhdConfig;
pub use crate::ds::{SamplePool, XorShift64};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lhd::Lhd;
pub use crate::traits::{Access, CacheView, Request, StaticView};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LhdMetricsSnapshot;
