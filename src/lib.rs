//! lhdkit: the Least Hit Density (LHD) cache replacement engine.
//!
//! LHD ranks every resident object by its estimated future hits per unit of
//! cache space and evicts the object with the least. The estimate is learned
//! online from the workload's hit/eviction age distributions, stratified by
//! (application, recency) class. See `src/policy/lhd.rs` for the engine and
//! `DESIGN.md` for internal architecture and invariants.

pub mod config;
pub mod ds;
pub mod error;
pub mod policy;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
