/// Point-in-time counter snapshot of an LHD engine.
///
/// Produced by [`Lhd::metrics_snapshot`](crate::policy::lhd::Lhd::metrics_snapshot)
/// for the enclosing cache's stats output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LhdMetricsSnapshot {
    pub update_calls: u64,
    pub insertions: u64,
    pub hits: u64,
    pub replaced_calls: u64,

    pub reconfigurations: u64,
    /// Age overflows since the last reconfiguration.
    pub overflows: u64,

    // gauges captured at snapshot time
    pub age_coarsening_shift: u32,
    pub resident_tags: usize,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_zeroed() {
        let snap = LhdMetricsSnapshot::default();
        assert_eq!(snap.update_calls, 0);
        assert_eq!(snap.resident_tags, 0);
        assert_eq!(snap.age_coarsening_shift, 0);
    }
}
