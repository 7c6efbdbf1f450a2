// ==============================================
// LHD END-TO-END SCENARIOS (integration)
// ==============================================
//
// Deterministic workload scenarios driven through the public engine API with
// fixed RNG seeds. Each module covers one behavior of the full
// update / rank / replaced / reconfigure loop.

use lhdkit::config::LhdConfig;
use lhdkit::policy::lhd::Lhd;
use lhdkit::traits::{Access, StaticView};

fn view(num_objects: usize) -> StaticView {
    StaticView {
        num_objects,
        consumed_capacity: 0,
    }
}

// ==============================================
// Cold Start
// ==============================================
//
// Before the first reconfiguration the engine ranks on the initial
// GDSF-like curve, so scores are fully predictable.

mod cold_start {
    use super::*;

    #[test]
    fn rank_uses_the_initial_gdsf_curve() {
        let config = LhdConfig {
            max_age: 2_000,
            ..LhdConfig::default()
        };
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 7).unwrap();
        for id in 0..10u64 {
            lhd.update(id, &Access::new(0, 100), &view(id as usize + 1));
        }
        assert_eq!(lhd.num_reconfigurations(), 0);

        // Fresh tags of app 0 sit in the last recency stratum: class 15.
        // Tag `id` was stamped at time `id`, so its age is 10 - id and its
        // density is 16 / (age + 1) / 100.
        for id in 0..10u64 {
            let age = 10 - id;
            let expected = 16.0 / (age + 1) as f64 / 100.0;
            let got = lhd.hit_density_of(&id).unwrap();
            assert!(
                (got - expected).abs() < 1e-12,
                "id {} density {} != gdsf {}",
                id,
                got,
                expected
            );
        }

        let victim = lhd.rank(&Access::new(0, 100));
        assert!(victim < 10, "victim {} is not a resident id", victim);
        assert!(lhd.contains(&victim));
    }
}

// ==============================================
// Hot Item Survives
// ==============================================

mod hot_item_survives {
    use super::*;

    const HOT: u64 = 0;

    #[test]
    fn learned_densities_protect_the_hot_object() {
        let config = LhdConfig {
            max_age: 2_000,
            accs_per_reconfiguration: 2_000,
            ..LhdConfig::default()
        };
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 11).unwrap();
        let v = view(1_001);

        // Alternate the hot id with 1000 one-shot ids: exactly one
        // reconfiguration fires at access 2000.
        for i in 0..1_000u64 {
            lhd.update(HOT, &Access::new(0, 100), &v);
            lhd.update(1 + i, &Access::new(0, 100), &v);
        }
        assert_eq!(lhd.num_reconfigurations(), 1);

        // The hot object's class concentrates its hit mass at tiny ages.
        let hot_class = lhd.debug_class_of(&HOT).unwrap();
        let hits = lhd.debug_class_hits(hot_class);
        let near: f64 = hits[..4].iter().sum();
        let total: f64 = hits.iter().sum();
        assert!(total > 0.0);
        assert!(
            near / total > 0.99,
            "hit mass not concentrated at small ages: {}/{}",
            near,
            total
        );

        // Every one-shot object ranks below the hot one.
        let hot_density = lhd.hit_density_of(&HOT).unwrap();
        for b in 1..=1_000u64 {
            let cold_density = lhd.hit_density_of(&b).unwrap();
            assert!(
                hot_density > cold_density,
                "one-shot id {} outranks the hot object ({} vs {})",
                b,
                cold_density,
                hot_density
            );
        }
    }
}

// ==============================================
// Size Sensitivity
// ==============================================

mod size_sensitivity {
    use super::*;

    /// Replays one trace with every object size scaled by `size`, then
    /// reports the hit density of id 0.
    fn density_after_trace(size: u64) -> f64 {
        let config = LhdConfig {
            max_age: 2_000,
            accs_per_reconfiguration: 500,
            ..LhdConfig::default()
        };
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 99).unwrap();
        let v = view(10);

        for i in 0..3_000u64 {
            lhd.update(i % 10, &Access::new(0, size), &v);
        }
        lhd.hit_density_of(&0).unwrap()
    }

    #[test]
    fn density_scales_inversely_with_size() {
        // Identical access pattern, sizes 1 and 1024: the class histograms
        // (and so the learned curves) are byte-for-byte the same, and only
        // the per-byte division differs.
        let small = density_after_trace(1);
        let large = density_after_trace(1024);

        assert!(small > 0.0);
        assert!(
            (small - 1024.0 * large).abs() <= 1e-12 * small,
            "density({}) != 1024 * density({})",
            small,
            large
        );
    }
}

// ==============================================
// Coarsening Compression
// ==============================================

mod coarsening_compression {
    use super::*;

    #[test]
    fn fifty_thousand_objects_select_shift_eight() {
        let config = LhdConfig {
            accs_per_reconfiguration: 1_000,
            ..LhdConfig::default()
        };
        let cadence = config.accs_per_reconfiguration;
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 3).unwrap();
        let v = view(50_000);

        // Five reconfigurations with a steady 50k-object container.
        for i in 0..(5 * cadence) {
            lhd.update(i % 500, &Access::new(0, 100), &v);
        }
        assert_eq!(lhd.num_reconfigurations(), 5);
        assert_eq!(lhd.age_coarsening_shift(), 0);

        let before: Vec<(u64, u64)> = (0..500u64)
            .filter_map(|id| lhd.debug_tag_timestamp(&id).map(|t| (id, t)))
            .collect();
        assert_eq!(before.len(), 500);

        // The sixth reconfiguration rescales: 50000 / (0.01 * 20000) = 250,
        // and the smallest shift with 2^s >= 250 is 8. Fresh ids keep the
        // observed tags untouched until the rescale lands.
        for i in 0..cadence {
            lhd.update(1_000_000 + i, &Access::new(0, 100), &v);
        }
        assert_eq!(lhd.num_reconfigurations(), 6);
        assert_eq!(lhd.age_coarsening_shift(), 8);

        for (id, old) in before {
            assert_eq!(
                lhd.debug_tag_timestamp(&id),
                Some(old >> 8),
                "tag {} not rescaled",
                id
            );
        }
    }
}

// ==============================================
// Overflow Recovery
// ==============================================

mod overflow_recovery {
    use super::*;

    #[test]
    fn stale_object_clamps_and_keeps_counting() {
        let config = LhdConfig {
            max_age: 32,
            accs_per_reconfiguration: 1_000_000,
            ..LhdConfig::default()
        };
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 5).unwrap();

        lhd.update(0, &Access::new(0, 100), &view(1));

        // Hold the object for twice the histogram span without touching it.
        for i in 0..64u64 {
            lhd.update(1 + i, &Access::new(0, 100), &view(2 + i as usize));
        }

        // Each density probe computes a clamped age and counts one overflow.
        let base = lhd.overflows();
        for probe in 1..=5u64 {
            let density = lhd.hit_density_of(&0).unwrap();
            assert!(density.is_finite());
            assert_eq!(lhd.overflows(), base + probe);
        }

        // A real hit on the stale object lands in the last bucket and the
        // engine keeps going.
        let class = lhd.debug_class_of(&0).unwrap();
        lhd.update(0, &Access::new(0, 100), &view(65));
        assert_eq!(lhd.debug_class_hits(class)[31], 1.0);
        assert!(lhd.contains(&0));
    }
}

// ==============================================
// Replaced Accounting
// ==============================================

mod replaced_accounting {
    use super::*;

    fn eviction_mass(lhd: &Lhd<u64>) -> f64 {
        (0..lhd.config().num_classes())
            .map(|c| lhd.debug_class_evictions(c).iter().sum::<f64>())
            .sum()
    }

    #[test]
    fn replaced_calls_match_charged_evictions() {
        let config = LhdConfig {
            max_age: 2_000,
            accs_per_reconfiguration: 10_000,
            ..LhdConfig::default()
        };
        let cadence = config.accs_per_reconfiguration;
        let decay = config.ewma_decay;
        let mut lhd: Lhd<u64> = Lhd::with_seed(config, 42).unwrap();
        let v = view(200);

        let mut replaced_calls = 0u64;
        let mut next_id = 0u64;
        let mut accesses = 0u64;

        // Deterministic churn: admit until 200 residents, then evict the
        // engine's own pick before each further admission.
        while accesses < cadence - 1 {
            if lhd.len() >= 200 {
                let victim = lhd.rank(&Access::new(0, 100));
                lhd.replaced(&victim);
                replaced_calls += 1;
            }
            lhd.update(next_id, &Access::new(0, 100), &v);
            next_id += 1;
            accesses += 1;
        }

        // Still inside the first epoch: charges are undecayed and exact.
        assert_eq!(lhd.num_reconfigurations(), 0);
        let charged = eviction_mass(&lhd);
        assert!(
            (charged - replaced_calls as f64).abs() < 1e-9,
            "{} replaced calls but {} eviction mass",
            replaced_calls,
            charged
        );

        // Crossing the barrier decays every charge once.
        lhd.update(next_id, &Access::new(0, 100), &v);
        assert_eq!(lhd.num_reconfigurations(), 1);
        let after_barrier = eviction_mass(&lhd);
        assert!(
            (after_barrier - replaced_calls as f64 * decay).abs() < 1e-6,
            "decayed eviction mass {} != {} * {}",
            after_barrier,
            replaced_calls,
            decay
        );
    }
}
