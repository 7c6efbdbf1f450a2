//! Example demonstrating the LHD (Least Hit Density) replacement engine.
//!
//! LHD learns the workload's hit/eviction age distributions online and evicts
//! the sampled object with the lowest expected hits per byte of cache space.
//!
//! Run with: cargo run --example basic_lhd

use lhdkit::config::LhdConfig;
use lhdkit::policy::lhd::Lhd;
use lhdkit::traits::{Access, StaticView};

fn main() {
    println!("=== LHD Replacement Engine Example ===\n");

    // Short reconfiguration cadence so the demo refits its model quickly.
    let config = LhdConfig {
        accs_per_reconfiguration: 5_000,
        ..LhdConfig::default()
    };
    let mut lhd: Lhd<u64> = Lhd::with_seed(config, 42).unwrap();

    println!("Created engine:");
    println!("  classes: {}", lhd.config().num_classes());
    println!("  histogram length: {}", lhd.config().max_age);
    println!("  refit cadence: {} accesses\n", lhd.config().accs_per_reconfiguration);

    // A small hot set of large objects plus a stream of one-shot small ones.
    // The enclosing cache would track residency; here a fixed view suffices.
    let view = StaticView {
        num_objects: 1_000,
        consumed_capacity: 0,
    };

    println!("Feeding 20000 accesses: 10 hot ids (size 4096) interleaved");
    println!("with one-shot ids (size 100)...\n");
    let mut cold_id = 1_000u64;
    for i in 0..20_000u64 {
        if i % 2 == 0 {
            lhd.update(i % 10, &Access::new(0, 4_096), &view);
        } else {
            lhd.update(cold_id, &Access::new(1, 100), &view);
            cold_id += 1;
        }
    }

    println!("After the workload:");
    println!("  resident tags: {}", lhd.len());
    println!("  reconfigurations: {}", lhd.num_reconfigurations());
    println!("  candidate sample width: {}", lhd.candidate_count());
    println!();

    // Hot objects are 40x larger, yet their learned density per byte still
    // beats the one-shot stream.
    let hot = lhd.hit_density_of(&0).unwrap();
    let cold = lhd.hit_density_of(&(cold_id - 1)).unwrap();
    println!("Learned hit densities (per byte):");
    println!("  hot id 0 (4096 B): {:.3e}", hot);
    println!("  latest one-shot ({} B): {:.3e}", 100, cold);
    println!();

    // Evict down by 100 objects using the engine's own victim selection.
    println!("Evicting 100 victims chosen by rank()...");
    let mut hot_evicted = 0;
    for _ in 0..100 {
        let victim = lhd.rank(&Access::new(0, 100));
        if victim < 10 {
            hot_evicted += 1;
        }
        lhd.replaced(&victim);
    }

    println!("  hot ids evicted: {} / 100", hot_evicted);
    println!("  resident tags: {}", lhd.len());
    println!();
    println!("The one-shot stream is drained first: objects that will not be");
    println!("hit again carry near-zero hit density regardless of their size.");
}
