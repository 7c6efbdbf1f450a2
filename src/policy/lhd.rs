//! Least Hit Density (LHD) cache replacement policy.
//!
//! LHD evicts the object expected to contribute the fewest future hits per
//! unit of cache space. Instead of a fixed heuristic (recency, frequency), it
//! learns the workload's hit and eviction age distributions online, stratified
//! by (application, recency) class, and periodically refits a per-age "hit
//! density" curve for each class. Eviction samples a handful of resident
//! objects and picks the one whose curve value, divided by its size, is
//! lowest.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                            Lhd<K> Layout                                 │
//! │                                                                          │
//! │  tags: SamplePool<K, Tag>          classes: Vec<ClassStats>              │
//! │    dense vec + id → slot index       app_classes × hit_age_classes       │
//! │                                                                          │
//! │  ┌──────┬─────────────────────┐    ┌──────────────────────────────┐      │
//! │  │ slot │ Tag                 │    │ hits[max_age]        (f64)   │      │
//! │  ├──────┼─────────────────────┤    │ evictions[max_age]   (f64)   │      │
//! │  │  0   │ ts, ages, app, size │    │ hit_densities[max_age]       │      │
//! │  │  1   │ ts, ages, app, size │    │ total_hits / total_evictions │      │
//! │  │  …   │                     │    └──────────────────────────────┘      │
//! │  └──────┴─────────────────────┘                                          │
//! │                                                                          │
//! │  timestamp ── logical clock, +1 per update                               │
//! │  age_coarsening_shift ── ages are measured in 2^shift-access ticks       │
//! │  rng ── one XorShift64 stream shared by updater and ranker               │
//! └──────────────────────────────────────────────────────────────────────────┘
//!
//! Eviction Flow (rank)
//! ────────────────────
//!
//!   rank(req):
//!     1. k = 8 during warm-up (≤ 50 reconfigurations), else associativity
//!     2. sample k slots uniformly with replacement
//!     3. score each: hit_densities[class][age] / size
//!     4. return the id with the lowest score (ties: earliest sampled)
//!
//! Access Flow (update)
//! ────────────────────
//!
//!   update(id, req, cache):
//!     miss → append tag (recency sentinel: last_last_hit_age = max_age)
//!     hit  → charge class.hits[age], shift recency window
//!     both → refresh timestamp/app/size, burn one RNG draw, advance clock,
//!            reconfigure every accs_per_reconfiguration accesses
//!
//! Reconfigure Flow
//! ────────────────
//!
//!   1. decay every histogram bucket by ewma_decay; recompute class totals
//!   2. adapt age coarsening (rescales at reconfigurations 5 and 25 only)
//!   3. refit hit densities via one backward sweep per class
//!   4. reset the overflow counter
//! ```
//!
//! ## Operations
//!
//! | Operation    | Time          | Notes                                     |
//! |--------------|---------------|-------------------------------------------|
//! | `update`     | O(1) amortized| reconfiguration cost is amortized over    |
//! |              |               | `accs_per_reconfiguration` accesses       |
//! | `rank`       | O(k)          | k = candidate sample width                |
//! | `replaced`   | O(1)          | swap-pop removal                          |
//! | reconfigure  | O(classes × max_age) | runs every 500k accesses (default) |
//!
//! ## Age coarsening
//!
//! Ages index fixed-length histograms, so the engine measures them in ticks
//! of `2^age_coarsening_shift` accesses. The shift is chosen from the
//! observed object count so that typical ages stay within `max_age` buckets;
//! it is adapted exactly twice (reconfigurations 5 and 25), each time
//! compressing or stretching every histogram and rescaling every resident
//! tag's timestamp so existing ages remain consistent.
//!
//! ## Example Usage
//!
//! ```
//! use lhdkit::config::LhdConfig;
//! use lhdkit::policy::lhd::Lhd;
//! use lhdkit::traits::{Access, StaticView};
//!
//! let mut lhd: Lhd<u64> = Lhd::new(LhdConfig::default()).unwrap();
//! let view = StaticView { num_objects: 4, consumed_capacity: 400 };
//!
//! // Admit four objects
//! for id in 0u64..4 {
//!     lhd.update(id, &Access::new(0, 100), &view);
//! }
//!
//! // Pick a victim and tell the engine it is gone
//! let victim = lhd.rank(&Access::new(0, 100));
//! lhd.replaced(&victim);
//! assert_eq!(lhd.len(), 3);
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe; the enclosing cache serializes `update` / `rank` /
//! `replaced` calls. Wrap in external synchronization for multi-threaded use.
//!
//! ## References
//!
//! - Beckmann, Chen, Sanchez. "LHD: Improving Cache Hit Rate by Maximizing
//!   Hit Density", NSDI 2018.

use std::cell::Cell;
use std::hash::Hash;

use crate::config::LhdConfig;
use crate::ds::{SamplePool, XorShift64};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::LhdMetricsSnapshot;
use crate::traits::{CacheView, Request};

/// Candidate sample width while the model is still untrained.
const WARMUP_CANDIDATES: u32 = 8;

/// Reconfigurations after which the ranker switches from the warm-up width
/// to the configured associativity.
const WARMUP_RECONFIGURATIONS: u64 = 50;

/// Event-mass floor below which a hit density is pinned to zero instead of
/// dividing near-empty histogram tails.
const RANK_EPSILON: f64 = 1e-5;

/// Reconfiguration counts at which the age coarsening may rescale.
const RESCALE_POINTS: [u64; 2] = [5, 25];

/// Per-resident-object metadata.
///
/// `timestamp` is recorded in coarsened ticks (the engine clock shifted right
/// by the coarsening in force at record time). The two hit ages form the
/// recency window that selects the tag's class; `last_last_hit_age` carries a
/// `max_age` sentinel until the second hit.
#[derive(Debug, Clone)]
struct Tag {
    timestamp: u64,
    last_hit_age: usize,
    last_last_hit_age: usize,
    app: u32,
    size: u64,
}

/// Histograms for one (app, recency) equivalence class.
#[derive(Debug, Clone)]
struct ClassStats {
    hits: Vec<f64>,
    evictions: Vec<f64>,
    hit_densities: Vec<f64>,
    total_hits: f64,
    total_evictions: f64,
}

/// The LHD replacement engine.
///
/// Generic over the cache's object identifier type. See the module docs for
/// the algorithm; see [`LhdConfig`] for the tunables.
pub struct Lhd<K>
where
    K: Clone + Eq + Hash,
{
    config: LhdConfig,
    tags: SamplePool<K, Tag>,
    classes: Vec<ClassStats>,

    timestamp: u64,
    age_coarsening_shift: u32,
    next_reconfiguration: u64,
    num_reconfigurations: u64,

    // Counted from ranking paths too, hence the interior mutability; reset
    // at every reconfiguration.
    overflows: Cell<u64>,

    ewma_num_objects: f64,
    ewma_num_objects_mass: f64,

    rng: XorShift64,

    num_updates: u64,
    num_insertions: u64,
    num_removals: u64,
}

impl<K> Lhd<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an engine with a fixed default seed.
    ///
    /// Hit densities start on a GDSF-like curve, `(c + 1) / (a + 1)` for
    /// class `c` and age `a`, so ranking is well-defined from the first
    /// access.
    pub fn new(config: LhdConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, 0)
    }

    /// Creates an engine with an explicit RNG seed, for reproducible runs.
    pub fn with_seed(config: LhdConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let num_classes = config.num_classes();
        let max_age = config.max_age;
        let mut classes = Vec::with_capacity(num_classes);
        for c in 0..num_classes {
            let mut hit_densities = vec![0.0; max_age];
            for (a, density) in hit_densities.iter_mut().enumerate() {
                *density = (c + 1) as f64 / (a + 1) as f64;
            }
            classes.push(ClassStats {
                hits: vec![0.0; max_age],
                evictions: vec![0.0; max_age],
                hit_densities,
                total_hits: 0.0,
                total_evictions: 0.0,
            });
        }

        Ok(Self {
            next_reconfiguration: config.accs_per_reconfiguration,
            config,
            tags: SamplePool::new(),
            classes,
            timestamp: 0,
            age_coarsening_shift: 0,
            num_reconfigurations: 0,
            overflows: Cell::new(0),
            ewma_num_objects: 0.0,
            ewma_num_objects_mass: 0.0,
            rng: XorShift64::new(seed),
            num_updates: 0,
            num_insertions: 0,
            num_removals: 0,
        })
    }

    // -- per-access protocol ----------------------------------------------

    /// Records one access to `id`, inserting or refreshing its tag.
    ///
    /// A hit charges the hit histogram of the class the tag belonged to on
    /// arrival, at the tag's current age, then shifts the recency window.
    /// Every call advances the logical clock by one and may trigger a
    /// reconfiguration.
    ///
    /// `req.size()` must be positive; the enclosing cache rejects zero-size
    /// objects.
    pub fn update<R: Request, C: CacheView>(&mut self, id: K, req: &R, cache: &C) {
        debug_assert!(req.size() > 0, "zero-size object reached the engine");
        self.num_updates += 1;

        match self.tags.slot_of(&id) {
            None => {
                self.tags.insert(
                    id.clone(),
                    Tag {
                        timestamp: 0,
                        last_hit_age: 0,
                        last_last_hit_age: self.config.max_age,
                        app: 0,
                        size: 0,
                    },
                );
                self.num_insertions += 1;
            }
            Some(slot) => {
                // Class membership is read before the recency shift: hits
                // are charged to the class the tag belonged to on arrival.
                let (age, class) = {
                    let tag = self.tags.value_at(slot);
                    (self.age_of(tag), self.class_of(tag))
                };
                self.classes[class].hits[age] += 1.0;

                let tag = self.tags.value_at_mut(slot);
                tag.last_last_hit_age = tag.last_hit_age;
                tag.last_hit_age = age;
            }
        }

        let coarsened = self.timestamp >> self.age_coarsening_shift;
        let app_classes = self.config.app_classes;
        let tag = self
            .tags
            .get_mut(&id)
            .expect("tag resident after insert/hit");
        tag.timestamp = coarsened;
        tag.app = req.app_id() % app_classes;
        tag.size = req.size();

        // One draw is burned per access; the ranker's candidate sequence is
        // a function of this stream position. Do not remove.
        self.rng.next_u64();

        self.timestamp += 1;

        self.next_reconfiguration -= 1;
        if self.next_reconfiguration == 0 {
            self.reconfigure(cache);
            self.next_reconfiguration = self.config.accs_per_reconfiguration;
            self.num_reconfigurations += 1;
        }
    }

    /// Selects an eviction victim among sampled residents.
    ///
    /// Samples [`candidate_count`](Self::candidate_count) slots uniformly
    /// with replacement and returns the id with the lowest hit density per
    /// byte; ties keep the earliest sampled candidate. Mutates nothing but
    /// the RNG stream (and the overflow diagnostic counter).
    ///
    /// # Panics
    ///
    /// Panics if the tag store is empty; the caller must not ask for a
    /// victim from an empty cache.
    pub fn rank<R: Request>(&mut self, _req: &R) -> K {
        assert!(
            !self.tags.is_empty(),
            "rank() called with no resident objects"
        );

        let candidates = self.candidate_count();
        let mut victim: Option<usize> = None;
        let mut victim_rank = f64::MAX;

        for _ in 0..candidates {
            let slot = self.rng.next_below(self.tags.len());
            let rank = self.hit_density_at(slot);
            if rank < victim_rank {
                victim = Some(slot);
                victim_rank = rank;
            }
        }

        let victim = victim.expect("at least one candidate was sampled");
        self.tags.key_at(victim).clone()
    }

    /// Accounts for the eviction of `id` and drops its tag.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not tracked; that is a contract breach by the
    /// enclosing cache.
    pub fn replaced(&mut self, id: &K) {
        let slot = self
            .tags
            .slot_of(id)
            .expect("replaced() called for an id the engine does not track");

        let (age, class) = {
            let tag = self.tags.value_at(slot);
            (self.age_of(tag), self.class_of(tag))
        };
        self.classes[class].evictions[age] += 1.0;

        self.tags.remove(id);
        self.num_removals += 1;
    }

    // -- scoring ----------------------------------------------------------

    /// Candidate sample width for the next `rank` call: 8 until the model
    /// has seen more than 50 reconfigurations, then the configured
    /// associativity.
    #[inline]
    pub fn candidate_count(&self) -> u32 {
        if self.num_reconfigurations > WARMUP_RECONFIGURATIONS {
            self.config.associativity
        } else {
            WARMUP_CANDIDATES
        }
    }

    /// Hit density per byte of the resident object `id`, if tracked.
    #[inline]
    pub fn hit_density_of(&self, id: &K) -> Option<f64> {
        self.tags.slot_of(id).map(|slot| self.hit_density_at(slot))
    }

    #[inline]
    fn hit_density_at(&self, slot: usize) -> f64 {
        let tag = self.tags.value_at(slot);
        let age = self.age_of(tag);
        let class = self.class_of(tag);
        self.classes[class].hit_densities[age] / tag.size as f64
    }

    /// Tag age in coarsened ticks, clamped to `max_age - 1`. A clamped age
    /// is an overflow and is counted for diagnostics.
    #[inline]
    fn age_of(&self, tag: &Tag) -> usize {
        let now = self.timestamp >> self.age_coarsening_shift;
        let raw = now.saturating_sub(tag.timestamp);
        if raw >= self.config.max_age as u64 {
            self.overflows.set(self.overflows.get() + 1);
            self.config.max_age - 1
        } else {
            raw as usize
        }
    }

    /// Recency stratum from the last two hit ages: the youngest stratum when
    /// their sum is small, saturating to the oldest stratum otherwise. The
    /// insert sentinel (`last_last_hit_age = max_age`) lands here too.
    #[inline]
    fn hit_age_class(&self, tag: &Tag) -> usize {
        let sum = tag.last_hit_age.saturating_add(tag.last_last_hit_age);
        if sum < self.config.hit_age_classes - 1 {
            0
        } else {
            self.config.hit_age_classes - 1
        }
    }

    #[inline]
    fn class_of(&self, tag: &Tag) -> usize {
        tag.app as usize * self.config.hit_age_classes + self.hit_age_class(tag)
    }

    // -- reconfiguration --------------------------------------------------

    fn reconfigure<C: CacheView>(&mut self, cache: &C) {
        let decay = self.config.ewma_decay;
        let max_age = self.config.max_age;

        let mut total_hits = 0.0;
        let mut total_evictions = 0.0;
        for cl in &mut self.classes {
            cl.total_hits = 0.0;
            cl.total_evictions = 0.0;
            for age in 0..max_age {
                cl.hits[age] *= decay;
                cl.evictions[age] *= decay;
                cl.total_hits += cl.hits[age];
                cl.total_evictions += cl.evictions[age];
            }
            debug_assert!(
                cl.hits.iter().all(|v| v.is_finite() && *v >= 0.0)
                    && cl.evictions.iter().all(|v| v.is_finite() && *v >= 0.0),
                "histogram went negative or non-finite after decay"
            );
            total_hits += cl.total_hits;
            total_evictions += cl.total_evictions;
        }

        self.adapt_age_coarsening(cache);

        self.model_hit_density();

        let events = total_hits + total_evictions;
        log::debug!(
            "lhd reconfigure {}: hits {:.1} evictions {:.1} hit_rate {:.4} overflows {} ({:.6}/access) shift {}",
            self.num_reconfigurations,
            total_hits,
            total_evictions,
            if events > 0.0 { total_hits / events } else { 0.0 },
            self.overflows.get(),
            self.overflows.get() as f64 / self.config.accs_per_reconfiguration as f64,
            self.age_coarsening_shift,
        );

        #[cfg(feature = "rank-dump")]
        for class in 0..self.classes.len() {
            self.dump_class_ranks(class, cache);
        }

        self.overflows.set(0);
    }

    /// Refits each class's hit-density curve with one backward sweep.
    ///
    /// Accumulators start from the last bucket; for every younger age the
    /// sweep maintains the cumulative hits, the cumulative events, and the
    /// unconditioned residual-lifetime mass, and stores their ratio. Ages
    /// whose cumulative event mass is below [`RANK_EPSILON`] get density 0.
    fn model_hit_density(&mut self) {
        let max_age = self.config.max_age;
        for cl in &mut self.classes {
            let mut total_hits = cl.hits[max_age - 1];
            let mut total_events = cl.hits[max_age - 1] + cl.evictions[max_age - 1];
            let mut lifetime_unconditioned = total_events;

            for a in (0..max_age - 1).rev() {
                total_hits += cl.hits[a];
                total_events += cl.hits[a] + cl.evictions[a];
                lifetime_unconditioned += total_events;

                cl.hit_densities[a] = if total_events > RANK_EPSILON {
                    total_hits / lifetime_unconditioned
                } else {
                    0.0
                };
            }
        }
    }

    /// Tracks the smoothed object count and, at reconfigurations 5 and 25
    /// only, re-picks the age-coarsening shift and rescales histograms and
    /// tag timestamps to the new time unit.
    ///
    /// The shift would only need manual configuration if object sizes were
    /// known up front; adapting it twice near the start of the trace keeps
    /// ages within the right order of magnitude on any workload.
    fn adapt_age_coarsening<C: CacheView>(&mut self, cache: &C) {
        let decay = self.config.ewma_decay;
        self.ewma_num_objects *= decay;
        self.ewma_num_objects_mass *= decay;
        self.ewma_num_objects += cache.num_objects() as f64;
        self.ewma_num_objects_mass += 1.0;

        let num_objects = self.ewma_num_objects / self.ewma_num_objects_mass;
        let optimal_coarsening = num_objects
            / (self.config.age_coarsening_error_tolerance * self.config.max_age as f64);

        if RESCALE_POINTS.contains(&self.num_reconfigurations) {
            let mut shift: u32 = 1;
            while shift < 63 && ((1u64 << shift) as f64) < optimal_coarsening {
                shift += 1;
            }

            let delta = shift as i32 - self.age_coarsening_shift as i32;
            self.age_coarsening_shift = shift;

            // Weight the accumulators so the second decision point sees a
            // heavily damped estimate.
            self.ewma_num_objects *= 8.0;
            self.ewma_num_objects_mass *= 8.0;

            if delta != 0 {
                self.rescale_histograms(delta);
                self.rescale_tag_timestamps(delta);
            }

            log::debug!(
                "lhd rescale at reconfiguration {}: shift {} (delta {}), smoothed objects {:.0}, optimal coarsening {:.1}",
                self.num_reconfigurations,
                shift,
                delta,
                num_objects,
                optimal_coarsening,
            );
        }
    }

    /// Compresses (`delta > 0`) or stretches (`delta < 0`) every class
    /// histogram to the new time unit. `delta == 0` is a no-op.
    ///
    /// Compression sums each run of `2^delta` old buckets into one new
    /// bucket, zeroes the vacated tail, and leaves the final bucket as-is.
    /// Stretching first folds the old tail into the final bucket, then
    /// spreads each old bucket evenly over `2^-delta` new ones, walking
    /// ages in descending order so sources are read before they are
    /// overwritten.
    fn rescale_histograms(&mut self, delta: i32) {
        let max_age = self.config.max_age;

        if delta > 0 {
            let d = delta as u32;
            for cl in &mut self.classes {
                for a in 0..(max_age >> d) {
                    let base = a << d;
                    let mut hits = 0.0;
                    let mut evictions = 0.0;
                    for i in 0..(1usize << d) {
                        hits += cl.hits[base + i];
                        evictions += cl.evictions[base + i];
                    }
                    cl.hits[a] = hits;
                    cl.evictions[a] = evictions;
                }
                for a in (max_age >> d)..(max_age - 1) {
                    cl.hits[a] = 0.0;
                    cl.evictions[a] = 0.0;
                }
            }
        } else if delta < 0 {
            let d = (-delta) as u32;
            let spread = (1u64 << d) as f64;
            for cl in &mut self.classes {
                for a in (max_age >> d)..(max_age - 1) {
                    let hits = cl.hits[a];
                    let evictions = cl.evictions[a];
                    cl.hits[max_age - 1] += hits;
                    cl.evictions[max_age - 1] += evictions;
                }
                for a in (0..=max_age - 2).rev() {
                    cl.hits[a] = cl.hits[a >> d] / spread;
                    cl.evictions[a] = cl.evictions[a >> d] / spread;
                }
            }
        }
    }

    /// Moves every resident tag's timestamp to the new time unit so ages
    /// computed after a rescale stay consistent.
    fn rescale_tag_timestamps(&mut self, delta: i32) {
        if delta > 0 {
            let d = delta as u32;
            for tag in self.tags.values_mut() {
                tag.timestamp >>= d;
            }
        } else if delta < 0 {
            let d = (-delta) as u32;
            for tag in self.tags.values_mut() {
                tag.timestamp <<= d;
            }
        }
    }

    #[cfg(feature = "rank-dump")]
    fn dump_class_ranks<C: CacheView>(&self, class: usize, cache: &C) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }

        let cl = &self.classes[class];
        let avg_object_size = if cache.num_objects() > 0 && cache.consumed_capacity() > 0 {
            cache.consumed_capacity() as f64 / cache.num_objects() as f64
        } else {
            1.0
        };

        // Each line stops once the printed value is zero and the remaining
        // histogram mass is negligible.
        let mut ranks = String::new();
        let mut left = cl.total_hits + cl.total_evictions;
        for a in 0..self.config.max_age {
            let density = cl.hit_densities[a] / avg_object_size;
            ranks.push_str(&format!("{}, ", density));
            left -= cl.hits[a] + cl.evictions[a];
            if density == 0.0 && left < 1e-2 {
                break;
            }
        }

        let mut hits = String::new();
        left = cl.total_hits + cl.total_evictions;
        for a in 0..self.config.max_age {
            hits.push_str(&format!("{}, ", cl.hits[a]));
            left -= cl.hits[a] + cl.evictions[a];
            if cl.hits[a] == 0.0 && left < 1e-2 {
                break;
            }
        }

        let mut evictions = String::new();
        left = cl.total_hits + cl.total_evictions;
        for a in 0..self.config.max_age {
            evictions.push_str(&format!("{}, ", cl.evictions[a]));
            left -= cl.hits[a] + cl.evictions[a];
            if cl.evictions[a] == 0.0 && left < 1e-2 {
                break;
            }
        }

        log::trace!(
            "lhd class {} (avg object {:.1}B) | ranks: {} | hits: {} | evictions: {}",
            class,
            avg_object_size,
            ranks,
            hits,
            evictions,
        );
    }

    // -- introspection ----------------------------------------------------

    /// Number of resident tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// `true` if no objects are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// `true` if `id` currently has a tag.
    #[inline]
    pub fn contains(&self, id: &K) -> bool {
        self.tags.contains(id)
    }

    /// The engine's configuration.
    #[inline]
    pub fn config(&self) -> &LhdConfig {
        &self.config
    }

    /// Logical clock value (accesses observed so far).
    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Current age-coarsening shift; one age tick spans `2^shift` accesses.
    #[inline]
    pub fn age_coarsening_shift(&self) -> u32 {
        self.age_coarsening_shift
    }

    /// Completed reconfigurations.
    #[inline]
    pub fn num_reconfigurations(&self) -> u64 {
        self.num_reconfigurations
    }

    /// Age overflows observed since the last reconfiguration.
    #[inline]
    pub fn overflows(&self) -> u64 {
        self.overflows.get()
    }

    /// Lifetime `update` calls.
    #[inline]
    pub fn num_updates(&self) -> u64 {
        self.num_updates
    }

    /// Lifetime tag insertions (misses).
    #[inline]
    pub fn num_insertions(&self) -> u64 {
        self.num_insertions
    }

    /// Lifetime tag removals (`replaced` calls).
    #[inline]
    pub fn num_removals(&self) -> u64 {
        self.num_removals
    }

    /// Counter snapshot for the enclosing cache's stats output.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LhdMetricsSnapshot {
        LhdMetricsSnapshot {
            update_calls: self.num_updates,
            insertions: self.num_insertions,
            hits: self.num_updates - self.num_insertions,
            replaced_calls: self.num_removals,
            reconfigurations: self.num_reconfigurations,
            overflows: self.overflows.get(),
            age_coarsening_shift: self.age_coarsening_shift,
            resident_tags: self.tags.len(),
            timestamp: self.timestamp,
        }
    }

    /// Checks the tag-store bijection and histogram sanity.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.tags.check_invariants()?;
        for (c, cl) in self.classes.iter().enumerate() {
            for a in 0..self.config.max_age {
                if !(cl.hits[a] >= 0.0 && cl.evictions[a] >= 0.0 && cl.hit_densities[a] >= 0.0) {
                    return Err(InvariantError::new(format!(
                        "class {} age {} holds a negative or NaN value",
                        c, a
                    )));
                }
            }
        }
        Ok(())
    }

    // -- test support -----------------------------------------------------

    /// Stored (coarsened) timestamp of `id`'s tag.
    #[doc(hidden)]
    pub fn debug_tag_timestamp(&self, id: &K) -> Option<u64> {
        self.tags.get(id).map(|tag| tag.timestamp)
    }

    /// Class index `id`'s tag currently belongs to.
    #[doc(hidden)]
    pub fn debug_class_of(&self, id: &K) -> Option<usize> {
        self.tags.get(id).map(|tag| self.class_of(tag))
    }

    /// Hit histogram of a class.
    #[doc(hidden)]
    pub fn debug_class_hits(&self, class: usize) -> &[f64] {
        &self.classes[class].hits
    }

    /// Eviction histogram of a class.
    #[doc(hidden)]
    pub fn debug_class_evictions(&self, class: usize) -> &[f64] {
        &self.classes[class].evictions
    }

    /// Hit-density curve of a class.
    #[doc(hidden)]
    pub fn debug_class_hit_densities(&self, class: usize) -> &[f64] {
        &self.classes[class].hit_densities
    }

    /// `(total_hits, total_evictions)` of a class as of the last decay.
    #[doc(hidden)]
    pub fn debug_class_totals(&self, class: usize) -> (f64, f64) {
        let cl = &self.classes[class];
        (cl.total_hits, cl.total_evictions)
    }

    /// Applies the histogram and tag-timestamp rescale for an arbitrary
    /// shift delta, outside the normal two rescale points. Exists for the
    /// round-trip tests; the shift itself is not changed.
    #[doc(hidden)]
    pub fn debug_force_rescale(&mut self, delta: i32) {
        self.rescale_histograms(delta);
        self.rescale_tag_timestamps(delta);
    }
}

impl<K> std::fmt::Debug for Lhd<K>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lhd")
            .field("resident_tags", &self.tags.len())
            .field("timestamp", &self.timestamp)
            .field("age_coarsening_shift", &self.age_coarsening_shift)
            .field("num_reconfigurations", &self.num_reconfigurations)
            .finish_non_exhaustive()
    }
}
