//! AdaptSize: a size-aware admission controller that periodically re-tunes
//! a scalar `c` such that an object of size `s` is admitted with
//! probability `exp(-s / c)` (4.4).
//!
//! Grounded in the spec's own pseudocode since no example in the retrieval
//! pack implements this algorithm; the analytic hit-rate estimator below is
//! a self-consistent stand-in for the original paper's `oP1`/`oP2`
//! polynomials, which the spec explicitly licenses ("the implementer may
//! treat these as given numerical definitions") — what must be preserved is
//! the surrounding control flow: EWMA merge, compaction, coarse scan,
//! golden-section refinement, NaN abort.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::Admissioner;
use crate::mathshim;
use crate::request::Request;

/// Decay applied to long-term `seen_times` at every reconfigure.
const EWMA_DECAY: f64 = 0.3;
/// Golden ratio minus one, used to bracket the golden-section search.
const GSS_R: f64 = 0.61803399;
const GSS_V: f64 = 1.0 - GSS_R;
/// Convergence tolerance for the golden-section search.
const TOL: f64 = 3e-8;
/// Long-term entries below this weight are dropped at compaction.
const COMPACT_THRESHOLD: f64 = 0.1;
/// Postponement added to `next_reconf` when there isn't enough coverage yet.
const INSUFFICIENT_COVERAGE_DELAY: u64 = 1000;

#[derive(Debug, Clone, Copy, Default)]
struct ObjectStats {
    seen_times: f64,
    size: f64,
}

/// Construction parameters recognized in the policy parameter string (6):
/// `max-iteration` and `reconf-interval`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptSizeConfig {
    /// Cap on golden-section-search iterations. Default 15.
    pub max_iteration: u32,
    /// Number of accesses between reconfigurations. Default 30000.
    pub reconf_interval: u64,
}

impl Default for AdaptSizeConfig {
    fn default() -> Self {
        Self {
            max_iteration: 15,
            reconf_interval: 30_000,
        }
    }
}

/// A tiny deterministic PRNG (splitmix64) so `admit`'s randomness is
/// reproducible given a seed, per the determinism requirement in 5.
#[derive(Debug, Clone, Copy)]
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// A uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// AdaptSize admission controller (4.4).
#[derive(Debug, Clone)]
pub struct AdaptSize {
    config: AdaptSizeConfig,
    cache_size: u64,
    next_reconf: u64,
    stat_size: f64,
    c_param: f64,
    interval: BTreeMap<u64, ObjectStats>,
    long_term: BTreeMap<u64, ObjectStats>,
    rng: SplitMix64,
}

impl AdaptSize {
    /// Creates an AdaptSize controller for a cache of `cache_size` bytes.
    pub fn new(cache_size: u64, config: AdaptSizeConfig) -> Self {
        Self {
            next_reconf: config.reconf_interval,
            config,
            cache_size,
            stat_size: 0.0,
            c_param: cache_size as f64,
            interval: BTreeMap::new(),
            long_term: BTreeMap::new(),
            rng: SplitMix64(0x9E3779B97F4A7C15 ^ cache_size),
        }
    }

    /// The current admission parameter, exposed for tests and diagnostics.
    pub fn c_param(&self) -> f64 {
        self.c_param
    }

    fn update_stats(&mut self, req: &Request) {
        if self.next_reconf == 0 {
            self.reconfigure();
        } else {
            self.next_reconf -= 1;
        }

        let size = req.obj_size.max(0) as f64;
        let existing_size = self
            .interval
            .get(&req.obj_id)
            .or_else(|| self.long_term.get(&req.obj_id))
            .map(|s| s.size);

        match existing_size {
            None => self.stat_size += size,
            Some(old) if old != size => self.stat_size += size - old,
            Some(_) => {}
        }

        let entry = self.interval.entry(req.obj_id).or_default();
        entry.seen_times += 1.0;
        entry.size = size;
    }

    fn reconfigure(&mut self) {
        if self.stat_size <= 3.0 * self.cache_size as f64 {
            self.next_reconf = INSUFFICIENT_COVERAGE_DELAY;
            return;
        }
        self.next_reconf = self.config.reconf_interval;

        // EWMA merge: decay long-term weights, fold in this interval.
        for stats in self.long_term.values_mut() {
            stats.seen_times *= EWMA_DECAY;
        }
        for (id, interval_stats) in self.interval.iter() {
            let entry = self.long_term.entry(*id).or_default();
            entry.seen_times += interval_stats.seen_times * (1.0 - EWMA_DECAY);
            entry.size = interval_stats.size;
        }
        self.interval.clear();

        // Compact: drop entries that decayed below the survival threshold.
        let dead: Vec<u64> = self
            .long_term
            .iter()
            .filter(|(_, s)| s.seen_times < COMPACT_THRESHOLD)
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            if let Some(s) = self.long_term.remove(&id) {
                self.stat_size -= s.size;
            }
        }

        let sizes: Vec<f64> = self.long_term.values().map(|s| s.size).collect();
        let seen_times: Vec<f64> = self.long_term.values().map(|s| s.seen_times).collect();

        if sizes.is_empty() {
            return;
        }

        let log2_cache_size = mathshim::log2(self.cache_size.max(1) as f64);

        // Coarse scan, stride 4 starting at 2 (spec: "a heuristic, not
        // load-bearing").
        let mut best_x = 2.0_f64;
        let mut best_rate = f64::NEG_INFINITY;
        let mut x = 2.0_f64;
        while x <= log2_cache_size {
            let rate = model_hit_rate(x, self.cache_size, &sizes, &seen_times);
            if rate.is_nan() {
                log::warn!("adaptsize: NaN hit-rate estimate during coarse scan, aborting search");
                return;
            }
            if rate > best_rate {
                best_rate = rate;
                best_x = x;
            }
            x += 4.0;
        }

        let lo = (best_x - 4.0).max(0.0);
        let hi = (best_x + 4.0).min(log2_cache_size.max(lo + TOL));

        match golden_section_search(lo, hi, self.cache_size, &sizes, &seen_times, self.config.max_iteration) {
            Some(best) => self.c_param = mathshim::powf(2.0, best),
            None => {
                log::warn!("adaptsize: NaN encountered during golden-section search, keeping previous c");
            }
        }
    }
}

/// An analytic estimate of hit rate for candidate `log2(c)`, given the
/// surviving population's sizes and seen-times. Refines an internal
/// sojourn-time parameter `t` so the projected resident bytes match
/// `cache_size`, then sums weighted per-object hit probabilities.
fn model_hit_rate(log2_c: f64, cache_size: u64, sizes: &[f64], seen_times: &[f64]) -> f64 {
    let c = mathshim::powf(2.0, log2_c);
    let mut t = cache_size as f64;

    for _ in 0..20 {
        let mut projected_bytes = 0.0;
        for (&size, &seen) in sizes.iter().zip(seen_times) {
            let admit_p = mathshim::exp(-size / c);
            let resident_p = -mathshim::exp_m1(-seen / t);
            projected_bytes += admit_p * resident_p * size;
        }
        if !projected_bytes.is_finite() || projected_bytes <= 0.0 {
            return f64::NAN;
        }
        t *= cache_size as f64 / projected_bytes;
        if !t.is_finite() {
            return f64::NAN;
        }
    }

    let mut hits = 0.0;
    let mut total = 0.0;
    for (&size, &seen) in sizes.iter().zip(seen_times) {
        let admit_p = mathshim::exp(-size / c);
        let resident_p = -mathshim::exp_m1(-seen / t);
        hits += seen * admit_p * resident_p;
        total += seen;
    }
    if total <= 0.0 {
        return 0.0;
    }
    (hits / total).clamp(0.0, 1.0)
}

#[allow(clippy::too_many_arguments)]
fn golden_section_search(
    a: f64,
    b: f64,
    cache_size: u64,
    sizes: &[f64],
    seen_times: &[f64],
    max_iteration: u32,
) -> Option<f64> {
    let mut x0 = a;
    let mut x3 = b;
    let mid = (a + b) / 2.0;
    let (mut x1, mut x2) = if (b - mid).abs() > (mid - a).abs() {
        (mid, mid + GSS_V * (b - mid))
    } else {
        (mid - GSS_V * (mid - a), mid)
    };

    let mut f1 = model_hit_rate(x1, cache_size, sizes, seen_times);
    let mut f2 = model_hit_rate(x2, cache_size, sizes, seen_times);
    if f1.is_nan() || f2.is_nan() {
        return None;
    }

    for _ in 0..max_iteration {
        if (x3 - x0).abs() <= TOL * (x1.abs() + x2.abs()) {
            break;
        }
        if f2 > f1 {
            x0 = x1;
            x1 = x2;
            x2 = GSS_R * x1 + GSS_V * x3;
            f1 = f2;
            f2 = model_hit_rate(x2, cache_size, sizes, seen_times);
        } else {
            x3 = x2;
            x2 = x1;
            x1 = GSS_R * x2 + GSS_V * x0;
            f2 = f1;
            f1 = model_hit_rate(x1, cache_size, sizes, seen_times);
        }
        if f1.is_nan() || f2.is_nan() {
            return None;
        }
    }

    Some(if f1 > f2 { x1 } else { x2 })
}

impl Admissioner for AdaptSize {
    fn update(&mut self, req: &Request, capacity: u64) {
        self.cache_size = capacity;
        self.update_stats(req);
    }

    fn admit(&mut self, req: &Request) -> bool {
        let size = req.obj_size.max(0) as f64;
        let threshold = mathshim::exp(-size / self.c_param);
        self.rng.next_f64() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Operation;

    fn req(id: u64, size: i64) -> Request {
        Request::new(0, id, size, Operation::Get)
    }

    #[test]
    fn update_stats_is_additive_in_seen_times() {
        let mut adm = AdaptSize::new(1_000_000, AdaptSizeConfig::default());
        adm.update(&req(1, 100), 1_000_000);
        let stat_size_after_first = adm.stat_size;
        adm.update(&req(1, 100), 1_000_000);
        assert_eq!(adm.interval[&1].seen_times, 2.0);
        assert_eq!(adm.stat_size, stat_size_after_first);
    }

    #[test]
    fn new_id_increases_stat_size_once() {
        let mut adm = AdaptSize::new(1_000_000, AdaptSizeConfig::default());
        adm.update(&req(1, 500), 1_000_000);
        assert_eq!(adm.stat_size, 500.0);
    }

    #[test]
    fn admit_never_exceeds_unit_probability() {
        let mut adm = AdaptSize::new(1_000_000, AdaptSizeConfig::default());
        // c_param starts at cache_size, so a zero-size object is always admitted.
        assert!(adm.admit(&req(1, 0)));
    }

    #[test]
    fn golden_section_search_returns_value_in_bracket_when_well_behaved() {
        let sizes = alloc::vec![1024.0, 1024.0 * 1024.0];
        let seen = alloc::vec![1000.0, 10.0];
        let result = golden_section_search(2.0, 20.0, 1_000_000, &sizes, &seen, 15);
        assert!(result.is_some());
        let x = result.unwrap();
        assert!((2.0..=20.0).contains(&x));
    }

    #[test]
    fn reconfigure_is_noop_before_sufficient_coverage() {
        let mut adm = AdaptSize::new(1_000_000, AdaptSizeConfig::default());
        let before = adm.c_param;
        adm.update(&req(1, 10), 1_000_000);
        adm.reconfigure();
        assert_eq!(adm.c_param, before);
        assert_eq!(adm.next_reconf, INSUFFICIENT_COVERAGE_DELAY);
    }
}
