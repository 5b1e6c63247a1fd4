//! The request-replay loop and interval statistics (4.6).
//!
//! A driver is deliberately thin: for each request it calls `cache.get`,
//! classifies the outcome, accumulates counters, and hands a snapshot to a
//! caller-supplied callback at reporting-interval boundaries and once more
//! at end-of-trace. It never reads a trace off disk or formats output —
//! those are a caller's concern (see `cachesim-driver` in this workspace).
//!
//! `[SUPPLEMENT]` The snapshot type implements a `metrics` method returning
//! a `BTreeMap<String, f64>`, deriving `hit_rate`/`byte_hit_rate` rather
//! than storing them, the same design the teacher crate's
//! `CoreCacheMetrics::to_btreemap` documents: deterministic key ordering
//! for reproducible output, worth the O(log n) over a `HashMap` at this
//! key count.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use crate::admission::Admissioner;
use crate::cache::{Cache, EvictionPolicy, Outcome};
use crate::request::Request;

/// Counters accumulated over one reporting interval (or, at end-of-trace,
/// over the whole replay) — the `{total_requests, misses, miss_bytes}`
/// tuple of 6, plus `hit_bytes` so byte hit rate can be derived without
/// re-deriving it from the cache itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalStats {
    /// Requests observed (valid requests only; see [`Driver::replay`]).
    pub total_requests: u64,
    /// Requests that missed.
    pub misses: u64,
    /// Bytes associated with missed requests.
    pub miss_bytes: u64,
    /// Bytes associated with hit requests.
    pub hit_bytes: u64,
}

impl IntervalStats {
    fn record(&mut self, outcome: Outcome) {
        self.total_requests += 1;
        match outcome {
            Outcome::Hit { bytes } => self.hit_bytes += bytes,
            Outcome::Miss { bytes, .. } => {
                self.misses += 1;
                self.miss_bytes += bytes;
            }
        }
    }
}

/// A `BTreeMap`-valued metrics view, mirrored from the teacher crate's own
/// `CacheMetrics` trait so a caller already used to that shape can reuse
/// it here.
pub trait DriverMetrics {
    /// Named metrics in deterministic (alphabetical, via `BTreeMap`) order.
    fn metrics(&self) -> BTreeMap<String, f64>;
}

impl DriverMetrics for IntervalStats {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        let total_bytes = self.hit_bytes + self.miss_bytes;
        let hits = self.total_requests.saturating_sub(self.misses);

        m.insert("total_requests".to_string(), self.total_requests as f64);
        m.insert("misses".to_string(), self.misses as f64);
        m.insert("miss_bytes".to_string(), self.miss_bytes as f64);
        m.insert("hit_bytes".to_string(), self.hit_bytes as f64);
        m.insert(
            "hit_rate".to_string(),
            if self.total_requests > 0 {
                hits as f64 / self.total_requests as f64
            } else {
                0.0
            },
        );
        m.insert(
            "byte_hit_rate".to_string(),
            if total_bytes > 0 {
                self.hit_bytes as f64 / total_bytes as f64
            } else {
                0.0
            },
        );
        m
    }
}

/// Whether a [`Driver::replay`] callback invocation is a periodic snapshot
/// or the final, whole-trace summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Fired when the interval counter reaches the configured
    /// `reporting_interval`; `stats` covers only that interval.
    Interval,
    /// Fired exactly once, after the last request; `stats` covers the
    /// whole replay.
    Final,
}

/// Anything a [`Driver`] can replay requests against. Implemented for
/// every [`Cache`] instantiation and for [`crate::config::AnyCache`], so a
/// driver built around a compile-time-chosen policy and one built around
/// `config::create`'s runtime-chosen policy share the same replay loop.
pub trait Replayable {
    /// Services one request, as [`Cache::get`] does.
    fn get(&mut self, req: &Request) -> Outcome;
}

impl<P: EvictionPolicy, A: Admissioner> Replayable for Cache<P, A> {
    fn get(&mut self, req: &Request) -> Outcome {
        Cache::get(self, req)
    }
}

impl Replayable for crate::config::AnyCache {
    fn get(&mut self, req: &Request) -> Outcome {
        crate::config::AnyCache::get(self, req)
    }
}

/// Replays a request stream against a [`Replayable`] cache, reporting
/// `{total_requests, misses, miss_bytes}` at each interval boundary and a
/// final cumulative summary at end-of-trace (4.6, 6).
#[derive(Debug)]
pub struct Driver<C> {
    cache: C,
    reporting_interval: u64,
    interval: IntervalStats,
    cumulative: IntervalStats,
}

impl<C: Replayable> Driver<C> {
    /// Creates a driver around `cache`. `reporting_interval == 0` disables
    /// periodic snapshots; only the final summary is ever reported.
    pub fn new(cache: C, reporting_interval: u64) -> Self {
        Self {
            cache,
            reporting_interval,
            interval: IntervalStats::default(),
            cumulative: IntervalStats::default(),
        }
    }

    /// Borrows the underlying cache, for callers that want to peek at
    /// `occupied_bytes`/`to_evict` between or after replays.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Mutably borrows the underlying cache.
    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    /// Cumulative counters observed across every `replay` call made on
    /// this driver so far.
    pub fn cumulative(&self) -> IntervalStats {
        self.cumulative
    }

    /// Replays `requests` in order. Invalid requests ([`Request::valid`]
    /// false) are skipped without counting, per the driver's tolerance for
    /// malformed trace lines (6). `on_snapshot` is called with
    /// [`SnapshotKind::Interval`] at each reporting boundary and exactly
    /// once more with [`SnapshotKind::Final`] after the last request (even
    /// if zero requests were replayed, so a caller always gets one line).
    pub fn replay<I>(&mut self, requests: I, mut on_snapshot: impl FnMut(SnapshotKind, &IntervalStats))
    where
        I: IntoIterator<Item = Request>,
    {
        for req in requests {
            if !req.valid {
                continue;
            }
            let outcome = self.cache.get(&req);
            self.interval.record(outcome);
            self.cumulative.record(outcome);

            if self.reporting_interval > 0 && self.interval.total_requests >= self.reporting_interval
            {
                on_snapshot(SnapshotKind::Interval, &self.interval);
                self.interval = IntervalStats::default();
            }
        }
        on_snapshot(SnapshotKind::Final, &self.cumulative);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Lru;
    use crate::request::Operation;

    fn req(id: u64, size: i64) -> Request {
        Request::new(0, id, size, Operation::Get)
    }

    #[test]
    fn final_snapshot_reports_cumulative_totals_over_the_whole_replay() {
        let cache = Cache::<Lru>::new(10, 0, None);
        let mut driver = Driver::new(cache, 0);
        let mut finals = 0;
        driver.replay(
            [req(1, 1), req(2, 1), req(1, 1)],
            |kind, stats| {
                if kind == SnapshotKind::Final {
                    finals += 1;
                    assert_eq!(stats.total_requests, 3);
                    assert_eq!(stats.misses, 2);
                }
            },
        );
        assert_eq!(finals, 1);
    }

    #[test]
    fn interval_boundaries_reset_between_snapshots() {
        let cache = Cache::<Lru>::new(10, 0, None);
        let mut driver = Driver::new(cache, 2);
        let mut interval_totals = alloc::vec::Vec::new();
        driver.replay([req(1, 1), req(2, 1), req(3, 1), req(4, 1)], |kind, stats| {
            if kind == SnapshotKind::Interval {
                interval_totals.push(stats.total_requests);
            }
        });
        assert_eq!(interval_totals, alloc::vec![2, 2]);
    }

    #[test]
    fn invalid_requests_are_skipped_without_counting() {
        let cache = Cache::<Lru>::new(10, 0, None);
        let mut driver = Driver::new(cache, 0);
        let mut invalid = req(1, 1);
        invalid.valid = false;
        driver.replay([invalid, req(2, 1)], |kind, stats| {
            if kind == SnapshotKind::Final {
                assert_eq!(stats.total_requests, 1);
            }
        });
    }

    #[test]
    fn metrics_view_derives_rates_rather_than_storing_them() {
        let stats = IntervalStats {
            total_requests: 4,
            misses: 1,
            miss_bytes: 10,
            hit_bytes: 30,
        };
        let m = stats.metrics();
        assert_eq!(m["hit_rate"], 0.75);
        assert_eq!(m["byte_hit_rate"], 0.75);
    }
}
