// Criterion benchmarks over the eviction-policy roster, grounded in the
// teacher crate's own `benches/criterion_benchmarks.rs` shape: a tiny
// reproducible RNG driving a skewed access pattern, one benchmark group
// per policy.

use cachesim_core::policy::{Arc, Car, Clock, Fifo, Lfu, Lru, Random, Slru};
use cachesim_core::{Cache, Operation, Request};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const CACHE_CAPACITY: u64 = 1_000;
const NUM_OPERATIONS: u64 = 10_000;
const KEY_SPACE: u64 = 5_000;

/// Simple linear congruential generator for reproducible benchmarks,
/// mirroring the teacher's own `SimpleRng`.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345) & 0x7fff_ffff;
        self.state
    }
}

/// A Zipf-ish skew: most accesses land in the first tenth of the key
/// space, the rest spread uniformly, so hot/cold behavior is exercised.
fn skewed_requests(seed: u64) -> Vec<Request> {
    let mut rng = SimpleRng::new(seed);
    (0..NUM_OPERATIONS)
        .map(|i| {
            let roll = rng.next_u64() % 100;
            let id = if roll < 80 {
                rng.next_u64() % (KEY_SPACE / 10).max(1)
            } else {
                rng.next_u64() % KEY_SPACE
            };
            Request::new(i as i64, id, 64, Operation::Get)
        })
        .collect()
}

macro_rules! bench_policy {
    ($fn_name:ident, $policy:ty, $label:expr) => {
        fn $fn_name(c: &mut Criterion) {
            let requests = skewed_requests(42);
            c.bench_function($label, |b| {
                b.iter(|| {
                    let mut cache = Cache::<$policy>::new(CACHE_CAPACITY, 0, None);
                    for req in &requests {
                        black_box(cache.get(req));
                    }
                });
            });
        }
    };
}

bench_policy!(bench_lru, Lru, "lru_skewed");
bench_policy!(bench_fifo, Fifo, "fifo_skewed");
bench_policy!(bench_clock, Clock, "clock_skewed");
bench_policy!(bench_lfu, Lfu, "lfu_skewed");
bench_policy!(bench_slru, Slru, "slru_skewed");
bench_policy!(bench_arc, Arc, "arc_skewed");
bench_policy!(bench_car, Car, "car_skewed");

fn bench_random(c: &mut Criterion) {
    let requests = skewed_requests(42);
    c.bench_function("random_skewed", |b| {
        b.iter(|| {
            let mut cache = Cache::<Random>::new(CACHE_CAPACITY, 0, Some(7));
            for req in &requests {
                black_box(cache.get(req));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_lru,
    bench_fifo,
    bench_clock,
    bench_random,
    bench_lfu,
    bench_slru,
    bench_arc,
    bench_car,
);
criterion_main!(benches);
