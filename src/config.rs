//! Named cache construction (6): `create(name, params, "k1=v1,k2=v2,…")`.
//!
//! Grounded in the spec's own interface text directly — the retrieval pack
//! has no runtime string-keyed cache factory to draw from, since the
//! teacher's own `config` module instead exposes one static config struct
//! per algorithm, selected at compile time via the cache's type parameter.
//! This module is the bridge: it resolves a policy *name* at run time into
//! one of those compile-time-selected [`Cache`] instantiations, wrapped in
//! [`AnyCache`] so a caller that only knows the name as a string (read from
//! a config file, say) still gets a single concrete value back.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::cache::{Cache, Outcome};
use crate::error::CacheError;
use crate::policy::{Arc, Belady, Car, CarConfig, Clock, Fifo, Lfu, Lru, Random, Slru, SlruConfig};
use crate::request::{ObjectId, Request};

/// Parameters shared by every policy (6, "Cache construction"). `capacity`
/// and `consider_object_metadata` feed directly into [`Cache::new`];
/// `default_ttl` and `hash_bucket_count` are carried for callers that build
/// their own [`Request`]s or size their own table reservations, since
/// neither has a live effect inside this core (the hash table, backed by
/// `hashbrown`/`std`'s `HashMap`, already grows on demand; see DESIGN.md).
#[derive(Debug, Clone, Copy)]
pub struct CacheParams {
    /// Capacity in bytes.
    pub capacity: u64,
    /// Default time-to-live applied by callers to requests that specify
    /// none. The core itself never defaults a `Request::ttl`.
    pub default_ttl: Option<i64>,
    /// Advisory hash-table sizing hint.
    pub hash_bucket_count: u64,
    /// Whether per-object bookkeeping overhead is counted against
    /// capacity. When `true`, `Cache::new` is given
    /// `size_of::<CacheObject>()` bytes of overhead per resident object;
    /// when `false`, zero.
    pub consider_object_metadata: bool,
}

fn overhead_bytes(consider_object_metadata: bool) -> u64 {
    if consider_object_metadata {
        core::mem::size_of::<crate::object::CacheObject>() as u64
    } else {
        0
    }
}

/// Splits a policy parameter string into raw `(key, value)` pairs: comma
/// separated, whitespace around keys/values tolerated, per 6.
fn parse_params(raw: &str) -> Result<Vec<(String, String)>, CacheError> {
    let mut pairs = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((key, value)) = entry.split_once('=') else {
            return Err(CacheError::MalformedParam(entry.to_string()));
        };
        pairs.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(pairs)
}

fn parse_u64(key: &str, value: &str) -> Result<u64, CacheError> {
    value
        .parse::<u64>()
        .map_err(|_| CacheError::MalformedParam(alloc::format!("{key}={value}")))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, CacheError> {
    value
        .parse::<u32>()
        .map_err(|_| CacheError::MalformedParam(alloc::format!("{key}={value}")))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, CacheError> {
    value
        .parse::<f64>()
        .map_err(|_| CacheError::MalformedParam(alloc::format!("{key}={value}")))
}

fn car_config(raw: &str) -> Result<CarConfig, CacheError> {
    let mut config = CarConfig::default();
    for (key, value) in parse_params(raw)? {
        match key.as_str() {
            "p" => config.p = parse_u64(&key, &value)?,
            other => return Err(CacheError::UnknownParam(other.to_string())),
        }
    }
    Ok(config)
}

fn random_config(raw: &str) -> Result<u64, CacheError> {
    let mut seed = 0u64;
    for (key, value) in parse_params(raw)? {
        match key.as_str() {
            "seed" => seed = parse_u64(&key, &value)?,
            other => return Err(CacheError::UnknownParam(other.to_string())),
        }
    }
    Ok(seed)
}

fn slru_config(raw: &str) -> Result<SlruConfig, CacheError> {
    let mut config = SlruConfig::default();
    for (key, value) in parse_params(raw)? {
        match key.as_str() {
            "protected-ratio" => config.protected_ratio = parse_f64(&key, &value)?,
            other => return Err(CacheError::UnknownParam(other.to_string())),
        }
    }
    Ok(config)
}

/// AdaptSize's construction parameters (6): `max-iteration`,
/// `reconf-interval`. Exposed separately from [`create`] since admission is
/// a second, independent type parameter on [`Cache`] rather than part of
/// the eviction-policy selection `name` resolves.
pub fn adaptsize_config(
    raw: &str,
) -> Result<crate::admission::adaptsize::AdaptSizeConfig, CacheError> {
    let mut config = crate::admission::adaptsize::AdaptSizeConfig::default();
    for (key, value) in parse_params(raw)? {
        match key.as_str() {
            "max-iteration" => config.max_iteration = parse_u32(&key, &value)?,
            "reconf-interval" => config.reconf_interval = parse_u64(&key, &value)?,
            other => return Err(CacheError::UnknownParam(other.to_string())),
        }
    }
    Ok(config)
}

/// A cache with its eviction policy resolved at run time from a name (6).
///
/// Every [`Cache`] in this core is generic over its policy, monomorphized
/// at compile time (9, "no `dyn`"); a runtime-chosen `name` cannot select a
/// monomorphized type the way a C-style function-pointer struct could, so
/// this enum stands in for that indirection — one variant per policy this
/// build supports, each holding the ordinary monomorphic `Cache<P>`. Adding
/// admission control is a caller-side composition step, via
/// `Cache::with_admission` on the variant's own `Cache<P>`, once unwrapped.
#[derive(Debug)]
pub enum AnyCache {
    /// Least Recently Used.
    Lru(Cache<Lru>),
    /// First In, First Out.
    Fifo(Cache<Fifo>),
    /// CLOCK / second-chance.
    Clock(Cache<Clock>),
    /// Uniform random eviction.
    Random(Cache<Random>),
    /// Least Frequently Used.
    Lfu(Cache<Lfu>),
    /// Segmented LRU.
    Slru(Cache<Slru>),
    /// Adaptive Replacement Cache.
    Arc(Cache<Arc>),
    /// CLOCK with Adaptive Replacement.
    Car(Cache<Car>),
    /// Belady's MIN (oracle).
    Belady(Cache<Belady>),
}

impl AnyCache {
    /// The default `get` (4.1), dispatched to whichever policy this
    /// instance holds.
    pub fn get(&mut self, req: &Request) -> Outcome {
        match self {
            AnyCache::Lru(c) => c.get(req),
            AnyCache::Fifo(c) => c.get(req),
            AnyCache::Clock(c) => c.get(req),
            AnyCache::Random(c) => c.get(req),
            AnyCache::Lfu(c) => c.get(req),
            AnyCache::Slru(c) => c.get(req),
            AnyCache::Arc(c) => c.get(req),
            AnyCache::Car(c) => c.get(req),
            AnyCache::Belady(c) => c.get(req),
        }
    }

    /// User-triggered removal (4.1, "remove").
    pub fn remove(&mut self, id: ObjectId) -> bool {
        match self {
            AnyCache::Lru(c) => c.remove(id),
            AnyCache::Fifo(c) => c.remove(id),
            AnyCache::Clock(c) => c.remove(id),
            AnyCache::Random(c) => c.remove(id),
            AnyCache::Lfu(c) => c.remove(id),
            AnyCache::Slru(c) => c.remove(id),
            AnyCache::Arc(c) => c.remove(id),
            AnyCache::Car(c) => c.remove(id),
            AnyCache::Belady(c) => c.remove(id),
        }
    }

    /// Current occupied bytes.
    pub fn occupied_bytes(&self) -> u64 {
        match self {
            AnyCache::Lru(c) => c.occupied_bytes(),
            AnyCache::Fifo(c) => c.occupied_bytes(),
            AnyCache::Clock(c) => c.occupied_bytes(),
            AnyCache::Random(c) => c.occupied_bytes(),
            AnyCache::Lfu(c) => c.occupied_bytes(),
            AnyCache::Slru(c) => c.occupied_bytes(),
            AnyCache::Arc(c) => c.occupied_bytes(),
            AnyCache::Car(c) => c.occupied_bytes(),
            AnyCache::Belady(c) => c.occupied_bytes(),
        }
    }

    /// The configured capacity in bytes.
    pub fn capacity(&self) -> u64 {
        match self {
            AnyCache::Lru(c) => c.capacity(),
            AnyCache::Fifo(c) => c.capacity(),
            AnyCache::Clock(c) => c.capacity(),
            AnyCache::Random(c) => c.capacity(),
            AnyCache::Lfu(c) => c.capacity(),
            AnyCache::Slru(c) => c.capacity(),
            AnyCache::Arc(c) => c.capacity(),
            AnyCache::Car(c) => c.capacity(),
            AnyCache::Belady(c) => c.capacity(),
        }
    }

    /// Number of `get` calls made against this cache.
    pub fn request_count(&self) -> u64 {
        match self {
            AnyCache::Lru(c) => c.request_count(),
            AnyCache::Fifo(c) => c.request_count(),
            AnyCache::Clock(c) => c.request_count(),
            AnyCache::Random(c) => c.request_count(),
            AnyCache::Lfu(c) => c.request_count(),
            AnyCache::Slru(c) => c.request_count(),
            AnyCache::Arc(c) => c.request_count(),
            AnyCache::Car(c) => c.request_count(),
            AnyCache::Belady(c) => c.request_count(),
        }
    }
}

/// The named factory (6): resolves `name` against this build's policy
/// roster (9, "policy roster"), parses `param_string` against that
/// policy's recognized keys, and returns a ready [`AnyCache`].
///
/// Unrecognized keys and malformed `key=value` pairs are both fatal at
/// construction time (7, "Parameter parse error"), never a per-request
/// failure.
pub fn create(name: &str, params: CacheParams, param_string: &str) -> Result<AnyCache, CacheError> {
    let overhead = overhead_bytes(params.consider_object_metadata);
    let cache = match name {
        "lru" => {
            reject_unknown(param_string)?;
            AnyCache::Lru(Cache::new(params.capacity, overhead, None))
        }
        "fifo" => {
            reject_unknown(param_string)?;
            AnyCache::Fifo(Cache::new(params.capacity, overhead, None))
        }
        "clock" => {
            reject_unknown(param_string)?;
            AnyCache::Clock(Cache::new(params.capacity, overhead, None))
        }
        "random" => AnyCache::Random(Cache::new(
            params.capacity,
            overhead,
            Some(random_config(param_string)?),
        )),
        "lfu" => {
            reject_unknown(param_string)?;
            AnyCache::Lfu(Cache::new(params.capacity, overhead, None))
        }
        "slru" => AnyCache::Slru(Cache::new(
            params.capacity,
            overhead,
            Some(slru_config(param_string)?),
        )),
        "arc" => {
            reject_unknown(param_string)?;
            AnyCache::Arc(Cache::new(params.capacity, overhead, None))
        }
        "car" => AnyCache::Car(Cache::new(
            params.capacity,
            overhead,
            Some(car_config(param_string)?),
        )),
        "belady" => {
            reject_unknown(param_string)?;
            AnyCache::Belady(Cache::new(params.capacity, overhead, None))
        }
        other => return Err(CacheError::UnknownPolicy(other.to_string())),
    };
    Ok(cache)
}

/// Policies with no recognized parameters still reject a non-empty,
/// malformed-or-not parameter string: any key at all is "unknown" to them.
fn reject_unknown(raw: &str) -> Result<(), CacheError> {
    if let Some((key, _)) = parse_params(raw)?.into_iter().next() {
        return Err(CacheError::UnknownParam(key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(capacity: u64) -> CacheParams {
        CacheParams {
            capacity,
            default_ttl: None,
            hash_bucket_count: 16,
            consider_object_metadata: false,
        }
    }

    #[test]
    fn create_resolves_every_name_in_the_policy_roster() {
        for name in [
            "lru", "fifo", "clock", "random", "lfu", "slru", "arc", "car", "belady",
        ] {
            assert!(create(name, params(64), "").is_ok(), "failed on {name}");
        }
    }

    #[test]
    fn unknown_policy_name_is_rejected() {
        assert_eq!(
            create("lirs", params(64), ""),
            Err(CacheError::UnknownPolicy("lirs".to_string()))
        );
    }

    #[test]
    fn car_accepts_its_p_parameter() {
        let cache = create("car", params(64), "p=10").unwrap();
        assert_eq!(cache.capacity(), 64);
    }

    #[test]
    fn unrecognized_param_key_is_rejected() {
        let err = create("lru", params(64), "ttl-aware=true").unwrap_err();
        assert_eq!(err, CacheError::UnknownParam("ttl-aware".to_string()));
    }

    #[test]
    fn malformed_param_pair_is_rejected() {
        let err = create("car", params(64), "p").unwrap_err();
        assert_eq!(err, CacheError::MalformedParam("p".to_string()));
    }
}
