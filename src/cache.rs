//! The policy-agnostic cache handle and the six-operation policy interface.
//!
//! `Cache<P>` carries the common parameters (3, "Cache"): capacity,
//! occupied bytes, per-object metadata overhead, the hash table, and the
//! request counter. `P: EvictionPolicy` supplies the six operations (4.1);
//! dispatch is monomorphic (one `Cache<P>` instance binds to one policy
//! type, inlined by the compiler), never a `dyn` trait object on the hot
//! path, per the design notes on function-pointer dispatch.

use crate::admission::{Admissioner, NoAdmission};
use crate::object::{CacheObject, ObjectId};
use crate::request::Request;
use crate::list::NodeRef;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;
#[cfg(all(feature = "std", not(feature = "hashbrown")))]
use std::collections::HashMap;

/// The hash table mapping object id to a handle into whichever intrusive
/// list currently owns that object's node. Keeps no size other than its
/// entry count — the bucketed-chain structure of 3 ("HashTable") is what a
/// language-level hash map already gives a Rust implementation.
pub type Table = HashMap<ObjectId, NodeRef<CacheObject>>;

/// The result of a completed [`Cache::get`]: how many bytes were served as
/// a hit versus counted as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The object was resident; served from cache.
    Hit {
        /// Size of the object served.
        bytes: u64,
    },
    /// The object was not resident (or was denied admission); not served.
    Miss {
        /// Size of the object that would have been served.
        bytes: u64,
        /// Whether the miss resulted in the object being inserted.
        inserted: bool,
    },
}

impl Outcome {
    /// Whether this outcome was a hit.
    pub fn is_hit(self) -> bool {
        matches!(self, Outcome::Hit { .. })
    }

    /// Whether this outcome was a miss.
    pub fn is_miss(self) -> bool {
        !self.is_hit()
    }

    /// The number of bytes associated with this outcome, hit or miss.
    pub fn bytes(self) -> u64 {
        match self {
            Outcome::Hit { bytes } | Outcome::Miss { bytes, .. } => bytes,
        }
    }
}

/// The six-operation policy interface (4.1). Implementors own their own
/// intrusive lists (4.2) and mutate only their own [`crate::object::PolicyMeta`]
/// variant; the cache abstraction layer never inspects policy internals.
///
/// All operations are total: there is no retry path. Corrupt-invariant
/// conditions (a victim that should exist but doesn't, a dangling node) are
/// `debug_assert!`-checked by implementations rather than returned as
/// errors, per the error-handling design (7).
pub trait EvictionPolicy {
    /// Per-policy constructor parameters, produced by [`crate::config::parse_params`].
    type Config: Default;

    /// Creates a policy instance bounded to operate within `capacity` bytes.
    /// The policy does not enforce capacity itself — the cache handle does,
    /// by calling `evict` until there is room — but some policies (CAR) need
    /// to know capacity up front to bound their adaptive parameter.
    fn new(capacity: u64, config: Self::Config) -> Self;

    /// Hash lookup by id. If found and `update_cache` is true, applies
    /// policy-defined bookkeeping (move to MRU position, set reference bit,
    /// adjust the CAR target `p`, …). Returns `true` only for a non-ghost
    /// hit; a ghost lookup mutates policy state but still reports a miss to
    /// the caller, per 4.1.
    ///
    /// `next_access_vtime` carries the request's oracle lookahead through to
    /// policies that need it (Belady); every other policy ignores it.
    fn find(
        &mut self,
        table: &mut Table,
        id: ObjectId,
        update_cache: bool,
        next_access_vtime: Option<i64>,
    ) -> bool;

    /// Creates a resident object record from `obj` and enqueues it in the
    /// policy's structures at the policy-defined position (T1 head for a
    /// plain miss in CAR, frequency-1 bucket for LFU, …), inserting it into
    /// `table`.
    fn insert(&mut self, table: &mut Table, obj: CacheObject);

    /// Picks the next victim per policy, removes it from `table` (or
    /// converts it to a ghost, leaving it in `table`), and returns the
    /// number of bytes freed (`0` if the victim was ghosted rather than
    /// evicted entirely, `None` if there is nothing left to evict).
    fn evict(&mut self, table: &mut Table) -> Option<u64>;

    /// Non-destructive peek at the next victim, for composition and sanity
    /// checks. Not every policy supports this; the default returns `None`.
    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        None
    }

    /// User-triggered removal; undoes `insert`. Returns the number of bytes
    /// freed, if `id` was resident.
    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64>;
}

/// The policy-agnostic cache handle (3, "Cache").
pub struct Cache<P, A = NoAdmission> {
    capacity: u64,
    occupied_bytes: u64,
    /// Fixed per-object bookkeeping overhead counted against capacity
    /// alongside the object's own size (3, "per-object metadata overhead").
    overhead: u64,
    table: Table,
    request_counter: u64,
    policy: P,
    admissioner: Option<A>,
}

impl<P: core::fmt::Debug, A: core::fmt::Debug> core::fmt::Debug for Cache<P, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("occupied_bytes", &self.occupied_bytes)
            .field("request_counter", &self.request_counter)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<P: EvictionPolicy> Cache<P, NoAdmission> {
    /// Creates a cache with no admission layer (every miss is admitted).
    pub fn new(capacity: u64, overhead: u64, config: Option<P::Config>) -> Self {
        Self {
            capacity,
            occupied_bytes: 0,
            overhead,
            table: Table::default(),
            request_counter: 0,
            policy: P::new(capacity, config.unwrap_or_default()),
            admissioner: None,
        }
    }
}

impl<P: EvictionPolicy, A: Admissioner> Cache<P, A> {
    /// Creates a cache wired to an admission layer (4.5).
    pub fn with_admission(capacity: u64, overhead: u64, config: P::Config, admissioner: A) -> Self {
        Self {
            capacity,
            occupied_bytes: 0,
            overhead,
            table: Table::default(),
            request_counter: 0,
            policy: P::new(capacity, config),
            admissioner: Some(admissioner),
        }
    }

    /// Current occupied bytes: the sum of sizes of resident (non-ghost)
    /// objects plus their per-object overhead (GLOSSARY, "Occupied bytes").
    pub fn occupied_bytes(&self) -> u64 {
        self.occupied_bytes
    }

    /// The configured capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of `get` calls made against this cache.
    pub fn request_count(&self) -> u64 {
        self.request_counter
    }

    /// The default `get` (4.1): find, admit, evict until it fits, insert.
    pub fn get(&mut self, req: &Request) -> Outcome {
        self.request_counter += 1;

        if let Some(admissioner) = &mut self.admissioner {
            admissioner.update(req, self.capacity);
        }

        let bytes = req.obj_size.max(0) as u64;

        if self
            .policy
            .find(&mut self.table, req.obj_id, true, req.next_access_vtime)
        {
            return Outcome::Hit { bytes };
        }

        if let Some(admissioner) = &mut self.admissioner {
            if !admissioner.admit(req) {
                return Outcome::Miss {
                    bytes,
                    inserted: false,
                };
            }
        }

        // Oversized request: cannot ever fit, not even in an empty cache.
        // Reported as "cannot insert", not an error (7).
        if bytes + self.overhead > self.capacity {
            return Outcome::Miss {
                bytes,
                inserted: false,
            };
        }

        while self.occupied_bytes + bytes + self.overhead > self.capacity {
            match self.policy.evict(&mut self.table) {
                Some(freed) => self.occupied_bytes = self.occupied_bytes.saturating_sub(freed),
                None => {
                    // Nothing left to evict but we still don't fit: the
                    // oversized check above should have caught this.
                    debug_assert!(
                        false,
                        "evict() returned None while the request still does not fit"
                    );
                    break;
                }
            }
        }

        let expire = req.ttl.map(|ttl| req.clock_time + ttl);
        let obj = CacheObject::resident(req.obj_id, bytes, req.clock_time, expire)
            .with_next_access_vtime(req.next_access_vtime);
        self.policy.insert(&mut self.table, obj);
        self.occupied_bytes += bytes;

        Outcome::Miss {
            bytes,
            inserted: true,
        }
    }

    /// Non-destructive peek at the next eviction victim.
    pub fn to_evict(&self) -> Option<ObjectId> {
        self.policy.to_evict(&self.table)
    }

    /// User-triggered removal (4.1, "remove").
    pub fn remove(&mut self, id: ObjectId) -> bool {
        match self.policy.remove(&mut self.table, id) {
            Some(freed) => {
                self.occupied_bytes = self.occupied_bytes.saturating_sub(freed);
                true
            }
            None => false,
        }
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
    fn residency_invariant_holds_after_gets() {
        let mut cache = Cache::<Lru>::new(30, 0, None);
        for id in 1..=5u64 {
            cache.get(&req(id, 10));
        }
        assert!(cache.occupied_bytes() <= cache.capacity());
    }

    #[test]
    fn oversized_request_is_reported_as_miss_without_mutation(){
        let mut cache = Cache::<Lru>::new(100, 0, None);
        let outcome = cache.get(&req(1, 200));
        assert!(outcome.is_miss());
        assert_eq!(cache.occupied_bytes(), 0);
    }

    #[test]
    fn repeated_get_of_same_id_is_a_hit() {
        let mut cache = Cache::<Lru>::new(100, 0, None);
        assert!(cache.get(&req(1, 10)).is_miss());
        assert!(cache.get(&req(1, 10)).is_hit());
    }

    #[test]
    fn remove_frees_occupied_bytes() {
        let mut cache = Cache::<Lru>::new(100, 0, None);
        cache.get(&req(1, 10));
        assert_eq!(cache.occupied_bytes(), 10);
        assert!(cache.remove(1));
        assert_eq!(cache.occupied_bytes(), 0);
    }
}
