//! The per-object record and its tagged-union policy metadata.
//!
//! Mirrors the teacher crate's per-algorithm metadata structs (`LfuMeta`,
//! `SlruMeta`, …), collapsed into one sum type because the cache
//! abstraction layer is policy-generic rather than one distinct cache type
//! per metadata shape.

pub use crate::request::ObjectId;

/// Per-policy metadata carried by a [`CacheObject`].
///
/// One variant per implemented eviction policy. A policy only ever reads
/// and writes its own variant; the cache abstraction layer never inspects
/// this enum itself; it hands a fresh variant to `insert` and leaves the
/// rest to the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyMeta {
    /// No extra bookkeeping (FIFO, Random).
    None,
    /// CLOCK / CAR resident reference bit.
    Clock {
        /// Set on hit, cleared on rotation; governs second-chance eviction.
        reference: bool,
    },
    /// CAR per-object state: which resident list it belongs to (T1/T2) and
    /// whether it is a ghost.
    Car {
        /// `true` for T2 (frequency), `false` for T1 (recency).
        in_t2: bool,
        /// Reference bit, meaningful only for resident (non-ghost) objects.
        reference: bool,
    },
    /// ARC per-object state: which resident list it belongs to.
    Arc {
        /// `true` for T2 (frequency), `false` for T1 (recency).
        in_t2: bool,
    },
    /// LFU access-frequency counter.
    Lfu {
        /// Number of times the object has been accessed.
        frequency: u64,
    },
    /// SLRU segment membership.
    Slru {
        /// `true` while in the protected segment, `false` in probationary.
        protected: bool,
    },
}

impl Default for PolicyMeta {
    fn default() -> Self {
        PolicyMeta::None
    }
}

/// One resident object, or one ghost entry shadowing a past resident.
///
/// Owned by exactly one collection at a time: the cache's hash table,
/// transitively, plus one intrusive list belonging to whichever policy
/// structure currently holds it. A ghost object has `is_ghost = true` and
/// carries no residency cost (it is not counted in `occupied_bytes`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheObject {
    /// Object identifier, the hash-table key.
    pub id: ObjectId,
    /// Current size in bytes. Zero for ghost entries.
    pub size: u64,
    /// Creation time (clock units), for TTL/age bookkeeping.
    pub create_time: i64,
    /// Expiry time, if the object carries a TTL.
    pub expire_time: Option<i64>,
    /// Whether this is a ghost (shadow) entry with no residency cost.
    pub is_ghost: bool,
    /// Virtual time of this object's next access, carried through from the
    /// request that last touched it. Only the oracle (Belady) policy reads
    /// this; every other policy ignores it. Not policy metadata itself,
    /// since it is a property of the request stream, not of any one policy.
    pub next_access_vtime: Option<i64>,
    /// The policy-specific metadata block.
    pub meta: PolicyMeta,
}

impl CacheObject {
    /// Creates a new resident object from a request.
    pub fn resident(id: ObjectId, size: u64, create_time: i64, expire_time: Option<i64>) -> Self {
        Self {
            id,
            size,
            create_time,
            expire_time,
            is_ghost: false,
            next_access_vtime: None,
            meta: PolicyMeta::None,
        }
    }

    /// Attaches oracle lookahead to an otherwise-built object.
    #[must_use]
    pub fn with_next_access_vtime(mut self, vtime: Option<i64>) -> Self {
        self.next_access_vtime = vtime;
        self
    }

    /// Creates a ghost entry (no residency cost) for the given id.
    pub fn ghost(id: ObjectId, create_time: i64) -> Self {
        Self {
            id,
            size: 0,
            create_time,
            expire_time: None,
            is_ghost: true,
            next_access_vtime: None,
            meta: PolicyMeta::None,
        }
    }

    /// Converts a resident object into a ghost entry in place, zeroing its
    /// residency cost.
    pub fn demote_to_ghost(&mut self) {
        self.size = 0;
        self.is_ghost = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resident_object_is_not_a_ghost() {
        let obj = CacheObject::resident(1, 100, 0, None);
        assert!(!obj.is_ghost);
        assert_eq!(obj.size, 100);
    }

    #[test]
    fn demote_to_ghost_zeroes_size() {
        let mut obj = CacheObject::resident(1, 100, 0, None);
        obj.demote_to_ghost();
        assert!(obj.is_ghost);
        assert_eq!(obj.size, 0);
    }

    #[test]
    fn default_policy_meta_is_none() {
        assert_eq!(PolicyMeta::default(), PolicyMeta::None);
    }
}
