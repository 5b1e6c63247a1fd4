//! Segmented LRU: a probationary segment for new or once-seen objects and a
//! protected segment for objects that have been hit at least once, grounded
//! in the teacher crate's `src/slru.rs` two-segment design. Objects promote
//! probationary -> protected on a hit and demote protected -> probationary
//! when the protected segment overflows its byte share of capacity.

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId, PolicyMeta};

/// Fraction of total capacity reserved for the protected segment.
#[derive(Debug, Clone, Copy)]
pub struct SlruConfig {
    pub protected_ratio: f64,
}

impl Default for SlruConfig {
    fn default() -> Self {
        Self {
            protected_ratio: 0.2,
        }
    }
}

/// SLRU: new objects enter probationary; a hit promotes to protected;
/// protected overflow demotes its LRU member back to probationary MRU.
#[derive(Debug)]
pub struct Slru {
    probationary: List<CacheObject>,
    protected: List<CacheObject>,
    protected_bytes: u64,
    protected_capacity: u64,
}

impl Slru {
    fn demote_protected_lru_if_over(&mut self, table: &mut Table) {
        while self.protected_bytes > self.protected_capacity {
            let Some(mut obj) = self.protected.pop_back() else {
                break;
            };
            self.protected_bytes -= obj.size;
            obj.meta = PolicyMeta::Slru { protected: false };
            let id = obj.id;
            let new_node = self.probationary.push_front(obj);
            table.insert(id, new_node);
        }
    }
}

impl EvictionPolicy for Slru {
    type Config = SlruConfig;

    fn new(capacity: u64, config: SlruConfig) -> Self {
        let ratio = config.protected_ratio.clamp(0.0, 1.0);
        Self {
            probationary: List::new(),
            protected: List::new(),
            protected_bytes: 0,
            protected_capacity: (capacity as f64 * ratio) as u64,
        }
    }

    fn find(
        &mut self,
        table: &mut Table,
        id: ObjectId,
        update_cache: bool,
        _next_access_vtime: Option<i64>,
    ) -> bool {
        let Some(&node) = table.get(&id) else {
            return false;
        };
        if !update_cache {
            return true;
        }
        let is_protected = matches!(
            self.probationary.get(node).meta,
            PolicyMeta::Slru { protected: true }
        ) || matches!(self.protected.get(node).meta, PolicyMeta::Slru { protected: true });

        if is_protected {
            self.protected.move_to_front(node);
        } else {
            let mut obj = self.probationary.remove(node);
            self.protected_bytes += obj.size;
            obj.meta = PolicyMeta::Slru { protected: true };
            let new_node = self.protected.push_front(obj);
            table.insert(id, new_node);
            self.demote_protected_lru_if_over(table);
        }
        true
    }

    fn insert(&mut self, table: &mut Table, mut obj: CacheObject) {
        obj.meta = PolicyMeta::Slru { protected: false };
        let id = obj.id;
        let node = self.probationary.push_front(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        if let Some(obj) = self.probationary.pop_back() {
            table.remove(&obj.id);
            return Some(obj.size);
        }
        let obj = self.protected.pop_back()?;
        self.protected_bytes = self.protected_bytes.saturating_sub(obj.size);
        table.remove(&obj.id);
        Some(obj.size)
    }

    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        self.probationary
            .back()
            .map(|node| self.probationary.get(node).id)
            .or_else(|| self.protected.back().map(|node| self.protected.get(node).id))
    }

    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64> {
        let node = table.remove(&id)?;
        if matches!(
            self.probationary.get(node).meta,
            PolicyMeta::Slru { protected: false }
        ) {
            Some(self.probationary.remove(node).size)
        } else {
            let obj = self.protected.remove(node);
            self.protected_bytes = self.protected_bytes.saturating_sub(obj.size);
            Some(obj.size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cache;
    use crate::request::{Operation, Request};

    fn req(id: u64, size: i64) -> Request {
        Request::new(0, id, size, Operation::Get)
    }

    #[test]
    fn promoted_object_survives_a_probationary_scan() {
        let mut cache = Cache::<Slru>::new(4, 0, Some(SlruConfig { protected_ratio: 0.5 }));
        cache.get(&req(1, 1));
        cache.get(&req(1, 1)); // promote 1 to protected
        cache.get(&req(2, 1));
        cache.get(&req(3, 1));
        cache.get(&req(4, 1)); // evicts from probationary, not protected
        assert!(cache.remove(1));
    }

    #[test]
    fn single_touch_objects_stay_probationary_and_evict_first() {
        let mut cache = Cache::<Slru>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(3, 1)); // 1 never got a second hit, evicted first
        assert!(!cache.remove(1));
        assert!(cache.remove(2));
        assert!(cache.remove(3));
    }
}
