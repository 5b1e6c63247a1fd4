//! Least Frequently Used eviction (2). Grounded in the teacher crate's
//! `src/lfu.rs`: a hash map for O(1) lookup plus frequency-bucketed lists,
//! with a `min_frequency` cursor for O(1) victim selection.

use alloc::collections::BTreeMap;

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId, PolicyMeta};

/// LFU: evicts the resident object with the lowest access frequency,
/// breaking ties by least-recently-promoted-to-that-frequency.
#[derive(Debug)]
pub struct Lfu {
    buckets: BTreeMap<u64, List<CacheObject>>,
    min_frequency: u64,
}

impl Lfu {
    fn bump(&mut self, node: crate::list::NodeRef<CacheObject>, old_freq: u64) {
        let bucket = self
            .buckets
            .get_mut(&old_freq)
            .expect("object's frequency bucket must exist");
        let mut obj = bucket.remove(node);
        if bucket.is_empty() && old_freq == self.min_frequency {
            self.min_frequency += 1;
        }
        let new_freq = old_freq + 1;
        obj.meta = PolicyMeta::Lfu {
            frequency: new_freq,
        };
        self.buckets.entry(new_freq).or_default().push_front(obj);
    }
}

impl EvictionPolicy for Lfu {
    type Config = ();

    fn new(_capacity: u64, _config: ()) -> Self {
        Self {
            buckets: BTreeMap::new(),
            min_frequency: 1,
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
        if update_cache {
            if let Some(freq) = self.frequency_of(node) {
                self.bump(node, freq);
            }
        }
        true
    }

    fn insert(&mut self, table: &mut Table, mut obj: CacheObject) {
        obj.meta = PolicyMeta::Lfu { frequency: 1 };
        let id = obj.id;
        let node = self.buckets.entry(1).or_default().push_front(obj);
        self.min_frequency = 1;
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        loop {
            let bucket = self.buckets.get_mut(&self.min_frequency)?;
            if let Some(obj) = bucket.pop_back() {
                table.remove(&obj.id);
                return Some(obj.size);
            }
            self.buckets.remove(&self.min_frequency);
            self.min_frequency = *self.buckets.keys().next()?;
        }
    }

    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        self.buckets
            .get(&self.min_frequency)
            .and_then(|list| list.back())
            .map(|node| {
                self.buckets
                    .get(&self.min_frequency)
                    .expect("just looked up")
                    .get(node)
                    .id
            })
    }

    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64> {
        let node = table.remove(&id)?;
        let freq = self.frequency_of(node)?;
        let bucket = self.buckets.get_mut(&freq)?;
        let obj = bucket.remove(node);
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
        Some(obj.size)
    }
}

impl Lfu {
    /// `NodeRef` addresses the node directly, so any bucket's list can read
    /// it; we only need one to get at the frequency the object itself carries.
    fn frequency_of(&self, node: crate::list::NodeRef<CacheObject>) -> Option<u64> {
        let list = self.buckets.values().next()?;
        match list.get(node).meta {
            PolicyMeta::Lfu { frequency } => Some(frequency),
            _ => None,
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
    fn higher_frequency_object_survives_eviction() {
        let mut cache = Cache::<Lfu>::new(3, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(3, 1));
        cache.get(&req(1, 1));
        cache.get(&req(1, 1));
        cache.get(&req(4, 1)); // evicts 2 or 3, both at frequency 1
        assert!(cache.remove(1));
    }
}
