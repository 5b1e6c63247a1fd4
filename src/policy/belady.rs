//! Belady's MIN (the clairvoyant oracle): always evicts the resident
//! object whose next access lies farthest in the future, using the
//! lookahead `next_access_vtime` carried on each [`CacheObject`]/request.
//! Objects with no further access (`None`) are treated as infinitely far
//! away and evicted first.
//!
//! Not implementable on a live system, included as an upper-bound baseline
//! for comparing the other policies (GLOSSARY, "Belady's algorithm").
//! Victims are tracked in a `BTreeMap` keyed by next-access time, the same
//! bucketing idiom the teacher crate uses for LFU's frequency buckets.

use alloc::collections::BTreeMap;

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId};

/// Sentinel key for "never accessed again" — sorts last, so it is always
/// the first candidate the eviction scan considers.
const NEVER_AGAIN: i64 = i64::MAX;

fn bucket_key(vtime: Option<i64>) -> i64 {
    vtime.unwrap_or(NEVER_AGAIN)
}

/// Belady: evicts whichever resident object's next access is farthest off
/// (or nonexistent).
#[derive(Debug)]
pub struct Belady {
    buckets: BTreeMap<i64, List<CacheObject>>,
}

impl EvictionPolicy for Belady {
    type Config = ();

    fn new(_capacity: u64, _config: ()) -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    fn find(
        &mut self,
        table: &mut Table,
        id: ObjectId,
        update_cache: bool,
        next_access_vtime: Option<i64>,
    ) -> bool {
        let Some(&node) = table.get(&id) else {
            return false;
        };
        if !update_cache {
            return true;
        }

        let current_key = bucket_key(self.bucket_of(node));
        if let Some(bucket) = self.buckets.get_mut(&current_key) {
            let mut obj = bucket.remove(node);
            if bucket.is_empty() {
                self.buckets.remove(&current_key);
            }
            obj.next_access_vtime = next_access_vtime;
            let new_key = bucket_key(next_access_vtime);
            let new_node = self.buckets.entry(new_key).or_default().push_front(obj);
            table.insert(id, new_node);
        }
        true
    }

    fn insert(&mut self, table: &mut Table, obj: CacheObject) {
        let id = obj.id;
        let key = bucket_key(obj.next_access_vtime);
        let node = self.buckets.entry(key).or_default().push_front(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        let key = *self.buckets.keys().next_back()?;
        let bucket = self.buckets.get_mut(&key)?;
        let obj = bucket.pop_back()?;
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        table.remove(&obj.id);
        Some(obj.size)
    }

    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        let key = *self.buckets.keys().next_back()?;
        self.buckets
            .get(&key)
            .and_then(|list| list.back())
            .map(|node| self.buckets.get(&key).expect("just looked up").get(node).id)
    }

    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64> {
        let node = table.remove(&id)?;
        let key = bucket_key(self.bucket_of(node));
        let bucket = self.buckets.get_mut(&key)?;
        let obj = bucket.remove(node);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        Some(obj.size)
    }
}

impl Belady {
    /// `NodeRef` addresses the node directly: any bucket's list can read
    /// it back, so we only need one concrete list to ask for its value.
    fn bucket_of(&self, node: crate::list::NodeRef<CacheObject>) -> Option<i64> {
        let list = self.buckets.values().next()?;
        list.get(node).next_access_vtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cache;
    use crate::request::{Operation, Request};

    fn req(id: u64, size: i64, next: Option<i64>) -> Request {
        let r = Request::new(0, id, size, Operation::Get);
        match next {
            Some(v) => r.with_next_access(v),
            None => r,
        }
    }

    #[test]
    fn evicts_the_object_accessed_farthest_in_the_future() {
        let mut cache = Cache::<Belady>::new(2, 0, None);
        cache.get(&req(1, 1, Some(100)));
        cache.get(&req(2, 1, Some(5)));
        cache.get(&req(3, 1, None)); // forces an eviction: 1 is farther off than 2
        assert!(!cache.remove(1));
        assert!(cache.remove(2));
    }

    #[test]
    fn object_with_no_future_access_is_evicted_first() {
        let mut cache = Cache::<Belady>::new(2, 0, None);
        cache.get(&req(1, 1, None));
        cache.get(&req(2, 1, Some(50)));
        cache.get(&req(3, 1, Some(10)));
        assert!(!cache.remove(1));
    }
}
