//! Least Recently Used eviction (2). Grounded directly in the teacher
//! crate's `src/lru.rs`: one intrusive list in most-recently-used-first
//! order, a hash table mapping id to list node.

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId};

/// LRU: evicts the object at the tail (least recently used) of the list.
#[derive(Debug)]
pub struct Lru {
    list: List<CacheObject>,
}

impl EvictionPolicy for Lru {
    type Config = ();

    fn new(_capacity: u64, _config: ()) -> Self {
        Self { list: List::new() }
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
            self.list.move_to_front(node);
        }
        true
    }

    fn insert(&mut self, table: &mut Table, obj: CacheObject) {
        let id = obj.id;
        let node = self.list.push_front(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        let obj = self.list.pop_back()?;
        table.remove(&obj.id);
        Some(obj.size)
    }

    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        self.list.back().map(|node| self.list.get(node).id)
    }

    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64> {
        let node = table.remove(&id)?;
        let obj = self.list.remove(node);
        Some(obj.size)
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
    fn lru_reference_property() {
        // Sequential trace of N unique ids, then a reverse replay against
        // a cache of capacity floor(N/2), per testable property 8.
        let n = 10u64;
        let mut cache = Cache::<Lru>::new(n / 2, 0, None);
        for id in 1..=n {
            assert!(cache.get(&req(id, 1)).is_miss());
        }
        let mut hits = 0;
        for id in (1..=n).rev() {
            if cache.get(&req(id, 1)).is_hit() {
                hits += 1;
            }
        }
        assert_eq!(hits, (n / 2) as usize);
    }

    #[test]
    fn scenario_1_from_spec() {
        let mut cache = Cache::<Lru>::new(3, 0, None);
        let trace = [1u64, 2, 3, 1, 4, 2];
        let mut hit_ids = alloc::vec::Vec::new();
        for id in trace {
            if cache.get(&req(id, 1)).is_hit() {
                hit_ids.push(id);
            }
        }
        assert_eq!(hit_ids, alloc::vec![1]);
    }

    #[test]
    fn eviction_removes_tail_and_frees_bytes() {
        let mut cache = Cache::<Lru>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(3, 1));
        assert!(!cache.remove(1));
        assert!(cache.remove(2) || cache.remove(3));
    }
}
