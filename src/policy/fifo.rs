//! First-In-First-Out eviction: the simplest specialization of the shared
//! intrusive-list primitive (4.2) — insertion order only, no bookkeeping
//! on hit.

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId};

/// FIFO: evicts whichever resident object was inserted first, regardless
/// of subsequent hits.
#[derive(Debug)]
pub struct Fifo {
    list: List<CacheObject>,
}

impl EvictionPolicy for Fifo {
    type Config = ();

    fn new(_capacity: u64, _config: ()) -> Self {
        Self { list: List::new() }
    }

    fn find(
        &mut self,
        table: &mut Table,
        id: ObjectId,
        _update_cache: bool,
        _next_access_vtime: Option<i64>,
    ) -> bool {
        table.contains_key(&id)
    }

    fn insert(&mut self, table: &mut Table, obj: CacheObject) {
        let id = obj.id;
        let node = self.list.push_back(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        let obj = self.list.pop_front()?;
        table.remove(&obj.id);
        Some(obj.size)
    }

    fn to_evict(&self, _table: &Table) -> Option<ObjectId> {
        self.list.front().map(|node| self.list.get(node).id)
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
    fn hits_do_not_change_eviction_order() {
        let mut cache = Cache::<Fifo>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(1, 1)); // hit, but 1 was still inserted first
        cache.get(&req(3, 1)); // forces an eviction
        assert!(!cache.remove(1), "1 should have been evicted despite the hit");
        assert!(cache.remove(2));
        assert!(cache.remove(3));
    }
}
