//! CLOCK (second-chance) eviction: a single circular list with a reference
//! bit per resident object, rotated on eviction. This is CAR's T1 mechanism
//! with the ARC adaptivity stripped out (GLOSSARY, "Reference bit").

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId, PolicyMeta};

/// CLOCK: evicts the first object at the head whose reference bit is
/// clear, clearing and rotating the bits of any it passes over.
#[derive(Debug)]
pub struct Clock {
    list: List<CacheObject>,
}

impl EvictionPolicy for Clock {
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
            if let PolicyMeta::Clock { reference } = &mut self.list.get_mut(node).meta {
                *reference = true;
            }
        }
        true
    }

    fn insert(&mut self, table: &mut Table, mut obj: CacheObject) {
        obj.meta = PolicyMeta::Clock { reference: false };
        let id = obj.id;
        let node = self.list.push_back(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        loop {
            let node = self.list.front()?;
            let reference = match self.list.get(node).meta {
                PolicyMeta::Clock { reference } => reference,
                _ => false,
            };
            if reference {
                if let PolicyMeta::Clock { reference } = &mut self.list.get_mut(node).meta {
                    *reference = false;
                }
                self.list.move_to_back(node);
                continue;
            }
            let obj = self.list.pop_front().expect("front() just confirmed a node");
            table.remove(&obj.id);
            return Some(obj.size);
        }
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
    fn referenced_objects_survive_one_rotation() {
        let mut cache = Cache::<Clock>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(1, 1)); // sets 1's reference bit
        cache.get(&req(3, 1)); // should rotate past 1 and evict 2
        assert!(cache.remove(1));
        assert!(!cache.remove(2));
    }
}
