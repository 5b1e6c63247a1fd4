//! Random eviction: uniformly picks any resident object as the victim.
//! No bookkeeping on hit; deterministic given a seed, per the core's
//! reproducibility requirement (5).

use crate::cache::{EvictionPolicy, Table};
use crate::list::List;
use crate::object::{CacheObject, ObjectId};

#[derive(Debug, Clone, Copy)]
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Random: evicts a uniformly chosen resident object.
#[derive(Debug)]
pub struct Random {
    list: List<CacheObject>,
    rng: SplitMix64,
}

impl EvictionPolicy for Random {
    type Config = u64;

    fn new(capacity: u64, seed: u64) -> Self {
        Self {
            list: List::new(),
            rng: SplitMix64(seed ^ capacity ^ 0x2545_F491_4F6C_DD1D),
        }
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
        let node = self.list.push_front(obj);
        table.insert(id, node);
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        if self.list.is_empty() {
            return None;
        }
        let idx = (self.rng.next_u64() as usize) % self.list.len();
        let node = self.list.nth_from_front(idx)?;
        let id = self.list.get(node).id;
        table.remove(&id);
        let obj = self.list.remove(node);
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
    fn eviction_always_keeps_within_capacity() {
        let mut cache = Cache::<Random>::new(3, 0, Some(42));
        for id in 1..=10u64 {
            cache.get(&req(id, 1));
            assert!(cache.occupied_bytes() <= cache.capacity());
        }
    }
}
