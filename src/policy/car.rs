//! CAR: CLOCK with Adaptive Replacement. Combines CLOCK's reference-bit
//! second chance with ARC's ghost-list adaptation of the T1/T2 split point
//! `p`. T1 and T2 are circular (FIFO-with-reference-bit) rather than
//! strict LRU; a referenced page scanned out of T1 is given a second
//! chance by moving to the tail of T2 instead of just rotating in place.
//!
//! Ghost lists B1/B2 and the `p` adaptation mirror [`crate::policy::arc`];
//! see that module and DESIGN.md for the shared simplifications (count-
//! based `p`/ghost bounds against a byte-capacity cache).

use crate::cache::{EvictionPolicy, Table};
use crate::list::{List, NodeRef};
use crate::object::{CacheObject, ObjectId, PolicyMeta};

#[derive(Debug, Clone, Copy, Default)]
enum GhostHit {
    #[default]
    None,
    B1,
    B2,
}

/// Construction parameters recognized in the policy parameter string (6):
/// `p`, the initial T1 target.
#[derive(Debug, Clone, Copy)]
pub struct CarConfig {
    /// Initial value of the adaptive target `p`. Default 0.
    pub p: u64,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self { p: 0 }
    }
}

/// CAR: clock-based second chance on T1/T2, with B1/B2 ghost history
/// adapting the target T1 size `p`.
#[derive(Debug)]
pub struct Car {
    t1: List<CacheObject>,
    t2: List<CacheObject>,
    b1: List<CacheObject>,
    b2: List<CacheObject>,
    b1_table: Table,
    b2_table: Table,
    /// Adaptive T1 target. Kept as a real value so ghost-hit deltas
    /// (`|B2|/|B1|` and its inverse) accumulate fractionally; clamped to
    /// `max(1, floor(p))` only where it is compared against list lengths.
    p: f64,
    c: u64,
    pending: GhostHit,
}

fn reference_of(obj: &CacheObject) -> bool {
    match obj.meta {
        PolicyMeta::Car { reference, .. } => reference,
        _ => false,
    }
}

impl Car {
    fn ghost_len(&self) -> u64 {
        self.b1.len() as u64 + self.b2.len() as u64
    }

    fn resident_len(&self) -> u64 {
        self.t1.len() as u64 + self.t2.len() as u64
    }

    /// One pass of the CAR clock hand: rotates referenced pages with a
    /// second chance (T1 pages move to T2's tail), evicts the first
    /// unreferenced page it finds, and demotes it to the matching ghost list.
    fn replace(&mut self, table: &mut Table) -> Option<u64> {
        loop {
            if self.t1.is_empty() && self.t2.is_empty() {
                return None;
            }
            let check_t1 = if self.t2.is_empty() {
                true
            } else if self.t1.is_empty() {
                false
            } else {
                self.t1.len() as u64 >= (self.p.floor() as u64).max(1)
            };

            if check_t1 {
                let node = self.t1.front().expect("checked non-empty");
                if reference_of(self.t1.get(node)) {
                    self.clear_reference_and_promote(table, node);
                    continue;
                }
                let mut obj = self.t1.remove(node);
                table.remove(&obj.id);
                let size = obj.size;
                obj.demote_to_ghost();
                let id = obj.id;
                let gn = self.b1.push_front(obj);
                self.b1_table.insert(id, gn);
                return Some(size);
            }

            let node = self.t2.front().expect("checked non-empty");
            if reference_of(self.t2.get(node)) {
                if let PolicyMeta::Car { reference, .. } = &mut self.t2.get_mut(node).meta {
                    *reference = false;
                }
                self.t2.move_to_back(node);
                continue;
            }
            let mut obj = self.t2.remove(node);
            table.remove(&obj.id);
            let size = obj.size;
            obj.demote_to_ghost();
            let id = obj.id;
            let gn = self.b2.push_front(obj);
            self.b2_table.insert(id, gn);
            return Some(size);
        }
    }

    /// A referenced T1 page gets a second chance in T2 rather than T1.
    fn clear_reference_and_promote(&mut self, table: &mut Table, node: NodeRef<CacheObject>) {
        let mut obj = self.t1.remove(node);
        obj.meta = PolicyMeta::Car {
            in_t2: true,
            reference: false,
        };
        let id = obj.id;
        let new_node = self.t2.push_back(obj);
        table.insert(id, new_node);
    }

    fn trim_histories(&mut self) {
        while self.resident_len() + (self.b1.len() as u64) > self.c {
            let Some(obj) = self.b1.pop_back() else { break };
            self.b1_table.remove(&obj.id);
        }
        while self.resident_len() + self.ghost_len() > 2 * self.c {
            let Some(obj) = self.b2.pop_back() else { break };
            self.b2_table.remove(&obj.id);
        }
    }
}

impl EvictionPolicy for Car {
    type Config = CarConfig;

    fn new(capacity: u64, config: CarConfig) -> Self {
        let c = capacity.max(1);
        Self {
            t1: List::new(),
            t2: List::new(),
            b1: List::new(),
            b2: List::new(),
            b1_table: Table::default(),
            b2_table: Table::default(),
            p: (config.p.min(c)) as f64,
            c,
            pending: GhostHit::None,
        }
    }

    fn find(
        &mut self,
        table: &mut Table,
        id: ObjectId,
        update_cache: bool,
        _next_access_vtime: Option<i64>,
    ) -> bool {
        if let Some(&node) = table.get(&id) {
            if update_cache {
                let in_t1 = matches!(self.t1.get(node).meta, PolicyMeta::Car { in_t2: false, .. });
                let list = if in_t1 { &mut self.t1 } else { &mut self.t2 };
                if let PolicyMeta::Car { reference, .. } = &mut list.get_mut(node).meta {
                    *reference = true;
                }
            }
            return true;
        }

        if !update_cache {
            return false;
        }

        if let Some(&node) = self.b1_table.get(&id) {
            let b1_len = self.b1.len() as f64;
            let b2_len = self.b2.len() as f64;
            let delta = if b1_len > 0.0 { b2_len / b1_len } else { 1.0 };
            self.p = (self.p + delta.max(1.0)).min(self.c as f64);
            self.b1.remove(node);
            self.b1_table.remove(&id);
            self.pending = GhostHit::B1;
        } else if let Some(&node) = self.b2_table.get(&id) {
            let b1_len = self.b1.len() as f64;
            let b2_len = self.b2.len() as f64;
            let delta = if b2_len > 0.0 { b1_len / b2_len } else { 1.0 };
            self.p = (self.p - delta.max(1.0)).max(0.0);
            self.b2.remove(node);
            self.b2_table.remove(&id);
            self.pending = GhostHit::B2;
        }
        false
    }

    fn insert(&mut self, table: &mut Table, mut obj: CacheObject) {
        let pending = core::mem::take(&mut self.pending);
        let id = obj.id;
        match pending {
            GhostHit::B1 | GhostHit::B2 => {
                obj.meta = PolicyMeta::Car {
                    in_t2: true,
                    reference: false,
                };
                let node = self.t2.push_back(obj);
                table.insert(id, node);
            }
            GhostHit::None => {
                obj.meta = PolicyMeta::Car {
                    in_t2: false,
                    reference: false,
                };
                let node = self.t1.push_back(obj);
                table.insert(id, node);
            }
        }
        if matches!(pending, GhostHit::None) {
            self.trim_histories();
        }
    }

    fn evict(&mut self, table: &mut Table) -> Option<u64> {
        self.replace(table)
    }

    fn remove(&mut self, table: &mut Table, id: ObjectId) -> Option<u64> {
        if let Some(node) = table.remove(&id) {
            let in_t1 = matches!(self.t1.get(node).meta, PolicyMeta::Car { in_t2: false, .. });
            return Some(if in_t1 {
                self.t1.remove(node).size
            } else {
                self.t2.remove(node).size
            });
        }
        if let Some(node) = self.b1_table.remove(&id) {
            self.b1.remove(node);
        } else if let Some(node) = self.b2_table.remove(&id) {
            self.b2.remove(node);
        }
        None
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
    fn ghost_bounds_are_respected() {
        let mut cache = Cache::<Car>::new(2, 0, None);
        for id in 1..=20u64 {
            cache.get(&req(id, 1));
        }
        // the policy internals are private; the externally visible
        // invariant is that the cache never exceeds its byte capacity.
        assert!(cache.occupied_bytes() <= cache.capacity());
    }

    #[test]
    fn referenced_t1_page_is_promoted_instead_of_evicted() {
        let mut cache = Cache::<Car>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(1, 1)); // sets reference bit in T1
        cache.get(&req(2, 1));
        cache.get(&req(3, 1)); // forces a clock scan past 1
        assert!(cache.remove(1), "referenced page should survive one scan");
    }

    #[test]
    fn parity_with_plain_clock_when_p_is_zero_and_no_ghost_hits() {
        let mut cache = Cache::<Car>::new(2, 0, None);
        cache.get(&req(1, 1));
        cache.get(&req(2, 1));
        cache.get(&req(3, 1));
        assert!(cache.occupied_bytes() <= cache.capacity());
    }
}
