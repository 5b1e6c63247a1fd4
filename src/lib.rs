//! Core engine for a trace-driven cache simulator.
//!
//! This crate replays a stream of object-access [`Request`]s against a
//! pluggable [`Cache`], enforcing a byte-size budget with a chosen
//! [`EvictionPolicy`], and reports miss-ratio / miss-byte statistics. It is
//! deliberately narrow: it does not read traces off disk, parse CLI
//! arguments, or format output. Those concerns live one layer up, in a
//! caller (see `cachesim-driver` in this workspace for a minimal one).
//!
//! # Layers
//!
//! - [`object`] / [`list`]: the per-object record and the intrusive
//!   doubly-linked list primitives every list-based policy shares.
//! - [`cache`]: the policy-agnostic handle and the [`EvictionPolicy`] trait
//!   six-operation interface, plus the default [`Cache::get`].
//! - [`policy`]: concrete eviction policies — LRU, FIFO, CLOCK, Random, LFU,
//!   SLRU, ARC, CAR, and Belady (oracle).
//! - [`admission`]: the admission layer sitting between lookup and insert,
//!   with AdaptSize as its non-trivial implementation.
//! - [`driver`]: the request-replay loop and interval statistics.
//!
//! # Example
//!
//! ```
//! use cachesim_core::{Cache, Request, Operation};
//! use cachesim_core::policy::Lru;
//!
//! let mut cache = Cache::<Lru>::new(1024, 0, None);
//! let req = Request::new(0, 1, 100, Operation::Get);
//! assert!(cache.get(&req).is_miss());
//! assert!(cache.get(&req).is_hit());
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod admission;
pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub(crate) mod list;
pub(crate) mod mathshim;
pub mod object;
pub mod policy;
pub mod request;

pub use cache::{Cache, EvictionPolicy, Outcome};
pub use config::{create, AnyCache, CacheParams};
pub use driver::{Driver, DriverMetrics, IntervalStats, SnapshotKind};
pub use error::CacheError;
pub use object::{CacheObject, ObjectId, PolicyMeta};
pub use request::{Operation, Request};
