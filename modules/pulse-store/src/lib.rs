//! Redis-backed persistence for the Market Pulse system.
//!
//! Thin JSON-over-key-value plumbing. Retention is bounded per entity
//! (snapshots 10, analyses 50, reports 100) by trimming the per-competitor
//! index lists on write; superseded entries age out, they are not deleted
//! individually. The store is constructed once at process start and passed
//! by reference — there is no hidden connection singleton.

pub mod keys;
pub mod store;

pub use store::RedisStore;
