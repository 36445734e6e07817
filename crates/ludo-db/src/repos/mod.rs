//! Repository modules for tables outside the snapshot's managed set.
//!
//! Each module adds methods to `StoreService` via `impl StoreService` blocks.

pub mod audit;
