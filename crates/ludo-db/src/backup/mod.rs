//! Snapshot export and restore.
//!
//! Both operations derive their table order from the entity dependency graph
//! in `ludo-core`; neither hardcodes a table sequence.

pub mod export;
pub mod restore;
