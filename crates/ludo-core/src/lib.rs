//! # ludo-core
//!
//! Core types shared across the Ludo storefront crates.
//!
//! This crate provides:
//! - `EntityKind`, the ten managed record kinds and their wire names
//! - The entity dependency graph with deterministic insertion/deletion orders
//! - The snapshot document exchanged by backup and restore, plus its shape validation
//! - Authenticated identity, audit entry, and response types
//! - Cross-cutting error types

pub mod audit;
pub mod entity;
pub mod errors;
pub mod graph;
pub mod identity;
pub mod responses;
pub mod snapshot;
