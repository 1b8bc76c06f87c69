//! OKR Sync: objectives and key results with local and shared storage
//!
//! A hierarchy of global and area OKRs, kept in a local key-value store or
//! in a shared SQLite database with automatic local fallback.

pub mod cli;
pub mod core;
pub mod entities;
pub mod store;
pub mod sync;
