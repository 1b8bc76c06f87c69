//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod hierarchy;
pub mod identity;
pub mod progress;
pub mod search;
pub mod workspace;

pub use config::Config;
pub use entity::Status;
pub use hierarchy::{collect_descendants, sort_okrs, HierarchyIndex};
pub use workspace::{Workspace, WorkspaceError};
