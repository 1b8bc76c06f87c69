//! CLI command implementations

pub mod actions;
pub mod checkin;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod new;
pub mod search;
pub mod show;
pub mod status;
pub mod watch;
