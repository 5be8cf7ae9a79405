//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod evaluate;
pub mod extract;
pub mod helpers;
pub mod history;
pub mod init;
pub mod serve;
