//! notion-scholar - keep a bibtex bibliography and a Notion database in sync
//!
//! The core of the crate is the configuration resolution (command-line
//! overrides merged over the saved config) and the mode dispatcher that
//! validates each invocation before running exactly one action.

pub mod bibtex;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod manager;
pub mod notion;
pub mod publication;
pub mod token;
pub mod utils;

pub use config::Config;
pub use dispatch::{Action, Mode};
pub use manager::{ConfigManager, Overrides, ResolvedConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
