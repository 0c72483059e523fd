//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every option has a default, so an empty file yields an open, seedless crawl.
//!
//! # Example
//!
//! ```no_run
//! use search_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Revisit interval: {}s", config.logic.revisit_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DbConfig, LogicConfig, RestrictionsConfig, DEFAULT_ACCEPT_LANGUAGE};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
