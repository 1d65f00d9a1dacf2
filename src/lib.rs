//! # iocsync - IOC Feed Collector
//!
//! A small tool that collects IPv4 threat indicators from external feeds and
//! merges them into local, deduplicated flat-file stores.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        iocsync                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: sync, status, check, version               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Feeds: export (text) and blacklist (JSON)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── One authenticated GET per feed, no retries           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validator                                                  │
//! │    └── Strict IPv4 syntax, exclusion markers                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Store (flat files)                                         │
//! │    └── Load, set union, atomic sorted rewrite               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use iocsync::config::Config;
//! use iocsync::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default("iocsync.yaml")?;
//!
//!     for feed in config.select_feeds(None)? {
//!         let outcome = pipeline::run(feed, &config.data_dir, false).await?;
//!         println!(
//!             "{}: {} indicators total",
//!             outcome.feed, outcome.stats.total
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Deterministic stores** - values are written sorted; identical sets
//!   produce byte-identical files
//! - **No partial writes** - stores are staged and atomically renamed; a
//!   failed run leaves the previous file untouched
//! - **Fail fast** - missing credentials, transport failures and unexpected
//!   response shapes abort the run before any data is modified
//! - **Credential protection** - API keys come from environment variables
//!   and are zeroed in memory on drop
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Error taxonomy
//! - [`fetcher`] - HTTP client and feed payload parsing
//! - [`merge`] - Set union of stored and fetched indicators
//! - [`pipeline`] - The fetch/validate/merge/persist sequence
//! - [`state`] - Last-sync counters for the status command
//! - [`store`] - Flat-file indicator stores
//! - [`validation`] - IPv4 and window validation

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod pipeline;
pub mod state;
pub mod store;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
