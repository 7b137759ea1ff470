//! `securecheck` - analytics over a database of police traffic stops
//!
//! This library loads stop records from SQLite, computes headline metrics and
//! distributions, runs a fixed catalog of analytical queries and renders the
//! results as terminal tables and charts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod access;
pub mod catalog;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod metrics;
pub mod record;
pub mod session;
pub mod shell;
pub mod storage;
pub mod views;

#[cfg(test)]
mod testing;

pub use access::{CachedExecutor, QueryExecutor, QueryResult, Value};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Dataset, StopRecord};
pub use session::Session;
pub use storage::{Database, StorageStats};
