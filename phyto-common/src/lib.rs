//! # Phyto Common Library
//!
//! Shared code for the phyto tools:
//! - Error type used by configuration and file handling
//! - Layered configuration (TOML file, environment, CLI overrides)
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
