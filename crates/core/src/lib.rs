//! Core utilities for the aarpub publishing tools
//!
//! This crate provides shared functionality used by the publishing crates:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Properties files**: the `key=value` format shared by `.env` and `gradle.properties`
//! - **Configuration**: TOML-based `aarpub.toml` with defaults for every field
//! - **Process execution**: running the Gradle wrapper with captured output
//!
//! # Example
//!
//! ```rust,no_run
//! use aarpub_core::{config::Config, properties::Properties};
//!
//! let config = Config::load(None).expect("valid configuration");
//! let gradle = Properties::load(&config.properties_path()).expect("gradle.properties");
//! println!("publishing version {:?}", gradle.get("lib.version"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
#[allow(missing_docs)]
pub mod error;
pub mod process;
pub mod properties;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, SecretsProfile};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::properties::Properties;
}
