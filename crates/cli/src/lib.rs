//! CLI utilities for the aarpub tools
//!
//! Provides shared CLI functionality:
//! - Terminal status lines and value formatting
//! - Spinners for long-running steps

#![warn(missing_docs)]

pub mod output;
pub mod progress;
