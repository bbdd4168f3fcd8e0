//! Configuration loading and schema definitions
//!
//! Tool configuration lives in `aarpub.toml`.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
