//! Shared types, conversions, configuration, and error taxonomy for the
//! simulation telemetry engine.
//!
//! # Module Structure
//!
//! - [`plate`] - the fixed-width vehicle plate identifier
//! - [`conv`] - byte-indexed numeric parsers for the CSV wire format
//! - [`config`] - TOML configuration loading traits and types
//! - [`consts`] - workspace-wide constants
//! - [`error`] - the top-level error taxonomy
//! - [`prelude`] - common re-exports for convenience

pub mod config;
pub mod consts;
pub mod conv;
pub mod error;
pub mod plate;
pub mod prelude;

pub use error::{EngineError, EngineResult};
pub use plate::PlateKey;
