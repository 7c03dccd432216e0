//! Convenient re-exports. `use simtelem_common::prelude::*;`

pub use crate::config::{ConfigError, ConfigLoader, EngineConfig, LogLevel, SharedConfig};
pub use crate::consts::*;
pub use crate::conv::{parse_f64, parse_i64};
pub use crate::error::{EngineError, EngineResult};
pub use crate::plate::PlateKey;
