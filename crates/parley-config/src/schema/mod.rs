//! Configuration schema types for Parley.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults below.

mod ai;
mod system;

pub use ai::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for Parley.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParleyConfig {
    pub ai: AiConfig,
    pub logging: LoggingConfig,
}
