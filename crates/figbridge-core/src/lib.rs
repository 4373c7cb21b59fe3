//! figbridge core: error type and configuration shared by the tagging
//! collector and the host/UI bridge.

pub mod config;
pub mod error;

pub use config::{BridgeConfig, CollectorConfig, FigBridgeConfig};
pub use error::{Error, Result};
