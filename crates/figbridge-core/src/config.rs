//! Configuration for both plugins, with environment overrides.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Payload JSON length above which the collector sends the reduced projection.
pub const DEFAULT_PAYLOAD_LIMIT: usize = 150_000;

/// Local dev server that receives the collector payload.
pub const DEFAULT_LAUNCH_URL: &str = "http://localhost:5173/";

/// Frame-name token marking a tagging frame.
pub const DEFAULT_TAG_TOKEN: &str = "tagueamento";

/// Embedded app loaded inside the bridge iframe.
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Name given to rectangles created on request of the embedded app.
pub const DEFAULT_RECTANGLE_NAME: &str = "Created by spec-to-sql-v001";

/// Collector/exporter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Case-insensitive substring a frame name must contain.
    pub tag_token: String,
    /// Maximum JSON length (UTF-16 code units) sent in full.
    pub payload_limit: usize,
    /// Base URL the payload fragment is appended to.
    pub launch_url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tag_token: DEFAULT_TAG_TOKEN.into(),
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
            launch_url: DEFAULT_LAUNCH_URL.into(),
        }
    }
}

/// Host/UI bridge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    pub app_url: String,
    pub ui_width: u32,
    pub ui_height: u32,
    pub theme_colors: bool,
    pub rectangle_name: String,
    /// Upper bound on messages held for the iframe before it loads.
    pub max_pending: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.into(),
            ui_width: 480,
            ui_height: 640,
            theme_colors: true,
            rectangle_name: DEFAULT_RECTANGLE_NAME.into(),
            max_pending: 256,
        }
    }
}

impl BridgeConfig {
    /// Origin of the embedded app (`scheme://host[:port]`).
    ///
    /// Used both as the `postMessage` target origin and as the only origin
    /// accepted for inbound app messages.
    pub fn app_origin(&self) -> Result<String> {
        let url = url::Url::parse(&self.app_url)
            .map_err(|e| Error::Config(format!("invalid app url {:?}: {}", self.app_url, e)))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(Error::Config(format!(
                "app url {:?} has an opaque origin",
                self.app_url
            )));
        }
        Ok(origin.ascii_serialization())
    }
}

/// Top-level figbridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigBridgeConfig {
    pub collector: CollectorConfig,
    pub bridge: BridgeConfig,
}

impl FigBridgeConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(token) = lookup("FIGBRIDGE_TAG_TOKEN") {
            if token.trim().is_empty() {
                return Err(Error::Config("FIGBRIDGE_TAG_TOKEN is empty".into()));
            }
            config.collector.tag_token = token;
        }
        if let Some(limit) = lookup("FIGBRIDGE_PAYLOAD_LIMIT") {
            config.collector.payload_limit = parse_number("FIGBRIDGE_PAYLOAD_LIMIT", &limit)?;
        }
        if let Some(launch_url) = lookup("FIGBRIDGE_LAUNCH_URL") {
            url::Url::parse(&launch_url)
                .map_err(|e| Error::Config(format!("FIGBRIDGE_LAUNCH_URL: {}", e)))?;
            config.collector.launch_url = launch_url;
        }
        if let Some(app_url) = lookup("FIGBRIDGE_APP_URL") {
            config.bridge.app_url = app_url;
            config.bridge.app_origin()?;
        }
        if let Some(max_pending) = lookup("FIGBRIDGE_MAX_PENDING") {
            config.bridge.max_pending = parse_number("FIGBRIDGE_MAX_PENDING", &max_pending)?;
        }

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}
