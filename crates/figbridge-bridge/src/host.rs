//! Host-side controller: renders the UI surface and answers app requests.

use figbridge_core::{BridgeConfig, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::*;

/// Host node identifier.
pub type NodeId = String;

pub const MIN_SIDE: f64 = 10.0;
pub const DEFAULT_WIDTH: f64 = 120.0;
pub const DEFAULT_HEIGHT: f64 = 80.0;

pub const APP_CONNECTED: &str = "Embedded app connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiOptions {
    pub width: u32,
    pub height: u32,
    pub theme_colors: bool,
}

/// The plugin host API used by the bridge controller.
pub trait HostApi {
    fn show_ui(&self, options: &UiOptions);
    /// Post to the UI surface; the host wraps it under `pluginMessage`.
    fn post_to_ui(&self, message: &Envelope);
    fn notify(&self, message: &str);
    fn document_name(&self) -> String;

    fn create_rectangle(&self) -> Result<NodeId>;
    fn set_name(&self, node: &NodeId, name: &str) -> Result<()>;
    fn resize(&self, node: &NodeId, width: f64, height: f64) -> Result<()>;
    fn append_to_current_page(&self, node: &NodeId) -> Result<()>;
    fn set_selection(&self, nodes: &[NodeId]) -> Result<()>;
    fn scroll_and_zoom_into_view(&self, nodes: &[NodeId]) -> Result<()>;
    fn node_size(&self, node: &NodeId) -> Result<(f64, f64)>;
}

/// What the controller did with one inbound UI message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundOutcome {
    /// Not an object with a string `type`.
    Ignored,
    AppConnected,
    RectangleCreated(RectangleCreated),
    Unhandled { kind: String },
    Failed { kind: String, error: String },
}

/// `Number(value)` with the plugin runtime's coercion rules.
fn js_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Requested side length: default when absent, zero or not a finite
/// number, then clamped to [`MIN_SIDE`].
pub fn resolve_side(value: Option<&Value>, default: f64) -> f64 {
    let n = value.map(js_number).unwrap_or(f64::NAN);
    let n = if n == 0.0 || !n.is_finite() { default } else { n };
    n.max(MIN_SIDE)
}

pub struct HostController<H: HostApi> {
    host: H,
    config: BridgeConfig,
    app_origin: String,
}

impl<H: HostApi> HostController<H> {
    pub fn new(host: H, config: BridgeConfig) -> Result<Self> {
        let app_origin = config.app_origin()?;
        Ok(Self {
            host,
            config,
            app_origin,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Show the UI surface and announce the plugin to it.
    pub fn start(&self) {
        self.host.show_ui(&UiOptions {
            width: self.config.ui_width,
            height: self.config.ui_height,
            theme_colors: self.config.theme_colors,
        });

        let ready = BridgeMessage::PluginReady(PluginReady {
            document_name: self.host.document_name(),
            app_origin: self.app_origin.clone(),
            timestamp: Timestamped::now().timestamp,
        });
        self.host.post_to_ui(&ready.into_envelope());
        info!("Plugin UI shown, app origin {}", self.app_origin);
    }

    /// Handle one message posted by the UI surface.
    pub fn handle_ui_message(&self, data: &Value) -> InboundOutcome {
        let Some(envelope) = Envelope::parse(data) else {
            debug!("Ignoring malformed UI message");
            return InboundOutcome::Ignored;
        };

        match BridgeMessage::from_envelope(&envelope) {
            BridgeMessage::AppReady(_) => {
                self.host.notify(APP_CONNECTED);
                InboundOutcome::AppConnected
            }
            BridgeMessage::CreateRectangle(request) => match self.create_rectangle(&request) {
                Ok(created) => InboundOutcome::RectangleCreated(created),
                Err(e) => {
                    warn!("Rectangle creation failed: {}", e);
                    InboundOutcome::Failed {
                        kind: envelope.kind,
                        error: e.to_string(),
                    }
                }
            },
            other => {
                info!(
                    "Unhandled message from UI: type={} payload={:?}",
                    other.kind(),
                    envelope.payload
                );
                InboundOutcome::Unhandled {
                    kind: envelope.kind,
                }
            }
        }
    }

    fn create_rectangle(&self, request: &CreateRectangle) -> Result<RectangleCreated> {
        let width = resolve_side(request.width.as_ref(), DEFAULT_WIDTH);
        let height = resolve_side(request.height.as_ref(), DEFAULT_HEIGHT);

        let node = self.host.create_rectangle()?;
        self.host.set_name(&node, &self.config.rectangle_name)?;
        self.host.resize(&node, width, height)?;
        self.host.append_to_current_page(&node)?;
        let selection = [node.clone()];
        self.host.set_selection(&selection)?;
        self.host.scroll_and_zoom_into_view(&selection)?;

        let (width, height) = self.host.node_size(&node)?;
        let created = RectangleCreated {
            id: node,
            width,
            height,
        };
        self.host
            .post_to_ui(&BridgeMessage::RectangleCreated(created.clone()).into_envelope());
        info!(
            "Created rectangle {} ({}x{})",
            created.id, created.width, created.height
        );
        Ok(created)
    }
}
