//! Bridge message types: the wire envelope and its typed view.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const APP_READY: &str = "APP_READY";
pub const CREATE_RECTANGLE: &str = "CREATE_RECTANGLE";
pub const FIGMA_PLUGIN_READY: &str = "FIGMA_PLUGIN_READY";
pub const FIGMA_RECTANGLE_CREATED: &str = "FIGMA_RECTANGLE_CREATED";
pub const FIGMA_UI_READY: &str = "FIGMA_UI_READY";
pub const FIGMA_UI_MOUNTED: &str = "FIGMA_UI_MOUNTED";

/// Which side of the bridge a relayed message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Figma,
    EmbeddedApp,
}

/// `{ type, payload?, source? }` as it crosses a window boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
            source: None,
        }
    }

    /// Read an envelope out of untyped message data.
    ///
    /// `None` unless `data` is an object with a string `type`. An
    /// unrecognised `source` is dropped rather than failing the message.
    pub fn parse(data: &Value) -> Option<Self> {
        let kind = data.get("type")?.as_str()?.to_string();
        Some(Self {
            kind,
            payload: data.get("payload").cloned(),
            source: data
                .get("source")
                .and_then(|s| serde_json::from_value(s.clone()).ok()),
        })
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Host wrapper: messages between the host and its UI travel under
/// `pluginMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMessage {
    pub plugin_message: Envelope,
}

impl PluginMessage {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginReady {
    pub document_name: String,
    pub app_origin: String,
    pub timestamp: i64,
}

/// Raw requested size; coerced by the host controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRectangle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleCreated {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamped {
    pub timestamp: i64,
}

impl Timestamped {
    pub fn now() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Typed view over the known message kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    AppReady(Option<Value>),
    CreateRectangle(CreateRectangle),
    PluginReady(PluginReady),
    RectangleCreated(RectangleCreated),
    UiReady(Timestamped),
    UiMounted(Timestamped),
    /// Any other kind, or a known kind whose payload does not fit its shape.
    Unknown { kind: String, payload: Option<Value> },
}

fn payload_as<T: DeserializeOwned>(payload: &Option<Value>) -> Option<T> {
    payload
        .as_ref()
        .and_then(|p| serde_json::from_value(p.clone()).ok())
}

impl BridgeMessage {
    pub fn kind(&self) -> &str {
        match self {
            BridgeMessage::AppReady(_) => APP_READY,
            BridgeMessage::CreateRectangle(_) => CREATE_RECTANGLE,
            BridgeMessage::PluginReady(_) => FIGMA_PLUGIN_READY,
            BridgeMessage::RectangleCreated(_) => FIGMA_RECTANGLE_CREATED,
            BridgeMessage::UiReady(_) => FIGMA_UI_READY,
            BridgeMessage::UiMounted(_) => FIGMA_UI_MOUNTED,
            BridgeMessage::Unknown { kind, .. } => kind,
        }
    }

    pub fn from_envelope(envelope: &Envelope) -> Self {
        let payload = &envelope.payload;
        let typed = match envelope.kind.as_str() {
            APP_READY => Some(BridgeMessage::AppReady(payload.clone())),
            CREATE_RECTANGLE => Some(BridgeMessage::CreateRectangle(CreateRectangle {
                width: payload.as_ref().and_then(|p| p.get("width")).cloned(),
                height: payload.as_ref().and_then(|p| p.get("height")).cloned(),
            })),
            FIGMA_PLUGIN_READY => payload_as(payload).map(BridgeMessage::PluginReady),
            FIGMA_RECTANGLE_CREATED => payload_as(payload).map(BridgeMessage::RectangleCreated),
            FIGMA_UI_READY => payload_as(payload).map(BridgeMessage::UiReady),
            FIGMA_UI_MOUNTED => payload_as(payload).map(BridgeMessage::UiMounted),
            _ => None,
        };
        typed.unwrap_or_else(|| BridgeMessage::Unknown {
            kind: envelope.kind.clone(),
            payload: payload.clone(),
        })
    }

    pub fn into_envelope(self) -> Envelope {
        let kind = self.kind().to_string();
        let payload = match self {
            BridgeMessage::AppReady(payload) => payload,
            BridgeMessage::CreateRectangle(p) => serde_json::to_value(p).ok(),
            BridgeMessage::PluginReady(p) => serde_json::to_value(p).ok(),
            BridgeMessage::RectangleCreated(p) => serde_json::to_value(p).ok(),
            BridgeMessage::UiReady(p) | BridgeMessage::UiMounted(p) => serde_json::to_value(p).ok(),
            BridgeMessage::Unknown { payload, .. } => payload,
        };
        Envelope::new(kind, payload)
    }
}
