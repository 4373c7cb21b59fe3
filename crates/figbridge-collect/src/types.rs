//! Collector payload types: the JSON shape the local dev server reads.

use serde::{Deserialize, Serialize, Serializer};

/// Largest integer an f64 holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Write a number the way `JSON.stringify` does: whole values without a
/// fractional part, so `100.0` goes out as `100`.
pub fn serialize_js_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Result of a host property read that may degrade to a sentinel.
///
/// Serialises as the bare value or the bare sentinel. `Fallback` is listed
/// first so a sentinel string deserialises back into a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SafeRead<T, S> {
    Fallback(S),
    Ok(T),
}

impl<T, S> SafeRead<T, S> {
    pub fn ok(self) -> Option<T> {
        match self {
            SafeRead::Ok(value) => Some(value),
            SafeRead::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SafeRead::Fallback(_))
    }
}

/// Font sentinels used when no single concrete font can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FontSentinel {
    /// Several fonts across the text run.
    Mixed,
    /// Read failed or the value had an unsupported shape.
    Unknown,
}

/// `"<family> <style>"`, `"MIXED"` or `"UNKNOWN"`.
pub type FontDescriptor = SafeRead<String, FontSentinel>;

/// Why a text entry carries no fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFill {
    Mixed,
    NotAList,
    Empty,
    NoSolidPaint,
    Unreadable,
}

/// Fixed `"SOLID"` discriminator on simplified colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidTag {
    #[default]
    #[serde(rename = "SOLID")]
    Solid,
}

/// Fixed `"FRAME"` discriminator on frame entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameTag {
    #[default]
    #[serde(rename = "FRAME")]
    Frame,
}

/// First solid paint of a node, channels normalized to 0..=1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidColor {
    #[serde(rename = "type")]
    pub kind: SolidTag,
    #[serde(serialize_with = "serialize_js_number")]
    pub r: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub g: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub b: f64,
    /// Paint opacity, 1 when the paint has none.
    #[serde(serialize_with = "serialize_js_number")]
    pub a: f64,
}

/// Axis-aligned bounds in absolute document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(serialize_with = "serialize_js_number")]
    pub x: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub y: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub width: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub id: String,
    pub name: String,
    pub characters: String,
    pub font_name: FontDescriptor,
    pub fills: Option<SolidColor>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    Instance,
    Component,
    ComponentSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    pub id: String,
    pub name: String,
    pub node_type: ComponentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    pub name: String,
    pub node_type: FrameTag,
    pub text_nodes: Vec<TextEntry>,
    pub components: Vec<ComponentRef>,
}

/// Full snapshot of the tagging frames on the current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Serialised as `null` when the host exposes no file key.
    pub file_key: Option<String>,
    pub file_name: String,
    pub page_id: String,
    pub page_name: String,
    pub frames: Vec<Frame>,
}

/// Counts-only frame used when the full payload is too large.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedFrame {
    pub id: String,
    pub name: String,
    pub node_type: FrameTag,
    pub text_count: usize,
    pub components_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedPayload {
    pub file_key: Option<String>,
    pub file_name: String,
    pub page_id: String,
    pub page_name: String,
    pub frames: Vec<ReducedFrame>,
}

impl From<&Payload> for ReducedPayload {
    fn from(payload: &Payload) -> Self {
        Self {
            file_key: payload.file_key.clone(),
            file_name: payload.file_name.clone(),
            page_id: payload.page_id.clone(),
            page_name: payload.page_name.clone(),
            frames: payload
                .frames
                .iter()
                .map(|f| ReducedFrame {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    node_type: FrameTag::Frame,
                    text_count: f.text_nodes.len(),
                    components_count: f.components.len(),
                })
                .collect(),
        }
    }
}

/// Either shape a launch URL can carry.
///
/// A payload without frames parses as `Full`; both shapes serialise to the
/// same JSON in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodedPayload {
    Full(Payload),
    Reduced(ReducedPayload),
}
