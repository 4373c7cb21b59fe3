//! JSON document snapshot: an in-memory host document.
//!
//! Lets the collector run outside the design tool: the CLI loads a
//! snapshot from disk and the tests build one inline. `fontName` and
//! `fills` keep their raw JSON so the host quirks can be expressed:
//! the string `"MIXED"` stands for the mixed sentinel and an object with
//! an `error` key stands for a read that throws.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{DocumentContext, FillsValue, FontValue, HostError, NodeKind, Paint, SceneNode};

/// Raw value standing for the host's "mixed" sentinel.
pub const MIXED_SENTINEL: &str = "MIXED";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_transform: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub characters: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Value>,
}

fn read_error(value: &Value) -> Option<HostError> {
    value.get("error").map(|e| {
        HostError(e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
    })
}

impl SceneNode for DocumentNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn absolute_transform(&self) -> Option<&[Vec<f64>]> {
        self.absolute_transform.as_deref()
    }

    fn x(&self) -> Option<f64> {
        self.x
    }

    fn y(&self) -> Option<f64> {
        self.y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn characters(&self) -> &str {
        &self.characters
    }

    fn font_name(&self) -> Result<FontValue, HostError> {
        let Some(raw) = &self.font_name else {
            return Ok(FontValue::Unsupported);
        };
        if let Some(err) = read_error(raw) {
            return Err(err);
        }
        if raw.as_str() == Some(MIXED_SENTINEL) {
            return Ok(FontValue::Mixed);
        }
        let family = raw.get("family").and_then(Value::as_str);
        let style = raw.get("style").and_then(Value::as_str);
        match (family, style) {
            (Some(family), Some(style)) => Ok(FontValue::Named {
                family: family.to_string(),
                style: style.to_string(),
            }),
            _ => Ok(FontValue::Unsupported),
        }
    }

    fn fills(&self) -> Result<FillsValue, HostError> {
        let Some(raw) = &self.fills else {
            return Ok(FillsValue::NotAList);
        };
        if let Some(err) = read_error(raw) {
            return Err(err);
        }
        match raw {
            Value::String(s) if s == MIXED_SENTINEL => Ok(FillsValue::Mixed),
            Value::Array(items) => Ok(FillsValue::Paints(
                items
                    .iter()
                    .map(|item| serde_json::from_value::<Paint>(item.clone()).unwrap_or_default())
                    .collect(),
            )),
            _ => Ok(FillsValue::NotAList),
        }
    }
}

/// Root of a document snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub file_key: Option<String>,
    pub name: String,
    /// Id of the current page; the first page when absent.
    #[serde(default)]
    pub current_page: Option<String>,
    #[serde(default)]
    pub pages: Vec<DocumentNode>,
}

impl DocumentSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> figbridge_core::Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl DocumentContext for DocumentSnapshot {
    type Node = DocumentNode;

    fn file_key(&self) -> Option<String> {
        self.file_key.clone()
    }

    fn root_name(&self) -> String {
        self.name.clone()
    }

    fn current_page(&self) -> Result<&DocumentNode, HostError> {
        match &self.current_page {
            Some(id) => self
                .pages
                .iter()
                .find(|p| &p.id == id)
                .ok_or_else(|| HostError(format!("current page {} not found", id))),
            None => self
                .pages
                .first()
                .ok_or_else(|| HostError("document has no pages".into())),
        }
    }
}
