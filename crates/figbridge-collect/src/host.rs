//! Host document seams: the read surface the collector needs from the
//! design tool, and the side effects it triggers on the plugin session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single property read that the host refused or could not answer.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct HostError(pub String);

impl From<HostError> for figbridge_core::Error {
    fn from(e: HostError) -> Self {
        figbridge_core::Error::Host(e.0)
    }
}

/// Node kinds the collector distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Page,
    Frame,
    Group,
    Text,
    Rectangle,
    Instance,
    Component,
    ComponentSet,
    #[default]
    #[serde(other)]
    Other,
}

/// Raw font value as the host reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum FontValue {
    Named { family: String, style: String },
    /// The host's "mixed" sentinel.
    Mixed,
    /// Anything without a family and a style.
    Unsupported,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// One entry of a node's paint list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paint {
    /// `SOLID`, `GRADIENT_LINEAR`, `IMAGE`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Raw fills value as the host reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum FillsValue {
    Mixed,
    NotAList,
    Paints(Vec<Paint>),
}

/// Read access to one node of the host document tree.
pub trait SceneNode: Sized {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn kind(&self) -> NodeKind;
    fn children(&self) -> &[Self];

    /// Rows of the absolute transform, `[[a, b, x], [c, d, y]]` when well formed.
    fn absolute_transform(&self) -> Option<&[Vec<f64>]>;
    fn x(&self) -> Option<f64>;
    fn y(&self) -> Option<f64>;
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Literal text content; empty for non-text nodes.
    fn characters(&self) -> &str;
    fn font_name(&self) -> Result<FontValue, HostError>;
    fn fills(&self) -> Result<FillsValue, HostError>;
}

/// Document-level globals the collector reads.
pub trait DocumentContext {
    type Node: SceneNode;

    fn file_key(&self) -> Option<String>;
    fn root_name(&self) -> String;
    fn current_page(&self) -> Result<&Self::Node, HostError>;
}

/// Plugin-session side effects of the collector.
#[allow(async_fn_in_trait)]
pub trait PluginHost {
    /// Show a transient user-facing message.
    fn notify(&self, message: &str);

    /// Ask the host to open `url` outside the editor.
    async fn open_external(&self, url: &str) -> figbridge_core::Result<()>;

    /// End the plugin session.
    fn close_plugin(&self);
}

/// All descendants of `root` (excluding `root`) matching `predicate`,
/// depth-first pre-order.
pub fn find_all<'a, N, P>(root: &'a N, predicate: P) -> Vec<&'a N>
where
    N: SceneNode,
    P: Fn(&N) -> bool,
{
    let mut found = Vec::new();
    walk(root, &predicate, &mut found);
    found
}

fn walk<'a, N, P>(node: &'a N, predicate: &P, found: &mut Vec<&'a N>)
where
    N: SceneNode,
    P: Fn(&N) -> bool,
{
    for child in node.children() {
        if predicate(child) {
            found.push(child);
        }
        walk(child, predicate, found);
    }
}
