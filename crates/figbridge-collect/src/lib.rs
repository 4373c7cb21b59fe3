//! Tagging collector: walks the current page for tagging frames, flattens
//! their text and component descendants, and hands a Base64 JSON snapshot
//! to the local dev server.
//!
//! The host document is only reached through the [`host::DocumentContext`]
//! and [`host::PluginHost`] traits, so everything here runs against the
//! in-memory [`document::DocumentSnapshot`] as well as a live host.

pub mod document;
pub mod driver;
pub mod encode;
pub mod flatten;
pub mod host;
pub mod launch;
pub mod select;
pub mod snapshot;
pub mod types;

pub use document::{DocumentNode, DocumentSnapshot};
pub use driver::{run, RunOutcome, RunReport};
pub use encode::{decode_payload, encode_payload, EncodedPayload};
pub use host::{DocumentContext, HostError, NodeKind, PluginHost, SceneNode};
pub use launch::{build_launch_url, decode_launch_url, decode_payload_param};
pub use select::FrameSelector;
pub use snapshot::{collect_snapshot, SnapshotStats};
pub use types::*;
