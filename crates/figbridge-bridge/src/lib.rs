//! Host/UI bridge: relays typed messages between the plugin host, its UI
//! surface, and the embedded web app loaded in an iframe.
//!
//! The host side ([`host::HostController`]) renders the UI and answers app
//! requests against the document. The UI side ([`ui::UiController`]) mounts
//! the iframe, buffers messages until it loads, and only accepts app
//! messages from the configured origin and the mounted frame's window.

pub mod host;
pub mod types;
pub mod ui;

pub use host::{HostApi, HostController, InboundOutcome, NodeId, UiOptions};
pub use types::*;
pub use ui::{IframeSpec, RelayOutcome, UiController, UiSurface, WindowEvent, WindowId};
