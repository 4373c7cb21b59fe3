//! UI-side controller: mounts the embedded app iframe and relays messages
//! between it and the host.
//!
//! Messages for the app are held in a FIFO queue until the iframe fires
//! `load`, then drained in arrival order ahead of `FIGMA_UI_READY`. The
//! loaded flag and the queue share one lock and app posts happen under it,
//! so a send racing a drain cannot overtake queued messages.

use std::collections::VecDeque;

use figbridge_core::{BridgeConfig, Result};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::*;

/// Opaque identity of a browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Target origin used for host-bound posts.
pub const HOST_TARGET_ORIGIN: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeSpec {
    pub src: String,
    pub allow: String,
    pub border: String,
    pub width: String,
    pub height: String,
    pub background: String,
}

impl IframeSpec {
    /// Borderless full-viewport frame for the embedded app.
    pub fn for_app(app_url: &str) -> Self {
        Self {
            src: app_url.to_string(),
            allow: "clipboard-write".into(),
            border: "0".into(),
            width: "100%".into(),
            height: "100%".into(),
            background: "transparent".into(),
        }
    }
}

/// A `message` event received by the UI window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub data: Value,
    pub origin: String,
    pub source: Option<WindowId>,
}

/// Browser primitives of the UI surface.
pub trait UiSurface {
    fn mount_iframe(&self, iframe: &IframeSpec);
    /// Content window of the mounted iframe, if it has one.
    fn app_window(&self) -> Option<WindowId>;
    fn post_to_app(&self, message: &Envelope, target_origin: &str);
    fn post_to_host(&self, message: &PluginMessage, target_origin: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Host message delivered or queued for the app.
    ToApp,
    /// App message forwarded to the host.
    ToHost,
    Malformed,
    ForeignOrigin,
    ForeignWindow,
}

#[derive(Debug)]
struct PendingMessage {
    message: Envelope,
    target_origin: String,
}

#[derive(Debug, Default)]
struct UiState {
    loaded: bool,
    pending: VecDeque<PendingMessage>,
}

pub struct UiController<S: UiSurface> {
    surface: S,
    app_origin: String,
    max_pending: usize,
    state: Mutex<UiState>,
}

impl<S: UiSurface> UiController<S> {
    /// Mount the iframe and announce `FIGMA_UI_MOUNTED` to the host.
    ///
    /// The announcement goes out before the controller exists, so it
    /// precedes every queued or ready message.
    pub fn mount(surface: S, config: &BridgeConfig) -> Result<Self> {
        let app_origin = config.app_origin()?;
        surface.mount_iframe(&IframeSpec::for_app(&config.app_url));

        let controller = Self {
            surface,
            app_origin,
            max_pending: config.max_pending.max(1),
            state: Mutex::new(UiState::default()),
        };
        controller.send_to_host(
            BridgeMessage::UiMounted(Timestamped::now())
                .into_envelope()
                .with_source(Source::Figma),
        );
        info!("UI mounted, embedding {}", config.app_url);
        Ok(controller)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn app_origin(&self) -> &str {
        &self.app_origin
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    /// Deliver to the app now, or queue until the iframe has loaded.
    pub fn send_to_app(&self, message: Envelope) {
        let mut state = self.state.lock();
        self.deliver_or_queue(&mut state, message);
    }

    fn deliver_or_queue(&self, state: &mut UiState, message: Envelope) {
        if state.loaded && self.surface.app_window().is_some() {
            self.surface.post_to_app(&message, &self.app_origin);
            return;
        }

        if state.pending.len() >= self.max_pending {
            if let Some(dropped) = state.pending.pop_front() {
                warn!(
                    "Pending queue full ({}), dropping oldest {}",
                    self.max_pending, dropped.message.kind
                );
            }
        }
        state.pending.push_back(PendingMessage {
            message,
            target_origin: self.app_origin.clone(),
        });
    }

    fn send_to_host(&self, message: Envelope) {
        self.surface.post_to_host(
            &PluginMessage {
                plugin_message: message,
            },
            HOST_TARGET_ORIGIN,
        );
    }

    /// Iframe `load`: drain the queue, then announce `FIGMA_UI_READY`.
    pub fn on_iframe_load(&self) {
        let mut state = self.state.lock();
        state.loaded = true;

        if self.surface.app_window().is_some() {
            let drained = state.pending.len();
            while let Some(pending) = state.pending.pop_front() {
                self.surface
                    .post_to_app(&pending.message, &pending.target_origin);
            }
            debug!("Iframe loaded, flushed {} pending message(s)", drained);
        }

        let ready = BridgeMessage::UiReady(Timestamped::now())
            .into_envelope()
            .with_source(Source::Figma);
        self.deliver_or_queue(&mut state, ready);
    }

    /// Window `message` event: host messages go to the app, app messages
    /// go to the host once origin and window identity check out.
    pub fn on_window_message(&self, event: &WindowEvent) -> RelayOutcome {
        if let Some(wrapped) = event.data.get("pluginMessage").filter(|v| !v.is_null()) {
            return match Envelope::parse(wrapped) {
                Some(envelope) => {
                    self.send_to_app(envelope.with_source(Source::Figma));
                    RelayOutcome::ToApp
                }
                None => {
                    debug!("Dropping malformed host message");
                    RelayOutcome::Malformed
                }
            };
        }

        if event.origin != self.app_origin {
            warn!(
                "Rejected message from origin {} (expected {})",
                event.origin, self.app_origin
            );
            return RelayOutcome::ForeignOrigin;
        }

        let app_window = self.surface.app_window();
        if event.source.is_none() || event.source != app_window {
            warn!("Rejected message from a window other than the app iframe");
            return RelayOutcome::ForeignWindow;
        }

        match Envelope::parse(&event.data) {
            Some(envelope) => {
                self.send_to_host(envelope.with_source(Source::EmbeddedApp));
                RelayOutcome::ToHost
            }
            None => {
                debug!("Dropping malformed app message");
                RelayOutcome::Malformed
            }
        }
    }
}
