//! In-process bridge session.
//!
//! Wires a [`HostController`] and a [`UiController`] over channels and
//! runs a scripted embedded app as its own task: the app answers
//! `FIGMA_UI_READY` with `APP_READY` and one `CREATE_RECTANGLE`. A spoofed
//! message from a foreign origin is injected after the iframe loads. Every
//! post across a window boundary is recorded as a [`Hop`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use figbridge_bridge::*;
use figbridge_core::{BridgeConfig, Error, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Quiet period after which the session is considered settled.
const IDLE: Duration = Duration::from_millis(200);

const APP_WINDOW: WindowId = WindowId(1);

/// Origin the UI window sees on messages from the host.
const HOST_ORIGIN: &str = "null";

pub const SPOOFED_ORIGIN: &str = "http://evil.example";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    HostToUi,
    UiToHost,
    UiToApp,
    AppToUi,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Route::HostToUi => "host -> ui",
            Route::UiToHost => "ui -> host",
            Route::UiToApp => "ui -> app",
            Route::AppToUi => "app -> ui",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub route: Route,
    pub kind: String,
    pub source: Option<Source>,
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(source) => write!(f, "{:<10} {} ({:?})", self.route, self.kind, source),
            None => write!(f, "{:<10} {}", self.route, self.kind),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub hops: Vec<Hop>,
    pub notifications: Vec<String>,
    pub rectangles: Vec<RectangleCreated>,
    /// Nodes appended to the current page.
    pub page_nodes: Vec<NodeId>,
    pub rejected: Vec<RelayOutcome>,
    pub unhandled: Vec<String>,
}

type Trace = Arc<Mutex<Vec<Hop>>>;

fn record(trace: &Trace, route: Route, envelope: &Envelope) {
    trace.lock().push(Hop {
        route,
        kind: envelope.kind.clone(),
        source: envelope.source,
    });
}

enum Delivery {
    /// Host post, as the UI window receives it.
    ToUi(Value),
    /// UI post, as the host message handler receives it.
    ToHost(Value),
    IframeLoaded,
    FromApp(WindowEvent),
}

struct ChannelHost {
    events: UnboundedSender<Delivery>,
    trace: Trace,
    document_name: String,
    notes: Mutex<Vec<String>>,
    nodes: Mutex<HashMap<NodeId, (f64, f64)>>,
    page: Mutex<Vec<NodeId>>,
}

impl ChannelHost {
    fn node_exists(&self, node: &NodeId) -> Result<()> {
        if self.nodes.lock().contains_key(node) {
            Ok(())
        } else {
            Err(Error::Host(format!("node {} does not exist", node)))
        }
    }
}

impl HostApi for ChannelHost {
    fn show_ui(&self, options: &UiOptions) {
        debug!("show_ui {}x{}", options.width, options.height);
    }

    fn post_to_ui(&self, message: &Envelope) {
        record(&self.trace, Route::HostToUi, message);
        let wrapped = PluginMessage {
            plugin_message: message.clone(),
        };
        let _ = self.events.send(Delivery::ToUi(wrapped.to_value()));
    }

    fn notify(&self, message: &str) {
        info!("notify: {}", message);
        self.notes.lock().push(message.to_string());
    }

    fn document_name(&self) -> String {
        self.document_name.clone()
    }

    fn create_rectangle(&self) -> Result<NodeId> {
        let mut nodes = self.nodes.lock();
        let id = format!("1:{}", nodes.len() + 1);
        nodes.insert(id.clone(), (100.0, 100.0));
        Ok(id)
    }

    fn set_name(&self, node: &NodeId, name: &str) -> Result<()> {
        self.node_exists(node)?;
        debug!("{} named {:?}", node, name);
        Ok(())
    }

    fn resize(&self, node: &NodeId, width: f64, height: f64) -> Result<()> {
        let mut nodes = self.nodes.lock();
        let size = nodes
            .get_mut(node)
            .ok_or_else(|| Error::Host(format!("node {} does not exist", node)))?;
        *size = (width, height);
        Ok(())
    }

    fn append_to_current_page(&self, node: &NodeId) -> Result<()> {
        self.node_exists(node)?;
        self.page.lock().push(node.clone());
        Ok(())
    }

    fn set_selection(&self, nodes: &[NodeId]) -> Result<()> {
        debug!("selection -> {:?}", nodes);
        Ok(())
    }

    fn scroll_and_zoom_into_view(&self, nodes: &[NodeId]) -> Result<()> {
        debug!("viewport -> {:?}", nodes);
        Ok(())
    }

    fn node_size(&self, node: &NodeId) -> Result<(f64, f64)> {
        self.nodes
            .lock()
            .get(node)
            .copied()
            .ok_or_else(|| Error::Host(format!("node {} does not exist", node)))
    }
}

struct ChannelSurface {
    events: UnboundedSender<Delivery>,
    app: UnboundedSender<Envelope>,
    window: Mutex<Option<WindowId>>,
    trace: Trace,
}

impl UiSurface for ChannelSurface {
    fn mount_iframe(&self, iframe: &IframeSpec) {
        debug!("iframe src={} allow={}", iframe.src, iframe.allow);
    }

    fn app_window(&self) -> Option<WindowId> {
        *self.window.lock()
    }

    fn post_to_app(&self, message: &Envelope, _target_origin: &str) {
        record(&self.trace, Route::UiToApp, message);
        let _ = self.app.send(message.clone());
    }

    fn post_to_host(&self, message: &PluginMessage, _target_origin: &str) {
        record(&self.trace, Route::UiToHost, &message.plugin_message);
        let _ = self
            .events
            .send(Delivery::ToHost(message.plugin_message.to_value()));
    }
}

/// Scripted embedded app: requests a rectangle once the UI is ready.
async fn embedded_app(
    mut inbox: UnboundedReceiver<Envelope>,
    events: UnboundedSender<Delivery>,
    origin: String,
    trace: Trace,
) {
    while let Some(message) = inbox.recv().await {
        if message.kind != FIGMA_UI_READY {
            continue;
        }
        let replies = [
            Envelope::new(APP_READY, None),
            Envelope::new(CREATE_RECTANGLE, Some(json!({ "width": 5, "height": 1000 }))),
        ];
        for reply in replies {
            record(&trace, Route::AppToUi, &reply);
            let _ = events.send(Delivery::FromApp(WindowEvent {
                data: reply.to_value(),
                origin: origin.clone(),
                source: Some(APP_WINDOW),
            }));
        }
    }
}

/// Run one bridge session to quiescence and report what crossed the bridge.
pub async fn run_session(config: &BridgeConfig, document_name: &str) -> Result<SessionReport> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (app_tx, app_rx) = mpsc::unbounded_channel();
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));

    let controller = HostController::new(
        ChannelHost {
            events: events_tx.clone(),
            trace: trace.clone(),
            document_name: document_name.to_string(),
            notes: Mutex::new(Vec::new()),
            nodes: Mutex::new(HashMap::new()),
            page: Mutex::new(Vec::new()),
        },
        config.clone(),
    )?;
    controller.start();

    let ui = UiController::mount(
        ChannelSurface {
            events: events_tx.clone(),
            app: app_tx,
            window: Mutex::new(None),
            trace: trace.clone(),
        },
        config,
    )?;

    let app = tokio::spawn(embedded_app(
        app_rx,
        events_tx.clone(),
        ui.app_origin().to_string(),
        trace.clone(),
    ));

    let _ = events_tx.send(Delivery::IframeLoaded);
    let _ = events_tx.send(Delivery::FromApp(WindowEvent {
        data: json!({ "type": CREATE_RECTANGLE, "payload": { "width": 999 } }),
        origin: SPOOFED_ORIGIN.into(),
        source: Some(APP_WINDOW),
    }));
    drop(events_tx);

    let mut report = SessionReport::default();
    while let Ok(Some(delivery)) = tokio::time::timeout(IDLE, events_rx.recv()).await {
        match delivery {
            Delivery::ToUi(data) => {
                ui.on_window_message(&WindowEvent {
                    data,
                    origin: HOST_ORIGIN.into(),
                    source: None,
                });
            }
            Delivery::ToHost(data) => match controller.handle_ui_message(&data) {
                InboundOutcome::RectangleCreated(created) => report.rectangles.push(created),
                InboundOutcome::Unhandled { kind } => report.unhandled.push(kind),
                _ => {}
            },
            Delivery::IframeLoaded => {
                *ui.surface().window.lock() = Some(APP_WINDOW);
                ui.on_iframe_load();
            }
            Delivery::FromApp(event) => match ui.on_window_message(&event) {
                RelayOutcome::ToApp | RelayOutcome::ToHost => {}
                rejected => report.rejected.push(rejected),
            },
        }
    }

    report.notifications = controller.host().notes.lock().clone();
    report.page_nodes = controller.host().page.lock().clone();
    drop(ui);
    drop(controller);
    app.await
        .map_err(|e| Error::Internal(format!("embedded app task failed: {}", e)))?;

    report.hops = trace.lock().clone();
    info!(
        "Bridge session settled: {} hop(s), {} rectangle(s), {} rejected",
        report.hops.len(),
        report.rectangles.len(),
        report.rejected.len()
    );
    Ok(report)
}
