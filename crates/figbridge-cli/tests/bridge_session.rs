//! In-process bridge session: host controller, UI controller and a
//! scripted embedded app talking over channels.

use figbridge_bridge::*;
use figbridge_cli::{run_session, Route};
use figbridge_core::BridgeConfig;

fn kinds(report: &figbridge_cli::SessionReport, route: Route) -> Vec<String> {
    report
        .hops
        .iter()
        .filter(|h| h.route == route)
        .map(|h| h.kind.clone())
        .collect()
}

#[tokio::test]
async fn test_session_handshake_order() {
    let report = run_session(&BridgeConfig::default(), "Landing page").await.unwrap();

    assert!(report.hops.len() >= 2);
    assert_eq!(report.hops[0].route, Route::HostToUi);
    assert_eq!(report.hops[0].kind, FIGMA_PLUGIN_READY);
    assert_eq!(report.hops[1].route, Route::UiToHost);
    assert_eq!(report.hops[1].kind, FIGMA_UI_MOUNTED);

    let to_app = kinds(&report, Route::UiToApp);
    let plugin_ready = to_app.iter().position(|k| k == FIGMA_PLUGIN_READY);
    let ui_ready = to_app.iter().position(|k| k == FIGMA_UI_READY);
    assert_eq!(plugin_ready, Some(0));
    assert_eq!(ui_ready, Some(1));

    assert!(report
        .hops
        .iter()
        .filter(|h| h.route == Route::UiToApp)
        .all(|h| h.source == Some(Source::Figma)));
    assert_eq!(report.unhandled, vec![FIGMA_UI_MOUNTED.to_string()]);
}

#[tokio::test]
async fn test_session_creates_clamped_rectangle() {
    let report = run_session(&BridgeConfig::default(), "Landing page").await.unwrap();

    assert_eq!(report.rectangles.len(), 1);
    let created = &report.rectangles[0];
    assert_eq!((created.width, created.height), (10.0, 1000.0));
    assert_eq!(report.page_nodes, vec![created.id.clone()]);
    assert!(report.notifications.contains(&host::APP_CONNECTED.to_string()));

    let to_app = kinds(&report, Route::UiToApp);
    assert_eq!(to_app.last().map(String::as_str), Some(FIGMA_RECTANGLE_CREATED));

    let relayed: Vec<_> = report
        .hops
        .iter()
        .filter(|h| h.route == Route::UiToHost && h.kind != FIGMA_UI_MOUNTED)
        .collect();
    assert_eq!(relayed.len(), 2);
    assert!(relayed.iter().all(|h| h.source == Some(Source::EmbeddedApp)));
}

#[tokio::test]
async fn test_session_rejects_spoofed_origin() {
    let report = run_session(&BridgeConfig::default(), "Landing page").await.unwrap();

    assert_eq!(report.rejected, vec![RelayOutcome::ForeignOrigin]);
    let create_requests = kinds(&report, Route::UiToHost)
        .into_iter()
        .filter(|k| k == CREATE_RECTANGLE)
        .count();
    assert_eq!(create_requests, 1);
}

#[tokio::test]
async fn test_session_with_invalid_app_url_fails() {
    let config = BridgeConfig {
        app_url: "not a url".into(),
        ..Default::default()
    };
    assert!(run_session(&config, "Landing page").await.is_err());
}
