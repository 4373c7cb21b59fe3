//! Top-level collector run: search, report, encode, launch, close.

use figbridge_core::CollectorConfig;
use tracing::{error, info};

use crate::encode::encode_payload;
use crate::host::{DocumentContext, PluginHost};
use crate::launch::launch;
use crate::select::FrameSelector;
use crate::snapshot::collect_snapshot;

pub const SEARCHING: &str = "Searching for tagging frames…";

/// What a successful run sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub frames: usize,
    pub texts: usize,
    pub reduced: bool,
    /// Length of the full payload JSON, whichever body was sent.
    pub full_len: usize,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Sent(RunReport),
    /// The message shown to the user after the `Error: ` prefix.
    Failed(String),
}

/// Closes the plugin session when dropped, whatever the exit path.
struct SessionGuard<'a, H: PluginHost> {
    host: &'a H,
}

impl<H: PluginHost> Drop for SessionGuard<'_, H> {
    fn drop(&mut self) {
        self.host.close_plugin();
    }
}

/// Run the collector once against `doc`. The session is closed on return.
pub async fn run<D, H>(doc: &D, host: &H, config: &CollectorConfig) -> RunOutcome
where
    D: DocumentContext,
    H: PluginHost,
{
    let _session = SessionGuard { host };

    match collect_and_send(doc, host, config).await {
        Ok(report) => {
            info!(
                "Sent {} payload for {} frame(s), full JSON {} chars",
                if report.reduced { "reduced" } else { "full" },
                report.frames,
                report.full_len
            );
            RunOutcome::Sent(report)
        }
        Err(e) => {
            let message = e.to_string();
            error!("Collector run failed: {}", message);
            host.notify(&format!("Error: {}", message));
            RunOutcome::Failed(message)
        }
    }
}

async fn collect_and_send<D, H>(
    doc: &D,
    host: &H,
    config: &CollectorConfig,
) -> figbridge_core::Result<RunReport>
where
    D: DocumentContext,
    H: PluginHost,
{
    host.notify(SEARCHING);

    let selector = FrameSelector::new(&config.tag_token)?;
    let payload = collect_snapshot(doc, &selector)?;
    let stats = payload.stats();
    host.notify(&format!(
        "Found {} tagging frame(s), {} text(s).",
        stats.frames, stats.texts
    ));

    let encoded = encode_payload(&payload, config.payload_limit)?;
    let url = launch(host, &config.launch_url, &encoded).await?;

    Ok(RunReport {
        frames: stats.frames,
        texts: stats.texts,
        reduced: encoded.reduced,
        full_len: encoded.full_len,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentSnapshot;
    use crate::launch::{decode_launch_url, SENT_FULL, SENT_REDUCED};
    use crate::types::DecodedPayload;
    use figbridge_core::Error;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingHost {
        notes: Mutex<Vec<String>>,
        opened: Mutex<Vec<String>>,
        closed: Mutex<usize>,
        fail_open: bool,
    }

    impl PluginHost for RecordingHost {
        fn notify(&self, message: &str) {
            self.notes.lock().push(message.to_string());
        }

        async fn open_external(&self, url: &str) -> figbridge_core::Result<()> {
            if self.fail_open {
                return Err(Error::Launch("blocked by host".into()));
            }
            self.opened.lock().push(url.to_string());
            Ok(())
        }

        fn close_plugin(&self) {
            *self.closed.lock() += 1;
        }
    }

    fn doc() -> DocumentSnapshot {
        serde_json::from_value(json!({
            "name": "Design",
            "pages": [{
                "id": "0:1", "name": "Page", "type": "PAGE",
                "children": [{ "id": "1:1", "name": "tagueamento", "type": "FRAME", "children": [
                    { "id": "1:2", "name": "t", "type": "TEXT", "characters": "Hi" }
                ]}]
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_run() {
        let host = RecordingHost::default();
        let outcome = run(&doc(), &host, &CollectorConfig::default()).await;

        let RunOutcome::Sent(report) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!((report.frames, report.texts, report.reduced), (1, 1, false));
        assert!(report.url.starts_with("http://localhost:5173/#payload="));
        assert_eq!(host.opened.lock().as_slice(), &[report.url.clone()]);
        assert!(matches!(decode_launch_url(&report.url).unwrap(), DecodedPayload::Full(_)));

        let notes = host.notes.lock().clone();
        assert_eq!(
            notes,
            vec![
                SEARCHING.to_string(),
                "Found 1 tagging frame(s), 1 text(s).".to_string(),
                SENT_FULL.to_string(),
            ]
        );
        assert_eq!(*host.closed.lock(), 1);
    }

    #[tokio::test]
    async fn test_reduced_run_notifies_summary() {
        let host = RecordingHost::default();
        let config = CollectorConfig {
            payload_limit: 16,
            ..Default::default()
        };
        let outcome = run(&doc(), &host, &config).await;
        assert!(matches!(outcome, RunOutcome::Sent(ref r) if r.reduced && r.full_len > 16));
        assert_eq!(host.notes.lock().last().map(String::as_str), Some(SENT_REDUCED));
    }

    #[tokio::test]
    async fn test_empty_document_still_completes() {
        let host = RecordingHost::default();
        let doc: DocumentSnapshot = serde_json::from_value(json!({
            "name": "Empty",
            "pages": [{ "id": "0:1", "name": "Page", "type": "PAGE" }]
        }))
        .unwrap();

        let outcome = run(&doc, &host, &CollectorConfig::default()).await;
        assert!(matches!(outcome, RunOutcome::Sent(ref r) if r.frames == 0));
        assert_eq!(*host.closed.lock(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_session_closed() {
        let host = RecordingHost {
            fail_open: true,
            ..Default::default()
        };
        let outcome = run(&doc(), &host, &CollectorConfig::default()).await;

        assert_eq!(
            outcome,
            RunOutcome::Failed("Launch error: blocked by host".into())
        );
        assert_eq!(
            host.notes.lock().last().map(String::as_str),
            Some("Error: Launch error: blocked by host")
        );
        assert_eq!(*host.closed.lock(), 1);
    }

    /// Panics on the count notification, after the search has run.
    #[derive(Default)]
    struct PanickingHost {
        closed: Mutex<usize>,
    }

    impl PluginHost for PanickingHost {
        fn notify(&self, message: &str) {
            if message.starts_with("Found") {
                panic!("notification rejected");
            }
        }

        async fn open_external(&self, _url: &str) -> figbridge_core::Result<()> {
            Ok(())
        }

        fn close_plugin(&self) {
            *self.closed.lock() += 1;
        }
    }

    #[test]
    fn test_session_closed_when_host_panics() {
        let host = PanickingHost::default();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            runtime.block_on(run(&doc(), &host, &CollectorConfig::default()))
        }));

        assert!(result.is_err());
        assert_eq!(*host.closed.lock(), 1);
    }

    #[tokio::test]
    async fn test_missing_page_fails_cleanly() {
        let host = RecordingHost::default();
        let doc = DocumentSnapshot {
            name: "No pages".into(),
            ..Default::default()
        };
        let outcome = run(&doc, &host, &CollectorConfig::default()).await;
        assert!(matches!(outcome, RunOutcome::Failed(_)));
        assert!(host.opened.lock().is_empty());
        assert_eq!(*host.closed.lock(), 1);
    }
}
