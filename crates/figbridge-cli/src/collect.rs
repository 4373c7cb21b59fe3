//! Collector host for the command line.

use figbridge_collect::PluginHost;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::opener::open_url;

/// Notifications go to the log; the launch URL is opened only on request.
#[derive(Default)]
pub struct CliHost {
    open: bool,
    notes: Mutex<Vec<String>>,
    opened: Mutex<Option<String>>,
    closed: Mutex<bool>,
}

impl CliHost {
    pub fn new(open: bool) -> Self {
        Self {
            open,
            ..Default::default()
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notes.lock().clone()
    }

    pub fn opened_url(&self) -> Option<String> {
        self.opened.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }
}

impl PluginHost for CliHost {
    fn notify(&self, message: &str) {
        info!("{}", message);
        self.notes.lock().push(message.to_string());
    }

    async fn open_external(&self, url: &str) -> figbridge_core::Result<()> {
        if self.open {
            open_url(url).await?;
        }
        *self.opened.lock() = Some(url.to_string());
        Ok(())
    }

    fn close_plugin(&self) {
        debug!("Plugin session closed");
        *self.closed.lock() = true;
    }
}
