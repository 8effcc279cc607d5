pub use tokio::sync::broadcast::{self, Receiver, Sender};

use serde::Serialize;

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::models::{FileRecord, Session};

/// Notifications for whatever is drawing the dashboards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PortalEvent {
    ValidationError { message: String },

    /// A file passed validation; `record` is what it will be stored as
    ValidationOk { record: FileRecord },

    UploadProgress { file: String, percent: u8 },

    UploadComplete { record: FileRecord },

    DownloadComplete { record: FileRecord },

    AuthError { kind: String, message: String },

    AuthSuccess { session: Session },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<PortalEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl EventBus {
    pub fn subscribe(&self) -> Receiver<PortalEvent> {
        self.tx.subscribe()
    }

    /// Queue an event. Nobody listening is fine.
    pub fn emit(&self, event: PortalEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}
