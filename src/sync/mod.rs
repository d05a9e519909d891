//! Save round-trip: snapshot the store, send it on a worker thread, and track
//! which revision the backing store has last accepted.

mod payload;
mod transport;

use std::sync::mpsc;
use std::sync::Arc;

use thiserror::Error;

pub use payload::{SavePayload, SaveResponse, SavedAnnotation, SUCCESS_STATUS};
pub use transport::{HttpSaveTransport, SaveTransport};

pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("a save is already in progress")]
    SaveInFlight,
    #[error("no save endpoint configured")]
    MissingEndpoint,
    #[error("{message}")]
    Transport { message: String },
    #[error("invalid save response: {message}")]
    InvalidResponse { message: String },
    #[error("{message}")]
    Rejected { message: String },
    #[error("save worker exited without a result")]
    WorkerDisconnected,
}

/// Display state of the save control. The dirty flag is the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

impl SaveState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Failed => "failed",
        }
    }
}

struct InFlightSave {
    revision: u64,
    receiver: mpsc::Receiver<SyncResult<SaveResponse>>,
}

pub struct SyncClient {
    transport: Arc<dyn SaveTransport>,
    state: SaveState,
    saved_revision: u64,
    in_flight: Option<InFlightSave>,
    last_message: Option<String>,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("state", &self.state)
            .field("saved_revision", &self.saved_revision)
            .field("in_flight", &self.in_flight.as_ref().map(|save| save.revision))
            .finish()
    }
}

impl SyncClient {
    /// `clean_revision` is the store revision that matches the backing store.
    pub fn new(transport: Arc<dyn SaveTransport>, clean_revision: u64) -> Self {
        Self {
            transport,
            state: SaveState::Idle,
            saved_revision: clean_revision,
            in_flight: None,
            last_message: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_dirty(&self, current_revision: u64) -> bool {
        current_revision != self.saved_revision
    }

    /// Message of the last failed save, if the latest outcome was a failure.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Sends `payload`, a snapshot taken at store revision `revision`.
    pub fn begin(&mut self, payload: SavePayload, revision: u64) -> SyncResult<()> {
        if let Some(current) = &self.in_flight {
            tracing::warn!(in_flight = current.revision, "save requested while another is in flight");
            return Err(SyncError::SaveInFlight);
        }

        let (tx, rx) = mpsc::channel();
        let transport = Arc::clone(&self.transport);
        let count = payload.annotations.len();
        std::thread::spawn(move || {
            let result = transport.save(&payload);
            let _ = tx.send(result);
        });

        tracing::debug!(revision, annotations = count, "save started");
        self.in_flight = Some(InFlightSave {
            revision,
            receiver: rx,
        });
        self.state = SaveState::Saving;
        self.last_message = None;
        Ok(())
    }

    /// Non-blocking check for the in-flight save's result.
    pub fn poll(&mut self) -> Option<SyncResult<()>> {
        let received = match self.in_flight.as_ref()?.receiver.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => Err(SyncError::WorkerDisconnected),
        };
        Some(self.finish(received))
    }

    /// Blocks until the in-flight save completes. `None` when nothing is in flight.
    pub fn wait(&mut self) -> Option<SyncResult<()>> {
        let received = self
            .in_flight
            .as_ref()?
            .receiver
            .recv()
            .unwrap_or(Err(SyncError::WorkerDisconnected));
        Some(self.finish(received))
    }

    fn finish(&mut self, received: SyncResult<SaveResponse>) -> SyncResult<()> {
        let Some(save) = self.in_flight.take() else {
            return Err(SyncError::WorkerDisconnected);
        };

        let outcome = received.and_then(|response| {
            if response.is_success() {
                Ok(())
            } else {
                Err(SyncError::Rejected {
                    message: response.failure_message(),
                })
            }
        });

        match &outcome {
            Ok(()) => {
                self.saved_revision = save.revision;
                self.state = SaveState::Saved;
                tracing::info!(revision = save.revision, "annotations saved");
            }
            Err(err) => {
                self.state = SaveState::Failed;
                self.last_message = Some(err.to_string());
                tracing::error!(revision = save.revision, error = %err, "save failed");
            }
        }
        outcome
    }
}
