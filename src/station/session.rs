//! Driving a [`PageController`] against a [`StationApi`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use super::controller::{Applied, CompletionOutcome, PageController, PendingSubmission};
use crate::capture::Key;
use crate::client::StationApi;
use crate::errors::{ClientError, StationError};
use crate::protocol::{LogResponse, Station};

/// Result of a log submission, routed back to the controller.
pub type SubmissionResult = (PendingSubmission, Result<LogResponse, ClientError>);

/// Send `pending` on a background task and deliver the result to `tx`.
///
/// Submissions are not awaited by the key loop, so several may be in flight
/// at once; the controller's sequencer decides which results still apply.
pub fn spawn_submission(
    api: Arc<dyn StationApi>,
    station: Station,
    pending: PendingSubmission,
    tx: mpsc::UnboundedSender<SubmissionResult>,
) {
    tokio::spawn(async move {
        let result = api.log_sequence(station, &pending.request).await;
        if tx.send((pending, result)).is_err() {
            debug!("scan loop closed before response arrived");
        }
    });
}

/// A scanner page bound to a server.
///
/// `press` awaits each submission in turn, which is what the one-shot
/// commands and tests want. The interactive loop uses [`spawn_submission`]
/// instead so keystrokes are never blocked on the network.
pub struct StationSession {
    api: Arc<dyn StationApi>,
    page: PageController,
}

impl StationSession {
    pub fn new(api: Arc<dyn StationApi>, page: PageController) -> Self {
        Self { api, page }
    }

    pub fn page(&self) -> &PageController {
        &self.page
    }

    pub async fn press(&mut self, key: &Key) -> Vec<Applied> {
        let station = self.page.station();
        let mut applied = Vec::new();
        for pending in self.page.on_key(key) {
            let result = self.api.log_sequence(station, &pending.request).await;
            applied.push(self.page.apply_log_response(&pending, result));
        }
        applied
    }

    /// Feed every character of `text` as if typed by the scanner.
    pub async fn scan(&mut self, text: &str) -> Vec<Applied> {
        let mut applied = Vec::new();
        for key in Key::sequence(text) {
            applied.extend(self.press(&key).await);
        }
        applied
    }

    /// Complete the displayed task.
    pub async fn complete(&mut self) -> Result<CompletionOutcome, StationError> {
        let request = self.page.begin_completion()?;
        let result = self
            .api
            .complete_task(self.page.station(), &request)
            .await;
        Ok(self.page.apply_completion(result))
    }
}
