use tracing::{info, warn};

use super::draft::{OrderDraft, OrderPayload};
use crate::client::StationApi;
use crate::errors::{ClientError, OrderError};
use crate::protocol::SubmitEnvelope;

pub const SUBMIT_LABEL: &str = "Создать реализацию";
pub const SUBMITTING_LABEL: &str = "Отправка...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server accepted the order; the draft was cleared.
    Accepted(String),
    Rejected(String),
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// Submit button state. At most one submission is in flight.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    in_flight: bool,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn label(&self) -> &'static str {
        if self.in_flight {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Disable the button and build the payload.
    pub fn begin(&mut self, draft: &OrderDraft) -> Result<OrderPayload, OrderError> {
        if self.in_flight {
            return Err(OrderError::SubmitInFlight);
        }
        let payload = draft.to_payload()?;
        self.in_flight = true;
        Ok(payload)
    }

    /// Re-enable the button. The draft is cleared only on acceptance.
    pub fn finish(
        &mut self,
        draft: &mut OrderDraft,
        result: Result<SubmitEnvelope, ClientError>,
    ) -> SubmitOutcome {
        self.in_flight = false;
        match result {
            Ok(envelope) if envelope.ok => {
                info!(message = %envelope.message, "order accepted");
                draft.clear();
                SubmitOutcome::Accepted(envelope.message)
            }
            Ok(envelope) => {
                warn!(message = %envelope.message, "order rejected");
                SubmitOutcome::Rejected(envelope.message)
            }
            Err(e) => {
                warn!(error = %e, "order submission failed");
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Submit `draft` through `api`, guarded by `guard`.
pub async fn submit_order(
    api: &dyn StationApi,
    guard: &mut SubmitGuard,
    draft: &mut OrderDraft,
) -> Result<SubmitOutcome, OrderError> {
    let payload = guard.begin(draft)?;
    let result = api.submit_order(&payload).await;
    Ok(guard.finish(draft, result))
}
