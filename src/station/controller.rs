//! Scanner page state machine.
//!
//! ```text
//! Idle --'('--> Capturing --')'--> Submitted --(task_data)--> AwaitingCompletion
//! AwaitingCompletion --(complete ok)--> Idle
//! AwaitingCompletion --(complete failed)--> AwaitingCompletion
//! Capturing --(other key)--> Capturing
//! ```
//!
//! The controller owns all page state and performs no I/O. Callers take
//! the [`PendingSubmission`]s it returns, send them, and feed the results
//! back through [`PageController::apply_log_response`].

use tracing::{debug, info, warn};

use super::display::TaskView;
use super::sequencer::{RequestSequencer, Ticket};
use crate::capture::{CLOSE, CaptureMode, CaptureRejection, CaptureSession, Key, KeyOutcome, OPEN};
use crate::errors::{ClientError, StationError};
use crate::protocol::{CompletionEnvelope, CompletionRequest, LogRequest, LogResponse, Station};

/// Prefix of the identification message shown after a scan.
pub const MESSAGE_PREFIX: &str = "Считанная последовательность";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    Idle,
    Capturing,
    Submitted,
    AwaitingCompletion,
}

/// A request the controller wants sent to the log endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: Ticket,
    pub request: LogRequest,
    /// The finished capture this submission closes, if any.
    pub sequence: Option<String>,
}

/// What applying a response did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// A newer response was already applied; this one was dropped.
    Stale,
    /// Transport failure; the page kept its previous state.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed,
    /// The server answered but refused the completion.
    Rejected(String),
    /// The request never got an answer.
    Failed(String),
}

#[derive(Debug)]
pub struct PageController {
    station: Station,
    mode: CaptureMode,
    capture: CaptureSession,
    sequencer: RequestSequencer,
    /// Phase outside of an open capture.
    stage: PagePhase,
    message: Option<String>,
    view: TaskView,
    employee_sequence: Option<String>,
    last_capture: Option<String>,
    completion_in_flight: bool,
    notice: Option<String>,
}

impl PageController {
    pub fn new(station: Station, mode: CaptureMode) -> Self {
        Self {
            station,
            mode,
            capture: CaptureSession::new(),
            sequencer: RequestSequencer::new(),
            stage: PagePhase::Idle,
            message: None,
            view: TaskView::Empty,
            employee_sequence: None,
            last_capture: None,
            completion_in_flight: false,
            notice: None,
        }
    }

    pub fn station(&self) -> Station {
        self.station
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> PagePhase {
        if self.capture.is_active() {
            PagePhase::Capturing
        } else {
            self.stage
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn view(&self) -> &TaskView {
        &self.view
    }

    pub fn controls_visible(&self) -> bool {
        self.view.controls_visible()
    }

    /// Employee sequence the completion button will submit.
    pub fn employee_sequence(&self) -> Option<&str> {
        self.employee_sequence.as_deref()
    }

    /// Last failure worth telling the operator about.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn capture_buffer(&self) -> &str {
        self.capture.buffer()
    }

    fn submission(&mut self, request: LogRequest, sequence: Option<String>) -> PendingSubmission {
        let pending = PendingSubmission {
            ticket: self.sequencer.issue(),
            request,
            sequence,
        };
        debug!(station = %self.station, ticket = pending.ticket.value(), request = ?pending.request, "queued submission");
        pending
    }

    fn per_key(&self) -> bool {
        self.mode == CaptureMode::PerKey
    }

    /// Feed a keystroke and return the submissions it triggers.
    pub fn on_key(&mut self, key: &Key) -> Vec<PendingSubmission> {
        match self.capture.feed(key) {
            KeyOutcome::Ignored => Vec::new(),
            KeyOutcome::Started { discarded } => {
                if let Some(partial) = discarded {
                    warn!(station = %self.station, %partial, "capture restarted, partial sequence discarded");
                }
                if self.per_key() {
                    vec![self.submission(LogRequest::key(OPEN), None)]
                } else {
                    Vec::new()
                }
            }
            KeyOutcome::Appended(c) => {
                if self.per_key() {
                    vec![self.submission(LogRequest::key(c), None)]
                } else {
                    Vec::new()
                }
            }
            KeyOutcome::Finished { sequence } => {
                debug!(station = %self.station, %sequence, "capture finished");
                self.last_capture = Some(sequence.clone());
                self.stage = PagePhase::Submitted;
                let request = if self.per_key() {
                    LogRequest::key(CLOSE)
                } else {
                    LogRequest::sequence(sequence.clone())
                };
                vec![self.submission(request, Some(sequence))]
            }
            KeyOutcome::Rejected(CaptureRejection::Empty) => {
                warn!(station = %self.station, "empty capture ignored");
                if self.per_key() {
                    vec![self.submission(LogRequest::key(CLOSE), None)]
                } else {
                    Vec::new()
                }
            }
            // Per-key pages forward every `)`; sequence pages have nothing to close.
            KeyOutcome::CloseWhileIdle => {
                if self.per_key() {
                    vec![self.submission(LogRequest::key(CLOSE), None)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Settle the phase after the final response of a capture.
    fn settle(&mut self) {
        self.stage = if self.view.controls_visible() {
            PagePhase::AwaitingCompletion
        } else {
            PagePhase::Idle
        };
    }

    /// Apply the result of a log submission.
    pub fn apply_log_response(
        &mut self,
        pending: &PendingSubmission,
        result: Result<LogResponse, ClientError>,
    ) -> Applied {
        if !self.sequencer.admit(pending.ticket) {
            debug!(station = %self.station, ticket = pending.ticket.value(), "discarding stale response");
            return Applied::Stale;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(station = %self.station, error = %e, "capture submission failed");
                self.notice = Some(e.to_string());
                if self.stage == PagePhase::Submitted {
                    self.settle();
                }
                return Applied::Failed;
            }
        };

        self.notice = None;
        if let Some(sequence) = response.sequence {
            self.message = Some(format!("{}: {}", MESSAGE_PREFIX, sequence));
        }

        match response.task {
            Some(task) => {
                self.view = TaskView::from_task_data(&task);
                self.employee_sequence = if self.view.controls_visible() {
                    pending
                        .sequence
                        .clone()
                        .or_else(|| self.last_capture.clone())
                } else {
                    None
                };
                self.settle();
            }
            None if pending.sequence.is_some() => self.settle(),
            None => {}
        }
        Applied::Updated
    }

    /// Start a completion for the displayed task.
    pub fn begin_completion(&mut self) -> Result<CompletionRequest, StationError> {
        if self.completion_in_flight {
            return Err(StationError::CompletionInFlight);
        }
        if self.stage != PagePhase::AwaitingCompletion || !self.view.controls_visible() {
            return Err(StationError::NoPendingTask);
        }
        let sequence = self
            .employee_sequence
            .clone()
            .ok_or(StationError::MissingEmployeeSequence)?;
        self.completion_in_flight = true;
        Ok(CompletionRequest::new(sequence))
    }

    /// Apply the result of a completion request.
    pub fn apply_completion(
        &mut self,
        result: Result<CompletionEnvelope, ClientError>,
    ) -> CompletionOutcome {
        self.completion_in_flight = false;
        match result {
            Ok(envelope) if envelope.ok => {
                info!(
                    station = %self.station,
                    employee = self.employee_sequence.as_deref().unwrap_or_default(),
                    "task completed"
                );
                self.reset();
                CompletionOutcome::Completed
            }
            Ok(envelope) => {
                warn!(station = %self.station, message = %envelope.message, "completion refused");
                self.notice = Some(envelope.message.clone());
                CompletionOutcome::Rejected(envelope.message)
            }
            Err(e) => {
                warn!(station = %self.station, error = %e, "completion failed");
                let text = e.to_string();
                self.notice = Some(text.clone());
                CompletionOutcome::Failed(text)
            }
        }
    }

    pub fn toggle_photo(&mut self) -> Option<bool> {
        self.view.toggle_photo()
    }

    /// Return the page to idle. Responses to requests still in flight are
    /// discarded when they arrive.
    pub fn reset(&mut self) {
        self.capture.reset();
        self.sequencer.invalidate();
        self.stage = PagePhase::Idle;
        self.message = None;
        self.view.clear();
        self.employee_sequence = None;
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TaskData;
    use serde_json::json;

    fn type_keys(page: &mut PageController, text: &str) -> Vec<PendingSubmission> {
        Key::sequence(text)
            .iter()
            .flat_map(|k| page.on_key(k))
            .collect()
    }

    fn task_response(name: &str) -> LogResponse {
        LogResponse {
            sequence: Some(name.to_string()),
            task: Some(
                TaskData::from_value(json!({"Артикул": "M-1", "Размер": "160/200"})).unwrap(),
            ),
        }
    }

    fn error_response(message: &str) -> LogResponse {
        LogResponse {
            sequence: None,
            task: Some(TaskData::Error(message.to_string())),
        }
    }

    fn transport_error() -> ClientError {
        ClientError::Decode {
            path: "/log_sequence_gluing".to_string(),
            message: "eof".to_string(),
        }
    }

    #[test]
    fn test_sequence_mode_submits_once_on_close() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(A1)");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].request, LogRequest::sequence("A1"));
        assert_eq!(subs[0].sequence.as_deref(), Some("A1"));
        assert_eq!(page.phase(), PagePhase::Submitted);
    }

    #[test]
    fn test_per_key_mode_submits_every_key() {
        let mut page = PageController::new(Station::Sewing, CaptureMode::PerKey);
        let subs = type_keys(&mut page, "(A1)");
        let bodies: Vec<_> = subs.iter().map(|s| s.request.clone()).collect();
        assert_eq!(
            bodies,
            vec![
                LogRequest::key("("),
                LogRequest::key("A"),
                LogRequest::key("1"),
                LogRequest::key(")"),
            ]
        );
        assert_eq!(subs[3].sequence.as_deref(), Some("A1"));
    }

    #[test]
    fn test_close_while_idle_submits_nothing() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        assert!(page.on_key(&Key::Char(')')).is_empty());
        assert_eq!(page.phase(), PagePhase::Idle);
    }

    #[test]
    fn test_per_key_close_while_idle_is_sent() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::PerKey);
        let subs = page.on_key(&Key::Char(')'));
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].request, LogRequest::key(")"));
        assert_eq!(subs[0].sequence, None);
        assert_eq!(page.phase(), PagePhase::Idle);
    }

    #[test]
    fn test_phase_is_capturing_while_buffer_open() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        type_keys(&mut page, "(12");
        assert_eq!(page.phase(), PagePhase::Capturing);
        assert_eq!(page.capture_buffer(), "12");
    }

    #[test]
    fn test_task_response_awaits_completion() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(A123)");
        let applied = page.apply_log_response(&subs[0], Ok(task_response("Иванов")));
        assert_eq!(applied, Applied::Updated);
        assert_eq!(page.phase(), PagePhase::AwaitingCompletion);
        assert_eq!(
            page.message(),
            Some("Считанная последовательность: Иванов")
        );
        assert!(page.controls_visible());
        assert_eq!(page.employee_sequence(), Some("A123"));
    }

    #[test]
    fn test_error_response_hides_controls() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(9)");
        page.apply_log_response(&subs[0], Ok(error_response("not found")));
        assert_eq!(page.view().error(), Some("not found"));
        assert!(!page.controls_visible());
        assert_eq!(page.phase(), PagePhase::Idle);
        assert_eq!(page.begin_completion(), Err(StationError::NoPendingTask));
    }

    #[test]
    fn test_transport_failure_keeps_previous_state() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let first = type_keys(&mut page, "(1)");
        page.apply_log_response(&first[0], Ok(task_response("Иванов")));

        let second = type_keys(&mut page, "(2)");
        let applied = page.apply_log_response(&second[0], Err(transport_error()));
        assert_eq!(applied, Applied::Failed);
        assert_eq!(page.phase(), PagePhase::AwaitingCompletion);
        assert_eq!(page.employee_sequence(), Some("1"));
        assert!(page.notice().is_some());
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut page = PageController::new(Station::Sewing, CaptureMode::Sequence);
        let first = type_keys(&mut page, "(1)");
        let second = type_keys(&mut page, "(2)");

        assert_eq!(
            page.apply_log_response(&second[0], Ok(task_response("Второй"))),
            Applied::Updated
        );
        assert_eq!(
            page.apply_log_response(&first[0], Ok(task_response("Первый"))),
            Applied::Stale
        );
        assert_eq!(page.message(), Some("Считанная последовательность: Второй"));
        assert_eq!(page.employee_sequence(), Some("2"));
    }

    #[test]
    fn test_per_key_intermediate_responses_update_message_only() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::PerKey);
        let subs = type_keys(&mut page, "(7)");
        let partial = LogResponse {
            sequence: Some("(7".to_string()),
            task: None,
        };
        page.apply_log_response(&subs[1], Ok(partial));
        assert_eq!(page.message(), Some("Считанная последовательность: (7"));
        assert_eq!(page.phase(), PagePhase::Submitted);

        page.apply_log_response(&subs[2], Ok(task_response("Иванов")));
        assert_eq!(page.phase(), PagePhase::AwaitingCompletion);
        assert_eq!(page.employee_sequence(), Some("7"));
    }

    #[test]
    fn test_completion_success_resets_page() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(A123)");
        page.apply_log_response(&subs[0], Ok(task_response("Иванов")));

        let request = page.begin_completion().unwrap();
        assert_eq!(request, CompletionRequest::new("A123"));

        let outcome = page.apply_completion(Ok(CompletionEnvelope::success()));
        assert_eq!(outcome, CompletionOutcome::Completed);
        assert_eq!(page.phase(), PagePhase::Idle);
        assert!(page.message().is_none());
        assert!(page.view().is_empty());
        assert!(!page.controls_visible());
    }

    #[test]
    fn test_completion_failure_keeps_task() {
        let mut page = PageController::new(Station::Sewing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(5)");
        page.apply_log_response(&subs[0], Ok(task_response("Петров")));
        page.begin_completion().unwrap();

        let outcome = page.apply_completion(Ok(CompletionEnvelope::failure("Этой брони больше нет")));
        assert_eq!(
            outcome,
            CompletionOutcome::Rejected("Этой брони больше нет".to_string())
        );
        assert_eq!(page.phase(), PagePhase::AwaitingCompletion);
        assert!(page.controls_visible());
        assert_eq!(page.notice(), Some("Этой брони больше нет"));

        // The operator can try again.
        assert!(page.begin_completion().is_ok());
    }

    #[test]
    fn test_second_completion_click_is_rejected() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(1)");
        page.apply_log_response(&subs[0], Ok(task_response("Иванов")));
        page.begin_completion().unwrap();
        assert_eq!(
            page.begin_completion(),
            Err(StationError::CompletionInFlight)
        );
    }

    #[test]
    fn test_responses_after_reset_are_stale() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(1)");
        page.reset();
        assert_eq!(
            page.apply_log_response(&subs[0], Ok(task_response("Иванов"))),
            Applied::Stale
        );
        assert!(page.view().is_empty());
    }

    #[test]
    fn test_toggle_photo_through_controller() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let subs = type_keys(&mut page, "(1)");
        let response = LogResponse {
            sequence: None,
            task: Some(TaskData::from_value(json!({"Фото": "u"})).unwrap()),
        };
        page.apply_log_response(&subs[0], Ok(response));
        assert_eq!(page.toggle_photo(), Some(true));
    }
}
