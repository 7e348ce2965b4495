//! Scanner station page.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `sequencer` | Drops responses that arrive after a newer one |
//! | `display` | Task fields as displayable elements |
//! | `controller` | Page state machine, no I/O |
//! | `session` | Binds a controller to a [`StationApi`](crate::client::StationApi) |

pub mod controller;
pub mod display;
pub mod sequencer;
pub mod session;

pub use controller::{
    Applied, CompletionOutcome, MESSAGE_PREFIX, PageController, PagePhase, PendingSubmission,
};
pub use display::{DisplayElement, PHOTO_FIELD, TaskView};
pub use sequencer::{RequestSequencer, Ticket};
pub use session::{StationSession, SubmissionResult, spawn_submission};
