//! Order entry: draft, photo attachments and submission.

pub mod draft;
pub mod draft_file;
pub mod photo;
pub mod submit;

pub use draft::{
    AdditionalPayload, ItemKind, LineItem, MAX_QUANTITY, MIN_QUANTITY, MattressOptions,
    MattressPayload, OrderDraft, OrderHeader, OrderPayload, PICKUP, REGIONS, UNIQUE_MATTRESS,
    parse_delivery_date,
};
pub use draft_file::DraftFile;
pub use photo::PhotoAttachment;
pub use submit::{SubmitGuard, SubmitOutcome, submit_order};
