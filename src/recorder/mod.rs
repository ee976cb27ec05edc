//! Recording orchestration.
//!
//! - `converter` - Decodes one framed submission into a WAV container
//! - `worker` - Serial background worker fed by a bounded queue
//! - `store` - Writes finished recordings to the recordings directory

pub mod converter;
pub mod store;
pub mod worker;

pub use converter::Converter;
pub use store::{RecordingStore, Role};
pub use worker::{RecordingWorker, Submission, SubmissionQueue};
