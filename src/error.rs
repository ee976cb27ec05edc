//! Error types for the recorder.
//!
//! Only [`ConvertError`] ends a conversion. [`FrameDecodeError`] is recovered
//! per frame by the converter, and [`IntakeError`] never reaches the queue.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Boxed cause carried by a decode failure, so any codec can sit behind
/// [`FrameDecoder`](crate::audio::FrameDecoder).
pub type DecodeCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One compressed frame could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode frame {index}: {source}")]
pub struct FrameDecodeError {
    pub index: usize,
    #[source]
    pub source: DecodeCause,
}

/// A conversion that could not produce a container at all.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The container sink rejected a write or the header patch on finalize.
    #[error("container sink failed: {0}")]
    Sink(#[from] hound::Error),

    /// A PCM block that does not hold a whole number of sample frames.
    #[error("PCM block of {len} bytes is not a multiple of the {align}-byte block align")]
    MisalignedBlock { len: usize, align: usize },
}

/// A submission refused before it was queued.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(Option<String>),

    #[error("request body is empty")]
    EmptyBody,

    #[error("request body of {0} bytes is too short to hold a frame header")]
    TooShort(usize),

    #[error("processing queue is full")]
    QueueFull,

    #[error("processing worker has stopped")]
    WorkerStopped,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IntakeError::EmptyBody | IntakeError::TooShort(_) => StatusCode::BAD_REQUEST,
            IntakeError::QueueFull | IntakeError::WorkerStopped => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            IntakeError::UnsupportedContentType(_) => "Invalid content type",
            IntakeError::EmptyBody => "No data received",
            IntakeError::TooShort(_) => "Invalid data format",
            IntakeError::QueueFull => "Processing queue is full",
            IntakeError::WorkerStopped => "Processing worker is not running",
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_status_codes() {
        assert_eq!(
            IntakeError::UnsupportedContentType(Some("text/plain".into())).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(IntakeError::EmptyBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(IntakeError::TooShort(1).status(), StatusCode::BAD_REQUEST);
        assert_eq!(IntakeError::QueueFull.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            IntakeError::WorkerStopped.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_frame_decode_error_keeps_cause() {
        let err = FrameDecodeError {
            index: 3,
            source: "corrupt packet".into(),
        };
        assert_eq!(err.to_string(), "failed to decode frame 3: corrupt packet");
        assert!(std::error::Error::source(&err).is_some());
    }
}
