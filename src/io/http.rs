//! HTTP intake.
//!
//! - `POST /api/audio` - accepts a framed Opus body and queues it, answering
//!   `202 Accepted` before any decoding happens
//! - `GET /api/hello` - liveness check
//!
//! Conversion results are never reported back to the caller.

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use crate::audio::demux::FRAME_HEADER_LEN;
use crate::error::IntakeError;
use crate::recorder::{Role, Submission};
use crate::state::AppState;

pub const OPUS_CONTENT_TYPE: &str = "audio/opus";
pub const AUDIO_TYPE_HEADER: &str = "x-audio-type";

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/audio", post(receive_audio))
        .route("/api/hello", get(hello))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

fn is_opus(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(OPUS_CONTENT_TYPE))
}

/// Checks a request before it is allowed onto the queue.
pub fn validate_submission(headers: &HeaderMap, body: Bytes) -> Result<Submission, IntakeError> {
    if !is_opus(headers) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        return Err(IntakeError::UnsupportedContentType(content_type));
    }
    if body.is_empty() {
        return Err(IntakeError::EmptyBody);
    }
    if body.len() < FRAME_HEADER_LEN {
        return Err(IntakeError::TooShort(body.len()));
    }

    let audio_type = headers
        .get(AUDIO_TYPE_HEADER)
        .and_then(|v| v.to_str().ok());
    let role = Role::from_header(audio_type);
    debug!("Audio type: {}, X-Audio-Type header: {:?}", role, audio_type);

    Ok(Submission::new(role, body))
}

async fn receive_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, IntakeError> {
    debug!("Received audio request, size: {} bytes", body.len());

    let submission = validate_submission(&headers, body).inspect_err(|e| {
        warn!("Rejected audio submission: {}", e);
    })?;
    state.queue.submit(submission)?;

    Ok(StatusCode::ACCEPTED)
}

#[derive(Serialize)]
struct Hello {
    message: &'static str,
}

async fn hello() -> Json<Hello> {
    Json(Hello {
        message: "Hello, World!",
    })
}
