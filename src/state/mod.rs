//! Application context shared with the HTTP handlers.
//!
//! Built once in `main` and handed to the router; nothing here is global.

use std::thread::JoinHandle;

use anyhow::Result;

use crate::audio::OpusFrameDecoder;
use crate::config::RecorderConfig;
use crate::recorder::{Converter, RecordingStore, RecordingWorker, SubmissionQueue};

#[derive(Clone)]
pub struct AppState {
    pub queue: SubmissionQueue,
}

impl AppState {
    /// Opens the decoder, starts the worker and returns the context for the
    /// intake together with the worker's join handle.
    pub fn new(config: &RecorderConfig) -> Result<(Self, JoinHandle<()>)> {
        let format = config.validate()?;

        let converter = Converter::new(OpusFrameDecoder::new(format)?);
        let store = RecordingStore::new(&config.recordings_dir);
        let (queue, worker) = RecordingWorker::start(converter, store, config.queue_capacity)?;

        Ok((Self { queue }, worker))
    }
}
