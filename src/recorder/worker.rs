//! Single-consumer recording worker.
//!
//! The Opus decoder keeps per-stream state, so conversions must never overlap.
//! Every submission goes through one bounded FIFO queue drained by one
//! dedicated thread that owns the [`Converter`]. Producers never block: a full
//! queue is reported back as [`IntakeError::QueueFull`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::converter::Converter;
use super::store::{RecordingStore, Role};
use crate::audio::FrameDecoder;
use crate::error::IntakeError;

/// One accepted request body waiting to be converted.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub role: Role,
    pub data: Bytes,
}

impl Submission {
    pub fn new(role: Role, data: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            data,
        }
    }
}

/// Producer side of the worker queue. Cheap to clone.
#[derive(Clone)]
pub struct SubmissionQueue {
    sender: mpsc::Sender<Submission>,
}

impl SubmissionQueue {
    /// Enqueue without waiting.
    pub fn submit(&self, submission: Submission) -> Result<(), IntakeError> {
        match self.sender.try_send(submission) {
            Ok(()) => {
                debug!(
                    "Added task to queue, current queue size: {}",
                    self.queued()
                );
                Ok(())
            }
            Err(TrySendError::Full(s)) => {
                warn!("Queue full, rejecting submission {}", s.id);
                Err(IntakeError::QueueFull)
            }
            Err(TrySendError::Closed(s)) => {
                error!("Worker stopped, rejecting submission {}", s.id);
                Err(IntakeError::WorkerStopped)
            }
        }
    }

    /// Submissions waiting for the worker.
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

pub struct RecordingWorker;

impl RecordingWorker {
    /// Spawns the worker thread.
    ///
    /// The thread exits once every [`SubmissionQueue`] clone has been dropped
    /// and the submissions already queued have been processed.
    pub fn start<D: FrameDecoder + 'static>(
        converter: Converter<D>,
        store: RecordingStore,
        capacity: usize,
    ) -> Result<(SubmissionQueue, thread::JoinHandle<()>)> {
        anyhow::ensure!(capacity > 0, "Queue capacity must be at least 1");
        let (sender, receiver) = mpsc::channel(capacity);

        let handle = thread::Builder::new()
            .name("recorder-worker".into())
            .spawn(move || Self::run(converter, store, receiver))
            .context("Failed to spawn recorder worker thread")?;

        Ok((SubmissionQueue { sender }, handle))
    }

    fn run<D: FrameDecoder>(
        mut converter: Converter<D>,
        store: RecordingStore,
        mut receiver: mpsc::Receiver<Submission>,
    ) {
        info!("Recorder worker started, saving to {:?}", store.dir());

        while let Some(submission) = receiver.blocking_recv() {
            debug!(
                "Got new task {} from queue, data size: {}, role: {}",
                submission.id,
                submission.data.len(),
                submission.role
            );

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                Self::process(&mut converter, &store, &submission)
            }));

            match outcome {
                Ok(Ok(())) => debug!("Task {} completed successfully", submission.id),
                Ok(Err(e)) => error!("Error processing submission {}: {:#}", submission.id, e),
                Err(_) => {
                    error!("Worker panicked while processing submission {}", submission.id);
                    if let Err(e) = converter.reset() {
                        error!("{:#}", e);
                    }
                }
            }
        }

        info!("Recorder worker shutting down");
    }

    fn process<D: FrameDecoder>(
        converter: &mut Converter<D>,
        store: &RecordingStore,
        submission: &Submission,
    ) -> Result<()> {
        converter.reset()?;

        let (wav, report) = converter
            .convert_to_container(&submission.data)
            .context("Conversion failed")?;

        let path = store.save(submission.role, &wav)?;

        info!(
            "Saved {:?} for submission {}: {} frames decoded, {} failed, stream end {:?}",
            path.file_name().unwrap_or_default(),
            submission.id,
            report.frames_decoded,
            report.frames_failed,
            report.end
        );
        Ok(())
    }
}
