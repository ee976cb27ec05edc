//! Opus frame decoding.
//!
//! [`FrameDecoder`] is the seam the converter decodes through. The Opus
//! implementation owns a single libopus decoder whose prediction state carries
//! from one frame to the next, so it must only ever see one stream at a time.

use anyhow::{Context, Result};
use opus::{Channels, Decoder};
use tracing::debug;

use super::format::StreamFormat;
use crate::error::FrameDecodeError;

/// Stateful decoder turning one compressed frame into interleaved 16-bit PCM.
pub trait FrameDecoder: Send {
    /// Layout of every block this decoder produces.
    fn format(&self) -> StreamFormat;

    /// Decode one frame. `index` is only used to label the error.
    fn decode(&mut self, index: usize, payload: &[u8]) -> Result<&[i16], FrameDecodeError>;

    /// Drop any state carried over from earlier frames.
    fn reset(&mut self) -> Result<()>;
}

fn channels_to_opus(channels: u16) -> Result<Channels> {
    match channels {
        1 => Ok(Channels::Mono),
        2 => Ok(Channels::Stereo),
        _ => anyhow::bail!("Opus only supports 1 or 2 channels, got {}", channels),
    }
}

pub struct OpusFrameDecoder {
    decoder: Decoder,
    format: StreamFormat,
    output_buffer: Vec<i16>,
}

impl OpusFrameDecoder {
    pub fn new(format: StreamFormat) -> Result<Self> {
        let channels = channels_to_opus(format.channels())?;

        let decoder = Decoder::new(format.sample_rate(), channels)
            .context("Failed to create Opus decoder")?;

        debug!(
            "Opus decoder ready: {}Hz, {} channel(s), {}ms frames of {} samples",
            format.sample_rate(),
            format.channels(),
            format.frame_duration_ms(),
            format.samples_per_frame()
        );

        Ok(Self {
            decoder,
            format,
            output_buffer: vec![0i16; format.samples_per_block()],
        })
    }
}

impl FrameDecoder for OpusFrameDecoder {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn decode(&mut self, index: usize, payload: &[u8]) -> Result<&[i16], FrameDecodeError> {
        // The output buffer holds exactly one nominal frame; a packet longer
        // than that is rejected by libopus rather than truncated.
        let samples_per_channel = self
            .decoder
            .decode(payload, &mut self.output_buffer, false)
            .map_err(|e| FrameDecodeError {
                index,
                source: Box::new(e),
            })?;

        let total_samples = samples_per_channel * self.format.channels() as usize;
        Ok(&self.output_buffer[..total_samples])
    }

    fn reset(&mut self) -> Result<()> {
        self.decoder
            .reset_state()
            .context("Failed to reset Opus decoder state")
    }
}
