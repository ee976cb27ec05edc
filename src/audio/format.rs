//! PCM stream layout shared by the decoder and the container writer.

use anyhow::Result;

/// Sample rates the Opus decoder can be opened at.
pub const OPUS_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Opus frame durations expressible in whole milliseconds.
pub const VALID_FRAME_DURATIONS_MS: [u32; 5] = [5, 10, 20, 40, 60];

/// Bytes per 16-bit sample.
pub const SAMPLE_WIDTH: usize = 2;

/// Layout of the decoded audio: rate, channel count and nominal frame duration.
///
/// Samples-per-frame is derived from the rate and duration so the two can
/// never drift apart when the rate is reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    sample_rate: u32,
    channels: u16,
    frame_duration_ms: u32,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: u16, frame_duration_ms: u32) -> Result<Self> {
        if !OPUS_SAMPLE_RATES.contains(&sample_rate) {
            anyhow::bail!(
                "Unsupported sample rate {}Hz, expected one of {:?}",
                sample_rate,
                OPUS_SAMPLE_RATES
            );
        }
        if !(1..=2).contains(&channels) {
            anyhow::bail!("Opus only supports 1 or 2 channels, got {}", channels);
        }
        if !VALID_FRAME_DURATIONS_MS.contains(&frame_duration_ms) {
            anyhow::bail!(
                "Invalid frame duration {}ms, expected one of {:?}",
                frame_duration_ms,
                VALID_FRAME_DURATIONS_MS
            );
        }
        Ok(Self {
            sample_rate,
            channels,
            frame_duration_ms,
        })
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub const fn frame_duration_ms(&self) -> u32 {
        self.frame_duration_ms
    }

    /// Samples per channel in one nominal frame.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate * self.frame_duration_ms / 1000) as usize
    }

    /// Interleaved samples across all channels in one nominal frame.
    pub fn samples_per_block(&self) -> usize {
        self.samples_per_frame() * self.channels as usize
    }

    /// Bytes of one interleaved sample frame (all channels).
    pub fn block_align(&self) -> usize {
        SAMPLE_WIDTH * self.channels as usize
    }

    /// Bytes of PCM one nominal frame decodes to.
    pub fn block_bytes(&self) -> usize {
        self.samples_per_frame() * self.block_align()
    }
}

impl Default for StreamFormat {
    /// 16 kHz mono in 20 ms frames.
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            frame_duration_ms: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_320_samples() {
        let format = StreamFormat::default();
        assert_eq!(format.samples_per_frame(), 320);
        assert_eq!(format.block_bytes(), 640);
        assert_eq!(format.block_align(), 2);
    }

    #[test]
    fn test_samples_follow_sample_rate() {
        let format = StreamFormat::new(48000, 2, 20).unwrap();
        assert_eq!(format.samples_per_frame(), 960);
        assert_eq!(format.samples_per_block(), 1920);
        assert_eq!(format.block_bytes(), 3840);

        let format = StreamFormat::new(8000, 1, 60).unwrap();
        assert_eq!(format.samples_per_frame(), 480);
    }

    #[test]
    fn test_rejects_unsupported_layouts() {
        assert!(StreamFormat::new(44100, 1, 20).is_err());
        assert!(StreamFormat::new(16000, 3, 20).is_err());
        assert!(StreamFormat::new(16000, 0, 20).is_err());
        assert!(StreamFormat::new(16000, 1, 25).is_err());
    }
}
