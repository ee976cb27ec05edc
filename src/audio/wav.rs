//! Incremental WAV container writer.
//!
//! Wraps [`hound::WavWriter`], which writes a placeholder RIFF header up
//! front and patches the RIFF and `data` sizes when finalized. Any
//! `Write + Seek` sink works; the converter uses an in-memory cursor.

use std::io::{Seek, Write};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::format::{SAMPLE_WIDTH, StreamFormat};
use crate::error::ConvertError;

/// Size of the canonical PCM header: RIFF, 16-byte `fmt ` chunk, `data` header.
pub const WAV_HEADER_LEN: usize = 44;

pub fn wav_spec(format: StreamFormat) -> WavSpec {
    WavSpec {
        channels: format.channels(),
        sample_rate: format.sample_rate(),
        bits_per_sample: (SAMPLE_WIDTH * 8) as u16,
        sample_format: SampleFormat::Int,
    }
}

pub struct ContainerWriter<W: Write + Seek> {
    writer: WavWriter<W>,
    format: StreamFormat,
    data_bytes: usize,
}

impl<W: Write + Seek> ContainerWriter<W> {
    pub fn new(sink: W, format: StreamFormat) -> Result<Self, ConvertError> {
        let writer = WavWriter::new(sink, wav_spec(format))?;
        Ok(Self {
            writer,
            format,
            data_bytes: 0,
        })
    }

    /// Append raw little-endian 16-bit PCM.
    ///
    /// The length must be a whole number of interleaved sample frames.
    pub fn write(&mut self, pcm_bytes: &[u8]) -> Result<(), ConvertError> {
        let align = self.format.block_align();
        if pcm_bytes.len() % align != 0 {
            return Err(ConvertError::MisalignedBlock {
                len: pcm_bytes.len(),
                align,
            });
        }

        for chunk in pcm_bytes.chunks_exact(SAMPLE_WIDTH) {
            self.writer
                .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?;
        }
        self.data_bytes += pcm_bytes.len();
        Ok(())
    }

    /// Append interleaved samples as produced by a decoder.
    pub fn write_samples(&mut self, samples: &[i16]) -> Result<(), ConvertError> {
        let channels = self.format.channels() as usize;
        if samples.len() % channels != 0 {
            return Err(ConvertError::MisalignedBlock {
                len: samples.len() * SAMPLE_WIDTH,
                align: self.format.block_align(),
            });
        }

        for &sample in samples {
            self.writer.write_sample(sample)?;
        }
        self.data_bytes += samples.len() * SAMPLE_WIDTH;
        Ok(())
    }

    /// Bytes of sample data written so far.
    pub fn data_len(&self) -> usize {
        self.data_bytes
    }

    /// Patch the header sizes and flush the sink.
    pub fn finalize(self) -> Result<(), ConvertError> {
        self.writer.finalize()?;
        Ok(())
    }
}
