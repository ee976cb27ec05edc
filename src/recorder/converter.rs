//! Whole-submission conversion: frames in, one WAV container out.

use std::io::Cursor;

use tracing::{debug, warn};

use crate::audio::{ContainerWriter, FrameDecoder, FrameReader, StreamEnd};
use crate::error::ConvertError;

/// What happened to the frames of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    pub frames_decoded: usize,
    pub frames_failed: usize,
    pub end: StreamEnd,
}

/// Owns the stream decoder and turns framed submissions into WAV bytes.
///
/// A frame that fails to decode is skipped; the rest of the stream is still
/// converted. Only a failing container sink aborts the conversion.
pub struct Converter<D> {
    decoder: D,
}

impl<D: FrameDecoder> Converter<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Clear decoder state left behind by a previous stream.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.decoder.reset()
    }

    pub fn convert_to_container(
        &mut self,
        raw_stream: &[u8],
    ) -> Result<(Vec<u8>, ConversionReport), ConvertError> {
        debug!("Converting {} bytes of framed audio", raw_stream.len());

        let mut sink = Cursor::new(Vec::new());
        let mut writer = ContainerWriter::new(&mut sink, self.decoder.format())?;

        let mut frames = FrameReader::new(raw_stream);
        let mut frames_decoded = 0;
        let mut frames_failed = 0;

        for frame in frames.by_ref() {
            match self.decoder.decode(frame.index, frame.payload) {
                Ok(pcm) => {
                    writer.write_samples(pcm)?;
                    frames_decoded += 1;
                    debug!(
                        "Decoded frame {} at offset {} ({} bytes -> {} samples)",
                        frame.index,
                        frame.offset,
                        frame.declared_len(),
                        pcm.len()
                    );
                }
                Err(e) => {
                    frames_failed += 1;
                    warn!("{}", e);
                }
            }
        }

        // The reader only yields `None` after recording how it ended.
        let end = frames.end().unwrap_or(StreamEnd::Clean);
        if !end.is_clean() {
            warn!(
                "Dropped {} trailing bytes of an incomplete frame: {:?}",
                end.discarded_bytes(),
                end
            );
        }

        writer.finalize()?;
        let bytes = sink.into_inner();

        debug!(
            "Conversion complete. Processed {} frames ({} failed), WAV size: {} bytes",
            frames_decoded,
            frames_failed,
            bytes.len()
        );

        Ok((
            bytes,
            ConversionReport {
                frames_decoded,
                frames_failed,
                end,
            },
        ))
    }
}
