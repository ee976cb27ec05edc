//! Audio formats and codecs.
//!
//! # Framing
//! - [`demux`] - Splits a submission into length-prefixed Opus frames
//!
//! # Codec
//! - [`opus`] - Stateful Opus decoding behind the [`FrameDecoder`] trait
//!
//! # Container
//! - [`wav`] - Incremental WAV writer over any seekable sink
//!
//! [`format::StreamFormat`] ties the three together: the decoder produces
//! blocks in that layout and the writer declares it in the header.

pub mod demux;
pub mod format;
pub mod opus;
pub mod wav;

pub use self::demux::{FrameReader, StreamEnd};
pub use self::format::StreamFormat;
pub use self::opus::{FrameDecoder, OpusFrameDecoder};
pub use self::wav::ContainerWriter;
