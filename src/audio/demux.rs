//! Splits a submission into its length-prefixed compressed frames.
//!
//! The wire format is a bare sequence of records:
//!
//! ```text
//! +----------------+---------------------+
//! | len: u16 (LE)  | payload: [u8; len]  |  repeated until the body ends
//! +----------------+---------------------+
//! ```
//!
//! There is no stream header, frame count or checksum. A record cut short at
//! either its header or its payload ends the stream; it is not an error.

use tracing::debug;

/// Size of the little-endian length prefix.
pub const FRAME_HEADER_LEN: usize = 2;

/// One complete frame borrowed from the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Position in the stream, counting from zero.
    pub index: usize,
    /// Byte offset of the length prefix.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl Frame<'_> {
    /// Length declared by the frame header.
    pub fn declared_len(&self) -> usize {
        self.payload.len()
    }
}

/// Why the frame sequence stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Every byte belonged to a complete frame.
    Clean,
    /// One trailing byte, too short for a length prefix.
    TruncatedHeader { remaining: usize },
    /// A header declared more payload than the stream holds.
    TruncatedPayload { declared: usize, available: usize },
}

impl StreamEnd {
    /// Bytes left unread after the last complete frame.
    pub fn discarded_bytes(&self) -> usize {
        match *self {
            StreamEnd::Clean => 0,
            StreamEnd::TruncatedHeader { remaining } => remaining,
            StreamEnd::TruncatedPayload { available, .. } => FRAME_HEADER_LEN + available,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, StreamEnd::Clean)
    }
}

/// Single-pass iterator over the frames of one submission.
///
/// Restarting requires a new reader from offset zero.
pub struct FrameReader<'a> {
    data: &'a [u8],
    offset: usize,
    index: usize,
    end: Option<StreamEnd>,
}

impl<'a> FrameReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            index: 0,
            end: None,
        }
    }

    /// How the stream ended, once iteration has finished.
    pub fn end(&self) -> Option<StreamEnd> {
        self.end
    }

    fn finish(&mut self, end: StreamEnd) -> Option<Frame<'a>> {
        debug!("Frame stream ended at offset {}: {:?}", self.offset, end);
        self.end = Some(end);
        None
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        if self.end.is_some() {
            return None;
        }

        let data: &'a [u8] = self.data;
        let remaining = &data[self.offset..];
        if remaining.is_empty() {
            return self.finish(StreamEnd::Clean);
        }

        let Some((header, rest)) = remaining.split_first_chunk::<FRAME_HEADER_LEN>() else {
            return self.finish(StreamEnd::TruncatedHeader {
                remaining: remaining.len(),
            });
        };

        let declared = u16::from_le_bytes(*header) as usize;
        if declared > rest.len() {
            return self.finish(StreamEnd::TruncatedPayload {
                declared,
                available: rest.len(),
            });
        }

        let frame = Frame {
            index: self.index,
            offset: self.offset,
            payload: &rest[..declared],
        };
        self.offset += FRAME_HEADER_LEN + declared;
        self.index += 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(frames: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for frame in frames {
            out.extend_from_slice(&(frame.len() as u16).to_le_bytes());
            out.extend_from_slice(frame);
        }
        out
    }

    #[test]
    fn test_single_frame() {
        let data = [0x02, 0x00, 0xAA, 0xBB];
        let mut reader = FrameReader::new(&data);

        let frame = reader.next().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.offset, 0);
        assert_eq!(frame.payload, &[0xAA, 0xBB]);
        assert_eq!(frame.declared_len(), 2);

        assert!(reader.next().is_none());
        assert_eq!(reader.end(), Some(StreamEnd::Clean));
    }

    #[test]
    fn test_frames_in_order() {
        let payloads: [&[u8]; 4] = [&[1, 2, 3], &[], &[4; 300], &[5]];
        let data = encode(&payloads);

        let mut reader = FrameReader::new(&data);
        let frames: Vec<_> = reader.by_ref().collect();

        assert_eq!(frames.len(), payloads.len());
        for (i, (frame, expected)) in frames.iter().zip(payloads.iter()).enumerate() {
            assert_eq!(frame.index, i);
            assert_eq!(frame.payload, *expected);
        }
        assert_eq!(frames[2].offset, 2 + 3 + 2);
        assert_eq!(reader.end(), Some(StreamEnd::Clean));
    }

    #[test]
    fn test_empty_stream() {
        let mut reader = FrameReader::new(&[]);
        assert!(reader.next().is_none());
        assert_eq!(reader.end(), Some(StreamEnd::Clean));
    }

    #[test]
    fn test_length_is_little_endian() {
        let mut data = vec![0x01, 0x01];
        data.extend(std::iter::repeat_n(7u8, 257));
        let frames: Vec<_> = FrameReader::new(&data).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.len(), 257);
    }

    #[test]
    fn test_truncated_header_keeps_prior_frames() {
        let mut data = encode(&[&[9, 9]]);
        data.push(0x05);

        let mut reader = FrameReader::new(&data);
        let frames: Vec<_> = reader.by_ref().collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, &[9, 9]);
        assert_eq!(
            reader.end(),
            Some(StreamEnd::TruncatedHeader { remaining: 1 })
        );
        assert_eq!(reader.end().unwrap().discarded_bytes(), 1);
    }

    #[test]
    fn test_truncated_payload_keeps_prior_frames() {
        let mut data = encode(&[&[1], &[2, 2]]);
        data.extend_from_slice(&[0x10, 0x00, 0xFF, 0xFF, 0xFF]);

        let mut reader = FrameReader::new(&data);
        let frames: Vec<_> = reader.by_ref().collect();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].payload, &[2, 2]);
        let end = reader.end().unwrap();
        assert_eq!(
            end,
            StreamEnd::TruncatedPayload {
                declared: 16,
                available: 3
            }
        );
        assert_eq!(end.discarded_bytes(), 5);
        assert!(!end.is_clean());
    }

    #[test]
    fn test_iteration_is_fused_after_end() {
        let data = [0x03, 0x00, 0x01];
        let mut reader = FrameReader::new(&data);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(
            reader.end(),
            Some(StreamEnd::TruncatedPayload {
                declared: 3,
                available: 1
            })
        );
    }
}
