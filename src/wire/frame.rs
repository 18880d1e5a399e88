// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Length-prefix framing codec (§4.1).
//!
//! ```text
//! +----------------+-------------------+
//! | Length (4B BE) | CBOR payload      |
//! +----------------+-------------------+
//! ```
//!
//! The reader is incremental so it can be driven from non-blocking I/O: it
//! accumulates bytes across calls and only returns `Ok(Some(frame))` once a
//! full frame is available, `Ok(None)` on `WouldBlock`.

use std::io::{self, Read};

use crate::config::{FRAME_HEADER_SIZE, MAX_FRAME_PAYLOAD, MIN_FRAME_PAYLOAD};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum ReadState {
    Length { read: usize },
    Body { expected: usize, read: usize },
}

impl Default for ReadState {
    fn default() -> Self {
        ReadState::Length { read: 0 }
    }
}

/// Incremental length-prefix frame reader/writer.
#[derive(Debug)]
pub struct FrameCodec {
    state: ReadState,
    header: [u8; FRAME_HEADER_SIZE],
    body: Vec<u8>,
    max_payload: usize,
    frames_decoded: u64,
    frames_rejected: u64,
}

impl FrameCodec {
    pub fn new(max_payload: usize) -> Self {
        Self {
            state: ReadState::default(),
            header: [0u8; FRAME_HEADER_SIZE],
            body: Vec::new(),
            max_payload,
            frames_decoded: 0,
            frames_rejected: 0,
        }
    }

    pub fn with_default_max() -> Self {
        Self::new(MAX_FRAME_PAYLOAD)
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected
    }

    pub fn reset(&mut self) {
        self.state = ReadState::default();
    }

    /// Frame a payload for sending: `[len: u32 BE][payload]`.
    pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < MIN_FRAME_PAYLOAD || payload.len() > MAX_FRAME_PAYLOAD {
            return Err(Error::FrameTooLarge {
                len: payload.len(),
                max: MAX_FRAME_PAYLOAD,
            });
        }
        let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        Ok(out)
    }

    /// Drive the state machine from a blocking or non-blocking reader.
    ///
    /// Returns `Ok(Some(frame))` once a complete payload has been read,
    /// `Ok(None)` when the reader would block, and `Err` on short read
    /// (`UnexpectedEof`) or an oversize length prefix (`FrameTooLarge`).
    pub fn decode<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<Option<Vec<u8>>> {
        loop {
            match self.state {
                ReadState::Length { read } => match reader.read(&mut self.header[read..]) {
                    Ok(0) => {
                        return Err(Error::ConnectionLost);
                    }
                    Ok(n) => {
                        let total = read + n;
                        if total < FRAME_HEADER_SIZE {
                            self.state = ReadState::Length { read: total };
                            continue;
                        }
                        let len = u32::from_be_bytes(self.header) as usize;
                        if len > self.max_payload {
                            self.frames_rejected += 1;
                            self.state = ReadState::default();
                            return Err(Error::FrameTooLarge {
                                len,
                                max: self.max_payload,
                            });
                        }
                        self.body.clear();
                        self.body.resize(len, 0);
                        if len == 0 {
                            self.frames_decoded += 1;
                            self.state = ReadState::default();
                            return Ok(Some(Vec::new()));
                        }
                        self.state = ReadState::Body { expected: len, read: 0 };
                    }
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        self.state = ReadState::Length { read };
                        return Ok(None);
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(Error::Io(e)),
                },
                ReadState::Body { expected, read } => {
                    match reader.read(&mut self.body[read..expected]) {
                        Ok(0) => return Err(Error::ConnectionLost),
                        Ok(n) => {
                            let total = read + n;
                            if total < expected {
                                self.state = ReadState::Body { expected, read: total };
                                continue;
                            }
                            let frame = std::mem::take(&mut self.body);
                            self.frames_decoded += 1;
                            self.state = ReadState::default();
                            return Ok(Some(frame));
                        }
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                            self.state = ReadState::Body { expected, read };
                            return Ok(None);
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(Error::Io(e)),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn encode_prefixes_big_endian_length() {
        let frame = FrameCodec::encode(b"hello").unwrap();
        assert_eq!(&frame[..4], &5u32.to_be_bytes());
        assert_eq!(&frame[4..], b"hello");
    }

    #[test]
    fn encode_rejects_zero_length_payload() {
        assert!(FrameCodec::encode(b"").is_err());
    }

    #[test]
    fn decode_round_trips() {
        let mut codec = FrameCodec::with_default_max();
        let frame = FrameCodec::encode(b"payload").unwrap();
        let mut cursor = Cursor::new(frame);
        let out = codec.decode(&mut cursor).unwrap();
        assert_eq!(out, Some(b"payload".to_vec()));
        assert_eq!(codec.frames_decoded(), 1);
    }

    #[test]
    fn decode_rejects_oversize_frame() {
        let mut codec = FrameCodec::new(10);
        let mut frame = vec![0, 0, 0, 20];
        frame.extend_from_slice(&[0u8; 20]);
        let mut cursor = Cursor::new(frame);
        let err = codec.decode(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { len: 20, max: 10 }));
        assert_eq!(codec.frames_rejected(), 1);
    }

    #[test]
    fn decode_accepts_boundary_max_frame() {
        let mut codec = FrameCodec::new(MAX_FRAME_PAYLOAD);
        let payload = vec![0u8; MAX_FRAME_PAYLOAD];
        let frame = FrameCodec::encode(&payload).unwrap();
        let mut cursor = Cursor::new(frame);
        let out = codec.decode(&mut cursor).unwrap();
        assert_eq!(out.unwrap().len(), MAX_FRAME_PAYLOAD);
    }

    #[test]
    fn decode_rejects_max_plus_one() {
        let payload = vec![0u8; MAX_FRAME_PAYLOAD + 1];
        assert!(FrameCodec::encode(&payload).is_err());
    }

    #[test]
    fn decode_short_read_is_connection_lost() {
        let mut codec = FrameCodec::with_default_max();
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let err = codec.decode(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
    }
}
