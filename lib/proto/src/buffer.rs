//! Growable byte buffers for framing messages over the reliable stream.
//!
//! The teacher's `neutronium::net::buffer::Buffer` is backed by
//! `slice_deque::SliceDeque`, a nightly-adjacent mmap-ring trick. A plain
//! `Vec<u8>` with a drain-on-consume reader is the stable-Rust equivalent
//! for the throughput this protocol needs and is grounded the same way
//! `flux::shared` buffers its socket reads.

use crate::error::ProtoError;
use crate::frame::{Header, HEADER_SIZE};

/// Accumulates bytes read off a `TcpStream` and yields complete
/// `(Header, payload)` frames as they become available. Partial frames
/// (a short read split across two `poll` wakeups) are held until the rest
/// arrives.
#[derive(Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        FrameReader { buf: Vec::new() }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete frame out of the buffer, if one is present.
    /// Returns `Ok(None)` when more bytes are needed.
    pub fn try_take_frame(&mut self) -> Result<Option<(Header, Vec<u8>)>, ProtoError> {
        if self.buf.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = Header::decode(&self.buf)?;
        let total = HEADER_SIZE + header.length as usize;
        if self.buf.len() < total {
            return Ok(None);
        }

        let payload = self.buf[HEADER_SIZE..total].to_vec();
        self.buf.drain(..total);
        Ok(Some((header, payload)))
    }

    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }
}

/// Serializes outgoing frames into one contiguous send buffer so a single
/// `TcpStream::write` call can push as much as the socket will take.
#[derive(Default)]
pub struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    pub fn new() -> Self {
        FrameWriter { buf: Vec::new() }
    }

    pub fn push_frame(&mut self, header: &Header, payload: &[u8]) -> Result<(), ProtoError> {
        let mut head = [0u8; HEADER_SIZE];
        header.encode(&mut head)?;
        self.buf.extend_from_slice(&head);
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Drop the first `n` bytes once the socket has accepted them.
    pub fn consume(&mut self, n: usize) {
        self.buf.drain(..n.min(self.buf.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_yields_frame_once_fully_buffered() {
        let mut writer = FrameWriter::new();
        writer.push_frame(&Header { msg_type: 1, length: 3, sequence: 0 }, &[9, 9, 9]).unwrap();

        let mut reader = FrameReader::new();
        let bytes = writer.as_slice();
        reader.feed(&bytes[..5]);
        assert!(reader.try_take_frame().unwrap().is_none());

        reader.feed(&bytes[5..]);
        let (header, payload) = reader.try_take_frame().unwrap().unwrap();
        assert_eq!(header.msg_type, 1);
        assert_eq!(payload, vec![9, 9, 9]);
        assert_eq!(reader.pending_bytes(), 0);
    }

    #[test]
    fn reader_handles_two_frames_in_one_feed() {
        let mut writer = FrameWriter::new();
        writer.push_frame(&Header { msg_type: 1, length: 0, sequence: 0 }, &[]).unwrap();
        writer.push_frame(&Header { msg_type: 2, length: 1, sequence: 1 }, &[0xAB]).unwrap();

        let mut reader = FrameReader::new();
        reader.feed(writer.as_slice());

        let (h1, p1) = reader.try_take_frame().unwrap().unwrap();
        assert_eq!((h1.msg_type, p1), (1, vec![]));
        let (h2, p2) = reader.try_take_frame().unwrap().unwrap();
        assert_eq!((h2.msg_type, p2), (2, vec![0xAB]));
        assert!(reader.try_take_frame().unwrap().is_none());
    }

    #[test]
    fn writer_consume_drops_acked_prefix() {
        let mut writer = FrameWriter::new();
        writer.push_frame(&Header { msg_type: 1, length: 0, sequence: 0 }, &[]).unwrap();
        let len = writer.as_slice().len();
        writer.consume(len);
        assert!(writer.is_empty());
    }
}
