use rt_common::error::IoFailure;

/// Reasons a raw buffer fails the wire-level validation rules of
/// `spec.md` §4.1, matching the teacher's `NetworkError`/`ErrorType` split
/// closely enough for call sites to apply the §7 policy by matching on the
/// variant rather than a string.
#[derive(Debug, Eq, PartialEq, Clone, Copy, thiserror::Error)]
pub enum ProtoError {
    #[error("frame shorter than the 8-byte header")]
    TruncatedHeader,
    #[error("declared payload length does not match the bytes received")]
    LengthMismatch,
    #[error("payload length exceeds the 24-bit (16 MiB) frame limit")]
    PayloadTooLarge,
    #[error("unknown message type byte {0:#04x} for this channel")]
    UnknownMessageType(u8),
    #[error("message type {0:#04x} received a payload of the wrong size")]
    InvalidPayloadSize(u8),
    #[error("io failure: {0}")]
    Io(IoFailure),
}

impl From<std::io::Error> for ProtoError {
    fn from(err: std::io::Error) -> Self {
        ProtoError::Io(err.into())
    }
}

impl ProtoError {
    /// Whether this is a transient "try again" condition rather than a
    /// protocol violation worth counting against the repeat-offender limit
    /// in `spec.md` §7 kind 1.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProtoError::Io(io) if io.is_transient())
    }
}
