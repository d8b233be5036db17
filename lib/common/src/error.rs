use std::io;

/// Shared taxonomy of transport-level failure causes, reused by both the
/// protocol crate (`rt-proto::ProtoError`) and the simulation crate so a
/// single `From<io::Error>` impl can live here instead of being duplicated.
#[derive(Debug, Eq, PartialEq, Clone, Copy, thiserror::Error)]
pub enum IoFailure {
    #[error("operation would block")]
    WouldBlock,
    #[error("connection reset by peer")]
    Reset,
    #[error("io error: {0:?}")]
    Other(io::ErrorKind),
}

impl From<io::Error> for IoFailure {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock => IoFailure::WouldBlock,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => IoFailure::Reset,
            kind => IoFailure::Other(kind),
        }
    }
}

impl IoFailure {
    /// Whether this failure represents "try again later" rather than a hard
    /// fault, mirroring the teacher's `ErrorUtils::has_failed`.
    pub fn is_transient(&self) -> bool {
        matches!(self, IoFailure::WouldBlock)
    }
}
