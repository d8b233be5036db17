//! Ambient infrastructure shared by every crate in the R-Type server core:
//! structured logging, monotonic timing helpers and the error plumbing used
//! to bridge `std::io::Error` into the protocol/simulation error enums.

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

/// Process-lifetime identifier used purely for log correlation. Never
/// transmitted on the wire and carries no gameplay meaning.
pub type SessionId = u64;
