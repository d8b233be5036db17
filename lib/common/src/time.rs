use std::time::{Duration, SystemTime};

/// Current unix timestamp in seconds, matching `flux::time::timestamp_secs`.
#[inline]
pub fn timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

/// Convert a `Duration` into a `f32` seconds delta, clamping to avoid NaN on
/// absurd durations (host clock jump, suspended process, ...).
#[inline]
pub fn duration_to_delta(duration: Duration) -> f32 {
    duration.as_secs_f32()
}
