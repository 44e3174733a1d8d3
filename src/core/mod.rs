//! Core constants and error types.
//!
//! Everything in this module is independent of the feature-gated layers
//! and is always compiled.

mod constants;
mod error;

pub use constants::*;
pub use error::*;

/// Current time in whole seconds since the Unix epoch.
pub(crate) fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
