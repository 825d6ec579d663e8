//! crates/checksums/src/rolling/error.rs

use thiserror::Error;

/// Errors that can occur while updating the rolling checksum state.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RollingError {
    /// The checksum window is empty, preventing the rolling update from making progress.
    #[error("rolling checksum requires a non-empty window")]
    EmptyWindow,
    /// The checksum window length exceeds what can be represented in 32 bits.
    #[error("rolling checksum window of {len} bytes exceeds 32-bit limit")]
    WindowTooLarge {
        /// Number of bytes present in the rolling window when the error was raised.
        len: usize,
    },
}
