//! crates/checksums/src/rolling/mod.rs
//! Rolling checksum implementation for delta encoding.
//!
//! The rolling checksum is a weak but fast checksum used to identify candidate
//! blocks. Updating the checksum for a window shifted by one byte requires
//! O(1) work rather than recomputing the whole window.
//!
//! # Algorithm
//!
//! This is the Adler-32 style checksum used by rsync. It keeps two 16-bit
//! components, a plain byte sum and a sum of the running prefix sums, which can
//! be updated incrementally as the window slides over data.
//!
//! # Example
//!
//! ```rust
//! use checksums::RollingChecksum;
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"hello");
//!
//! // Slide window: remove 'h', add '!'
//! rolling.roll(b'h', b'!').unwrap();
//! ```

mod checksum;
mod digest;
mod error;

pub use checksum::RollingChecksum;
pub use digest::RollingDigest;
pub use error::RollingError;
