#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the two hash families the deltasync block matcher is
//! built on:
//!
//! - [`RollingChecksum`], the rsync-style weak checksum that can slide over a
//!   window one byte at a time in constant time.
//! - The [`strong`] digests ([`strong::Md4`], [`strong::Md5`],
//!   [`strong::Sha1`], [`strong::Xxh3_128`]) that verify weak-checksum
//!   candidates.
//!
//! Both are pure functions of their input bytes. Neither depends on the
//! position of the window within a stream.
//!
//! # Examples
//!
//! ```
//! use checksums::{RollingChecksum, RollingDigest};
//! use checksums::strong::{Md4, StrongDigest};
//!
//! let data = b"abcdefgh";
//! let mut rolling = RollingChecksum::new();
//! rolling.update(&data[..4]);
//! rolling.roll(data[0], data[4]).expect("window is non-empty");
//! assert_eq!(rolling.value(), RollingDigest::from_bytes(&data[1..5]).value());
//!
//! let digest = Md4::digest(&data[1..5]);
//! assert_eq!(digest.len(), Md4::DIGEST_LEN);
//! ```

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError};
