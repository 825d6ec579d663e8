#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `signature` describes a basis stream as an ordered list of per-block
//! records: the rolling weak checksum of each block and a truncated strong
//! digest that disambiguates weak collisions.
//!
//! # Design
//!
//! - [`SignatureOptions`] and [`resolve_layout`] turn caller preferences and
//!   an optional basis size hint into concrete block and digest lengths.
//! - [`SignatureBuilder`] is a [`streaming::JobStep`] that hashes the basis
//!   as it is fed in, emits the serialized signature and keeps the resulting
//!   [`SignatureSet`].
//! - [`LoadSignature`] is the inverse job: it parses serialized signature
//!   bytes back into a [`SignatureSet`].
//! - The [`wire`] module owns the big-endian on-disk representation.
//! - With the `parallel` feature, [`parallel::generate_signatures_parallel`]
//!   builds signatures for many independent buffers on the rayon pool.
//!
//! # Examples
//!
//! ```
//! use signature::{SignatureOptions, generate_signature};
//!
//! let basis = vec![7u8; 10_000];
//! let options = SignatureOptions::new().with_block_len(1024);
//! let set = generate_signature(&mut basis.as_slice(), options).expect("signature");
//! assert_eq!(set.len(), 10);
//! assert_eq!(set.block_len(), 1024);
//! ```

mod algorithm;
mod block;
mod error;
mod generation;
mod layout;
mod load;
mod set;
pub mod wire;

#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub mod parallel;

pub use algorithm::SignatureAlgorithm;
pub use block::SignatureBlock;
pub use error::SignatureError;
pub use generation::{SignatureBuilder, generate_signature, signature_of};
pub use layout::{
    DEFAULT_BLOCK_LEN, DEFAULT_STRONG_LEN, LayoutError, MAX_BLOCK_LEN, SignatureLayout,
    SignatureOptions, resolve_layout,
};
pub use load::{LoadSignature, load_signature};
pub use set::SignatureSet;
