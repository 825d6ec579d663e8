#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Block matching, delta encoding and patch application.
//!
//! - [`MatchTable`] indexes a finished [`signature::SignatureSet`] by weak
//!   checksum and verifies candidates with the strong digest.
//! - [`DeltaEncoder`] slides a block-sized window over the target and emits
//!   COPY and LITERAL commands in the format described in [`wire`].
//! - [`PatchApplier`] replays a delta against any [`BasisSource`].
//! - [`DeltaScript`] and [`DeltaToken`] give an in-memory view of a delta.
//!
//! All three stream-processing types are [`streaming::JobStep`]
//! implementations and are driven through [`streaming::Job`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use matching::{DeltaEncoder, MatchTable, PatchApplier};
//! use signature::{SignatureOptions, signature_of};
//! use streaming::iterate_growing;
//!
//! let basis = b"the quick brown fox jumps over the lazy dog".to_vec();
//! let target = b"the quick brown cat jumps over the lazy dog".to_vec();
//!
//! let options = SignatureOptions::new().with_block_len(8);
//! let table = Arc::new(MatchTable::build(signature_of(&basis, options).unwrap()));
//!
//! let mut encoder = DeltaEncoder::begin(table);
//! let mut delta = Vec::new();
//! iterate_growing(&mut encoder, &target, &mut delta).unwrap();
//! iterate_growing(&mut encoder, &[], &mut delta).unwrap();
//!
//! let mut applier = PatchApplier::begin(basis.as_slice());
//! let mut rebuilt = Vec::new();
//! iterate_growing(&mut applier, &delta, &mut rebuilt).unwrap();
//! assert_eq!(rebuilt, target);
//! ```

mod apply;
mod error;
mod generator;
mod index;
mod script;
pub mod wire;

pub use apply::{ApplyStats, BasisSource, PatchApplier, SeekSource, apply_delta};
pub use error::DeltaError;
pub use generator::{DeltaEncoder, EncodeStats, generate_delta};
pub use index::MatchTable;
pub use script::{DeltaScript, DeltaToken};
