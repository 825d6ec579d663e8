#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` provides the verbosity flag system shared by every crate in the
//! deltasync workspace. Diagnostics are grouped into info and debug
//! categories ([`InfoFlag`], [`DebugFlag`]); each category carries a numeric
//! level and a message is only recorded when the configured level for its
//! category is at least the level the message was emitted with.
//!
//! # Design
//!
//! Configuration lives in thread-local storage so that independent jobs
//! running on separate threads never contend on a lock. The
//! [`debug_log!`] and [`info_log!`] macros check the level before formatting,
//! which keeps disabled diagnostics free on the hot paths of the delta
//! encoder. Recorded events are buffered per thread and can be drained with
//! [`drain_events`] by an embedding application or a test.
//!
//! When the `tracing` feature is enabled, [`tracing_bridge::DeltaLayer`]
//! routes `tracing` events whose target starts with `deltasync::` onto the
//! same flags.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, VerbosityConfig, debug_log, drain_events, init};
//!
//! let mut config = VerbosityConfig::default();
//! config.debug.deltasum = 2;
//! init(config);
//!
//! debug_log!(Deltasum, 1, "matched block {}", 7);
//! debug_log!(Deltasum, 3, "suppressed");
//!
//! let events = drain_events();
//! assert_eq!(events.len(), 1);
//! ```

mod config;
mod levels;
mod macros;
mod thread_local;

#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub mod tracing_bridge;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};
pub use thread_local::{
    DiagnosticEvent, apply_debug_flag, apply_info_flag, debug_gte, drain_events, emit_debug,
    emit_info, info_gte, init,
};

#[cfg(feature = "tracing")]
pub use tracing_bridge::{DeltaLayer, init_tracing, init_tracing_with_filter};
