//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and the verbosity flag system.
//!
//! [`DeltaLayer`] is a `tracing-subscriber` layer that maps events whose
//! target names a deltasync subsystem (`deltasync::delta`, `deltasync::sig`,
//! ...) onto [`DebugFlag`]/[`InfoFlag`] categories and records them through
//! the same thread-local event buffer as [`debug_log!`](crate::debug_log).
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2));
//! tracing::debug!(target: "deltasync::delta", "window matched");
//! ```

use super::config::VerbosityConfig;
use super::levels::{DebugFlag, InfoFlag};
use super::thread_local::{debug_gte, emit_debug, emit_info, info_gte};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// A tracing layer that bridges tracing events to the verbosity flags.
pub struct DeltaLayer {
    _config: VerbosityConfig,
}

impl DeltaLayer {
    /// Create a new layer with the given verbosity configuration.
    #[must_use]
    pub const fn new(config: VerbosityConfig) -> Self {
        Self { _config: config }
    }

    fn subsystem(target: &str) -> Option<&str> {
        target.strip_prefix("deltasync::")
    }

    /// Map a tracing target to an info flag.
    fn target_to_info_flag(target: &str) -> Option<InfoFlag> {
        match Self::subsystem(target)? {
            "stats" => Some(InfoFlag::Stats),
            "misc" => Some(InfoFlag::Misc),
            _ => None,
        }
    }

    /// Map a tracing target to a debug flag.
    fn target_to_debug_flag(target: &str) -> Option<DebugFlag> {
        match Self::subsystem(target)? {
            "delta" | "deltasum" => Some(DebugFlag::Deltasum),
            "hash" | "match" => Some(DebugFlag::Hash),
            "io" => Some(DebugFlag::Io),
            "job" => Some(DebugFlag::Job),
            "patch" => Some(DebugFlag::Patch),
            "sig" | "signature" => Some(DebugFlag::Sig),
            _ => None,
        }
    }

    const fn level_to_verbosity_level(level: &Level) -> u8 {
        match *level {
            Level::ERROR | Level::WARN | Level::INFO => 1,
            Level::DEBUG => 2,
            Level::TRACE => 3,
        }
    }
}

impl<S> Layer<S> for DeltaLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        let verbosity_level = Self::level_to_verbosity_level(metadata.level());

        if let Some(debug_flag) = Self::target_to_debug_flag(target) {
            if debug_gte(debug_flag, verbosity_level) {
                let mut visitor = MessageVisitor::default();
                event.record(&mut visitor);
                if let Some(message) = visitor.message {
                    emit_debug(debug_flag, verbosity_level, message);
                }
            }
            return;
        }

        if let Some(info_flag) = Self::target_to_info_flag(target) {
            if info_gte(info_flag, verbosity_level) {
                let mut visitor = MessageVisitor::default();
                event.record(&mut visitor);
                if let Some(message) = visitor.message {
                    emit_info(info_flag, verbosity_level, message);
                }
            }
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Installs a global subscriber that routes tracing events through [`DeltaLayer`].
///
/// Also initialises the calling thread's verbosity configuration.
pub fn init_tracing(config: VerbosityConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());
    tracing_subscriber::registry()
        .with(DeltaLayer::new(config))
        .init();
}

/// Like [`init_tracing`], with an additional filter layer (for example an `EnvFilter`).
pub fn init_tracing_with_filter<F>(config: VerbosityConfig, filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());
    tracing_subscriber::registry()
        .with(filter)
        .with(DeltaLayer::new(config))
        .init();
}
