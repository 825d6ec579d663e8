//! crates/logging/src/macros.rs
//! Level-gated diagnostic macros.

/// Records a debug diagnostic when the flag's level is at least `level`.
///
/// The message is only formatted when it will be recorded.
///
/// ```
/// use logging::{VerbosityConfig, debug_log, drain_events, init};
///
/// let mut config = VerbosityConfig::default();
/// config.debug.patch = 1;
/// init(config);
///
/// debug_log!(Patch, 1, "copy {} bytes", 42);
/// assert_eq!(drain_events()[0].message(), "copy 42 bytes");
/// ```
#[macro_export]
macro_rules! debug_log {
    ($flag:ident, $level:expr, $($arg:tt)+) => {{
        let level: u8 = $level;
        if $crate::debug_gte($crate::DebugFlag::$flag, level) {
            $crate::emit_debug($crate::DebugFlag::$flag, level, ::std::format!($($arg)+));
        }
    }};
}

/// Records an info diagnostic when the flag's level is at least `level`.
#[macro_export]
macro_rules! info_log {
    ($flag:ident, $level:expr, $($arg:tt)+) => {{
        let level: u8 = $level;
        if $crate::info_gte($crate::InfoFlag::$flag, level) {
            $crate::emit_info($crate::InfoFlag::$flag, level, ::std::format!($($arg)+));
        }
    }};
}
