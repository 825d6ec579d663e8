//! Integration tests for the level-gated diagnostic macros.
//!
//! These tests verify that `debug_log!` and `info_log!` record or suppress
//! messages according to the configured per-flag verbosity levels.

use logging::{
    DebugFlag, DiagnosticEvent, InfoFlag, VerbosityConfig, debug_log, drain_events, info_log,
    init,
};

// ============================================================================
// Emission Thresholds
// ============================================================================

#[test]
fn debug_log_emits_when_level_sufficient() {
    let mut config = VerbosityConfig::default();
    config.debug.deltasum = 2;
    init(config);
    drain_events();

    debug_log!(Deltasum, 1, "test message");

    let events = drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        DiagnosticEvent::Debug {
            flag,
            level,
            message,
        } => {
            assert_eq!(*flag, DebugFlag::Deltasum);
            assert_eq!(*level, 1);
            assert_eq!(message, "test message");
        }
        other => panic!("expected debug event, got {other:?}"),
    }
}

#[test]
fn debug_log_suppresses_when_level_insufficient() {
    let mut config = VerbosityConfig::default();
    config.debug.patch = 1;
    init(config);
    drain_events();

    debug_log!(Patch, 2, "should not appear");

    assert!(drain_events().is_empty());
}

#[test]
fn debug_log_emits_on_exact_level() {
    let mut config = VerbosityConfig::default();
    config.debug.sig = 3;
    init(config);
    drain_events();

    debug_log!(Sig, 3, "exact {}", "match");

    let events = drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "exact match");
}

#[test]
fn suppressed_messages_are_not_formatted() {
    struct Explodes;
    impl std::fmt::Display for Explodes {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            panic!("formatted a suppressed message");
        }
    }

    init(VerbosityConfig::default());
    debug_log!(Hash, 1, "{}", Explodes);
    assert!(drain_events().is_empty());
}

// ============================================================================
// Flag Independence
// ============================================================================

#[test]
fn flags_are_independent() {
    let mut config = VerbosityConfig::default();
    config.debug.io = 2;
    init(config);
    drain_events();

    debug_log!(Io, 1, "io visible");
    debug_log!(Job, 1, "job hidden");
    info_log!(Stats, 1, "stats hidden");

    let events = drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "io visible");
}

#[test]
fn info_log_uses_info_levels() {
    let mut config = VerbosityConfig::default();
    config.info.stats = 1;
    init(config);
    drain_events();

    info_log!(Stats, 1, "{} literal bytes", 10);

    let events = drain_events();
    assert_eq!(
        events,
        vec![DiagnosticEvent::Info {
            flag: InfoFlag::Stats,
            level: 1,
            message: "10 literal bytes".to_string(),
        }]
    );
}

#[test]
fn verbose_level_mapping_drives_macros() {
    init(VerbosityConfig::from_verbose_level(2));
    drain_events();

    debug_log!(Deltasum, 1, "level one");
    debug_log!(Deltasum, 2, "level two");

    let events = drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "level one");
}

#[cfg(feature = "serde")]
#[test]
fn verbosity_config_roundtrips_through_json() {
    let config = VerbosityConfig::from_verbose_level(3);
    let json = serde_json::to_string(&config).expect("serialize");
    let parsed: VerbosityConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, config);
}
