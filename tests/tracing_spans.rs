//! tests/tracing_spans.rs
//!
//! The `tracing` feature reaches the instrumented functions of every crate.

#![cfg(feature = "tracing")]

use std::sync::{Arc, Mutex};

use deltasync::{SignatureOptions, apply_patch, build_match_table, build_signature, encode_delta};
use tracing::Subscriber;
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, Registry};

#[derive(Clone, Default)]
struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

impl<S> Layer<S> for SpanNames
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.0
            .lock()
            .expect("span names lock")
            .push(attrs.metadata().name());
    }
}

#[test]
fn caller_operations_open_spans() {
    let names = SpanNames::default();
    let subscriber = Registry::default().with(names.clone());

    tracing::subscriber::with_default(subscriber, || {
        let basis = vec![b'A'; 1000];
        let mut target = basis.clone();
        target[500..510].fill(b'B');

        let options = SignatureOptions::new().with_block_len(10);
        let signature = build_signature(&mut basis.as_slice(), options).expect("signature");
        let table = build_match_table(signature);
        let mut delta = Vec::new();
        encode_delta(&table, &mut target.as_slice(), &mut delta).expect("encode");
        let mut rebuilt = Vec::new();
        apply_patch(&mut delta.as_slice(), basis.as_slice(), &mut rebuilt).expect("patch");
        assert_eq!(rebuilt, target);
    });

    let names = names.0.lock().expect("span names lock");
    for expected in ["generate_signature", "generate_delta", "apply_delta"] {
        assert!(names.contains(&expected), "missing span {expected}: {names:?}");
    }
}
