use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("a0.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("a0.client.request_errors");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("a0.stream.fragments");
pub(crate) static STREAM_BYTES: Counter = Counter::new("a0.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("a0.stream.ttfb_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("a0.stream.duration_seconds");

pub(crate) static REGISTRY_DUPLICATES: Counter = Counter::new("a0.registry.duplicates");
pub(crate) static REGISTRY_REJECTED: Counter = Counter::new("a0.registry.rejected");

pub(crate) static PLUGIN_DISPATCHES: Counter = Counter::new("a0.plugin.dispatches");
pub(crate) static PLUGIN_TERMINATIONS: Counter = Counter::new("a0.plugin.terminations");
pub(crate) static CLIPBOARD_FAILURES: Counter = Counter::new("a0.clipboard.failures");

pub(crate) static TURNS_COMPLETED: Counter = Counter::new("a0.turn.completed");
pub(crate) static TURNS_FAILED: Counter = Counter::new("a0.turn.failed");
pub(crate) static TURNS_INTERRUPTED: Counter = Counter::new("a0.turn.interrupted");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&REGISTRY_DUPLICATES);
    collector.register_counter(&REGISTRY_REJECTED);

    collector.register_counter(&PLUGIN_DISPATCHES);
    collector.register_counter(&PLUGIN_TERMINATIONS);
    collector.register_counter(&CLIPBOARD_FAILURES);

    collector.register_counter(&TURNS_COMPLETED);
    collector.register_counter(&TURNS_FAILED);
    collector.register_counter(&TURNS_INTERRUPTED);
}
