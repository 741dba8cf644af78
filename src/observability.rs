use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("caremind.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("caremind.client.request_errors");
pub(crate) static CLIENT_UNAUTHORIZED: Counter = Counter::new("caremind.client.unauthorized");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("caremind.client.request_duration_seconds");

pub(crate) static STORE_SAVE_FAILURES: Counter = Counter::new("caremind.store.save_failures");
pub(crate) static STORE_CLEAR_FAILURES: Counter = Counter::new("caremind.store.clear_failures");

pub(crate) static REVEAL_TASKS: Counter = Counter::new("caremind.reveal.tasks");
pub(crate) static REVEAL_STEPS: Counter = Counter::new("caremind.reveal.steps");
pub(crate) static REVEAL_CANCELLED: Counter = Counter::new("caremind.reveal.cancelled");

pub(crate) static SESSION_STARTS: Counter = Counter::new("caremind.session.starts");
pub(crate) static SESSION_TURNS: Counter = Counter::new("caremind.session.turns");
pub(crate) static SESSION_RESETS: Counter = Counter::new("caremind.session.resets");
pub(crate) static SESSION_FALLBACKS: Counter = Counter::new("caremind.session.fallback_messages");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_UNAUTHORIZED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STORE_SAVE_FAILURES);
    collector.register_counter(&STORE_CLEAR_FAILURES);

    collector.register_counter(&REVEAL_TASKS);
    collector.register_counter(&REVEAL_STEPS);
    collector.register_counter(&REVEAL_CANCELLED);

    collector.register_counter(&SESSION_STARTS);
    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_RESETS);
    collector.register_counter(&SESSION_FALLBACKS);
}
