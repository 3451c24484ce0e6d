use biometrics::{Collector, Counter, Moments};

pub(crate) static TURNS_STARTED: Counter = Counter::new("thinker.chat.turns_started");
pub(crate) static TURNS_COMPLETED: Counter = Counter::new("thinker.chat.turns_completed");
pub(crate) static FORMAT_FAULTS: Counter = Counter::new("thinker.chat.format_faults");
pub(crate) static STREAM_FAULTS: Counter = Counter::new("thinker.chat.stream_faults");
pub(crate) static FRAGMENTS: Counter = Counter::new("thinker.chat.fragments");
pub(crate) static CLEARS: Counter = Counter::new("thinker.chat.clears");
pub(crate) static INTERRUPTS: Counter = Counter::new("thinker.chat.interrupts");
pub(crate) static TURN_DURATION: Moments = Moments::new("thinker.chat.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&TURNS_STARTED);
    collector.register_counter(&TURNS_COMPLETED);
    collector.register_counter(&FORMAT_FAULTS);
    collector.register_counter(&STREAM_FAULTS);
    collector.register_counter(&FRAGMENTS);
    collector.register_counter(&CLEARS);
    collector.register_counter(&INTERRUPTS);
    collector.register_moments(&TURN_DURATION);
}
