use parking_lot::Mutex;

/// Read-only view of the narration transport. The engine samples this once
/// per tick and never writes back; the owner is free to pause, seek or loop
/// the underlying audio between samples.
pub trait ClockSource: Send + Sync {
    /// Current playback position in seconds, or `None` when no position is
    /// available (no track loaded, clock not yet started, ...).
    fn current_time_secs(&self) -> Option<f64>;
}

/// Clock that is never available. An engine following it runs off its own
/// local timer instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullClock;

impl ClockSource for NullClock {
    fn current_time_secs(&self) -> Option<f64> {
        None
    }
}

/// Externally driven clock for tests and headless previews: the driver sets
/// the position, the engine reads it.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: Mutex<Option<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, secs: f64) {
        *self.time.lock() = Some(secs);
    }

    pub fn clear(&self) {
        *self.time.lock() = None;
    }
}

impl ClockSource for ManualClock {
    fn current_time_secs(&self) -> Option<f64> {
        *self.time.lock()
    }
}
