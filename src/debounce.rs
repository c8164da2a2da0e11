use std::time::{Duration, Instant};

pub const DATA_INPUT_WAIT: Duration = Duration::from_millis(300);

/// Leading and trailing edge debouncer driven by caller-supplied timestamps.
///
/// The first call after a quiet period goes through at once. Calls inside the wait window
/// are held, and the latest one is released once the window has passed without new calls.
#[derive(Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    last_call: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Debouncer {
            wait,
            last_call: None,
            pending: None,
        }
    }

    fn quiet(&self, now: Instant) -> bool {
        match self.last_call {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.wait,
        }
    }

    /// Offer a value. Returns it back when it should be applied right away.
    pub fn call(&mut self, value: T, now: Instant) -> Option<T> {
        let quiet = self.quiet(now);
        self.last_call = Some(now);
        if quiet {
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the held value once the wait has elapsed since the last call.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.quiet(now) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Release the held value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drop any held value and forget the window.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_call = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
