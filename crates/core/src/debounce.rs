//! Trailing-edge debounce driven by caller-supplied clocks.
//!
//! Browser timers stay on the JavaScript side; the owner feeds event and poll
//! timestamps in milliseconds and asks whether the debounced action is due.
//! There is no cancellation beyond a stale deadline being replaced by the
//! next event.

/// One debounced action's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    /// Creates a debouncer with the given trailing delay.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Records an event at `now_ms`, pushing the deadline out.
    pub fn note_event(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Returns true (once) when the deadline has passed at `now_ms`.
    pub fn fire_ready(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether an action is scheduled and not yet fired.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops any scheduled action.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
