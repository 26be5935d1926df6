use std::{cell::Cell, fmt, rc::Rc, time::Instant};

/// Millisecond time source for round timers.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Never decreases.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually driven clock. Clones share the same time, so a test can keep one
/// handle while the session owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(start_millis)),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.set(millis);
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get().saturating_add(millis));
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now.get())
            .finish()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

/// Elapsed-time source of one round. Reads are driven by explicit `now`
/// values; once stopped, every read returns the frozen value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimer {
    started_at: u64,
    frozen: Option<u64>,
}

impl RoundTimer {
    pub fn start(now: u64) -> Self {
        RoundTimer {
            started_at: now,
            frozen: None,
        }
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        self.frozen
            .unwrap_or_else(|| now.saturating_sub(self.started_at))
    }

    /// Freezes the timer. Stopping twice keeps the first frozen value.
    pub fn stop(&mut self, now: u64) {
        if self.frozen.is_none() {
            self.frozen = Some(now.saturating_sub(self.started_at));
        }
    }
}
