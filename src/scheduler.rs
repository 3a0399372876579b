use std::time::Duration;

/// Nominal spacing between countdown ticks
pub const DEFAULT_TICK_MS: u64 = 250;

pub fn tick_interval() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Opaque id for an armed repeating tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Periodic callback source driving the countdown
pub trait Scheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Bookkeeping scheduler for a single-threaded run loop.
///
/// It never fires anything itself: the loop delivers ticks at `interval()`
/// while a handle is armed. At most one handle is armed at a time.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    next_id: u64,
    armed: Option<(TickHandle, Duration)>,
    times_armed: u64,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.armed.is_some())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.armed.map(|(_, interval)| interval)
    }

    pub fn times_armed(&self) -> u64 {
        self.times_armed
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        if let Some((previous, _)) = self.armed.replace((handle, interval)) {
            tracing::warn!(?previous, "replacing an armed ticker");
        }
        self.times_armed += 1;
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if matches!(self.armed, Some((armed, _)) if armed == handle) {
            self.armed = None;
        }
    }
}
