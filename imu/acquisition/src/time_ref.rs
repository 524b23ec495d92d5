use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of wall-clock and monotonic readings.
pub trait Clock {
    /// Monotonic instant, never runs backward.
    fn now(&self) -> Instant;

    /// Whole seconds since the Unix epoch.
    fn wall_clock_secs(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock_secs(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => since_epoch.as_secs() as i64,
            Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
        }
    }
}

/// Pairs a wall-clock second with the monotonic instant at which it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReference {
    wall_clock_secs: i64,
    anchor: Instant,
}

impl TimeReference {
    pub fn new(wall_clock_secs: i64, anchor: Instant) -> Self {
        TimeReference {
            wall_clock_secs,
            anchor,
        }
    }

    /// Spins until the wall-clock second rolls over, then captures both clocks.
    ///
    /// Preemption between the two final reads widens the skew between them;
    /// nothing detects or corrects that.
    pub fn synchronize<C: Clock + ?Sized>(clock: &C) -> Self {
        let start = clock.wall_clock_secs();
        while clock.wall_clock_secs() <= start {
            std::hint::spin_loop();
        }
        let wall_clock_secs = clock.wall_clock_secs();
        let anchor = clock.now();
        TimeReference::new(wall_clock_secs, anchor)
    }

    pub fn wall_clock_secs(&self) -> i64 {
        self.wall_clock_secs
    }

    pub fn anchor(&self) -> Instant {
        self.anchor
    }

    /// Whole microseconds from the anchor to `now`, truncated.
    pub fn elapsed_micros(&self, now: Instant) -> i64 {
        let micros = now.saturating_duration_since(self.anchor).as_micros();
        i64::try_from(micros).unwrap_or(i64::MAX)
    }
}
