//! Fixed-timestep clock and autosave countdown.
//!
//! `draw_web()` fires at the display refresh rate with a variable delta.
//! [`TickClock`] turns wall-clock timestamps into whole ticks so the autosave
//! schedule does not depend on frame rate.

/// Game ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 10;

/// Most ticks released by one frame. A backgrounded tab resumes with at most
/// this much catch-up and then restarts its schedule.
const MAX_CATCH_UP_TICKS: u32 = 5;

/// Releases ticks as wall-clock deadlines pass.
pub struct TickClock {
    ms_per_tick: f64,
    /// When the next tick is due; `None` until the first frame.
    next_due: Option<f64>,
}

impl TickClock {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            next_due: None,
        }
    }

    /// Ticks whose deadline passed by `now_ms`. The first call only arms
    /// the schedule.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(due) = self.next_due else {
            self.next_due = Some(now_ms + self.ms_per_tick);
            return 0;
        };
        if now_ms < due {
            return 0;
        }
        let passed = ((now_ms - due) / self.ms_per_tick) as u32 + 1;
        if passed > MAX_CATCH_UP_TICKS {
            self.next_due = Some(now_ms + self.ms_per_tick);
            return MAX_CATCH_UP_TICKS;
        }
        self.next_due = Some(due + passed as f64 * self.ms_per_tick);
        passed
    }
}

/// Counts ticks down to the next save.
pub struct Autosave {
    interval: u32,
    elapsed: u32,
}

impl Autosave {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Returns true when a save is due. At most one save per call, however
    /// many intervals the ticks cover.
    pub fn tick(&mut self, ticks: u32) -> bool {
        self.elapsed = self.elapsed.saturating_add(ticks);
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            return true;
        }
        false
    }

    /// Restart the countdown, e.g. after a manual save.
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

/// Current time in ms from `performance.now()`, or the JS date clock when the
/// performance API is unavailable.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
