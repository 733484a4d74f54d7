//! Clocks and frame pacing.
//!
//! The frame loop reads one [`Clock`] per tick and hands the reading to every
//! flow, so tweens and procedural animation share a single time basis. A
//! [`Scheduler`] decides when the next tick may start.

use instant::{Duration, Instant};

/// Monotonic time since the scene started.
pub trait Clock {
    fn elapsed(&self) -> Duration;

    /// Called once per tick before the reading is taken.
    fn tick(&mut self) {}

    /// Restarts the time basis at zero.
    fn reset(&mut self);
}

/// Wall-clock time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn reset(&mut self) {
        self.started = Instant::now();
    }
}

/// Advances by a fixed step on every tick, independent of wall time.
///
/// The first tick reads zero, so the first frame sees a scene at `t = 0`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    step: Duration,
    elapsed: Duration,
    ticks: u64,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            elapsed: Duration::ZERO,
            ticks: 0,
        }
    }

    /// A clock stepping at `fps` frames per second.
    pub fn at_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn tick(&mut self) {
        if self.ticks > 0 {
            self.elapsed += self.step;
        }
        self.ticks += 1;
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.ticks = 0;
    }
}

/// Arranges for the next frame. Called once at the end of every tick.
pub trait Scheduler {
    fn next_frame(&mut self);
}

/// Schedules the next frame right away.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn next_frame(&mut self) {}
}

/// Sleeps until one frame interval has passed since the previous frame.
///
/// Frames that overrun the interval are not made up for; the next frame
/// starts immediately.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last: Instant,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Scheduler for FramePacer {
    fn next_frame(&mut self) {
        let spent = self.last.elapsed();
        if let Some(remaining) = self.interval.checked_sub(spent) {
            std::thread::sleep(remaining);
        } else {
            log::trace!("frame overran its interval by {:?}", spent - self.interval);
        }
        self.last = Instant::now();
    }
}
