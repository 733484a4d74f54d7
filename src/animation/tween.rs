//! Time-driven scalar interpolation.
//!
//! A [`Tween`] is configured with a builder and handed to a [`TweenEngine`]
//! with [`Tween::start`]. The engine is advanced once per frame with the
//! elapsed scene time and a mutable target (usually the scene graph); every
//! tween whose delay has passed receives the target and its current value.
//!
//! ```
//! use std::time::Duration;
//! use flow_scenes::animation::{easing::Easing, tween::{Tween, TweenEngine}};
//!
//! let mut engine: TweenEngine<f32> = TweenEngine::new();
//! Tween::new(0.0, 10.0, Duration::from_secs(2))
//!     .easing(Easing::QuadraticInOut)
//!     .on_update(|target: &mut f32, value| *target = value)
//!     .start(&mut engine)
//!     .unwrap();
//!
//! let mut value = 0.0;
//! engine.advance(Duration::from_secs(1), &mut value);
//! assert_eq!(value, 5.0);
//! ```

use std::fmt::Debug;

use instant::Duration;
use log::debug;
use thiserror::Error;

use crate::animation::easing::Easing;

#[derive(Debug, Error, PartialEq)]
pub enum TweenError {
    #[error("tween duration must be positive, got {0:?}")]
    NonPositiveDuration(Duration),
    #[error("tween endpoint {0} is not a finite number")]
    NonFinite(f32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId(usize);

/// What happens once a tween reaches its end value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    Never,
    /// Run this many additional times.
    Times(u32),
    Forever,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStatus {
    /// Started, but the delay has not passed yet.
    Pending,
    Running,
    Completed,
    Stopped,
}

impl TweenStatus {
    pub fn is_active(self) -> bool {
        matches!(self, TweenStatus::Pending | TweenStatus::Running)
    }
}

type OnUpdate<T> = Box<dyn FnMut(&mut T, f32)>;

pub struct Tween<T> {
    from: f32,
    to: f32,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    repeat: Repeat,
    on_update: Option<OnUpdate<T>>,
}

impl<T> Tween<T> {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::Linear,
            repeat: Repeat::Never,
            on_update: None,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn on_update(mut self, on_update: impl FnMut(&mut T, f32) + 'static) -> Self {
        self.on_update = Some(Box::new(on_update));
        self
    }

    /// Registers the tween; its clock starts at the engine's current time.
    pub fn start(self, engine: &mut TweenEngine<T>) -> Result<TweenId, TweenError> {
        engine.start(self)
    }

    fn validate(&self) -> Result<(), TweenError> {
        if self.duration.is_zero() {
            return Err(TweenError::NonPositiveDuration(self.duration));
        }
        for endpoint in [self.from, self.to] {
            if !endpoint.is_finite() {
                return Err(TweenError::NonFinite(endpoint));
            }
        }
        Ok(())
    }

    /// Value and whether this was the final tick, `local` being the time since the delay ended.
    fn sample(&self, local: Duration) -> (f32, bool) {
        let cycles = (local.as_secs_f64() / self.duration.as_secs_f64()).floor();
        let finished = match self.repeat {
            Repeat::Never => cycles >= 1.0,
            Repeat::Times(n) => cycles >= n as f64 + 1.0,
            Repeat::Forever => false,
        };
        if finished {
            return (self.to, true);
        }
        let into_cycle = local.as_secs_f64() - cycles * self.duration.as_secs_f64();
        let t = (into_cycle / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32;
        (self.from + (self.to - self.from) * self.easing.apply(t), false)
    }
}

impl<T> Debug for Tween<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("repeat", &self.repeat)
            .finish()
    }
}

#[derive(Debug)]
struct Entry<T> {
    tween: Tween<T>,
    start: Duration,
    status: TweenStatus,
    value: Option<f32>,
}

/// Owns running tweens and advances them against a shared clock reading.
pub struct TweenEngine<T> {
    entries: Vec<Option<Entry<T>>>,
    now: Duration,
}

impl<T> TweenEngine<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            now: Duration::ZERO,
        }
    }

    /// The elapsed time of the last [`advance`](Self::advance).
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn start(&mut self, tween: Tween<T>) -> Result<TweenId, TweenError> {
        tween.validate()?;
        debug!("starting {:?} at {:?}", tween, self.now);
        let id = TweenId(self.entries.len());
        self.entries.push(Some(Entry {
            tween,
            start: self.now,
            status: TweenStatus::Pending,
            value: None,
        }));
        Ok(id)
    }

    /**
     * Updates every active tween to `elapsed` and invokes its callback.
     *
     * Tweens still waiting for their delay are skipped. The tick that reaches
     * the end emits exactly the target value and completes the tween; later
     * calls leave it alone. Returns the number of callbacks invoked.
     */
    pub fn advance(&mut self, elapsed: Duration, target: &mut T) -> usize {
        self.now = elapsed;
        let mut fired = 0;
        for entry in self.entries.iter_mut().flatten() {
            if !entry.status.is_active() {
                continue;
            }
            let begin = entry.start + entry.tween.delay;
            let Some(local) = elapsed.checked_sub(begin) else {
                continue;
            };
            let (value, finished) = entry.tween.sample(local);
            entry.value = Some(value);
            entry.status = if finished {
                TweenStatus::Completed
            } else {
                TweenStatus::Running
            };
            if let Some(on_update) = entry.tween.on_update.as_mut() {
                on_update(target, value);
            }
            fired += 1;
        }
        fired
    }

    /// The last value handed to the callback, if the tween has run at all.
    pub fn value(&self, id: TweenId) -> Option<f32> {
        self.entry(id).and_then(|e| e.value)
    }

    pub fn status(&self, id: TweenId) -> Option<TweenStatus> {
        self.entry(id).map(|e| e.status)
    }

    /// Stops an active tween. Returns `false` if it was unknown or already finished.
    pub fn stop(&mut self, id: TweenId) -> bool {
        match self.entries.get_mut(id.0).and_then(Option::as_mut) {
            Some(entry) if entry.status.is_active() => {
                entry.status = TweenStatus::Stopped;
                true
            }
            _ => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|e| e.status.is_active())
            .count()
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Drops completed and stopped tweens along with their callbacks.
    pub fn clear_completed(&mut self) {
        for slot in self.entries.iter_mut() {
            if slot.as_ref().is_some_and(|e| !e.status.is_active()) {
                *slot = None;
            }
        }
    }

    fn entry(&self, id: TweenId) -> Option<&Entry<T>> {
        self.entries.get(id.0).and_then(Option::as_ref)
    }
}

impl<T> Default for TweenEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}
