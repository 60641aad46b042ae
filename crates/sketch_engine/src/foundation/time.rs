//! Time management utilities
//!
//! The engine never reads the wall clock on its own: the host loop hands
//! over the elapsed time of every frame, and everything time-based
//! (delta time, deferred timers) is advanced from that value.

use super::collections::{SlotMap, TimerId};
use std::collections::VecDeque;
use std::time::Instant;

/// Number of recent frame rates kept by [`FrameClock`]
pub const FPS_READINGS: usize = 100;

/// Frame clock fed by the host loop
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    fps_readings: VecDeque<f32>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock at frame zero
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            fps_readings: VecDeque::with_capacity(FPS_READINGS),
        }
    }

    /// Advance by an explicit frame duration in seconds
    pub fn advance(&mut self, delta_seconds: f32) {
        self.delta_time = delta_seconds.max(0.0);
        self.total_time += self.delta_time;
        self.frame_count += 1;

        if self.delta_time > 0.0 {
            if self.fps_readings.len() == FPS_READINGS {
                self.fps_readings.pop_front();
            }
            self.fps_readings.push_back(1.0 / self.delta_time);
        }
    }

    /// Advance by the real time elapsed since the previous call
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        self.advance(elapsed);
    }

    /// Time since the last frame in seconds
    pub fn delta_time_seconds(&self) -> f32 {
        self.delta_time
    }

    /// Total time accumulated since the clock was created
    pub fn elapsed(&self) -> f32 {
        self.total_time
    }

    /// Number of frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }

    /// Frame rates of the most recent frames, oldest first
    ///
    /// Zero-length frames are not recorded.
    pub fn fps_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.fps_readings.iter().copied()
    }

    /// Mean of the recorded frame rates, zero before the first reading
    pub fn average_fps(&self) -> f32 {
        if self.fps_readings.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.fps_readings.len() as f32;
        self.fps_readings.iter().sum::<f32>() / count
    }

    /// Lowest and highest recorded frame rate
    pub fn fps_range(&self) -> Option<(f32, f32)> {
        self.fps_history().fold(None, |range, fps| match range {
            None => Some((fps, fps)),
            Some((low, high)) => Some((low.min(fps), high.max(fps))),
        })
    }
}

struct PendingTimer<C> {
    duration: f32,
    elapsed: f32,
    callback: C,
}

/// Deferred callbacks advanced once per frame
///
/// Timers are not asynchronous: a timer fires synchronously inside the
/// `advance` call that pushes its counter past the duration. Cancelling a
/// timer means removing it before that happens.
pub struct TimerQueue<C> {
    timers: SlotMap<TimerId, PendingTimer<C>>,
    order: Vec<TimerId>,
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerQueue<C> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Schedule `callback` to fire once `seconds` of advanced time elapsed
    pub fn after(&mut self, seconds: f32, callback: C) -> TimerId {
        let id = self.timers.insert(PendingTimer {
            duration: seconds.max(0.0),
            elapsed: 0.0,
            callback,
        });
        self.order.push(id);
        id
    }

    /// Remove a timer before it fires, returns false if it already fired
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if self.timers.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    /// Advance every timer and return the callbacks that are now due,
    /// in scheduling order
    pub fn advance(&mut self, delta_seconds: f32) -> Vec<C> {
        let mut due = Vec::new();
        let timers = &mut self.timers;
        self.order.retain(|&id| {
            let Some(timer) = timers.get_mut(id) else {
                return false;
            };
            timer.elapsed += delta_seconds;
            if timer.elapsed >= timer.duration {
                if let Some(timer) = timers.remove(id) {
                    due.push(timer.callback);
                }
                false
            } else {
                true
            }
        });
        due
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when no timer is pending
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
        self.order.clear();
    }
}
