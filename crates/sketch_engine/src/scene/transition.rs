//! Timed transitions between Scenes
//!
//! A transition runs for `duration` seconds. The active Scene is swapped
//! once `switch_at` seconds have passed; the effect is asked to draw its
//! progress every tick until the transition is done.

use crate::render::Canvas;

/// Visuals of a transition, supplied by the host
pub trait TransitionEffect {
    /// The transition started
    fn start(&mut self) {}

    /// Draw the transition at `progress` in `0..=1`
    fn display(&mut self, progress: f32, canvas: &mut dyn Canvas);
}

/// Effect that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffect;

impl TransitionEffect for NoEffect {
    fn display(&mut self, _progress: f32, _canvas: &mut dyn Canvas) {}
}

/// An in-flight switch from the active Scene to another one
pub struct SceneTransition {
    duration: f32,
    switch_at: f32,
    timer: f32,
    effect: Box<dyn TransitionEffect>,
}

impl std::fmt::Debug for SceneTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneTransition")
            .field("duration", &self.duration)
            .field("switch_at", &self.switch_at)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl SceneTransition {
    /// Transition lasting `duration` seconds that switches halfway
    pub fn new(duration: f32, effect: impl TransitionEffect + 'static) -> Self {
        Self::with_switch_at(duration, duration / 2.0, effect)
    }

    /// Transition that switches Scenes after `switch_at` seconds
    ///
    /// Both values are clamped: `duration` to be non-negative and
    /// `switch_at` into `0..=duration`.
    pub fn with_switch_at(duration: f32, switch_at: f32, effect: impl TransitionEffect + 'static) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            switch_at: switch_at.min(duration).max(0.0),
            timer: 0.0,
            effect: Box::new(effect),
        }
    }

    /// Total length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds after which the Scene is swapped
    pub fn switch_at(&self) -> f32 {
        self.switch_at
    }

    /// Fraction of the transition that has elapsed, in `0..=1`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.timer / self.duration).min(1.0)
        }
    }

    /// True once the Scene swap point has been reached
    pub fn has_switched(&self) -> bool {
        self.timer >= self.switch_at
    }

    /// True once the whole duration has elapsed
    pub fn is_done(&self) -> bool {
        self.timer >= self.duration
    }

    pub(crate) fn start(&mut self) {
        self.timer = 0.0;
        self.effect.start();
    }

    pub(crate) fn advance(&mut self, delta_seconds: f32) {
        self.timer += delta_seconds;
    }

    pub(crate) fn display(&mut self, canvas: &mut dyn Canvas) {
        let progress = self.progress();
        self.effect.display(progress, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_switch_is_halfway() {
        let transition = SceneTransition::new(2.0, NoEffect);
        assert_relative_eq!(transition.switch_at(), 1.0);
    }

    #[test]
    fn test_switch_point_is_clamped() {
        let transition = SceneTransition::with_switch_at(1.0, 5.0, NoEffect);
        assert_relative_eq!(transition.switch_at(), 1.0);

        let transition = SceneTransition::with_switch_at(-1.0, -1.0, NoEffect);
        assert_relative_eq!(transition.duration(), 0.0);
        assert!(transition.is_done());
    }

    #[test]
    fn test_progress_and_edges() {
        let mut transition = SceneTransition::new(1.0, NoEffect);
        transition.start();
        transition.advance(0.25);
        assert!(!transition.has_switched());
        assert_relative_eq!(transition.progress(), 0.25);

        transition.advance(0.25);
        assert!(transition.has_switched());
        assert!(!transition.is_done());

        transition.advance(0.75);
        assert!(transition.is_done());
        assert_relative_eq!(transition.progress(), 1.0);
    }
}
