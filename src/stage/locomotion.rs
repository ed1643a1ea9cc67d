//! Click-to-walk movement.
//!
//! A walk is a straight line from the character's position to a target
//! clamped into the platform bounds, traversed at constant speed. Progress
//! is a function of elapsed wall-clock time, so the frame rate never changes
//! how long a walk takes.

use glam::Vec3;

use crate::stage::platform::PlatformBounds;

/// A walk in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkPlan {
    pub start: Vec3,
    /// Resolved (clamped) target.
    pub target: Vec3,
    /// Facing for the duration of the walk, radians about +Y.
    pub yaw: f32,
    /// Seconds; zero for a walk of zero length.
    pub duration: f32,
    pub started_at: f32,
}

impl WalkPlan {
    /// Fraction of the walk completed at time `now`, in [0, 1].
    #[must_use]
    pub fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn position_at(&self, now: f32) -> Vec3 {
        self.start.lerp(self.target, self.progress(now))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkProgress {
    Moving(Vec3),
    /// The walk finished this step at the given position.
    Arrived(Vec3),
}

#[derive(Debug, Clone)]
pub struct Locomotion {
    bounds: PlatformBounds,
    seconds_per_unit: f32,
    active: Option<WalkPlan>,
}

impl Locomotion {
    #[must_use]
    pub fn new(bounds: PlatformBounds, seconds_per_unit: f32) -> Self {
        Self {
            bounds,
            seconds_per_unit,
            active: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn bounds(&self) -> &PlatformBounds {
        &self.bounds
    }

    /// The walking flag.
    #[inline]
    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.active.is_some()
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&WalkPlan> {
        self.active.as_ref()
    }

    /// Starts a walk from `from` toward `raw_target` at time `now`.
    ///
    /// Returns `None` while a walk is already in progress. The target is
    /// clamped into the bounds and keeps the height of `from`.
    pub fn begin(&mut self, from: Vec3, raw_target: Vec3, now: f32) -> Option<WalkPlan> {
        if self.active.is_some() {
            return None;
        }

        let target = self.bounds.clamp(Vec3::new(raw_target.x, from.y, raw_target.z));
        let delta = target - from;
        let distance = delta.length();
        let yaw = if distance > f32::EPSILON { delta.x.atan2(delta.z) } else { 0.0 };

        let plan = WalkPlan {
            start: from,
            target,
            yaw,
            duration: distance * self.seconds_per_unit,
            started_at: now,
        };
        self.active = Some(plan);
        Some(plan)
    }

    /// Position of the walk at time `now`; `None` when not walking.
    ///
    /// Reports [`WalkProgress::Arrived`] exactly once per walk and clears
    /// the walking flag when it does.
    pub fn advance(&mut self, now: f32) -> Option<WalkProgress> {
        let plan = self.active?;
        if plan.progress(now) >= 1.0 {
            self.active = None;
            Some(WalkProgress::Arrived(plan.target))
        } else {
            Some(WalkProgress::Moving(plan.position_at(now)))
        }
    }
}
