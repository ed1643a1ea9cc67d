use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end once, then finish.
    Once,
    /// Wrap around to the start at the end.
    Loop,
}

/// Notable moments reported by [`AnimationAction::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    /// A `LoopMode::Once` action reached its end. Reported once per play.
    Finished,
    /// A looping action wrapped around.
    Looped,
}

/// A sampled track value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

/// Linear weight ramp in progress.
#[derive(Debug, Clone, Copy)]
struct WeightFade {
    elapsed: f32,
    duration: f32,
    from: f32,
    to: f32,
}

/// Playback state of one clip.
///
/// The contribution of an action to the final pose is
/// [`effective_weight`](Self::effective_weight): the user `weight` times the
/// current fade value. A fade that ends at zero disables the action.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,
    /// With `LoopMode::Once`: hold the last frame when finished instead of
    /// dropping out of the blend.
    pub clamp_when_finished: bool,

    pub bindings: Vec<PropertyBinding>,

    fade_value: f32,
    fade: Option<WeightFade>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            clamp_when_finished: false,
            bindings: Vec::new(),
            fade_value: 1.0,
            fade: None,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Makes the action take part in the blend.
    pub fn play(&mut self) -> &mut Self {
        self.enabled = true;
        self
    }

    /// Rewinds to the start, unpauses and cancels any fade.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
        self.fade = None;
        self.fade_value = 1.0;
        self.track_cursors.fill(KeyframeCursor::default());
        self
    }

    /// Removes the action from the blend and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.reset();
        self.enabled = false;
        self
    }

    /// Ramps the fade value from 0 to 1 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 0.0, 1.0);
        self
    }

    /// Ramps the fade value from 1 to 0 over `duration` seconds, then disables.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 1.0, 0.0);
        self
    }

    fn schedule_fade(&mut self, duration: f32, from: f32, to: f32) {
        if duration <= 0.0 {
            self.fade = None;
            self.finish_fade(to);
            return;
        }
        self.fade_value = from;
        self.fade = Some(WeightFade {
            elapsed: 0.0,
            duration,
            from,
            to,
        });
    }

    fn finish_fade(&mut self, to: f32) {
        self.fade_value = to;
        if to <= 0.0 {
            self.enabled = false;
            self.fade_value = 1.0;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Weight this action blends in with this frame.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if self.enabled { self.weight * self.fade_value } else { 0.0 }
    }

    /// Whether the action is enabled and advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && !self.paused && self.time_scale != 0.0
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advances fades and local time by `dt` seconds.
    ///
    /// Fades progress even while the action is paused, so a clamped action
    /// can be faded out.
    pub fn update(&mut self, dt: f32) -> Option<ActionEvent> {
        if !self.enabled {
            return None;
        }

        self.advance_fade(dt);
        if !self.enabled || self.paused {
            return None;
        }

        let duration = self.clip.duration;
        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration || self.time < 0.0 {
                    self.time = self.time.clamp(0.0, duration);
                    if self.clamp_when_finished {
                        self.paused = true;
                    } else {
                        self.enabled = false;
                    }
                    return Some(ActionEvent::Finished);
                }
                None
            }
            LoopMode::Loop => {
                if duration <= 0.0 {
                    self.time = 0.0;
                    return None;
                }
                if self.time >= duration || self.time < 0.0 {
                    self.time = self.time.rem_euclid(duration);
                    return Some(ActionEvent::Looped);
                }
                None
            }
        }
    }

    fn advance_fade(&mut self, dt: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        fade.elapsed += dt;
        let progress = (fade.elapsed / fade.duration).clamp(0.0, 1.0);
        let (from, to) = (fade.from, fade.to);

        if progress >= 1.0 {
            self.fade = None;
            self.finish_fade(to);
        } else {
            self.fade_value = from + (to - from) * progress;
        }
    }

    /// Value of track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)),
            TrackData::Quaternion(t) => TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor)),
        })
    }
}
