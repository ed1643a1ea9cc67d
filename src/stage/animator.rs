//! Character animation state machine.
//!
//! States are clip names: the resting `Idle` clip, the `Walking` loop and
//! any other clip as a one-shot gesture. Every transition is a cross-fade;
//! fading to the state that is already current does nothing.

use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngExt};
use rustc_hash::FxHashMap;

use crate::animation::{ActionHandle, AnimationClip, AnimationMixer, LoopMode, MixerEvent};
use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Walking,
    Gesture(String),
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Walking => write!(f, "Walking"),
            Self::Gesture(name) => write!(f, "Gesture({name})"),
        }
    }
}

pub struct AnimationController {
    mixer: AnimationMixer,
    actions: FxHashMap<String, ActionHandle>,
    /// Gesture clip names in load order.
    gestures: Vec<String>,
    idle_clip: String,
    walk_clip: String,

    state: AnimationState,
    current: Option<ActionHandle>,
    fade_duration: f32,
}

impl AnimationController {
    /// Binds every clip to the subtree under `root` and starts `idle_clip`.
    pub fn new(
        clips: &[Arc<AnimationClip>],
        root: NodeHandle,
        scene: &Scene,
        idle_clip: &str,
        walk_clip: &str,
        fade_duration: f32,
    ) -> Self {
        let mut mixer = AnimationMixer::new();
        let mut actions = FxHashMap::default();
        let mut gestures = Vec::new();

        for clip in clips {
            if actions.contains_key(&clip.name) {
                log::warn!("Duplicate animation clip '{}' ignored", clip.name);
                continue;
            }
            let handle = mixer.clip_action(Arc::clone(clip), root, scene);
            if clip.name != idle_clip && clip.name != walk_clip {
                gestures.push(clip.name.clone());
            }
            actions.insert(clip.name.clone(), handle);
        }

        for required in [idle_clip, walk_clip] {
            if !actions.contains_key(required) {
                log::warn!("Character has no '{required}' clip");
            }
        }

        let current = actions.get(idle_clip).copied();
        if let Some(action) = current.and_then(|h| mixer.action_mut(h)) {
            action.reset().play();
        }

        Self {
            mixer,
            actions,
            gestures,
            idle_clip: idle_clip.to_string(),
            walk_clip: walk_clip.to_string(),
            state: AnimationState::Idle,
            current,
            fade_duration,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == AnimationState::Idle
    }

    /// Clips other than idle and walk, in load order.
    #[must_use]
    pub fn gestures(&self) -> &[String] {
        &self.gestures
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    /// Action currently faded in, if its clip exists.
    #[must_use]
    pub fn current_action(&self) -> Option<ActionHandle> {
        self.current
    }

    fn clip_name<'a>(&'a self, state: &'a AnimationState) -> &'a str {
        match state {
            AnimationState::Idle => &self.idle_clip,
            AnimationState::Walking => &self.walk_clip,
            AnimationState::Gesture(name) => name,
        }
    }

    /// Cross-fades to `state`.
    ///
    /// Returns whether a transition started: fading to the current state, or
    /// to a state whose clip is missing, leaves everything unchanged.
    pub fn fade_to(&mut self, state: AnimationState) -> bool {
        if state == self.state {
            return false;
        }
        let Some(&to) = self.actions.get(self.clip_name(&state)) else {
            log::warn!("No clip for animation state {state}; staying in {}", self.state);
            return false;
        };

        if let Some(action) = self.mixer.action_mut(to) {
            action.reset();
            if matches!(state, AnimationState::Gesture(_)) {
                action.loop_mode = LoopMode::Once;
                action.clamp_when_finished = true;
            } else {
                action.loop_mode = LoopMode::Loop;
                action.clamp_when_finished = false;
            }
        }
        self.mixer.cross_fade(self.current, to, self.fade_duration);

        log::debug!("Animation {} -> {state}", self.state);
        self.current = Some(to);
        self.state = state;
        true
    }

    /// Starts a gesture picked uniformly among the gesture clips.
    ///
    /// Returns the name of the gesture that started. `None` when there are
    /// no gestures, or when the pick is the gesture already playing.
    pub fn play_random_gesture<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.gestures.is_empty() {
            return None;
        }
        let name = self.gestures[rng.random_range(0..self.gestures.len())].clone();
        self.fade_to(AnimationState::Gesture(name.clone())).then_some(name)
    }

    /// Advances the mixer by `dt` and writes the blended pose into `scene`.
    ///
    /// A gesture that finishes while it is still current fades back to
    /// `Idle`; returns whether that happened this step.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> bool {
        let events = self.mixer.update(dt, scene);

        let gesture_finished = matches!(self.state, AnimationState::Gesture(_))
            && events
                .iter()
                .any(|event| matches!(event, MixerEvent::Finished(h) if Some(*h) == self.current));

        gesture_finished && self.fade_to(AnimationState::Idle)
    }
}
