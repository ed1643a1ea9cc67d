//! Animation Mixer
//!
//! Owns a set of [`AnimationAction`]s bound to one scene subtree and blends
//! their samples into node transforms each frame.
//!
//! # Blending
//!
//! For every animated property, the samples of all enabled actions are
//! accumulated as a running weighted average. If the accumulated weight is
//! below one, the result is mixed with the property's rest value (captured
//! when the first action bound to it was created), so a lone action fading
//! in eases the node out of its rest pose.
//!
//! # Cross-fades
//!
//! [`AnimationMixer::cross_fade`] fades one action out and another in over
//! the same duration. Actions whose fade-out completes are disabled.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::animation::action::{ActionEvent, AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    pub struct ActionHandle;
}

/// Event raised during [`AnimationMixer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerEvent {
    Finished(ActionHandle),
    Looped(ActionHandle),
}

type PropertyKey = (NodeHandle, TargetPath);

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    value: TrackValue,
    weight: f32,
}

pub struct AnimationMixer {
    actions: SlotMap<ActionHandle, AnimationAction>,
    rest_pose: FxHashMap<PropertyKey, TrackValue>,
    accumulators: FxHashMap<PropertyKey, Accumulator>,

    /// Total mixer time in seconds.
    pub time: f32,
    /// Scales every `dt` fed to [`AnimationMixer::update`].
    pub time_scale: f32,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: SlotMap::with_key(),
            rest_pose: FxHashMap::default(),
            accumulators: FxHashMap::default(),
            time: 0.0,
            time_scale: 1.0,
        }
    }

    /// Creates an action for `clip`, bound to the subtree under `root`.
    ///
    /// The action starts disabled: call `play` (or cross-fade into it) to
    /// make it contribute.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>, root: NodeHandle, scene: &Scene) -> ActionHandle {
        let bindings = Binder::bind(scene, root, &clip);

        for binding in &bindings {
            let key = (binding.node_handle, binding.target);
            if self.rest_pose.contains_key(&key) {
                continue;
            }
            if let Some(node) = scene.get_node(binding.node_handle) {
                let t = &node.transform;
                let rest = match binding.target {
                    TargetPath::Translation => TrackValue::Vector3(t.position),
                    TargetPath::Rotation => TrackValue::Quaternion(t.rotation),
                    TargetPath::Scale => TrackValue::Vector3(t.scale),
                };
                self.rest_pose.insert(key, rest);
            }
        }

        let mut action = AnimationAction::new(clip);
        action.bindings = bindings;
        action.enabled = false;
        self.actions.insert(action)
    }

    /// Adds a pre-bound action as is.
    pub fn add_action(&mut self, action: AnimationAction) -> ActionHandle {
        self.actions.insert(action)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    /// First action whose clip is named `name`.
    #[must_use]
    pub fn find_action(&self, name: &str) -> Option<ActionHandle> {
        self.actions
            .iter()
            .find(|(_, a)| a.clip().name == name)
            .map(|(h, _)| h)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    /// Fades `from` out and `to` in over `duration` seconds.
    ///
    /// `to` is not reset here; callers that want a fresh start reset it first.
    pub fn cross_fade(&mut self, from: Option<ActionHandle>, to: ActionHandle, duration: f32) {
        if let Some(from) = from.filter(|&f| f != to)
            && let Some(action) = self.actions.get_mut(from)
        {
            action.fade_out(duration);
        }
        if let Some(action) = self.actions.get_mut(to) {
            action.play().fade_in(duration);
        }
    }

    /// Advances every action by `dt` and writes the blended pose.
    ///
    /// Returns the events raised this step, in action order.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> Vec<MixerEvent> {
        let dt = dt * self.time_scale;
        self.time += dt;

        let mut events = Vec::new();
        for (handle, action) in &mut self.actions {
            match action.update(dt) {
                Some(ActionEvent::Finished) => events.push(MixerEvent::Finished(handle)),
                Some(ActionEvent::Looped) => events.push(MixerEvent::Looped(handle)),
                None => {}
            }
        }

        self.accumulators.clear();
        for action in self.actions.values_mut() {
            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }
            accumulate(action, weight, &mut self.accumulators);
        }

        for (&(node_handle, target), acc) in &self.accumulators {
            let value = match self.rest_pose.get(&(node_handle, target)) {
                Some(rest) if acc.weight < 1.0 => mix(*rest, acc.value, acc.weight),
                _ => acc.value,
            };

            let Some(node) = scene.get_node_mut(node_handle) else {
                continue;
            };
            match (target, value) {
                (TargetPath::Translation, TrackValue::Vector3(v)) => node.transform.position = v,
                (TargetPath::Scale, TrackValue::Vector3(v)) => node.transform.scale = v,
                (TargetPath::Rotation, TrackValue::Quaternion(q)) => node.transform.rotation = q,
                _ => {}
            }
        }

        events
    }
}

fn accumulate(action: &mut AnimationAction, weight: f32, accumulators: &mut FxHashMap<PropertyKey, Accumulator>) {
    for i in 0..action.bindings.len() {
        let binding = action.bindings[i];
        let Some(value) = action.sample_track(binding.track_index) else {
            continue;
        };

        accumulators
            .entry((binding.node_handle, binding.target))
            .and_modify(|acc| {
                let total = acc.weight + weight;
                acc.value = mix(acc.value, value, weight / total);
                acc.weight = total;
            })
            .or_insert(Accumulator { value, weight });
    }
}

/// Interpolates from `a` toward `b`; mismatched kinds keep `b`.
fn mix(a: TrackValue, b: TrackValue, t: f32) -> TrackValue {
    match (a, b) {
        (TrackValue::Vector3(a), TrackValue::Vector3(b)) => TrackValue::Vector3(Vec3::lerp(a, b, t)),
        (TrackValue::Quaternion(a), TrackValue::Quaternion(b)) => TrackValue::Quaternion(Quat::slerp(a, b, t)),
        (_, b) => b,
    }
}
