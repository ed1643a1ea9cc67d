//! Keyframe Animation
//!
//! - [`KeyframeTrack`]: cursor-accelerated keyframe sampling
//! - [`AnimationClip`]: named set of tracks addressed by node name
//! - [`Binder`]: resolves track node names inside a scene subtree
//! - [`AnimationAction`]: playback state of one clip (time, loop, fades)
//! - [`AnimationMixer`]: weighted blending of actions into node transforms

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{ActionEvent, AnimationAction, LoopMode, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::{ActionHandle, AnimationMixer, MixerEvent};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
