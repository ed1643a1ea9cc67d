use rustc_hash::FxHashMap;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves a clip's tracks against the subtree under `root`.
    ///
    /// Tracks are matched by node name; when several nodes share a name the
    /// first one in depth-first order wins. Tracks without a matching node
    /// are dropped.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut by_name: FxHashMap<&str, NodeHandle> = FxHashMap::default();
        for handle in scene.descendants(root) {
            if let Some(node) = scene.get_node(handle) {
                by_name.entry(node.name.as_str()).or_insert(handle);
            }
        }

        let bindings: Vec<PropertyBinding> = clip
            .tracks
            .iter()
            .enumerate()
            .filter_map(|(track_index, track)| {
                let node_handle = *by_name.get(track.meta.node_name.as_str())?;
                Some(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                })
            })
            .collect();

        if bindings.len() < clip.tracks.len() {
            log::debug!(
                "Clip '{}': {} of {} tracks bound",
                clip.name,
                bindings.len(),
                clip.tracks.len()
            );
        }

        bindings
    }
}
