use crate::scene::NodeHandle;

/// Node property an animation track writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    /// `transform.position`
    Translation,
    /// `transform.rotation`
    Rotation,
    /// `transform.scale`
    Scale,
}

/// Track `track_index` of a clip resolved to a concrete node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
