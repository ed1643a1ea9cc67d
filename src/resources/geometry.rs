use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Smallest box containing every point; `None` for an empty set.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }
}

/// Indexed triangle mesh data, CPU side.
///
/// Attribute arrays are parallel; `normals` and `uvs` are always as long as
/// `positions`. Skinning attributes are either empty or full length.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,

    bounding_box: Option<BoundingBox>,
}

impl Geometry {
    /// Missing normals default to +Y and missing UVs to zero.
    #[must_use]
    pub fn new(
        positions: Vec<[f32; 3]>,
        mut normals: Vec<[f32; 3]>,
        mut uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        let count = positions.len();
        normals.resize(count, [0.0, 1.0, 0.0]);
        uvs.resize(count, [0.0, 0.0]);

        let mut geometry = Self {
            positions,
            normals,
            uvs,
            joints: Vec::new(),
            weights: Vec::new(),
            indices,
            bounding_box: None,
        };
        geometry.compute_bounding_box();
        geometry
    }

    /// Attaches skinning attributes. Mismatched lengths are ignored.
    #[must_use]
    pub fn with_skin(mut self, joints: Vec<[u16; 4]>, weights: Vec<[f32; 4]>) -> Self {
        if joints.len() == self.positions.len() && weights.len() == self.positions.len() {
            self.joints = joints;
            self.weights = weights;
        } else {
            log::warn!(
                "Skin attribute length mismatch ({} joints, {} weights, {} vertices), geometry left unskinned",
                joints.len(),
                weights.len(),
                self.positions.len()
            );
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Local-space bounds of the positions.
    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn compute_bounding_box(&mut self) {
        self.bounding_box = BoundingBox::from_points(self.positions.iter().map(|&p| Vec3::from(p)));
    }
}
