//! Ray queries used for picking.
//!
//! All intersection functions report the nearest hit at a non-negative
//! distance along the ray. A ray starting inside a volume hits its far side.

use glam::Vec3;

use crate::resources::BoundingBox;

const PARALLEL_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length (or zero for a degenerate ray, which hits nothing).
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
}

impl RayHit {
    fn along(ray: &Ray, distance: f32) -> Self {
        Self {
            distance,
            point: ray.at(distance),
        }
    }
}

/// Slab test against an axis-aligned box.
#[must_use]
pub fn intersect_aabb(ray: &Ray, bbox: &BoundingBox) -> Option<RayHit> {
    if ray.direction == Vec3::ZERO {
        return None;
    }

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let (lo, hi) = (bbox.min[axis], bbox.max[axis]);

        if dir.abs() < PARALLEL_EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let (t0, t1) = {
            let a = (lo - origin) * inv;
            let b = (hi - origin) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    let distance = if t_near >= 0.0 { t_near } else { t_far };
    Some(RayHit::along(ray, distance))
}

/// Moller-Trumbore test against a single triangle. Both windings hit.
#[must_use]
pub fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<RayHit> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then(|| RayHit::along(ray, t))
}

/// Nearest hit against an indexed triangle list. Triangles with an index
/// outside `positions` are skipped.
#[must_use]
pub fn intersect_triangles(ray: &Ray, positions: &[Vec3], indices: &[u32]) -> Option<RayHit> {
    indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let a = *positions.get(tri[0] as usize)?;
            let b = *positions.get(tri[1] as usize)?;
            let c = *positions.get(tri[2] as usize)?;
            intersect_triangle(ray, a, b, c)
        })
        .min_by(|x, y| x.distance.total_cmp(&y.distance))
}

/// Finite, capped cylinder with its axis parallel to Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderVolume {
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

impl CylinderVolume {
    #[inline]
    #[must_use]
    pub fn top(&self) -> f32 {
        self.center.y + self.half_height
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_height
    }

    /// Nearest intersection with the side wall or either cap.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }

        let r2 = self.radius * self.radius;
        let mut nearest: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && nearest.is_none_or(|n| t < n) {
                nearest = Some(t);
            }
        };

        // Side wall: |(o + t d - c).xz| = r
        let ox = ray.origin.x - self.center.x;
        let oz = ray.origin.z - self.center.z;
        let (dx, dz) = (ray.direction.x, ray.direction.z);
        let a = dx * dx + dz * dz;
        if a > PARALLEL_EPSILON {
            let b = 2.0 * (ox * dx + oz * dz);
            let c = ox * ox + oz * oz - r2;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant >= 0.0 {
                let sqrt_d = discriminant.sqrt();
                for t in [(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)] {
                    let y = ray.origin.y + t * ray.direction.y;
                    if (y - self.center.y).abs() <= self.half_height {
                        consider(t);
                    }
                }
            }
        }

        // Caps
        if ray.direction.y.abs() > PARALLEL_EPSILON {
            for cap_y in [self.top(), self.bottom()] {
                let t = (cap_y - ray.origin.y) / ray.direction.y;
                let p = ray.at(t);
                let px = p.x - self.center.x;
                let pz = p.z - self.center.z;
                if px * px + pz * pz <= r2 {
                    consider(t);
                }
            }
        }

        nearest.map(|t| RayHit::along(ray, t))
    }
}

/// Intersection with the horizontal plane `y = height`, in front of the ray.
#[must_use]
pub fn intersect_ground_plane(ray: &Ray, height: f32) -> Option<RayHit> {
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (height - ray.origin.y) / ray.direction.y;
    (t >= 0.0).then(|| RayHit::along(ray, t))
}
