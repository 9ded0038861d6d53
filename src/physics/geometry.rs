/// Collision geometry queries against single triangles.
use super::spatial_hash::XzBounds;
use glam::Vec3;

/// Below this, a center-to-surface distance squared is treated as zero.
const DEGENERATE_DIST2: f32 = 1e-12;

/// Möller–Trumbore determinant and hit-distance tolerance
pub const RAY_EPSILON: f32 = 1e-8;

/// World-space triangle with its XZ footprint
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionTriangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub bounds: XzBounds,
}

impl CollisionTriangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            a,
            b,
            c,
            bounds: XzBounds::of_triangle(a, b, c),
        }
    }

    /// Unnormalized face normal (right-handed winding)
    #[inline]
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    #[inline]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        closest_point_on_triangle(p, self.a, self.b, self.c)
    }
}

/// Nearest point on the solid triangle `abc` to `p`.
///
/// Voronoi-region walk: vertex regions, edge regions, then the face.
/// Zero denominators from degenerate triangles fall back to the edge start
/// or to vertex `a`, so the result is always finite for finite input.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = ratio(d1, d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = ratio(d2, d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = ratio(d4 - d3, (d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom == 0.0 {
        return a;
    }
    let inv = 1.0 / denom;
    a + ab * (vb * inv) + ac * (vc * inv)
}

#[inline]
fn ratio(num: f32, denom: f32) -> f32 {
    if denom != 0.0 {
        num / denom
    } else {
        0.0
    }
}

/// Möller–Trumbore ray/triangle test. Returns the ray parameter `t > eps`
/// of the hit, or `None` for a miss, a parallel ray, or a hit behind the origin.
pub fn ray_triangle(origin: Vec3, dir: Vec3, tri: &CollisionTriangle) -> Option<f32> {
    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    let h = dir.cross(e2);
    let det = e1.dot(h);
    if det.abs() < RAY_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - tri.a;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = inv_det * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = inv_det * e2.dot(q);
    (t > RAY_EPSILON).then_some(t)
}

/// Sphere/triangle penetration
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Closest point on the triangle
    pub point: Vec3,
    /// Unit push-out direction, from the triangle toward the sphere center
    pub normal: Vec3,
    /// Penetration depth, `radius - distance`
    pub depth: f32,
}

impl Contact {
    /// Sphere center resting exactly on the surface along the normal
    #[inline]
    pub fn resolved_center(&self, radius: f32) -> Vec3 {
        self.point + self.normal * radius
    }
}

/// Contact when the sphere strictly overlaps the triangle.
/// A center lying on the surface pushes straight up.
pub fn sphere_contact(center: Vec3, radius: f32, tri: &CollisionTriangle) -> Option<Contact> {
    let point = tri.closest_point(center);
    let v = center - point;
    let d2 = v.length_squared();
    if d2 >= radius * radius {
        return None;
    }
    let (normal, distance) = if d2 > DEGENERATE_DIST2 {
        let d = d2.sqrt();
        (v / d, d)
    } else {
        (Vec3::Y, 0.0)
    };
    Some(Contact {
        point,
        normal,
        depth: radius - distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor() -> CollisionTriangle {
        CollisionTriangle::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn closest_point_on_edge_region() {
        let p = closest_point_on_triangle(
            Vec3::new(0.5, 0.0, -3.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_triangle_stays_finite() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let p = closest_point_on_triangle(Vec3::new(5.0, -1.0, 0.0), a, a, a);
        assert!(p.is_finite());
        assert_eq!(p, a);
    }

    #[test]
    fn upward_ray_misses_floor_below() {
        assert!(ray_triangle(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, &floor()).is_none());
        let t = ray_triangle(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, &floor());
        assert_relative_eq!(t.unwrap_or(f32::NAN), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn touching_sphere_has_no_contact() {
        assert!(sphere_contact(Vec3::new(0.0, 0.5, 0.0), 0.5, &floor()).is_none());
        let contact = sphere_contact(Vec3::new(0.0, 0.3, 0.0), 0.5, &floor());
        let contact = contact.unwrap_or_else(|| panic!("expected a contact"));
        assert_relative_eq!(contact.depth, 0.2, epsilon = 1e-6);
        assert_eq!(contact.normal, Vec3::Y);
    }

    #[test]
    fn center_on_surface_pushes_up() {
        let contact = sphere_contact(Vec3::ZERO, 0.35, &floor());
        let contact = contact.unwrap_or_else(|| panic!("expected a contact"));
        assert_eq!(contact.normal, Vec3::Y);
        assert_relative_eq!(contact.resolved_center(0.35).y, 0.35);
    }
}
