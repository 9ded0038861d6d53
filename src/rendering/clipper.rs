/// Homogeneous clip-volume polygon clipping (Sutherland-Hodgman)
///
/// Polygons live in a fixed-capacity stack buffer: a triangle gains at most
/// one vertex per plane, so six planes bound it at nine vertices.
use crate::count_call;
use glam::{Vec2, Vec4};

/// Upper bound on vertices of a triangle clipped against the six frustum planes.
pub const MAX_CLIP_VERTS: usize = 9;

/// Clip-space position with an optional texture coordinate
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipVertex {
    pub clip: Vec4,
    pub uv: Option<Vec2>,
}

impl ClipVertex {
    #[inline]
    pub const fn new(clip: Vec4, uv: Option<Vec2>) -> Self {
        Self { clip, uv }
    }

    /// Linear interpolation of position and (when both ends have one) UV.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let uv = match (self.uv, other.uv) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            _ => None,
        };
        Self {
            clip: self.clip + (other.clip - self.clip) * t,
            uv,
        }
    }
}

/// One of the six canonical clip planes (`-w <= x, y, z <= w`)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Signed distance, >= 0 inside.
    #[inline]
    pub fn signed_distance(self, c: Vec4) -> f32 {
        match self {
            ClipPlane::Left => c.x + c.w,
            ClipPlane::Right => -c.x + c.w,
            ClipPlane::Bottom => c.y + c.w,
            ClipPlane::Top => -c.y + c.w,
            ClipPlane::Near => c.z + c.w,
            ClipPlane::Far => -c.z + c.w,
        }
    }
}

/// Convex polygon in clip space, stored inline
#[derive(Copy, Clone, Debug)]
pub struct ClipPolygon {
    verts: [ClipVertex; MAX_CLIP_VERTS],
    len: usize,
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self {
            verts: [ClipVertex::new(Vec4::ZERO, None); MAX_CLIP_VERTS],
            len: 0,
        }
    }
}

impl ClipPolygon {
    pub fn triangle(a: ClipVertex, b: ClipVertex, c: ClipVertex) -> Self {
        let mut poly = Self::default();
        poly.push(a);
        poly.push(b);
        poly.push(c);
        poly
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[ClipVertex] {
        &self.verts[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a vertex. Convex input never exceeds capacity; anything past
    /// it is dropped.
    #[inline]
    pub fn push(&mut self, v: ClipVertex) {
        debug_assert!(self.len < MAX_CLIP_VERTS, "clip polygon overflow");
        if self.len < MAX_CLIP_VERTS {
            self.verts[self.len] = v;
            self.len += 1;
        }
    }

    /// Fan triangulation around the first vertex
    pub fn fan(&self) -> impl Iterator<Item = [ClipVertex; 3]> + '_ {
        let v = self.as_slice();
        (1..v.len().saturating_sub(1)).map(move |k| [v[0], v[k], v[k + 1]])
    }
}

/// Clip a convex polygon against one plane.
///
/// Vertices with signed distance >= 0 are kept; each edge that changes sides
/// contributes its intersection point, interpolated by the distance ratio.
/// An edge whose endpoints have equal distances contributes no intersection.
pub fn clip_against_plane(input: &ClipPolygon, plane: ClipPlane, output: &mut ClipPolygon) {
    output.clear();
    let verts = input.as_slice();
    let Some(&last) = verts.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_d = plane.signed_distance(prev.clip);
    let mut prev_in = prev_d >= 0.0;

    for &cur in verts {
        let cur_d = plane.signed_distance(cur.clip);
        let cur_in = cur_d >= 0.0;

        if prev_in != cur_in {
            let denom = prev_d - cur_d;
            if denom != 0.0 {
                output.push(prev.lerp(cur, prev_d / denom));
            }
        }
        if cur_in {
            output.push(cur);
        }

        prev = cur;
        prev_d = cur_d;
        prev_in = cur_in;
    }
}

/// Clip a triangle against the full clip volume.
/// Returns an empty polygon as soon as any plane leaves fewer than 3 vertices.
pub fn clip_triangle(a: ClipVertex, b: ClipVertex, c: ClipVertex) -> ClipPolygon {
    let mut current = ClipPolygon::triangle(a, b, c);
    let mut scratch = ClipPolygon::default();
    for plane in ClipPlane::ALL {
        clip_against_plane(&current, plane, &mut scratch);
        if scratch.len() < 3 {
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_clipped_away);
            return ClipPolygon::default();
        }
        std::mem::swap(&mut current, &mut scratch);
    }
    current
}
