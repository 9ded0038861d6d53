/// Uniform grid over the XZ plane bucketing static triangles by bounding box
use glam::{IVec2, Vec3};
use std::collections::HashMap;

/// Inclusive XZ rectangle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct XzBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl XzBounds {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// XZ footprint of a triangle
    pub fn of_triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            min_x: a.x.min(b.x).min(c.x),
            max_x: a.x.max(b.x).max(c.x),
            min_z: a.z.min(b.z).min(c.z),
            max_z: a.z.max(b.z).max(c.z),
        }
    }

    /// Square of half-width `radius` around (x, z)
    pub fn around(x: f32, z: f32, radius: f32) -> Self {
        let r = radius.abs();
        Self::new(x - r, x + r, z - r, z + r)
    }

    pub fn overlaps(&self, other: &XzBounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_z <= other.max_z
            && other.min_z <= self.max_z
    }
}

/// Static spatial hash. Rebuild from scratch to change the geometry.
#[derive(Debug, Clone)]
pub struct SpatialHashXZ {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<IVec2, Vec<u32>>,
}

impl SpatialHashXZ {
    /// A non-positive or non-finite `cell_size` falls back to 1.0.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn cell_of(&self, x: f32, z: f32) -> IVec2 {
        IVec2::new(
            (x * self.inv_cell_size).floor() as i32,
            (z * self.inv_cell_size).floor() as i32,
        )
    }

    /// Inclusive cell range covered by `bounds`, or `None` for non-finite bounds
    fn cell_range(&self, bounds: &XzBounds) -> Option<(IVec2, IVec2)> {
        let finite = [bounds.min_x, bounds.max_x, bounds.min_z, bounds.max_z]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return None;
        }
        Some((
            self.cell_of(bounds.min_x, bounds.min_z),
            self.cell_of(bounds.max_x, bounds.max_z),
        ))
    }

    /// Add `index` to every cell the bounds touch.
    pub fn insert(&mut self, index: u32, bounds: &XzBounds) {
        let Some((lo, hi)) = self.cell_range(bounds) else {
            return;
        };
        for z in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                self.cells.entry(IVec2::new(x, z)).or_default().push(index);
            }
        }
    }

    /// Union of indices in every cell the bounds touch, each listed once,
    /// in ascending order.
    pub fn query(&self, bounds: &XzBounds) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(bounds, &mut out);
        out
    }

    /// `query` into a caller-owned buffer (cleared first). Does not allocate
    /// once the buffer has grown to the largest result.
    pub fn query_into(&self, bounds: &XzBounds, out: &mut Vec<u32>) {
        out.clear();
        let Some((lo, hi)) = self.cell_range(bounds) else {
            return;
        };
        for z in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                if let Some(bucket) = self.cells.get(&IVec2::new(x, z)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        // Triangles spanning several cells appear once per cell
        out.sort_unstable();
        out.dedup();
    }
}
