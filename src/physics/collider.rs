/// Static triangle collider built once from a scene, queried every physics step.
use super::geometry::{ray_triangle, CollisionTriangle};
use super::spatial_hash::{SpatialHashXZ, XzBounds};
use crate::count_add;
use crate::scene::Scene;
use glam::Vec3;
use rayon::prelude::*;

/// Triangle list + its XZ spatial hash
#[derive(Debug, Clone)]
pub struct Collider {
    triangles: Vec<CollisionTriangle>,
    grid: SpatialHashXZ,
}

impl Collider {
    /// Build from already world-space triangles.
    pub fn from_triangles(triangles: Vec<CollisionTriangle>, cell_size: f32) -> Self {
        let mut grid = SpatialHashXZ::new(cell_size);
        for (i, tri) in triangles.iter().enumerate() {
            grid.insert(i as u32, &tri.bounds);
        }
        Self { triangles, grid }
    }

    /// Walk every primitive's triangles under its world matrix.
    ///
    /// Primitives are transformed in parallel; triangle order (and so each
    /// triangle's index) follows scene order.
    pub fn from_scene(scene: &Scene, cell_size: f32) -> Self {
        crate::perf_scope!("collider_build");
        let per_primitive: Vec<Vec<CollisionTriangle>> = scene
            .primitives
            .par_iter()
            .map(|prim| {
                let world: Vec<Vec3> = prim
                    .mesh
                    .positions()
                    .iter()
                    .map(|&p| prim.local_to_world.transform_point3(p))
                    .collect();
                prim.mesh
                    .indices()
                    .iter()
                    .map(|&[i0, i1, i2]| {
                        CollisionTriangle::new(
                            world[i0 as usize],
                            world[i1 as usize],
                            world[i2 as usize],
                        )
                    })
                    .collect()
            })
            .collect();

        let triangles: Vec<CollisionTriangle> = per_primitive.into_iter().flatten().collect();
        let collider = Self::from_triangles(triangles, cell_size);
        log::debug!(
            "collider built: {} triangles from {} primitives, {} cells (cell size {})",
            collider.triangle_count(),
            scene.primitives.len(),
            collider.cell_count(),
            collider.grid.cell_size()
        );
        collider
    }

    #[inline]
    pub fn triangles(&self) -> &[CollisionTriangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle(&self, index: u32) -> &CollisionTriangle {
        &self.triangles[index as usize]
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    #[inline]
    pub fn grid(&self) -> &SpatialHashXZ {
        &self.grid
    }

    /// Candidate triangles whose cells touch the sphere's XZ square
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_sphere_into(center, radius, &mut out);
        out
    }

    pub fn query_sphere_into(&self, center: Vec3, radius: f32, out: &mut Vec<u32>) {
        self.grid
            .query_into(&XzBounds::around(center.x, center.z, radius), out);
        count_add!(crate::perf::FUNCTION_COUNTERS.collision_candidates, out.len());
    }

    /// Cast straight down from `(x, y0, z)` and return the world Y of the
    /// nearest hit, considering triangles within `query_radius` in XZ.
    pub fn raycast_down(&self, x: f32, z: f32, y0: f32, query_radius: f32) -> Option<f32> {
        let origin = Vec3::new(x, y0, z);
        self.grid
            .query(&XzBounds::around(x, z, query_radius))
            .into_iter()
            .filter_map(|i| ray_triangle(origin, Vec3::NEG_Y, self.triangle(i)))
            .min_by(f32::total_cmp)
            .map(|t| y0 - t)
    }

    /// Height of the first surface below `(x, y0, z)` with the default query radius
    pub fn ground_height(&self, x: f32, z: f32, y0: f32) -> Option<f32> {
        self.raycast_down(x, z, y0, DEFAULT_RAYCAST_RADIUS)
    }
}

/// XZ half-width searched by `ground_height`
pub const DEFAULT_RAYCAST_RADIUS: f32 = 4.0;
