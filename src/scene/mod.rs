/// Scene data consumed by the render pipeline and the collider builder.
/// Loaders (OBJ, glTF, ...) live outside this crate and only need to
/// produce these shapes.
use crate::config::RenderConfig;
use crate::error::MeshError;
use crate::rendering::Rgba8;
use glam::{Mat4, Vec2, Vec3};
use std::sync::Arc;

/// Nearest-sampled 2D texel source (no mipmapping, no wrap)
pub trait TextureSampler: Send + Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Texel at integer coordinates. Callers keep `x < width`, `y < height`.
    fn texel(&self, x: usize, y: usize) -> Rgba8;
}

/// Row-major RGBA8 image
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Rgba8>,
}

impl Texture {
    /// Build from row-major texels. Returns `None` when the sizes disagree
    /// or the image is empty.
    pub fn from_texels(width: usize, height: usize, texels: Vec<Rgba8>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            texels,
        })
    }

    /// Single-color texture
    pub fn solid(width: usize, height: usize, color: Rgba8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            texels: vec![color; width * height],
        }
    }

    /// Two-color checkerboard with `cell`-texel squares
    pub fn checkerboard(width: usize, height: usize, cell: usize, a: Rgba8, b: Rgba8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cell = cell.max(1);
        let texels = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width,
            height,
            texels,
        }
    }
}

impl TextureSampler for Texture {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn texel(&self, x: usize, y: usize) -> Rgba8 {
        self.texels[y * self.width + x]
    }
}

/// Indexed triangle mesh.
///
/// Invariants (checked by `new`): every index is in range, and UVs, when
/// present, are one per position.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Vec3>,
    uvs: Option<Vec<Vec2>>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(
        positions: Vec<Vec3>,
        uvs: Option<Vec<Vec2>>,
        indices: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        if let Some(uvs) = &uvs {
            if uvs.len() != positions.len() {
                return Err(MeshError::UvCountMismatch {
                    uvs: uvs.len(),
                    positions: positions.len(),
                });
            }
        }
        let vertex_count = positions.len();
        for (triangle, tri) in indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            positions,
            uvs,
            indices,
        })
    }

    /// Axis-aligned cube centered at the origin, CCW-outward winding,
    /// with per-face UVs (vertices are duplicated per face).
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        // +X, -X, +Y, -Y, +Z, -Z; corners CCW seen from outside
        let faces: [[Vec3; 4]; 6] = [
            [Vec3::new(h, -h, h), Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h)],
            [Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h)],
            [Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h), Vec3::new(-h, h, -h)],
            [Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h)],
            [Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h)],
            [Vec3::new(h, -h, -h), Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h)],
        ];
        let face_uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(12);
        for corners in faces {
            let base = positions.len() as u32;
            positions.extend_from_slice(&corners);
            uvs.extend_from_slice(&face_uvs);
            indices.push([base, base + 1, base + 2]);
            indices.push([base, base + 2, base + 3]);
        }
        Self {
            positions,
            uvs: Some(uvs),
            indices,
        }
    }

    /// Flat square in the XZ plane at height `y`, facing +Y.
    pub fn quad_xz(half_extent: f32, y: f32) -> Self {
        let h = half_extent;
        Self {
            positions: vec![
                Vec3::new(-h, y, h),
                Vec3::new(h, y, h),
                Vec3::new(h, y, -h),
                Vec3::new(-h, y, -h),
            ],
            uvs: Some(vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ]),
            indices: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// World-space corners of triangle `i` under `model`
    #[inline]
    pub fn triangle_world(&self, i: usize, model: &Mat4) -> [Vec3; 3] {
        let [a, b, c] = self.indices[i];
        [
            model.transform_point3(self.positions[a as usize]),
            model.transform_point3(self.positions[b as usize]),
            model.transform_point3(self.positions[c as usize]),
        ]
    }
}

/// Surface appearance, shared read-only between primitives
#[derive(Clone)]
pub struct Material {
    pub name: String,
    /// Linear 0..1 base color
    pub base_color: Vec3,
    pub texture: Option<Arc<dyn TextureSampler>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: Vec3::ONE,
            texture: None,
        }
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("base_color", &self.base_color)
            .field("textured", &self.texture.is_some())
            .finish()
    }
}

impl Material {
    pub fn colored(name: impl Into<String>, base_color: Vec3) -> Self {
        Self {
            name: name.into(),
            base_color,
            texture: None,
        }
    }

    pub fn textured(name: impl Into<String>, texture: Arc<dyn TextureSampler>) -> Self {
        Self {
            name: name.into(),
            base_color: Vec3::ONE,
            texture: Some(texture),
        }
    }
}

/// Mesh + material + placement, immutable for the duration of a frame
#[derive(Debug, Clone)]
pub struct Primitive {
    pub mesh: Arc<Mesh>,
    pub material: Arc<Material>,
    pub local_to_world: Mat4,
    /// Many real assets have inconsistent winding; when in doubt, disable.
    pub cull_backfaces: bool,
    /// Front-face winding in NDC (y up)
    pub front_face_ccw: bool,
}

impl Primitive {
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        Self {
            mesh,
            material,
            local_to_world: Mat4::IDENTITY,
            cull_backfaces: true,
            front_face_ccw: true,
        }
    }

    pub fn with_transform(mut self, local_to_world: Mat4) -> Self {
        self.local_to_world = local_to_world;
        self
    }

    pub fn with_culling(mut self, cull_backfaces: bool, front_face_ccw: bool) -> Self {
        self.cull_backfaces = cull_backfaces;
        self.front_face_ccw = front_face_ccw;
        self
    }
}

/// Omnidirectional light
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// 0..1 per channel
    pub color: Vec3,
    pub intensity: f32,
}

impl PointLight {
    pub const fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }
}

/// Everything drawn in a frame: primitives, lights and an ambient term
#[derive(Debug, Clone)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub lights: Vec<PointLight>,
    pub ambient: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            primitives: Vec::new(),
            lights: Vec::new(),
            ambient: RenderConfig::default().ambient,
        }
    }
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self {
            primitives,
            ..Self::default()
        }
    }

    /// Take the ambient term from render configuration.
    pub fn with_config(mut self, config: &RenderConfig) -> Self {
        self.ambient = config.ambient;
        self
    }

    pub fn with_lights(mut self, lights: Vec<PointLight>, ambient: f32) -> Self {
        self.lights = lights;
        self.ambient = ambient;
        self
    }

    /// Total triangle count across all primitives
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.mesh.triangle_count()).sum()
    }
}
