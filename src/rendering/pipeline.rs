/// Mesh render pipeline: model -> world -> clip, clip, divide, cull, shade, rasterize.
use super::clipper::{clip_triangle, ClipVertex};
use super::rasterizer::{fill_triangle_textured_z, fill_triangle_z};
use super::shading::{quantize_color, shade_flat, Shade};
use super::sink::PixelSink;
use super::surface::DepthBuffer;
use crate::config::RenderConfig;
use crate::count_call;
use crate::scene::{Material, Mesh, Primitive, Scene, TextureSampler};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// View and projection for one frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub proj: Mat4,
}

impl ViewProjection {
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self { view, proj }
    }

    /// Combined `proj * view`
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.proj * self.view
    }
}

/// Per-primitive face culling settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceCulling {
    pub cull_backfaces: bool,
    /// Front faces are counter-clockwise in NDC (y up)
    pub front_face_ccw: bool,
}

impl Default for FaceCulling {
    fn default() -> Self {
        Self {
            cull_backfaces: true,
            front_face_ccw: true,
        }
    }
}

impl FaceCulling {
    pub const NONE: Self = Self {
        cull_backfaces: false,
        front_face_ccw: true,
    };

    /// True when a triangle with NDC signed twice-area `area` should be dropped.
    /// Zero-area triangles are dropped whenever culling is on.
    #[inline]
    pub fn rejects(self, area: f32) -> bool {
        if !self.cull_backfaces {
            return false;
        }
        if self.front_face_ccw {
            area <= 0.0
        } else {
            area >= 0.0
        }
    }
}

/// Counters for one or more `render_*` calls
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles_submitted: usize,
    pub triangles_clipped_away: usize,
    pub triangles_culled: usize,
    pub triangles_rasterized: usize,
    pub pixels_written: usize,
}

impl std::ops::AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles_submitted += rhs.triangles_submitted;
        self.triangles_clipped_away += rhs.triangles_clipped_away;
        self.triangles_culled += rhs.triangles_culled;
        self.triangles_rasterized += rhs.triangles_rasterized;
        self.pixels_written += rhs.pixels_written;
    }
}

/// Map NDC [-1, 1]^2 to pixel coordinates [0, w-1] x [0, h-1].
/// Y is flipped (NDC up, pixels down); z passes through unchanged as depth.
#[inline]
pub fn ndc_to_screen(ndc: Vec3, width: usize, height: usize) -> Vec3 {
    let w = width.saturating_sub(1) as f32;
    let h = height.saturating_sub(1) as f32;
    Vec3::new(
        (ndc.x * 0.5 + 0.5) * w,
        (1.0 - (ndc.y * 0.5 + 0.5)) * h,
        ndc.z,
    )
}

/// How a primitive's triangles reach the rasterizer, decided once per mesh.
enum Fill<'a> {
    Flat(Vec3),
    Textured {
        texture: &'a dyn TextureSampler,
        uvs: &'a [Vec2],
        shade_scale: Vec3,
    },
}

pub struct Renderer {
    /// Global backface culling switch, combined with the per-primitive flag
    pub backface_culling: bool,
    // Scratch buffers so each vertex is transformed once per mesh,
    // not once per triangle.
    world_positions: Vec<Vec3>,
    clip_positions: Vec<Vec4>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            backface_culling: true,
            world_positions: Vec::new(),
            clip_positions: Vec::new(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            backface_culling: config.backface_culling,
            ..Self::new()
        }
    }

    /// Render one mesh into `sink`, depth testing against `depth`.
    ///
    /// With a scene, each triangle gets flat lighting from its world-space
    /// normal and centroid; without one it is drawn unlit. Textured materials
    /// are used only when the mesh has UVs.
    #[allow(clippy::too_many_arguments)]
    pub fn render_mesh<S: PixelSink + ?Sized>(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        model: &Mat4,
        camera: &ViewProjection,
        scene: Option<&Scene>,
        culling: FaceCulling,
        sink: &mut S,
        depth: &mut DepthBuffer,
    ) -> FrameStats {
        count_call!(crate::perf::FUNCTION_COUNTERS.render_mesh_calls);
        let mut stats = FrameStats::default();
        if mesh.triangle_count() == 0 {
            return stats;
        }

        let view_proj = camera.matrix();
        self.world_positions.clear();
        self.world_positions
            .extend(mesh.positions().iter().map(|&p| model.transform_point3(p)));
        self.clip_positions.clear();
        self.clip_positions
            .extend(self.world_positions.iter().map(|&p| view_proj * p.extend(1.0)));

        let fill = match (material.texture.as_deref(), mesh.uvs()) {
            (Some(texture), Some(uvs)) => Fill::Textured {
                texture,
                uvs,
                shade_scale: material.base_color,
            },
            _ => Fill::Flat(material.base_color),
        };

        let culling = FaceCulling {
            cull_backfaces: culling.cull_backfaces && self.backface_culling,
            ..culling
        };
        let width = sink.width();
        let height = sink.height();

        for &[i0, i1, i2] in mesh.indices() {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
            stats.triangles_submitted += 1;
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_submitted);

            let corner = |i: usize| {
                let uv = match &fill {
                    Fill::Textured { uvs, .. } => Some(uvs[i]),
                    Fill::Flat(_) => None,
                };
                ClipVertex::new(self.clip_positions[i], uv)
            };
            let poly = clip_triangle(corner(i0), corner(i1), corner(i2));
            if poly.len() < 3 {
                stats.triangles_clipped_away += 1;
                continue;
            }

            // Flat lighting from the unclipped world-space face
            let light = match scene {
                Some(scene) => {
                    let (p0, p1, p2) = (
                        self.world_positions[i0],
                        self.world_positions[i1],
                        self.world_positions[i2],
                    );
                    let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
                    let centroid = (p0 + p1 + p2) / 3.0;
                    Some(shade_flat(&scene.lights, scene.ambient, normal, centroid))
                }
                None => None,
            };

            for [va, vb, vc] in poly.fan() {
                if va.clip.w == 0.0 || vb.clip.w == 0.0 || vc.clip.w == 0.0 {
                    continue;
                }
                let a_ndc = va.clip.truncate() / va.clip.w;
                let b_ndc = vb.clip.truncate() / vb.clip.w;
                let c_ndc = vc.clip.truncate() / vc.clip.w;

                // Backface test in NDC, before the Y flip
                let area = (b_ndc.x - a_ndc.x) * (c_ndc.y - a_ndc.y)
                    - (b_ndc.y - a_ndc.y) * (c_ndc.x - a_ndc.x);
                if culling.rejects(area) {
                    stats.triangles_culled += 1;
                    count_call!(crate::perf::FUNCTION_COUNTERS.triangles_culled);
                    continue;
                }

                let screen = [
                    ndc_to_screen(a_ndc, width, height),
                    ndc_to_screen(b_ndc, width, height),
                    ndc_to_screen(c_ndc, width, height),
                ];

                let written = match &fill {
                    Fill::Flat(base) => {
                        let color = match light {
                            Some(light) => quantize_color(light * *base),
                            None => quantize_color(*base),
                        };
                        fill_triangle_z(sink, depth, screen, color)
                    }
                    Fill::Textured {
                        texture,
                        shade_scale,
                        ..
                    } => {
                        let (Some(uva), Some(uvb), Some(uvc)) = (va.uv, vb.uv, vc.uv) else {
                            continue;
                        };
                        let shade = match light {
                            Some(light) => Shade::Rgb(light * *shade_scale),
                            None if *shade_scale == Vec3::ONE => Shade::ONE,
                            None => Shade::Rgb(*shade_scale),
                        };
                        fill_triangle_textured_z(sink, depth, screen, [uva, uvb, uvc], *texture, shade)
                    }
                };
                stats.triangles_rasterized += 1;
                stats.pixels_written += written;
            }
        }

        stats
    }

    /// Render a primitive placed under `root`.
    pub fn render_primitive<S: PixelSink + ?Sized>(
        &mut self,
        primitive: &Primitive,
        root: &Mat4,
        camera: &ViewProjection,
        scene: Option<&Scene>,
        sink: &mut S,
        depth: &mut DepthBuffer,
    ) -> FrameStats {
        let model = *root * primitive.local_to_world;
        self.render_mesh(
            &primitive.mesh,
            &primitive.material,
            &model,
            camera,
            scene,
            FaceCulling {
                cull_backfaces: primitive.cull_backfaces,
                front_face_ccw: primitive.front_face_ccw,
            },
            sink,
            depth,
        )
    }

    /// Render every primitive of `scene`, lit by the scene's lights, into one
    /// shared depth buffer. The caller resets `depth` before the frame.
    pub fn render_scene<S: PixelSink + ?Sized>(
        &mut self,
        scene: &Scene,
        root: &Mat4,
        camera: &ViewProjection,
        sink: &mut S,
        depth: &mut DepthBuffer,
    ) -> FrameStats {
        crate::perf_scope!("render_scene");
        let mut stats = FrameStats::default();
        for primitive in &scene.primitives {
            stats += self.render_primitive(primitive, root, camera, Some(scene), sink, depth);
        }
        log::trace!(
            "frame: {} tris submitted, {} clipped, {} culled, {} px",
            stats.triangles_submitted,
            stats.triangles_clipped_away,
            stats.triangles_culled,
            stats.pixels_written
        );
        stats
    }
}
