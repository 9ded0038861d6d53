/// Software render pipeline: surfaces, sinks, clipping, rasterization, shading
pub mod clipper;
pub mod pipeline;
/// Triangle, line and outline kernels
pub mod rasterizer;
pub mod shading;
pub mod sink;
pub mod surface;

pub use clipper::{clip_triangle, ClipPlane, ClipPolygon, ClipVertex};
pub use pipeline::{ndc_to_screen, FaceCulling, FrameStats, Renderer, ViewProjection};
pub use rasterizer::{
    draw_line, fill_triangle, fill_triangle_scanline, fill_triangle_textured_z, fill_triangle_z,
    triangle_outline,
};
pub use shading::{blend_over, quantize_color, shade_flat, Shade};
pub use sink::{BlitPacer, Immediate, PixelQueue, PixelSink, QueuedPixel};
pub use surface::{DepthBuffer, Framebuffer, PixelSurface, Rgba8};
