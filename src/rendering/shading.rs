/// Basic, configurable shading utilities.
/// Kept separate from the rasterizer so lighting models
/// can evolve independently of the rasterization pipeline.
use super::surface::Rgba8;
use crate::scene::PointLight;
use glam::Vec3;

/// Shading factor applied to sampled texels, decided once per primitive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shade {
    /// Same multiplier for every channel
    Flat(f32),
    /// Per-channel multipliers
    Rgb(Vec3),
}

impl Shade {
    /// Unlit
    pub const ONE: Self = Shade::Flat(1.0);

    /// Per-channel multipliers, negatives clamped to zero
    #[inline]
    pub fn channels(self) -> [f32; 3] {
        match self {
            Shade::Flat(s) => {
                let s = s.max(0.0);
                [s, s, s]
            }
            Shade::Rgb(v) => [v.x.max(0.0), v.y.max(0.0), v.z.max(0.0)],
        }
    }

    /// Multiply an 8-bit color by this shade, saturating at 255. Alpha is kept.
    #[inline]
    pub fn apply(self, texel: Rgba8) -> Rgba8 {
        let [sr, sg, sb] = self.channels();
        Rgba8::new(
            scale_channel(texel.r, sr),
            scale_channel(texel.g, sg),
            scale_channel(texel.b, sb),
            texel.a,
        )
    }
}

#[inline]
fn scale_channel(c: u8, s: f32) -> u8 {
    let v = f32::from(c) * s;
    // NaN casts to 0, +inf saturates
    v.min(255.0) as u8
}

/// Flat lighting for one face: ambient plus a Lambert term per point light.
///
/// `normal` should be unit length; a zero normal receives ambient only.
/// There is no upper clamp, so bright lights can overexpose.
pub fn shade_flat(lights: &[PointLight], ambient: f32, normal: Vec3, position: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    let mut light = Vec3::splat(ambient);
    for l in lights {
        let to_light = (l.position - position).normalize_or_zero();
        let n_dot_l = n.dot(to_light).max(0.0) * l.intensity;
        light += l.color * n_dot_l;
    }
    light.max(Vec3::ZERO)
}

/// Quantize a linear 0..1 color to opaque 8-bit, clamping first.
#[inline]
pub fn quantize_color(color: Vec3) -> Rgba8 {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE);
    // A NaN channel survives clamp(); `as u8` maps it to 0
    Rgba8::opaque((c.x * 255.0) as u8, (c.y * 255.0) as u8, (c.z * 255.0) as u8)
}

/// Source-over composite of `src` onto `dst`.
#[inline]
pub fn blend_over(src: Rgba8, dst: Rgba8) -> Rgba8 {
    let sa = f32::from(src.a) / 255.0;
    let inv = 1.0 - sa;
    let mix = |s: u8, d: u8| (f32::from(s) * sa + f32::from(d) * inv).min(255.0) as u8;
    Rgba8::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (f32::from(src.a) + f32::from(dst.a) * inv).min(255.0) as u8,
    )
}
