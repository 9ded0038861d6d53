/// Triangle rasterization kernels
///
/// All bounding-box kernels share one contract: walk the integer pixel
/// bounding box of the screen-space triangle (clipped to the target), sample
/// at pixel centers, and use the 2D edge function for inside-ness and
/// barycentric weights. The sign of the total signed area selects the
/// inequality, so CW and CCW input both rasterize. Zero-area triangles are
/// skipped before any division.
use super::shading::{blend_over, Shade};
use super::sink::PixelSink;
use super::surface::{DepthBuffer, Rgba8};
use crate::count_call;
use crate::scene::TextureSampler;
use glam::{Vec2, Vec3};

/// Twice the signed area of (p0, p1, p). Positive when `p` lies to one
/// side of the directed edge p0 -> p1, negative on the other, zero on it.
#[inline(always)]
pub fn edge_function(p0: Vec2, p1: Vec2, p: Vec2) -> f32 {
    (p.x - p0.x) * (p1.y - p0.y) - (p.y - p0.y) * (p1.x - p0.x)
}

/// Inclusive pixel rectangle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl PixelBounds {
    /// Integer bounds of a screen-space triangle clipped to `width x height`.
    /// `None` when the triangle misses the target or has non-finite corners.
    pub fn of_triangle(a: Vec2, b: Vec2, c: Vec2, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 || !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return None;
        }
        let lo = a.min(b).min(c);
        let hi = a.max(b).max(c);

        let min_x = lo.x.floor().max(0.0);
        let min_y = lo.y.floor().max(0.0);
        let max_x = hi.x.ceil().min((width - 1) as f32);
        let max_y = hi.y.ceil().min((height - 1) as f32);
        if min_x > max_x || min_y > max_y {
            return None;
        }

        Some(Self {
            min_x: min_x as usize,
            max_x: max_x as usize,
            min_y: min_y as usize,
            max_y: max_y as usize,
        })
    }
}

/// Visit every covered pixel center with its barycentric weights
/// (weights for a, b, c; they sum to 1).
#[inline(always)]
fn for_each_covered(
    a: Vec2,
    b: Vec2,
    c: Vec2,
    width: usize,
    height: usize,
    mut visit: impl FnMut(usize, usize, [f32; 3]),
) {
    let Some(bounds) = PixelBounds::of_triangle(a, b, c, width, height) else {
        return;
    };

    // Determine winding so the inside test works for both CW and CCW input.
    let area = edge_function(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    let inv_area = 1.0 / area;
    let positive = area > 0.0;

    for y in bounds.min_y..=bounds.max_y {
        let py = y as f32 + 0.5;
        for x in bounds.min_x..=bounds.max_x {
            let p = Vec2::new(x as f32 + 0.5, py);
            let w0 = edge_function(b, c, p);
            let w1 = edge_function(c, a, p);
            let w2 = edge_function(a, b, p);

            let inside = if positive {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if inside {
                visit(x, y, [w0 * inv_area, w1 * inv_area, w2 * inv_area]);
            }
        }
    }
}

#[inline(always)]
fn xy(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Filled triangle without depth (bounding box + edge test).
/// Returns the number of pixels plotted.
pub fn fill_triangle<S: PixelSink + ?Sized>(sink: &mut S, a: Vec2, b: Vec2, c: Vec2, color: Rgba8) -> usize {
    let (w, h) = (sink.width(), sink.height());
    let mut written = 0usize;
    for_each_covered(a, b, c, w, h, |x, y, _| {
        sink.plot(x, y, color);
        written += 1;
    });
    written
}

/// Filled triangle by horizontal spans.
///
/// Cheaper than the bounding-box walk for long, thin triangles since only the
/// spans that intersect the triangle are touched.
pub fn fill_triangle_scanline<S: PixelSink + ?Sized>(
    sink: &mut S,
    a: Vec2,
    b: Vec2,
    c: Vec2,
    color: Rgba8,
) -> usize {
    let area = edge_function(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return 0;
    }
    let (w, h) = (sink.width(), sink.height());
    if w == 0 || h == 0 {
        return 0;
    }

    // Sort by Y: v0 (top), v1 (mid), v2 (bottom).
    let mut v = [a, b, c];
    v.sort_by(|p, q| p.y.total_cmp(&q.y));
    let [v0, v1, v2] = v;

    let x_at_y = |p0: Vec2, p1: Vec2, y: f32| -> f32 {
        let dy = p1.y - p0.y;
        if dy == 0.0 {
            p0.x
        } else {
            p0.x + (y - p0.y) / dy * (p1.x - p0.x)
        }
    };

    // Rows whose center y + 0.5 lies within [v0.y, v2.y]
    let y_start = (v0.y - 0.5).ceil().max(0.0);
    let y_end = (v2.y - 0.5).floor().min((h - 1) as f32);
    if y_start > y_end {
        return 0;
    }

    let mut written = 0usize;
    for y in (y_start as usize)..=(y_end as usize) {
        let sample_y = y as f32 + 0.5;
        let xa = x_at_y(v0, v2, sample_y);
        let xb = if sample_y < v1.y {
            x_at_y(v0, v1, sample_y)
        } else {
            x_at_y(v1, v2, sample_y)
        };
        let (xa, xb) = if xa > xb { (xb, xa) } else { (xa, xb) };

        let x_start = (xa - 0.5).ceil().max(0.0);
        let x_end = (xb - 0.5).floor().min((w - 1) as f32);
        if x_start > x_end {
            continue;
        }
        for x in (x_start as usize)..=(x_end as usize) {
            sink.plot(x, y, color);
            written += 1;
        }
    }
    written
}

/// Z-buffered flat fill.
///
/// Vertices carry screen x/y in pixels and a depth in z (smaller is closer).
/// A pixel is written only when its interpolated depth is strictly less
/// than the stored value. Returns the number of pixels written.
pub fn fill_triangle_z<S: PixelSink + ?Sized>(
    sink: &mut S,
    depth: &mut DepthBuffer,
    verts: [Vec3; 3],
    color: Rgba8,
) -> usize {
    let [a, b, c] = verts;
    let w = sink.width().min(depth.width());
    let h = sink.height().min(depth.height());
    let stride = depth.width();

    let mut written = 0usize;
    for_each_covered(xy(a), xy(b), xy(c), w, h, |x, y, [l0, l1, l2]| {
        count_call!(crate::perf::FUNCTION_COUNTERS.pixels_tested);
        let z = l0 * a.z + l1 * b.z + l2 * c.z;
        if depth.test_and_set(y * stride + x, z) {
            count_call!(crate::perf::FUNCTION_COUNTERS.depth_passed);
            sink.plot(x, y, color);
            written += 1;
        } else {
            count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
        }
    });
    written
}

/// Z-buffered textured fill with per-pixel alpha.
///
/// UVs are interpolated with the same barycentric weights as depth, clamped
/// to [0, 1] and nearest-sampled. Texels with alpha 0 are skipped without
/// touching the depth buffer; alpha 255 overwrites; anything in between is
/// blended source-over against the destination when the sink can read it
/// back, and written opaque otherwise.
pub fn fill_triangle_textured_z<S, T>(
    sink: &mut S,
    depth: &mut DepthBuffer,
    verts: [Vec3; 3],
    uvs: [Vec2; 3],
    texture: &T,
    shade: Shade,
) -> usize
where
    S: PixelSink + ?Sized,
    T: TextureSampler + ?Sized,
{
    let (tw, th) = (texture.width(), texture.height());
    if tw == 0 || th == 0 {
        return 0;
    }
    let [a, b, c] = verts;
    let [uva, uvb, uvc] = uvs;
    let w = sink.width().min(depth.width());
    let h = sink.height().min(depth.height());
    let stride = depth.width();
    let tex_max = Vec2::new((tw - 1) as f32, (th - 1) as f32);

    let mut written = 0usize;
    for_each_covered(xy(a), xy(b), xy(c), w, h, |x, y, [l0, l1, l2]| {
        count_call!(crate::perf::FUNCTION_COUNTERS.pixels_tested);
        let z = l0 * a.z + l1 * b.z + l2 * c.z;
        let idx = y * stride + x;
        if !depth.passes(idx, z) {
            count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
            return;
        }

        // Clamp, no wrapping
        let uv = (uva * l0 + uvb * l1 + uvc * l2).clamp(Vec2::ZERO, Vec2::ONE);
        let t = uv * tex_max;
        let texel = texture.texel(t.x as usize, t.y as usize);
        if texel.a == 0 {
            count_call!(crate::perf::FUNCTION_COUNTERS.transparent_texels_skipped);
            return;
        }

        depth.store(idx, z);
        count_call!(crate::perf::FUNCTION_COUNTERS.depth_passed);

        let shaded = shade.apply(texel);
        let out = if texel.a == 255 {
            shaded
        } else {
            match sink.read(x, y) {
                Some(dst) => blend_over(shaded, dst),
                None => shaded,
            }
        };
        sink.plot(x, y, out);
        written += 1;
    });
    written
}

#[inline]
fn plot_checked<S: PixelSink + ?Sized>(sink: &mut S, x: f32, y: f32, color: Rgba8) -> bool {
    if !(x >= 0.0 && y >= 0.0) {
        return false;
    }
    let (xi, yi) = (x as usize, y as usize);
    if xi < sink.width() && yi < sink.height() {
        sink.plot(xi, yi, color);
        true
    } else {
        false
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `[0, max]`.
/// Endpoints are clamped into the box afterwards, so rounding on huge
/// coordinates cannot leave a far-away endpoint behind.
fn clip_segment(a: Vec2, b: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [(-d.x, a.x), (d.x, max.x - a.x), (-d.y, a.y), (d.y, max.y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        (a + d * t0).clamp(Vec2::ZERO, max),
        (a + d * t1).clamp(Vec2::ZERO, max),
    ))
}

/// DDA line from `a` to `b`, both endpoints included. Off-target pixels are dropped.
///
/// Segments leaving the target are clipped to it first, so the step count
/// is bounded by the target size.
pub fn draw_line<S: PixelSink + ?Sized>(sink: &mut S, a: Vec2, b: Vec2, color: Rgba8) -> usize {
    if !(a.is_finite() && b.is_finite()) {
        return 0;
    }
    let max = Vec2::new(sink.width() as f32, sink.height() as f32);
    let inside = |p: Vec2| p.cmpge(Vec2::ZERO).all() && p.cmple(max).all();
    let (a, b) = if inside(a) && inside(b) {
        (a, b)
    } else {
        match clip_segment(a, b, max) {
            Some(segment) => segment,
            None => return 0,
        }
    };
    let d = b - a;
    if !d.is_finite() {
        return 0;
    }
    let steps = d.x.abs().max(d.y.abs()) as usize;
    if steps == 0 {
        return usize::from(plot_checked(sink, a.x, a.y, color));
    }
    let step = d / steps as f32;
    let mut p = a;
    let mut written = 0usize;
    for _ in 0..=steps {
        written += usize::from(plot_checked(sink, p.x, p.y, color));
        p += step;
    }
    written
}

/// Wireframe triangle
pub fn triangle_outline<S: PixelSink + ?Sized>(sink: &mut S, a: Vec2, b: Vec2, c: Vec2, color: Rgba8) -> usize {
    draw_line(sink, a, b, color) + draw_line(sink, b, c, color) + draw_line(sink, c, a, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestTarget {
        width: usize,
        height: usize,
        color: Vec<Rgba8>,
        readable: bool,
        pub pixels_written: usize,
    }

    impl TestTarget {
        fn new(width: usize, height: usize, readable: bool) -> Self {
            Self {
                width,
                height,
                color: vec![Rgba8::BLACK; width * height],
                readable,
                pixels_written: 0,
            }
        }

        fn at(&self, x: usize, y: usize) -> Rgba8 {
            self.color[y * self.width + x]
        }
    }

    impl PixelSink for TestTarget {
        fn width(&self) -> usize {
            self.width
        }

        fn height(&self) -> usize {
            self.height
        }

        fn plot(&mut self, x: usize, y: usize, color: Rgba8) {
            self.color[y * self.width + x] = color;
            self.pixels_written += 1;
        }

        fn read(&self, x: usize, y: usize) -> Option<Rgba8> {
            self.readable.then(|| self.at(x, y))
        }
    }

    #[test]
    fn colinear_triangle_draws_nothing() {
        let mut target = TestTarget::new(8, 8, true);
        let mut depth = DepthBuffer::new(8, 8);
        let verts = [
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(4.0, 4.0, 0.5),
            Vec3::new(8.0, 8.0, 0.5),
        ];
        assert_eq!(fill_triangle_z(&mut target, &mut depth, verts, Rgba8::WHITE), 0);
        assert_eq!(target.pixels_written, 0);
        assert!(depth.as_slice().iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn triangle_off_target_is_rejected_by_bounds() {
        assert!(PixelBounds::of_triangle(
            Vec2::new(20.0, 20.0),
            Vec2::new(30.0, 20.0),
            Vec2::new(20.0, 30.0),
            8,
            8
        )
        .is_none());
        assert!(PixelBounds::of_triangle(Vec2::NAN, Vec2::ONE, Vec2::ZERO, 8, 8).is_none());
    }

    #[test]
    fn scanline_and_bounding_box_agree_on_interior() {
        let (a, b, c) = (Vec2::new(1.0, 1.0), Vec2::new(14.0, 3.0), Vec2::new(5.0, 13.0));
        let mut bbox = TestTarget::new(16, 16, true);
        let mut spans = TestTarget::new(16, 16, true);
        let n_bbox = fill_triangle(&mut bbox, a, b, c, Rgba8::WHITE);
        let n_spans = fill_triangle_scanline(&mut spans, a, b, c, Rgba8::WHITE);
        assert!(n_bbox > 0 && n_spans > 0);
        // Different sampling rules at the edges, same area to within a border
        let diff = (n_bbox as i64 - n_spans as i64).abs();
        assert!(diff < 20, "bbox={n_bbox} spans={n_spans}");
    }

    #[test]
    fn partial_alpha_blends_only_when_destination_is_readable() {
        let texture = crate::scene::Texture::solid(1, 1, Rgba8::new(255, 255, 255, 128));
        let verts = [
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(8.0, 0.0, 0.5),
            Vec3::new(0.0, 8.0, 0.5),
        ];
        let uvs = [Vec2::ZERO; 3];

        let mut readable = TestTarget::new(8, 8, true);
        let mut depth = DepthBuffer::new(8, 8);
        fill_triangle_textured_z(&mut readable, &mut depth, verts, uvs, &texture, Shade::ONE);
        let blended = readable.at(1, 1);
        assert!(blended.r > 100 && blended.r < 160, "got {blended:?}");

        let mut write_only = TestTarget::new(8, 8, false);
        let mut depth = DepthBuffer::new(8, 8);
        fill_triangle_textured_z(&mut write_only, &mut depth, verts, uvs, &texture, Shade::ONE);
        assert_eq!(write_only.at(1, 1), Rgba8::new(255, 255, 255, 128));
    }

    #[test]
    fn transparent_texels_leave_depth_untouched() {
        let texture = crate::scene::Texture::solid(2, 2, Rgba8::TRANSPARENT);
        let mut target = TestTarget::new(8, 8, true);
        let mut depth = DepthBuffer::new(8, 8);
        let written = fill_triangle_textured_z(
            &mut target,
            &mut depth,
            [
                Vec3::new(0.0, 0.0, 0.1),
                Vec3::new(8.0, 0.0, 0.1),
                Vec3::new(0.0, 8.0, 0.1),
            ],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            &texture,
            Shade::ONE,
        );
        assert_eq!(written, 0);
        assert!(depth.as_slice().iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn line_includes_both_endpoints() {
        let mut target = TestTarget::new(8, 8, true);
        let n = draw_line(&mut target, Vec2::new(0.0, 0.0), Vec2::new(7.0, 0.0), Rgba8::WHITE);
        assert_eq!(n, 8);
        assert_eq!(target.at(0, 0), Rgba8::WHITE);
        assert_eq!(target.at(7, 0), Rgba8::WHITE);
        // Fully off-target lines write nothing
        assert_eq!(draw_line(&mut target, Vec2::splat(-5.0), Vec2::splat(-1.0), Rgba8::WHITE), 0);
    }

    #[test]
    fn huge_line_is_clipped_to_target() {
        let mut target = TestTarget::new(8, 4, true);
        let n = draw_line(&mut target, Vec2::new(2.0, 1.5), Vec2::new(1e9, 1.5), Rgba8::WHITE);
        assert!((5..=7).contains(&n), "wrote {n} pixels");
        for x in 2..7 {
            assert_eq!(target.at(x, 1), Rgba8::WHITE, "pixel {x} missing");
        }
        assert!((0..8).all(|x| target.at(x, 0) == Rgba8::BLACK && target.at(x, 2) == Rgba8::BLACK));

        // Finite but astronomically long: must return promptly, writing at most one row
        let n = draw_line(&mut target, Vec2::new(-1e20, 2.5), Vec2::new(1e20, 2.5), Rgba8::WHITE);
        assert!(n <= 8, "wrote {n} pixels");
        assert!(target.pixels_written <= 7 + 8);
    }

    #[test]
    fn outline_traces_all_three_edges() {
        let mut target = TestTarget::new(8, 8, true);
        let (a, b, c) = (Vec2::new(1.0, 1.0), Vec2::new(6.0, 1.0), Vec2::new(1.0, 5.0));
        let n = triangle_outline(&mut target, a, b, c, Rgba8::WHITE);
        assert_eq!(n, target.pixels_written);
        for (x, y) in [(1, 1), (6, 1), (1, 5), (3, 1), (1, 3)] {
            assert_eq!(target.at(x, y), Rgba8::WHITE, "edge pixel ({x}, {y}) missing");
        }
        assert_eq!(target.at(2, 2), Rgba8::BLACK, "outline must not fill the interior");
    }
}
