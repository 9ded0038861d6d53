/// Pixel surfaces and the per-frame depth buffer
///
/// Memory layout mirrors a display framebuffer:
/// - Hot metadata (width, height) stored first for bounds checking
/// - Color is packed ARGB u32 so it can be presented without conversion
/// - Depth lives in its own allocation, owned by the frame being rendered

/// 8-bit RGBA color
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Pack into ARGB u32
    #[inline]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Unpack from ARGB u32
    #[inline]
    pub const fn from_argb(c: u32) -> Self {
        Self {
            a: (c >> 24) as u8,
            r: (c >> 16) as u8,
            g: (c >> 8) as u8,
            b: c as u8,
        }
    }
}

/// Opaque 2D RGBA surface. Callers bounds-check before access.
pub trait PixelSurface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn get_pixel(&self, x: usize, y: usize) -> Rgba8;
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgba8);
}

/// In-memory color buffer
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>, // ARGB format
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color_buffer: vec![Rgba8::BLACK.to_argb(); width * height],
        }
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: Rgba8) {
        self.color_buffer.fill(color.to_argb());
    }

    /// Resize and clear to black. Old contents would not line up with the new row stride.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.color_buffer.clear();
        self.color_buffer.resize(width * height, Rgba8::BLACK.to_argb());
    }

    /// Get color buffer as slice (ARGB, row-major)
    pub fn color_buffer_slice(&self) -> &[u32] {
        &self.color_buffer
    }

    /// Number of pixels whose color differs from `color`
    pub fn count_not(&self, color: Rgba8) -> usize {
        let packed = color.to_argb();
        self.color_buffer.iter().filter(|&&c| c != packed).count()
    }
}

impl PixelSurface for Framebuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: usize, y: usize) -> Rgba8 {
        Rgba8::from_argb(self.color_buffer[y * self.width + x])
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgba8) {
        self.color_buffer[y * self.width + x] = color.to_argb();
    }
}

/// Per-pixel nearest depth, smaller is closer.
/// Must be reset before the first write of every frame.
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depth: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset every sample to +infinity
    pub fn reset(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    /// Resize and reset
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.depth.clear();
        self.depth.resize(width * height, f32::INFINITY);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Strict less-than depth test. Does not write.
    #[inline]
    pub fn passes(&self, index: usize, depth: f32) -> bool {
        depth < self.depth[index]
    }

    #[inline]
    pub fn store(&mut self, index: usize, depth: f32) {
        self.depth[index] = depth;
    }

    /// Depth test at a linear index and, if it passes, record `depth`.
    #[inline]
    pub fn test_and_set(&mut self, index: usize, depth: f32) -> bool {
        if depth < self.depth[index] {
            self.depth[index] = depth;
            true
        } else {
            false
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.depth
    }
}
