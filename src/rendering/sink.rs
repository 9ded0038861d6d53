/// Pixel sinks: where the rasterizer's output goes.
///
/// `Immediate` writes straight into a surface and can read the destination
/// back for blending. `PixelQueue` records writes for later, paced draining;
/// it has no destination to read, so partially transparent texels degrade to
/// an opaque overwrite when plotted through it.
use super::surface::{PixelSurface, Rgba8};
use std::collections::VecDeque;

/// Write capability handed to the rasterizer.
pub trait PixelSink {
    /// Width of the addressable area
    fn width(&self) -> usize;
    /// Height of the addressable area
    fn height(&self) -> usize;
    /// Plot one pixel. Coordinates are already inside `width() x height()`.
    fn plot(&mut self, x: usize, y: usize, color: Rgba8);
    /// Current destination color, or `None` when the sink cannot read back.
    fn read(&self, x: usize, y: usize) -> Option<Rgba8>;
}

/// Immediate-mode sink over any pixel surface
pub struct Immediate<'a, S: PixelSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: PixelSurface + ?Sized> Immediate<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Self { surface }
    }
}

impl<'a, S: PixelSurface + ?Sized> PixelSink for Immediate<'a, S> {
    #[inline]
    fn width(&self) -> usize {
        self.surface.width()
    }

    #[inline]
    fn height(&self) -> usize {
        self.surface.height()
    }

    #[inline]
    fn plot(&mut self, x: usize, y: usize, color: Rgba8) {
        if x < self.surface.width() && y < self.surface.height() {
            self.surface.set_pixel(x, y, color);
        }
    }

    #[inline]
    fn read(&self, x: usize, y: usize) -> Option<Rgba8> {
        if x < self.surface.width() && y < self.surface.height() {
            Some(self.surface.get_pixel(x, y))
        } else {
            None
        }
    }
}

/// A recorded pixel write
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueuedPixel {
    pub x: u32,
    pub y: u32,
    pub color: Rgba8,
}

/// Deferred sink: records writes in order for later draining.
pub struct PixelQueue {
    width: usize,
    height: usize,
    pixels: VecDeque<QueuedPixel>,
}

impl PixelQueue {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: VecDeque::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Write up to `budget` queued pixels into `surface`, oldest first.
    /// Pixels outside the surface are consumed but not written.
    /// Returns the number of pixels consumed.
    pub fn drain_into<S: PixelSurface + ?Sized>(&mut self, surface: &mut S, budget: usize) -> usize {
        let n = budget.min(self.pixels.len());
        let (w, h) = (surface.width(), surface.height());
        for p in self.pixels.drain(..n) {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < w && y < h {
                surface.set_pixel(x, y, p.color);
            }
        }
        n
    }
}

impl PixelSink for PixelQueue {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn plot(&mut self, x: usize, y: usize, color: Rgba8) {
        self.pixels.push_back(QueuedPixel {
            x: x as u32,
            y: y as u32,
            color,
        });
    }

    #[inline]
    fn read(&self, _x: usize, _y: usize) -> Option<Rgba8> {
        None
    }
}

/// Converts a pixels-per-second drain rate into per-frame budgets.
#[derive(Debug, Clone)]
pub struct BlitPacer {
    pub pixels_per_second: u32,
    accum: f64,
    needs_clear: bool,
}

impl BlitPacer {
    pub fn new(pixels_per_second: u32) -> Self {
        Self {
            pixels_per_second,
            accum: 0.0,
            needs_clear: false,
        }
    }

    /// Mark the start of a new deferred frame: the surface is cleared right
    /// before the first drain, so no blank frame is ever presented.
    pub fn begin_frame(&mut self) {
        self.needs_clear = true;
    }

    /// Pixel budget for a frame of `dt` seconds, carrying the fractional part.
    pub fn budget(&mut self, dt: f32) -> usize {
        self.accum += f64::from(self.pixels_per_second) * f64::from(dt.max(0.0));
        let n = self.accum.floor();
        self.accum -= n;
        n as usize
    }

    /// Drain one frame's worth of pixels from `queue` into `surface`.
    pub fn drain<S: PixelSurface + ?Sized>(
        &mut self,
        queue: &mut PixelQueue,
        surface: &mut S,
        clear_color: Rgba8,
        dt: f32,
    ) -> usize {
        if queue.is_empty() {
            return 0;
        }
        if self.needs_clear {
            for y in 0..surface.height() {
                for x in 0..surface.width() {
                    surface.set_pixel(x, y, clear_color);
                }
            }
            self.needs_clear = false;
        }
        let budget = self.budget(dt);
        if budget == 0 {
            return 0;
        }
        queue.drain_into(surface, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Framebuffer;

    #[test]
    fn pacer_carries_fractional_pixels() {
        let mut pacer = BlitPacer::new(10);
        // 10 px/s * 0.25 s = 2.5 -> 2, then 2.5 + 0.5 carry -> 3
        assert_eq!(pacer.budget(0.25), 2);
        assert_eq!(pacer.budget(0.25), 3);
        assert_eq!(pacer.budget(-1.0), 0);
    }

    #[test]
    fn queue_drains_in_order_and_skips_out_of_bounds() {
        let mut queue = PixelQueue::new(4, 4);
        queue.plot(0, 0, Rgba8::WHITE);
        queue.plot(9, 9, Rgba8::WHITE);
        queue.plot(1, 0, Rgba8::opaque(255, 0, 0));
        assert!(queue.read(0, 0).is_none());

        let mut fb = Framebuffer::new(4, 4);
        assert_eq!(queue.drain_into(&mut fb, 2), 2);
        assert_eq!(fb.get_pixel(0, 0), Rgba8::WHITE);
        assert_eq!(fb.get_pixel(1, 0), Rgba8::BLACK);
        assert_eq!(queue.drain_into(&mut fb, 10), 1);
        assert_eq!(fb.get_pixel(1, 0), Rgba8::opaque(255, 0, 0));
        assert!(queue.is_empty());
    }

    #[test]
    fn first_drain_of_a_frame_clears_the_surface() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear(Rgba8::WHITE);
        let mut queue = PixelQueue::new(2, 1);
        queue.plot(1, 0, Rgba8::opaque(0, 0, 255));

        let mut pacer = BlitPacer::new(1000);
        pacer.begin_frame();
        assert_eq!(pacer.drain(&mut queue, &mut fb, Rgba8::BLACK, 1.0), 1);
        assert_eq!(fb.get_pixel(0, 0), Rgba8::BLACK);
        assert_eq!(fb.get_pixel(1, 0), Rgba8::opaque(0, 0, 255));
    }
}
