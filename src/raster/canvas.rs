//! Palette-indexed pixel canvas and its drawing primitives.
//!
//! One byte per pixel: [`PAPER`], [`INK`] or an Ultracode colour letter.
//! Coordinates are signed so shapes may hang off an edge; anything outside
//! the canvas is clipped.

use crate::error::{Error, Result};

/// Background pixel.
pub const PAPER: u8 = b'0';
/// Foreground pixel.
pub const INK: u8 = b'1';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Allocate `len` bytes of `fill`, failing with a memory error rather than
/// aborting.
pub(crate) fn alloc(len: usize, fill: u8, reason: u16) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::memory(reason, "Insufficient memory for pixel buffer"))?;
    buf.resize(len, fill);
    Ok(buf)
}

impl Canvas {
    /// A canvas filled with paper; `reason` tags the allocation failure.
    pub fn new(width: usize, height: usize, reason: u16) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or_else(|| Error::memory(reason, "Insufficient memory for pixel buffer"))?;
        Ok(Self {
            width,
            height,
            pixels: alloc(len, PAPER, reason)?,
        })
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// Pixel at (x, y), `None` off the canvas.
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> Option<u8> {
        self.in_bounds(x, y)
            .then(|| self.pixels[y as usize * self.width + x as usize])
    }

    /// Set one pixel if it lies on the canvas.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, fill: u8) {
        if self.in_bounds(x, y) {
            let idx = y as usize * self.width + x as usize;
            self.pixels[idx] = fill;
        }
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Horizontal span clipped to the canvas: `(start index, len)`.
    fn span(&self, x: i32, len: i32, y: i32) -> Option<(usize, usize)> {
        if y < 0 || y as usize >= self.height || len <= 0 {
            return None;
        }
        let x0 = x.max(0) as usize;
        let x1 = ((x + len).max(0) as usize).min(self.width);
        (x0 < x1).then(|| (y as usize * self.width + x0, x1 - x0))
    }

    /// Draw the first scanline of a bar; [`Canvas::copy_line`] completes it.
    pub fn bar_line(&mut self, x: i32, len: i32, y: i32, fill: u8) {
        if let Some((start, n)) = self.span(x, len, y) {
            self.pixels[start..start + n].fill(fill);
        }
    }

    /// Replicate scanline `y` over the next `rows - 1` scanlines, between
    /// `x` and `x + len`.
    pub fn copy_line(&mut self, x: i32, len: i32, y: i32, rows: i32) {
        let Some((start, n)) = self.span(x, len, y) else {
            return;
        };
        let end = (y + rows).min(self.height as i32);
        for yy in y + 1..end {
            let dst = start + (yy - y) as usize * self.width;
            self.pixels.copy_within(start..start + n, dst);
        }
    }

    /// Copy scanline `from` onto scanline `to`, between `x` and `x + len`.
    pub fn copy_scanline(&mut self, x: i32, len: i32, from: i32, to: i32) {
        if from == to {
            return;
        }
        if let (Some((src, n)), Some((dst, _))) = (self.span(x, len, from), self.span(x, len, to)) {
            self.pixels.copy_within(src..src + n, dst);
        }
    }

    /// Filled rectangle.
    pub fn bar(&mut self, x: i32, len: i32, y: i32, rows: i32, fill: u8) {
        for yy in y..y + rows {
            self.bar_line(x, len, yy, fill);
        }
    }

    /// Disc of all points with `x² + y² <= r²`.
    pub fn circle(&mut self, x0: i32, y0: i32, radius: f32, fill: u8) {
        let r = radius as i32;
        let r2 = r * r;
        for y in -r..=r {
            for x in -r..=r {
                if x * x + y * y <= r2 {
                    self.set(x0 + x, y0 + y, fill);
                }
            }
        }
    }

    fn mp_circle_lines(&mut self, x0: i32, y0: i32, x: i32, y: i32, fill: u8) {
        for i in x0 - x..=x0 + x {
            self.set(i, y0 + y, fill);
            self.set(i, y0 - y, fill);
        }
        for i in x0 - y..=x0 + y {
            self.set(i, y0 + x, fill);
            self.set(i, y0 - x, fill);
        }
    }

    /// Disc drawn with the midpoint circle algorithm, filled by horizontal
    /// spans. Gives a flatter rim than [`Canvas::circle`].
    pub fn mp_circle(&mut self, x0: i32, y0: i32, r: i32, fill: u8) {
        let mut f = 1 - r;
        let mut ddf_x = 0;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        self.mp_circle_lines(x0, y0, x, y, fill);
        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x + 1;
            self.mp_circle_lines(x0, y0, x, y, fill);
        }
    }

    /// Bresenham line of ink.
    pub fn line(&mut self, mut x: i32, mut y: i32, end_x: i32, end_y: i32) {
        let dx = (end_x - x).abs();
        let sx = if x < end_x { 1 } else { -1 };
        let dy = -(end_y - y).abs();
        let sy = if y < end_y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set(x, y, INK);
            if x == end_x && y == end_y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Copy every ink pixel of `mask` onto the canvas at (x, y).
    pub fn stamp(&mut self, mask: &Canvas, x: i32, y: i32) {
        for my in 0..mask.height {
            for mx in 0..mask.width {
                if mask.get(mx, my) == INK {
                    self.set(x + mx as i32, y + my as i32, INK);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(canvas: &Canvas, fill: u8) -> usize {
        canvas.pixels.iter().filter(|&&p| p == fill).count()
    }

    #[test]
    fn test_new_is_paper() {
        let c = Canvas::new(4, 3, 658).unwrap();
        assert_eq!(c.pixels.len(), 12);
        assert_eq!(count(&c, PAPER), 12);
    }

    #[test]
    fn test_set_clips() {
        let mut c = Canvas::new(2, 2, 658).unwrap();
        c.set(-1, 0, INK);
        c.set(0, 2, INK);
        c.set(1, 1, INK);
        assert_eq!(count(&c, INK), 1);
        assert_eq!(c.get(1, 1), INK);
    }

    #[test]
    fn test_bar_line_and_copy() {
        let mut c = Canvas::new(6, 4, 658).unwrap();
        c.bar_line(1, 2, 0, INK);
        c.bar_line(4, 5, 0, INK);
        c.copy_line(0, 6, 0, 3);
        assert_eq!(c.row(0), b"011011");
        assert_eq!(c.row(2), b"011011");
        assert_eq!(c.row(3), b"000000");
    }

    #[test]
    fn test_bar_clips_at_edges() {
        let mut c = Canvas::new(3, 3, 658).unwrap();
        c.bar(-2, 4, 2, 5, INK);
        assert_eq!(c.row(2), b"110");
        assert_eq!(count(&c, INK), 2);
    }

    #[test]
    fn test_circle_is_symmetric() {
        let mut c = Canvas::new(9, 9, 657).unwrap();
        c.circle(4, 4, 3.0, INK);
        for y in 0..9 {
            for x in 0..9 {
                assert_eq!(c.get(x, y), c.get(8 - x, y));
                assert_eq!(c.get(x, y), c.get(x, 8 - y));
            }
        }
        assert_eq!(c.get(4, 1), INK);
        assert_eq!(c.get(1, 1), PAPER);
    }

    #[test]
    fn test_mp_circle_fills_centre_and_rim() {
        let mut c = Canvas::new(11, 11, 655).unwrap();
        c.mp_circle(5, 5, 4, INK);
        assert_eq!(c.get(5, 5), INK);
        assert_eq!(c.get(5, 1), INK);
        assert_eq!(c.get(1, 5), INK);
        assert_eq!(c.get(0, 0), PAPER);
        assert_eq!(c.get(5, 0), PAPER);
    }

    #[test]
    fn test_line_endpoints() {
        let mut c = Canvas::new(5, 5, 656).unwrap();
        c.line(0, 4, 4, 0);
        assert_eq!(c.get(0, 4), INK);
        assert_eq!(c.get(4, 0), INK);
        assert_eq!(c.get(2, 2), INK);
        assert_eq!(count(&c, INK), 5);
    }

    #[test]
    fn test_stamp_only_ink() {
        let mut mask = Canvas::new(2, 1, 656).unwrap();
        mask.set(1, 0, INK);
        let mut c = Canvas::new(4, 1, 655).unwrap();
        c.set(0, 0, INK);
        c.stamp(&mask, 1, 0);
        assert_eq!(c.row(0), b"1010");
    }
}
