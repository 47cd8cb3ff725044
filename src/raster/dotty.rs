//! Dotty plot: each set module becomes a filled circle of `dot_size`
//! modules diameter. Dots larger than a module spill past the symbol's
//! right and bottom edges, so the image grows to hold them.

use crate::error::Result;
use crate::symbol::Symbol;

use super::canvas::{Canvas, INK};
use super::layout;

pub(super) fn plot(symbol: &Symbol) -> Result<Canvas> {
    let o = &symbol.options;
    let scaler = (2.0 * o.scale).max(2.0);
    let symbol_height_si = (symbol.height() * scaler).ceil() as i32;
    let dot_radius_s = o.dot_size * scaler / 2.0;

    let (mut dot_overspill_si, dot_offset_s) = if o.dot_size < 1.0 {
        (0, scaler / 2.0)
    } else {
        (((o.dot_size - 1.0) * scaler).ceil() as i32, dot_radius_s)
    };
    if dot_overspill_si == 0 {
        dot_overspill_si = 1;
    }

    let m = layout::whitespace(symbol, None).scaled(scaler);
    let image_width = (symbol.width() as f32 * scaler) as i32 + m.left + m.right + dot_overspill_si;
    let image_height = symbol_height_si + m.top + m.bottom + dot_overspill_si;
    log::trace!("dotty {}x{}, dot radius {}", image_width, image_height, dot_radius_s);

    let mut canvas = Canvas::new(image_width.max(0) as usize, image_height.max(0) as usize, 657)?;

    let grid = symbol.grid();
    for r in 0..grid.rows() {
        let y = (r as f32 * scaler + m.top as f32 + dot_offset_s) as i32;
        for c in 0..symbol.width() {
            if grid.is_set(r, c) {
                let x = (c as f32 * scaler + m.left as f32 + dot_offset_s) as i32;
                canvas.circle(x, y, dot_radius_s, INK);
            }
        }
    }

    layout::draw_bind_box(&mut canvas, symbol, &m, symbol_height_si, dot_overspill_si, scaler as i32);
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::canvas::PAPER;
    use crate::symbol::OutputOptions;
    use crate::symbology::Symbology;

    fn diagonal(dot_size: f32) -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = Symbology::DotCode.id();
        s.options.output_options = OutputOptions::DOTTY_MODE | OutputOptions::NO_QUIET_ZONES;
        s.options.dot_size = dot_size;
        s.grid_mut().push_row(vec![1, 0], 1.0).unwrap();
        s.grid_mut().push_row(vec![0, 1], 1.0).unwrap();
        s.set_height(0.0, 0.0, 0.0);
        s
    }

    #[test]
    fn test_small_dots_one_pixel_overspill() {
        let c = plot(&diagonal(0.8)).unwrap();
        assert_eq!((c.width, c.height), (5, 5));
        assert_eq!(c.get(1, 1), INK);
        assert_eq!(c.get(3, 3), INK);
        assert_eq!(c.get(3, 1), PAPER);
        assert_eq!(c.pixels.iter().filter(|&&p| p == INK).count(), 2);
    }

    #[test]
    fn test_large_dots_grow_image() {
        let c = plot(&diagonal(2.0)).unwrap();
        assert_eq!((c.width, c.height), (6, 6));
        assert_eq!(c.get(2, 2), INK);
        assert_eq!(c.get(2, 0), INK);
        assert_eq!(c.get(0, 0), PAPER);
    }

    #[test]
    fn test_scale_doubles_pitch() {
        let mut s = diagonal(0.8);
        s.options.scale = 2.0;
        let c = plot(&s).unwrap();
        assert_eq!((c.width, c.height), (9, 9));
        // Dots of radius 1.6 centred on (2, 2) and (6, 6)
        assert_eq!(c.get(2, 2), INK);
        assert_eq!(c.get(6, 6), INK);
        assert_eq!(c.get(4, 4), PAPER);
    }
}
