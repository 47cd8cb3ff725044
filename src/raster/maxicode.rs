//! # MaxiCode Plot
//!
//! MaxiCode modules are hexagons on a staggered grid around a bullseye
//! finder (ISO/IEC 16023:2000).
//!
//! ```text
//!   row 0   ⬡ ⬡ ⬡ ⬡ ⬡        full rows: 30 hexagons
//!   row 1    ⬡ ⬡ ⬡ ⬡         odd rows: 29, shifted half a hexagon
//!   row 2   ⬡ ⬡ ◎ ⬡ ⬡        bullseye centred on the symbol
//! ```
//!
//! One hexagon mask is built per render: the top-left edge is drawn with
//! Bresenham's algorithm, filled rightwards, then mirrored across both axes
//! so every copy is symmetric.

use crate::error::{Result, Warning, WarningKind};
use crate::symbol::Symbol;

use super::canvas::{Canvas, INK, PAPER};
use super::layout;

/// Long diameter over short diameter of a hexagon.
const TWO_DIV_SQRT3: f32 = 1.1547;
/// Row pitch over short diameter.
const SQRT3_DIV_TWO: f32 = 0.866;

/// Acceptable width/height ratios of the hexagon area.
const MIN_RATIO: f32 = 24.82 / 26.69;
const MAX_RATIO: f32 = 27.93 / 23.71;

/// Hexagon cell geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    width: i32,
    height: i32,
    x_start: i32,
    y_start: i32,
    x_end: i32,
    y_end: i32,
}

impl Cell {
    fn new(scaler: f32) -> Cell {
        let width = scaler.round() as i32;
        let height = (scaler * TWO_DIV_SQRT3).round() as i32;
        // Whitespace around each hexagon
        let x_start = if scaler < 3.5 { 0 } else { (width as f32 * 0.05).ceil() as i32 };
        let y_start = (height as f32 * 0.05).ceil() as i32;
        let x_end = ((width - x_start) as f32 * 0.05).round() as i32;
        let y_end = ((height - y_start) as f32 * 0.05).round() as i32;
        Cell {
            width,
            height,
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    /// Filled hexagon mask of `width` x `height` pixels.
    fn mask(&self) -> Result<Canvas> {
        let mut hex = Canvas::new(self.width.max(0) as usize, self.height.max(0) as usize, 656)?;
        let (x_start, y_start) = (self.x_start, self.y_start);

        let hx_width = self.width - self.x_start - self.x_end;
        let hy_height = self.height - self.x_start - self.x_end;
        let hx_width_odd = hx_width & 1;
        let hy_height_odd = hy_height & 1;
        let hx_radius = hx_width / 2;
        let hy_radius = hy_height / 2;

        // Top left quadrant first
        let start_y = y_start + (hy_radius + 1) / 2;
        let mut end_x = x_start + hx_radius;
        if hx_radius > 2 && (hx_radius < 10 || hx_width_odd == 0) {
            end_x -= 1;
        }
        hex.line(x_start, start_y, end_x, y_start);

        let lines = y_start..y_start + hy_radius + hy_height_odd;
        let cols = x_start..x_start + hx_radius + hx_width_odd;

        // Fill to the right of the edge
        let mut not_top = false;
        for line in lines.clone() {
            let mut found = false;
            for i in cols.clone() {
                if found {
                    hex.set(i, line, INK);
                    not_top = true;
                } else if hex.at(i, line) == Some(INK) {
                    found = true;
                }
            }
            if not_top && !found {
                for i in cols.clone() {
                    hex.set(i, line, INK);
                }
            }
        }

        // Mirror left to right
        for line in lines.clone() {
            for i in cols.clone() {
                if hex.at(i, line) == Some(INK) {
                    hex.set(self.width - self.x_end - (i - x_start + 1), line, INK);
                }
            }
        }

        // Mirror top to bottom
        for line in lines {
            for i in x_start..self.width {
                if hex.at(i, line) == Some(INK) {
                    hex.set(i, self.height - self.y_end - (line - y_start + 1), INK);
                }
            }
        }
        Ok(hex)
    }
}

/// Six alternating rings, ink outermost, centred 14.5 hexagons in and half
/// way down.
fn draw_bullseye(canvas: &mut Canvas, cell: &Cell, hex_image_height: i32, xoffset_si: i32, yoffset_si: i32) {
    let x = (14.5 * cell.width as f32 - cell.x_start as f32 + xoffset_si as f32) as i32;
    let y = hex_image_height / 2 + yoffset_si;

    // Inner diameter is the hexagon's long diameter, outer is 9 hexagons
    let r1 = (cell.height as f32 / 2.0).ceil() as i32;
    let mut r_incr = ((cell.width * 9 - r1) / 5) / 2;
    if r_incr > cell.x_end {
        r_incr -= cell.x_end;
    }

    for (step, fill) in [(5, INK), (4, PAPER), (3, INK), (2, PAPER), (1, INK), (0, PAPER)] {
        canvas.mp_circle(x, y, r1 + r_incr * step, fill);
    }
}

pub(super) fn plot(symbol: &Symbol) -> Result<(Canvas, Option<Warning>)> {
    let scaler = symbol.options.scale.max(0.2) * 10.0;
    let m = layout::whitespace(symbol, None).scaled(scaler);
    let cell = Cell::new(scaler);

    let hex_image_width = 30 * cell.width - cell.x_start - cell.x_end;
    let yposn_offset = if scaler > 10.0 {
        (SQRT3_DIV_TWO * cell.width as f32) as i32
    } else {
        (SQRT3_DIV_TWO * cell.width as f32).round() as i32
    };
    // 32 row pitches plus the last row's hexagon
    let hex_image_height = 32 * yposn_offset + cell.height - cell.y_start - cell.y_end;

    let image_width = hex_image_width + m.left + m.right;
    let image_height = hex_image_height + m.top + m.bottom;
    log::trace!("maxicode {}x{}, hexagon {}x{}", image_width, image_height, cell.width, cell.height);

    let mut canvas = Canvas::new(image_width.max(0) as usize, image_height.max(0) as usize, 655)?;
    let hexagon = cell.mask()?;

    let grid = symbol.grid();
    for r in 0..grid.rows() {
        let odd_row = r & 1;
        let yposn = r as i32 * yposn_offset + m.top - cell.y_start;
        let xposn_offset = if odd_row == 1 { cell.width / 2 } else { 0 } + m.left - cell.x_start;
        for c in 0..symbol.width().saturating_sub(odd_row) {
            if grid.is_set(r, c) {
                canvas.stamp(&hexagon, c as i32 * cell.width + xposn_offset, yposn);
            }
        }
    }

    draw_bullseye(&mut canvas, &cell, hex_image_height, m.left, m.top);
    layout::draw_bind_box(&mut canvas, symbol, &m, hex_image_height, 0, scaler as i32);

    let ratio = hex_image_width as f32 / hex_image_height as f32;
    let warning = (!(MIN_RATIO..=MAX_RATIO).contains(&ratio)).then(|| {
        Warning::new(WarningKind::Noncompliant, 663, "Size not within the minimum/maximum ranges")
    });
    Ok((canvas, warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::Symbology;

    fn maxicode(set: &[(usize, usize)]) -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = Symbology::Maxicode.id();
        for r in 0..33 {
            let row = (0..30).map(|c| u8::from(set.contains(&(r, c)))).collect();
            s.grid_mut().push_row(row, 1.0).unwrap();
        }
        s
    }

    #[test]
    fn test_cell_at_scale_one() {
        let cell = Cell::new(10.0);
        assert_eq!(
            cell,
            Cell {
                width: 10,
                height: 12,
                x_start: 1,
                y_start: 1,
                x_end: 0,
                y_end: 1
            }
        );
    }

    #[test]
    fn test_hexagon_mask_is_symmetric() {
        let cell = Cell::new(10.0);
        let hex = cell.mask().unwrap();
        assert_eq!(hex.at(5, 5), Some(INK));
        assert_eq!(hex.at(0, 0), Some(PAPER));
        // Left/right mirror about column 5
        for y in 0..hex.height as i32 {
            for x in 1..5 {
                assert_eq!(hex.at(x, y), hex.at(10 - x, y), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_plot_size_and_bullseye() {
        let s = maxicode(&[(0, 0)]);
        let (canvas, warning) = plot(&s).unwrap();
        assert_eq!((canvas.width, canvas.height), (299, 298));
        assert!(warning.is_none());
        // Centre disc paper, first ring ink, second ring paper
        assert_eq!(canvas.at(144, 149), Some(PAPER));
        assert_eq!(canvas.at(154, 149), Some(INK));
        assert_eq!(canvas.at(162, 149), Some(PAPER));
        // Top-left hexagon
        assert_eq!(canvas.at(4, 4), Some(INK));
        assert_eq!(canvas.at(290, 4), Some(PAPER));
    }

    #[test]
    fn test_empty_grid_has_only_bullseye() {
        let s = maxicode(&[]);
        let (canvas, _) = plot(&s).unwrap();
        assert_eq!(canvas.at(4, 4), Some(PAPER));
    }
}
