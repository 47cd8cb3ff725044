//! Default plot: rectangular modules, human readable text, UPC/EAN layout,
//! Ultracode colours, stacked separators, and resampling for scales that
//! are not a multiple of one half.

use crate::error::Result;
use crate::symbol::{OutputOptions, Symbol};
use crate::symbology::Symbology;

use super::canvas::{Canvas, INK};
use super::colour::ULTRA_COLOURS;
use super::font::{self, TextStyle};
use super::layout::{self, UpcEan, UpcEanKind};

/// Gap between the symbol and its text, in modules.
const TEXT_GAP: f32 = 1.0;

/// Length of the run of equal modules starting at column `c`.
fn run_length(width: usize, c: usize, value: impl Fn(usize) -> u8) -> usize {
    let fill = value(c);
    let mut len = 1;
    while c + len < width && value(c + len) == fill {
        len += 1;
    }
    len
}

fn text_style(flags: OutputOptions, upcean: bool) -> TextStyle {
    let small = flags.contains(OutputOptions::SMALL_TEXT);
    match (upcean, small) {
        (true, true) => TextStyle::UpceanSmall,
        (true, false) => TextStyle::Upcean,
        (false, true) => TextStyle::Small,
        (false, false) if flags.contains(OutputOptions::BOLD_TEXT) => TextStyle::Bold,
        (false, false) => TextStyle::Normal,
    }
}

pub(super) fn plot(symbol: &Symbol) -> Result<Canvas> {
    let o = &symbol.options;
    let flags = o.output_options;
    let symbology = symbol.symbology();
    let grid = symbol.grid();
    let rows = grid.rows();
    let width = symbol.width();

    // Below half a pixel per module modules would vanish
    let scaler = o.scale.max(0.5);
    let half_int_scaling = (scaler * 2.0).fract() == 0.0;
    let si = if half_int_scaling { (scaler * 2.0) as i32 } else { 2 };

    let row_heights = layout::row_heights_si(symbol, si);
    let symbol_height_si: i32 = row_heights.iter().sum();

    let upcean = layout::upcean(symbol);
    let main = upcean.as_ref().filter(|u| u.kind.is_main());
    let main_width = upcean.as_ref().map_or(width as i32, |u| u.main_width);
    let comp_xoffset = upcean.as_ref().map_or(0, |u| u.comp_xoffset);

    let hide_text = !o.show_hrt || symbol.text().is_empty() || scaler < 1.0;
    let m = layout::whitespace(symbol, upcean.as_ref()).scaled(si as f32);
    let comp_xoffset_si = m.left + comp_xoffset * si;

    let style = text_style(flags, upcean.is_some());
    let text_height = style.text_height() as f32;
    let guard_descent = if main.is_some() { o.guard_descent } else { 0.0 };
    let textoffset = if hide_text {
        guard_descent
    } else {
        (text_height + TEXT_GAP).max(guard_descent)
    };

    let image_width = width as i32 * si + m.left + m.right;
    let image_height = symbol_height_si + (textoffset * si as f32) as i32 + m.top + m.bottom;
    log::trace!(
        "plot {}x{} at si {} ({} rows, {} modules)",
        image_width,
        image_height,
        si,
        rows,
        width
    );
    let mut canvas = Canvas::new(image_width.max(0) as usize, image_height.max(0) as usize, 658)?;
    let body_width = image_width - m.left - m.right;

    // Body: draw each run on the row's first scanline, then copy it down
    let is_ultra = symbology == Some(Symbology::Ultra);
    let mut yposn_si = m.top;
    let mut addon_text_yposn = 0;
    let mut addon_latch = false;
    let mut prev_yposn_si = None;
    for (r, &height_si) in row_heights.iter().enumerate() {
        let mut row_height_si = height_si;
        let repeat = main.is_none() && r > 0 && grid.row(r).modules == grid.row(r - 1).modules;
        if let (true, Some(prev)) = (repeat, prev_yposn_si) {
            canvas.copy_scanline(m.left, body_width, prev, yposn_si);
            canvas.copy_line(m.left, body_width, yposn_si, row_height_si);
            prev_yposn_si = Some(yposn_si);
            yposn_si += row_height_si;
            continue;
        }
        prev_yposn_si = Some(yposn_si);
        let value = |c: usize| if is_ultra { grid.colour(r, c) } else { u8::from(grid.is_set(r, c)) };
        let mut c = 0;
        while c < width {
            let run = run_length(width, c, value);
            let fill = value(c);
            if let Some(u) = main {
                if r == rows - 1 && c as i32 > main_width && !addon_latch {
                    // Add-on bars start below its text
                    let text_offset_si = ((text_height + TEXT_GAP) * si as f32) as i32;
                    canvas.copy_line(m.left, main_width * si, yposn_si, row_height_si);
                    addon_text_yposn = yposn_si;
                    yposn_si += text_offset_si;
                    let mut addon_row_height_si = row_height_si - text_offset_si;
                    if u.kind.addon_descends() {
                        addon_row_height_si += (guard_descent * si as f32) as i32;
                    }
                    if addon_row_height_si == 0 {
                        addon_row_height_si = 1;
                    }
                    row_height_si = addon_row_height_si;
                    addon_latch = true;
                }
            }
            if fill != 0 {
                let colour = if is_ultra {
                    ULTRA_COLOURS.get(fill as usize).copied().unwrap_or(INK)
                } else {
                    INK
                };
                canvas.bar_line(c as i32 * si + m.left, run as i32 * si, yposn_si, colour);
            }
            c += run;
        }
        if addon_latch {
            let x = m.left + main_width * si;
            canvas.copy_line(x, image_width - main_width * si - m.left - m.right, yposn_si, row_height_si);
        } else {
            canvas.copy_line(m.left, body_width, yposn_si, row_height_si);
        }
        yposn_si += row_height_si;
    }

    if let Some(u) = main {
        if guard_descent > 0.0 {
            draw_guards(&mut canvas, symbol, u, si, m.left, comp_xoffset_si, m.top + symbol_height_si);
            let descent_si = (guard_descent * si as f32) as i32;
            canvas.copy_line(
                comp_xoffset_si,
                image_width - comp_xoffset_si - m.right,
                m.top + symbol_height_si,
                descent_si,
            );
        }
    }

    if !hide_text {
        let mut text_yposn = m.top + symbol_height_si + (TEXT_GAP * si as f32) as i32;
        if o.border_width > 0 && flags.intersects(OutputOptions::BOX | OutputOptions::BIND) {
            text_yposn += o.border_width * si;
        }
        match main {
            Some(u) => draw_upcean_text(&mut canvas, symbol, u, style, si, comp_xoffset_si, text_yposn, addon_text_yposn),
            None => {
                let text = font::to_latin1(symbol.text());
                let x = (main_width / 2) * si + comp_xoffset_si;
                font::draw_string(&mut canvas, &text, x, text_yposn, style, si);
            }
        }
    }

    // Separators between the rows of stacked symbols
    let stackable = symbology.is_some_and(|s| s.is_stackable());
    if flags.contains(OutputOptions::BIND) && rows > 1 && stackable {
        let sep_height = if (1..=4).contains(&o.option_3) { o.option_3 as f32 } else { 1.0 };
        let sep_height_si = (sep_height * si as f32) as i32;
        let mut sep_yoffset_si = m.top + row_heights[0] - sep_height_si / 2;
        let mut sep_xoffset_si = m.left;
        let mut sep_width_si = width as i32 * si;
        if matches!(symbology, Some(Symbology::CodablockF | Symbology::HibcBlockF)) {
            // Clear of the 11 module start and 13 module stop characters
            sep_xoffset_si += 11 * si;
            sep_width_si -= (11 + 13) * si;
        }
        for &height_si in &row_heights[1..] {
            canvas.bar(sep_xoffset_si, sep_width_si, sep_yoffset_si, sep_height_si, INK);
            sep_yoffset_si += height_si;
        }
    }

    layout::draw_bind_box(&mut canvas, symbol, &m, symbol_height_si, 0, si);

    if half_int_scaling {
        Ok(canvas)
    } else {
        resample(&canvas, scaler)
    }
}

/// Extend the guard bars below the symbol's first scanline of descent.
fn draw_guards(canvas: &mut Canvas, symbol: &Symbol, u: &UpcEan, si: i32, xoffset_si: i32, comp_xoffset_si: i32, y: i32) {
    for &g in u.kind.guard_bars() {
        canvas.bar_line(g * si + comp_xoffset_si, si, y, INK);
    }
    if u.kind == UpcEanKind::UpcA {
        // The first and last digits descend in full
        let grid = symbol.grid();
        let last = symbol.rows().saturating_sub(1);
        let width = symbol.width();
        let value = |c: usize| u8::from(grid.is_set(last, c));
        for range in [0..11, 85..96] {
            let mut c = range.start + u.comp_xoffset as usize;
            let end = (range.end + u.comp_xoffset as usize).min(width);
            while c < end {
                let run = run_length(width, c, value);
                if value(c) != 0 {
                    canvas.bar_line(c as i32 * si + xoffset_si, run as i32 * si, y, INK);
                }
                c += run;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_upcean_text(
    canvas: &mut Canvas,
    symbol: &Symbol,
    u: &UpcEan,
    style: TextStyle,
    si: i32,
    comp_xoffset_si: i32,
    text_yposn: i32,
    addon_text_yposn: i32,
) {
    // Small outer digits share the baseline of the large ones
    let small_height_adj =
        (TextStyle::Upcean.cell_height() - TextStyle::UpceanSmall.cell_height()) as i32 * si / 2;

    let parts = layout::split_text(u.kind, symbol.text().as_bytes());
    for (part, &(pos, small)) in parts.iter().zip(u.kind.text_positions()) {
        let (part_style, dy) = if small { (style.small(), small_height_adj) } else { (style, 0) };
        font::draw_string(canvas, part, pos * si + comp_xoffset_si, text_yposn + dy, part_style, si);
    }
    if let Some(pos) = u.kind.addon_position(u.addon.len()) {
        let x = (pos + u.addon_gap) * si + comp_xoffset_si;
        font::draw_string(canvas, &u.addon, x, addon_text_yposn, style, si);
    }
}

/// Nearest-neighbour resample of a canvas drawn at two pixels per module to
/// `scaler` times its size. A target row mapping to the same source row as
/// the one before, or to an identical source row, is copied.
fn resample(canvas: &Canvas, scaler: f32) -> Result<Canvas> {
    let scale_width = (canvas.width as f32 * scaler) as usize;
    let scale_height = (canvas.height as f32 * scaler) as usize;
    let mut scaled = Canvas::new(scale_width, scale_height, 659)?;
    if canvas.width == 0 || canvas.height == 0 {
        return Ok(scaled);
    }

    let mut prev_row: Option<usize> = None;
    for r in 0..scale_height {
        let src_row = ((r as f32 / scaler) as usize).min(canvas.height - 1);
        let out = r * scale_width;
        let repeat = prev_row.is_some_and(|p| p == src_row || canvas.row(p) == canvas.row(src_row));
        if repeat {
            scaled.pixels.copy_within(out - scale_width..out, out);
        } else {
            for x in 0..scale_width {
                let src_x = ((x as f32 / scaler) as usize).min(canvas.width - 1);
                scaled.pixels[out + x] = canvas.get(src_x, src_row);
            }
        }
        prev_row = Some(src_row);
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::canvas::PAPER;

    fn symbol(symbology: Symbology, rows: &[&[u8]], height: f32) -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = symbology.id();
        for row in rows {
            s.grid_mut().push_row(row.to_vec(), height).unwrap();
        }
        s.set_height(0.0, 0.0, 0.0);
        s
    }

    #[test]
    fn test_plain_bars_scale_one() {
        let mut s = symbol(Symbology::Code128, &[&[1, 0, 1, 1]], 5.0);
        s.options.show_hrt = false;
        let c = plot(&s).unwrap();
        assert_eq!((c.width, c.height), (8, 10));
        assert_eq!(c.row(0), b"11001111");
        assert_eq!(c.row(9), b"11001111");
    }

    #[test]
    fn test_text_adds_text_row() {
        let mut s = symbol(Symbology::Code128, &[&[1, 0, 1, 1]], 5.0);
        s.set_text("AB");
        let c = plot(&s).unwrap();
        // 7 modules of text plus 1 of gap
        assert_eq!(c.height, 10 + 16);
        assert!(c.pixels[10 * c.width..].iter().any(|&p| p == INK));
    }

    #[test]
    fn test_identical_rows_share_scanlines() {
        let same: &[u8] = &[1, 0, 1, 1, 0, 1];
        let mut s = symbol(Symbology::Code16k, &[same, same, same, &[0, 1, 1, 0, 0, 1]], 2.0);
        s.options.output_options = OutputOptions::NO_QUIET_ZONES;
        let c = plot(&s).unwrap();
        assert_eq!((c.width, c.height), (12, 16));
        for y in 1..12 {
            assert_eq!(c.row(y), c.row(0), "scanline {}", y);
        }
        assert_eq!(c.row(0), b"110011110011");
        assert_eq!(c.row(12), b"001111000011");
        assert_eq!(c.row(15), c.row(12));
    }

    #[test]
    fn test_ultra_colours() {
        let s = symbol(Symbology::Ultra, &[&[1, 2, 0, 8]], 1.0);
        let c = plot(&s).unwrap();
        assert_eq!(c.row(0), b"CCBB00WW");
    }

    #[test]
    fn test_fractional_scale_resamples() {
        let mut s = symbol(Symbology::Code128, &[&[1, 0, 1, 1]], 10.0);
        s.options.show_hrt = false;
        s.options.scale = 0.75;
        let c = plot(&s).unwrap();
        assert_eq!((c.width, c.height), (6, 15));
        assert_eq!(c.row(0), c.row(14));
        assert_eq!(c.get(0, 0), INK);
        assert_eq!(c.get(2, 0), PAPER);
    }

    #[test]
    fn test_stacked_separator() {
        let mut s = symbol(Symbology::Code16k, &[&[1, 0, 0, 1], &[1, 0, 0, 1]], 4.0);
        s.options.output_options = OutputOptions::BIND | OutputOptions::NO_QUIET_ZONES;
        let c = plot(&s).unwrap();
        // Separator one module high centred on the row boundary at y = 8
        assert_eq!(c.row(7), b"11111111");
        assert_eq!(c.row(8), b"11111111");
        assert_eq!(c.row(5), b"11000011");
    }

    #[test]
    fn test_upca_guards_descend() {
        let mut row = vec![0u8; 95];
        for g in [0, 2, 46, 48, 92, 94] {
            row[g] = 1;
        }
        let mut s = symbol(Symbology::Upca, &[&row], 10.0);
        s.set_text("725272702703");
        s.options.output_options = OutputOptions::NO_QUIET_ZONES;
        let c = plot(&s).unwrap();
        // Text row (7 + 1 modules) is deeper than the 5 module guard descent
        assert_eq!(c.height, 20 + 16);
        let below = 20;
        assert_eq!(c.get(46 * 2, below), INK);
        assert_eq!(c.get(47 * 2, below), PAPER);
        assert_eq!(c.get(2 * 2, below), INK);
    }
}
