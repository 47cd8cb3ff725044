//! # Bitmap Fonts
//!
//! Human readable text is drawn from four fixed glyph tables built once from
//! the Spleen PSF2 fonts, scaled to fixed cell sizes:
//!
//! | Table | Cell | Source | Glyphs |
//! |-------|------|--------|--------|
//! | normal | 7×14 | Spleen 8×16 | Latin-1 |
//! | small | 5×9 | Spleen 6×12 | Latin-1 |
//! | UPC/EAN | 9×14 | Spleen 12×24 | digits |
//! | UPC/EAN small | 7×11 | Spleen 12×24 | digits |
//!
//! Bold text is the normal table one pixel wider with each ink run smeared
//! one pixel to the right.
//!
//! Cell sizes are in pixels at scale 1 (two pixels per module), so text
//! heights in modules are half of them rounded up.

use std::sync::OnceLock;

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use super::canvas::{Canvas, INK};

/// One glyph table. Each glyph row is a bitmask, leftmost pixel in bit
/// `width - 1`.
#[derive(Debug)]
pub struct Font {
    pub width: usize,
    pub height: usize,
    glyphs: Vec<Vec<u16>>,
}

impl Font {
    /// Build from a Spleen font, keeping the glyphs of `chars`.
    fn build(data: &[u8], src: (usize, usize), dst: (usize, usize), chars: impl Iterator<Item = u8>) -> Font {
        let mut glyphs = vec![Vec::new(); 256];
        if let Ok(mut spleen) = PSF2Font::new(data) {
            for code in chars {
                let ch = char::from(code).to_string();
                let Some(glyph) = spleen.glyph_for_utf8(ch.as_bytes()) else {
                    continue;
                };
                let mut src_bitmap = vec![0u8; src.0 * src.1];
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < src.1 && col_x < src.0 {
                            src_bitmap[row_y * src.0 + col_x] = u8::from(on);
                        }
                    }
                }
                let mut scaled = vec![0u8; dst.0 * dst.1];
                scale_bitmap(&src_bitmap, src.0, src.1, &mut scaled, dst.0, dst.1);
                glyphs[code as usize] = scaled
                    .chunks(dst.0)
                    .map(|row| row.iter().fold(0u16, |acc, &on| (acc << 1) | on as u16))
                    .collect();
            }
        } else {
            log::warn!("Spleen font failed to load, text will be blank");
        }
        Font {
            width: dst.0,
            height: dst.1,
            glyphs,
        }
    }

    pub fn glyph(&self, code: u8) -> Option<&[u16]> {
        let g = &self.glyphs[code as usize];
        (!g.is_empty()).then_some(g.as_slice())
    }

    #[inline]
    fn bit(&self, glyph: &[u16], y: usize, x: usize) -> bool {
        x < self.width && glyph[y] & (1 << (self.width - 1 - x)) != 0
    }
}

/// Scale a bitmap using nearest neighbor sampling.
fn scale_bitmap(src: &[u8], src_w: usize, src_h: usize, dst: &mut [u8], dst_w: usize, dst_h: usize) {
    for dy in 0..dst_h {
        let sy = dy * src_h / dst_h;
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            dst[dy * dst_w + dx] = src[sy * src_w + sx];
        }
    }
}

fn latin1() -> impl Iterator<Item = u8> {
    (33u8..127).chain(161u8..=255)
}

static NORMAL: OnceLock<Font> = OnceLock::new();
static SMALL: OnceLock<Font> = OnceLock::new();
static UPCEAN: OnceLock<Font> = OnceLock::new();
static UPCEAN_SMALL: OnceLock<Font> = OnceLock::new();

fn normal() -> &'static Font {
    NORMAL.get_or_init(|| Font::build(FONT_8X16, (8, 16), (7, 14), latin1()))
}

fn small() -> &'static Font {
    SMALL.get_or_init(|| Font::build(FONT_6X12, (6, 12), (5, 9), latin1()))
}

fn upcean() -> &'static Font {
    UPCEAN.get_or_init(|| Font::build(FONT_12X24, (12, 24), (9, 14), b'0'..=b'9'))
}

fn upcean_small() -> &'static Font {
    UPCEAN_SMALL.get_or_init(|| Font::build(FONT_12X24, (12, 24), (7, 11), b'0'..=b'9'))
}

/// Which table and spacing a string is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    Bold,
    Small,
    Upcean,
    UpceanSmall,
}

impl TextStyle {
    pub fn font(self) -> &'static Font {
        match self {
            TextStyle::Normal | TextStyle::Bold => normal(),
            TextStyle::Small => small(),
            TextStyle::Upcean => upcean(),
            TextStyle::UpceanSmall => upcean_small(),
        }
    }

    pub fn is_upcean(self) -> bool {
        matches!(self, TextStyle::Upcean | TextStyle::UpceanSmall)
    }

    /// Small variant of this style (bold has none).
    pub fn small(self) -> TextStyle {
        if self.is_upcean() {
            TextStyle::UpceanSmall
        } else {
            TextStyle::Small
        }
    }

    /// Glyph cell width in pixels.
    pub fn cell_width(self) -> usize {
        match self {
            TextStyle::Bold => self.font().width + 1,
            _ => self.font().width,
        }
    }

    /// Cell height in pixels.
    pub fn cell_height(self) -> usize {
        self.font().height
    }

    fn letter_gap(self) -> usize {
        match self {
            TextStyle::Upcean | TextStyle::UpceanSmall => 4,
            TextStyle::Bold => 1,
            _ => 0,
        }
    }

    /// Text height in modules.
    pub fn text_height(self) -> usize {
        self.cell_height().div_ceil(2)
    }
}

/// Draw one Latin-1 letter with its top-left corner at (x, y).
///
/// `si` is the integer scale in half-pixels: each glyph pixel becomes
/// `si / 2` canvas pixels, plus one more on every odd row and column when
/// `si` is odd.
pub fn draw_letter(canvas: &mut Canvas, letter: u8, x: i32, y: i32, style: TextStyle, si: i32) {
    if letter < 33 || (127..161).contains(&letter) || y < 0 {
        return;
    }
    if style.is_upcean() && !letter.is_ascii_digit() {
        return;
    }
    let font = style.font();
    let Some(glyph) = font.glyph(letter) else {
        return;
    };
    let bold = style == TextStyle::Bold;
    let max_x = style.cell_width();
    let half_si = si / 2;
    let odd_si = si & 1 == 1;
    let (x_start, xposn) = if x < 0 { ((-x) as usize, 0) } else { (0, x) };
    let right = canvas.width as i32;
    let max_y = font.height.min(canvas.height.saturating_sub(y as usize));

    let mut line = y;
    for gy in 0..max_y {
        let mut line_end = xposn;
        for _ in 0..half_si {
            let mut px = xposn;
            let mut prev_set = false;
            for gx in x_start..max_x {
                if px >= right {
                    break;
                }
                let set = font.bit(glyph, gy, gx);
                // Bold smears each glyph pixel one glyph pixel to the right
                let ink = set || (bold && prev_set);
                for _ in 0..half_si {
                    if px >= right {
                        break;
                    }
                    if ink {
                        canvas.set(px, line, INK);
                    }
                    px += 1;
                }
                prev_set = set;
                if px < right && odd_si && gx & 1 == 1 {
                    if set {
                        canvas.set(px, line, INK);
                    }
                    px += 1;
                }
            }
            if bold && prev_set {
                for _ in 0..half_si {
                    if px < right {
                        canvas.set(px, line, INK);
                        px += 1;
                    }
                }
            }
            line_end = px;
            line += 1;
        }
        if odd_si && gy & 1 == 1 && line > 0 && (line as usize) < canvas.height {
            let src = (line as usize - 1) * canvas.width;
            let dst = line as usize * canvas.width;
            let (from, to) = (xposn as usize, (line_end as usize).min(canvas.width));
            if from < to {
                canvas.pixels.copy_within(src + from..src + to, dst + from);
            }
            line += 1;
        }
    }
}

/// Draw `text` horizontally centred on `x`, top at `y`.
pub fn draw_string(canvas: &mut Canvas, text: &[u8], x: i32, y: i32, style: TextStyle, si: i32) {
    let gap = style.letter_gap() as i32;
    let letter_width = style.cell_width() as i32 + gap;
    let half_si = si / 2;
    let odd_si = si & 1 == 1;
    let span = letter_width * text.len() as i32 - gap;

    // Centre at two pixels per module, then scale, so doubling `si` doubles `left`
    let mut left = x - (span / 2) * half_si;
    if odd_si {
        left -= span / 4;
    }
    for (i, &letter) in text.iter().enumerate() {
        let i = i as i32;
        let mut x_incr = i * letter_width * half_si;
        if odd_si {
            x_incr += i * letter_width / 2;
        }
        draw_letter(canvas, letter, left + x_incr, y, style, si);
    }
}

/// Latin-1 bytes of `text`; characters above U+00FF are dropped.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink(canvas: &Canvas) -> usize {
        canvas.pixels.iter().filter(|&&p| p == INK).count()
    }

    #[test]
    fn test_cell_sizes() {
        assert_eq!((TextStyle::Normal.cell_width(), TextStyle::Normal.cell_height()), (7, 14));
        assert_eq!(TextStyle::Bold.cell_width(), 8);
        assert_eq!((TextStyle::Small.cell_width(), TextStyle::Small.cell_height()), (5, 9));
        assert_eq!((TextStyle::Upcean.cell_width(), TextStyle::Upcean.cell_height()), (9, 14));
        assert_eq!((TextStyle::UpceanSmall.cell_width(), TextStyle::UpceanSmall.cell_height()), (7, 11));
        assert_eq!(TextStyle::Normal.text_height(), 7);
        assert_eq!(TextStyle::Small.text_height(), 5);
    }

    #[test]
    fn test_glyph_coverage() {
        assert!(normal().glyph(b'A').is_some());
        assert!(normal().glyph(b' ').is_none());
        assert!(upcean().glyph(b'7').is_some());
        assert!(upcean().glyph(b'A').is_none());
    }

    #[test]
    fn test_scale_bitmap_halves() {
        let src = [1, 0, 0, 1];
        let mut dst = [0u8; 1];
        scale_bitmap(&src, 2, 2, &mut dst, 1, 1);
        assert_eq!(dst, [1]);
    }

    #[test]
    fn test_draw_letter_doubles_with_scale() {
        let mut one = Canvas::new(20, 40, 658).unwrap();
        draw_letter(&mut one, b'H', 0, 0, TextStyle::Normal, 2);
        let mut two = Canvas::new(20, 40, 658).unwrap();
        draw_letter(&mut two, b'H', 0, 0, TextStyle::Normal, 4);
        assert!(ink(&one) > 0);
        assert_eq!(ink(&two), ink(&one) * 4);
    }

    fn assert_doubled(one: &Canvas, two: &Canvas) {
        for y in 0..two.height {
            for x in 0..two.width {
                assert_eq!(two.get(x, y), one.get(x / 2, y / 2), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_draw_string_odd_span_doubles_with_scale() {
        for style in [TextStyle::Normal, TextStyle::Bold] {
            let mut one = Canvas::new(60, 20, 658).unwrap();
            draw_string(&mut one, b"ABC", 30, 2, style, 2);
            let mut two = Canvas::new(120, 40, 658).unwrap();
            draw_string(&mut two, b"ABC", 60, 4, style, 4);
            assert!(ink(&one) > 0);
            assert_doubled(&one, &two);
        }
    }

    #[test]
    fn test_bold_has_more_ink() {
        let mut plain = Canvas::new(20, 20, 658).unwrap();
        draw_letter(&mut plain, b'I', 0, 0, TextStyle::Normal, 2);
        let mut bold = Canvas::new(20, 20, 658).unwrap();
        draw_letter(&mut bold, b'I', 0, 0, TextStyle::Bold, 2);
        assert!(ink(&bold) > ink(&plain));
    }

    #[test]
    fn test_spaces_and_controls_draw_nothing() {
        let mut c = Canvas::new(40, 20, 658).unwrap();
        draw_string(&mut c, b" \t\x7f", 20, 0, TextStyle::Normal, 2);
        assert_eq!(ink(&c), 0);
    }

    #[test]
    fn test_to_latin1() {
        assert_eq!(to_latin1("Aé€"), vec![b'A', 0xE9]);
    }
}
