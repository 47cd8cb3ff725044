//! Colour parsing and palette to RGB conversion.

use crate::error::{Error, Result};
use crate::symbol::Pixels;

use super::canvas::{Canvas, INK, PAPER, alloc};

/// Ultracode module values 0..=8 map onto these palette letters.
pub const ULTRA_COLOURS: &[u8; 9] = b"0CBMRYGKW";

/// RGB of an Ultracode palette letter.
fn ultra_rgb(letter: u8) -> Option<[u8; 3]> {
    Some(match letter {
        b'C' => [0x00, 0xff, 0xff],
        b'B' => [0x00, 0x00, 0xff],
        b'M' => [0xff, 0x00, 0xff],
        b'R' => [0xff, 0x00, 0x00],
        b'Y' => [0xff, 0xff, 0x00],
        b'G' => [0x00, 0xff, 0x00],
        b'K' => [0x00, 0x00, 0x00],
        b'W' => [0xff, 0xff, 0xff],
        _ => return None,
    })
}

/// A parsed `RRGGBB` or `RRGGBBAA` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub rgb: [u8; 3],
    pub alpha: Option<u8>,
}

impl Colour {
    /// Parse a hex colour; `reason` and `which` tag the error.
    pub fn parse(s: &str, reason: u16, which: &str) -> Result<Colour> {
        let malformed = || Error::invalid_option(reason, format!("Malformed {} colour target", which));
        if !(s.len() == 6 || s.len() == 8) || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| malformed());
        Ok(Colour {
            rgb: [byte(0)?, byte(2)?, byte(4)?],
            alpha: if s.len() == 8 { Some(byte(6)?) } else { None },
        })
    }

    fn alpha_or_opaque(&self) -> u8 {
        self.alpha.unwrap_or(0xff)
    }
}

/// Foreground and background of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Colour,
    pub bg: Colour,
}

impl Palette {
    /// Errors 651 (foreground) and 652 (background).
    pub fn new(fg: &str, bg: &str) -> Result<Palette> {
        Ok(Palette {
            fg: Colour::parse(fg, 651, "foreground")?,
            bg: Colour::parse(bg, 652, "background")?,
        })
    }

    pub fn has_alpha(&self) -> bool {
        self.fg.alpha.is_some() || self.bg.alpha.is_some()
    }

    pub fn rgb(&self, pixel: u8) -> [u8; 3] {
        match pixel {
            INK => self.fg.rgb,
            PAPER => self.bg.rgb,
            other => ultra_rgb(other).unwrap_or([0, 0, 0]),
        }
    }

    /// Convert a palette canvas to RGB, plus an alpha plane when either
    /// colour has one. Identical source rows are converted once.
    pub fn to_rgb(&self, canvas: &Canvas) -> Result<Pixels> {
        let (w, h) = (canvas.width, canvas.height);
        let mut rgb = alloc(w * h * 3, 0, 661)
            .map_err(|_| Error::memory(661, "Insufficient memory for bitmap buffer"))?;
        let mut alpha = if self.has_alpha() {
            Some(
                alloc(w * h, 0, 662)
                    .map_err(|_| Error::memory(662, "Insufficient memory for alphamap buffer"))?,
            )
        } else {
            None
        };
        let (fg_alpha, bg_alpha) = (self.fg.alpha_or_opaque(), self.bg.alpha_or_opaque());

        for y in 0..h {
            let out = y * w * 3;
            if y > 0 && canvas.row(y) == canvas.row(y - 1) {
                rgb.copy_within(out - w * 3..out, out);
                if let Some(a) = alpha.as_mut() {
                    a.copy_within((y - 1) * w..y * w, y * w);
                }
                continue;
            }
            for (x, &p) in canvas.row(y).iter().enumerate() {
                rgb[out + x * 3..out + x * 3 + 3].copy_from_slice(&self.rgb(p));
                if let Some(a) = alpha.as_mut() {
                    a[y * w + x] = if p == PAPER { bg_alpha } else { fg_alpha };
                }
            }
        }
        Ok(Pixels::Rgb { rgb, alpha })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colours() {
        let c = Colour::parse("FF8000", 651, "foreground").unwrap();
        assert_eq!(c.rgb, [0xff, 0x80, 0x00]);
        assert_eq!(c.alpha, None);
        let c = Colour::parse("00ff0080", 651, "foreground").unwrap();
        assert_eq!(c.alpha, Some(0x80));
    }

    #[test]
    fn test_malformed_colours() {
        let e = Palette::new("12345", "ffffff").unwrap_err();
        assert_eq!(e.reason, 651);
        assert_eq!(e.to_string(), "Error 651: Malformed foreground colour target");
        let e = Palette::new("000000", "fffffg").unwrap_err();
        assert_eq!(e.reason, 652);
    }

    #[test]
    fn test_to_rgb_with_alpha() {
        let palette = Palette::new("000000", "ffffff00").unwrap();
        let mut canvas = Canvas::new(2, 2, 658).unwrap();
        canvas.set(0, 0, INK);
        canvas.set(1, 1, b'R');
        let Pixels::Rgb { rgb, alpha } = palette.to_rgb(&canvas).unwrap() else {
            panic!("expected rgb");
        };
        assert_eq!(&rgb[0..6], &[0, 0, 0, 0xff, 0xff, 0xff]);
        assert_eq!(&rgb[9..12], &[0xff, 0, 0]);
        assert_eq!(alpha, Some(vec![0xff, 0x00, 0x00, 0xff]));
    }

    #[test]
    fn test_to_rgb_repeats_rows() {
        let palette = Palette::new("102030", "ffffff").unwrap();
        let mut canvas = Canvas::new(3, 3, 658).unwrap();
        canvas.bar(1, 1, 0, 3, INK);
        let Pixels::Rgb { rgb, alpha } = palette.to_rgb(&canvas).unwrap() else {
            panic!("expected rgb");
        };
        assert!(alpha.is_none());
        assert_eq!(&rgb[0..9], &rgb[18..27]);
        assert_eq!(&rgb[3..6], &[0x10, 0x20, 0x30]);
    }
}
