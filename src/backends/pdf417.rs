//! PDF417 through the `pdf417` crate (text compaction, ASCII only).

use pdf417::{END_PATTERN, PDF417, PDF417Encoder, START_PATTERN};

use crate::dispatch::SegmentEncoder;
use crate::error::{Error, Result, Warning};
use crate::symbol::{Segment, Symbol};

const MIN_ROWS: u8 = 3;
const MAX_ROWS: u8 = 90;
const MAX_COLS: u8 = 30;

/// Row height in modules.
const ROW_HEIGHT: f32 = 3.0;

/// Width in modules of a symbol with `cols` data columns.
pub fn symbol_width(cols: u8) -> usize {
    START_PATTERN.size() as usize + 17 + cols as usize * 17 + 17 + END_PATTERN.size() as usize
}

/// Starting column count for `len` bytes of text.
fn initial_cols(len: usize) -> u8 {
    // Text compaction packs about two characters per codeword
    let codewords = (len / 2 + 1) as f32;
    ((codewords / 3.0).sqrt().round() as u8).clamp(1, MAX_COLS)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pdf417;

impl Pdf417 {
    /// Smallest layout, columns first, that the data fits with some error
    /// correction.
    fn layout(data: &str, fixed_cols: Option<u8>) -> Option<(u8, u8, u8, Vec<u16>)> {
        let cols_range = match fixed_cols {
            Some(c) => c..=c,
            None => initial_cols(data.len())..=MAX_COLS,
        };
        for cols in cols_range {
            for rows in MIN_ROWS..=MAX_ROWS {
                let mut codewords = vec![0u16; rows as usize * cols as usize];
                let fitted = PDF417Encoder::new(&mut codewords, false)
                    .append_ascii(data)
                    .fit_seal()
                    .map(|(level, filled)| (level, filled.to_vec()));
                if let Some((level, filled)) = fitted {
                    return Some((rows, cols, level, filled));
                }
            }
        }
        None
    }
}

impl SegmentEncoder for Pdf417 {
    fn name(&self) -> &'static str {
        "pdf417"
    }

    fn encode_segs(&self, symbol: &mut Symbol, segs: &[Segment]) -> Result<Option<Warning>> {
        if let Some(seg) = segs.iter().find(|s| s.eci != 0) {
            return Err(Error::invalid_option(
                463,
                format!("ECI {} not supported by this encoder", seg.eci),
            ));
        }
        let bytes: Vec<u8> = segs.iter().flat_map(|s| s.source.iter().copied()).collect();
        if !bytes.is_ascii() {
            return Err(Error::invalid_data(462, "Invalid character in input data (ASCII only)"));
        }
        // ASCII is valid UTF-8
        let data = String::from_utf8_lossy(&bytes);

        let fixed_cols = match symbol.options.option_2 {
            c @ 1..=30 => Some(c as u8),
            _ => None,
        };
        let (rows, cols, level, codewords) = Pdf417::layout(&data, fixed_cols)
            .ok_or_else(|| Error::too_long(464, "Input too long"))?;
        log::debug!("PDF417 {} rows x {} columns, ECC level {}", rows, cols, level);

        let width = symbol_width(cols);
        let bits: Vec<u8> = PDF417::new(&codewords, rows, cols, level).bits().map(u8::from).collect();
        for row in bits.chunks(width).take(rows as usize) {
            symbol.grid_mut().push_row(row.to_vec(), ROW_HEIGHT)?;
        }
        symbol.set_height(0.0, 0.0, 0.0);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol() -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = crate::symbology::Symbology::Pdf417.id();
        s
    }

    #[test]
    fn test_encodes_rows_of_fixed_width() {
        let mut s = symbol();
        Pdf417.encode_segs(&mut s, &[Segment::from("Hello, PDF417!")]).unwrap();
        assert!(s.rows() >= MIN_ROWS as usize);
        assert!(s.rows() < crate::symbol::MAX_ROWS);
        assert_eq!((s.width() - symbol_width(1)) % 17, 0);
        assert_eq!(s.height(), s.rows() as f32 * ROW_HEIGHT);
    }

    #[test]
    fn test_fixed_columns() {
        let mut s = symbol();
        s.options.option_2 = 4;
        Pdf417.encode_segs(&mut s, &[Segment::from("ABC")]).unwrap();
        assert_eq!(s.width(), symbol_width(4));
    }

    #[test]
    fn test_rejects_non_ascii_and_eci() {
        let mut s = symbol();
        assert_eq!(Pdf417.encode_segs(&mut s, &[Segment::new(vec![0xE9], 0)]).unwrap_err().reason, 462);
        assert_eq!(Pdf417.encode_segs(&mut s, &[Segment::new("A", 3)]).unwrap_err().reason, 463);
    }

    #[test]
    fn test_initial_cols_grows_with_length() {
        assert_eq!(initial_cols(0), 1);
        assert!(initial_cols(1000) > initial_cols(50));
        assert!(initial_cols(100_000) <= MAX_COLS);
    }
}
