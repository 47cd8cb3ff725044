//! ZSoft PCX version 5 writer: 24 bit colour as three 8 bit planes (four
//! with alpha), run-length encoded per plane per scanline.

use crate::error::Result;
use crate::raster::{Canvas, PAPER, Palette};

const HEADER_LEN: usize = 128;
/// Resolution written into the header, in dots per inch.
const DEFAULT_DPI: u16 = 300;
/// Longest run one count byte can hold.
const MAX_RUN: usize = 63;

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn header(width: u16, height: u16, planes: u8, bytes_per_line: u16) -> Vec<u8> {
    let mut h = Vec::with_capacity(HEADER_LEN);
    h.push(10); // manufacturer
    h.push(5); // version
    h.push(1); // run-length encoding
    h.push(8); // bits per pixel per plane
    push_u16(&mut h, 0);
    push_u16(&mut h, 0);
    push_u16(&mut h, width.saturating_sub(1));
    push_u16(&mut h, height.saturating_sub(1));
    push_u16(&mut h, DEFAULT_DPI);
    push_u16(&mut h, DEFAULT_DPI);
    h.extend_from_slice(&[0; 48]); // EGA palette, unused
    h.push(0);
    h.push(planes);
    push_u16(&mut h, bytes_per_line);
    push_u16(&mut h, 1); // colour palette
    push_u16(&mut h, 0);
    push_u16(&mut h, 0);
    h.resize(HEADER_LEN, 0);
    h
}

/// Run-length encode one plane of one scanline.
fn rle(line: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < line.len() {
        let b = line[i];
        let mut run = 1;
        while i + run < line.len() && line[i + run] == b && run < MAX_RUN {
            run += 1;
        }
        if run > 1 || b >= 0xc0 {
            out.push(0xc0 | run as u8);
        }
        out.push(b);
        i += run;
    }
}

/// Encode a palette canvas as PCX.
pub fn encode(canvas: &Canvas, palette: &Palette) -> Result<Vec<u8>> {
    let width = u16::try_from(canvas.width).unwrap_or(u16::MAX);
    let height = u16::try_from(canvas.height).unwrap_or(u16::MAX);
    let planes: u8 = if palette.has_alpha() { 4 } else { 3 };
    // Scanlines are padded to an even length
    let bytes_per_line = canvas.width + (canvas.width & 1);
    let (fg_alpha, bg_alpha) = (
        palette.fg.alpha.unwrap_or(0xff),
        palette.bg.alpha.unwrap_or(0xff),
    );

    let mut out = header(width, height, planes, bytes_per_line as u16);
    let mut line = vec![0u8; bytes_per_line];
    for y in 0..canvas.height {
        let row = canvas.row(y);
        for plane in 0..planes as usize {
            for (x, &p) in row.iter().enumerate() {
                line[x] = match plane {
                    3 if p == PAPER => bg_alpha,
                    3 => fg_alpha,
                    _ => palette.rgb(p)[plane],
                };
            }
            rle(&line, &mut out);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::INK;

    #[test]
    fn test_rle_runs_and_high_bytes() {
        let mut out = Vec::new();
        rle(&[5, 5, 5, 0xc1, 7], &mut out);
        assert_eq!(out, vec![0xc3, 5, 0xc1, 0xc1, 7]);
    }

    #[test]
    fn test_rle_splits_long_runs() {
        let mut out = Vec::new();
        rle(&[0; 70], &mut out);
        assert_eq!(out, vec![0xff, 0, 0xc7, 0]);
    }

    #[test]
    fn test_header_fields() {
        let mut canvas = Canvas::new(3, 2, 658).unwrap();
        canvas.set(0, 0, INK);
        let palette = Palette::new("000000", "ffffff").unwrap();
        let bytes = encode(&canvas, &palette).unwrap();
        assert_eq!(&bytes[0..4], &[10, 5, 1, 8]);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 2);
        assert_eq!(u16::from_le_bytes([bytes[10], bytes[11]]), 1);
        assert_eq!(bytes[65], 3);
        assert_eq!(u16::from_le_bytes([bytes[66], bytes[67]]), 4);
        // Red plane of the first scanline: ink, paper, paper, pad
        assert_eq!(&bytes[128..132], &[0, 0xc2, 0xff, 0]);
    }

    #[test]
    fn test_alpha_adds_plane() {
        let canvas = Canvas::new(2, 1, 658).unwrap();
        let palette = Palette::new("000000", "ffffff80").unwrap();
        let bytes = encode(&canvas, &palette).unwrap();
        assert_eq!(bytes[65], 4);
        // 3 colour planes of two 0xff bytes then the alpha plane
        assert_eq!(&bytes[128..], &[0xc2, 0xff, 0xc2, 0xff, 0xc2, 0xff, 0xc2, 0x80]);
    }
}
