//! # ECI Character Sets
//!
//! Conversion of UTF-8 input into the byte encoding an Extended Channel
//! Interpretation selects, plus the best-fit search used when data does
//! not fit the symbology's default character set.
//!
//! | ECI | Encoding |
//! |-----|----------|
//! | 0, 3 | ISO/IEC 8859-1 (0 = no ECI emitted) |
//! | 4-13, 15-18 | ISO/IEC 8859-2 .. 8859-16 |
//! | 21-24 | Windows-1250, 1251, 1252, 1256 |
//! | 25 / 33 | UTF-16BE / UTF-16LE |
//! | 26 | UTF-8 (left as is) |
//! | 27 | ASCII |
//! | 34 / 35 | UTF-32BE / UTF-32LE |
//! | 170 | ISO/IEC 646 invariant |
//!
//! Multibyte national sets (20, 28-32) and ECIs above 35 are passed
//! through untouched.

use super::eci_tables::*;
use crate::symbol::Segment;

/// ISO/IEC 646 characters outside the invariant set.
const ISO646_VARIANT: &[u8] = b"#$@[\\]^`{|}~";

/// `true` if `eci` may be declared on a segment (0 = none).
pub fn is_valid(eci: i32) -> bool {
    eci == 0 || ((3..=999_999).contains(&eci) && eci != 14 && eci != 19)
}

/// `true` if UTF-8 input is transcoded for `eci` before encoding.
pub fn is_convertible(eci: i32) -> bool {
    match eci {
        20 | 26 | 28..=32 => false,
        0..=35 | 170 => true,
        _ => false,
    }
}

/// Per-segment convertibility, or `None` if no segment is convertible.
pub fn convertible_segs(segs: &[Segment]) -> Option<Vec<bool>> {
    let flags: Vec<bool> = segs.iter().map(|s| is_convertible(s.eci)).collect();
    flags.iter().any(|&c| c).then_some(flags)
}

/// Convert UTF-8 `source` to the encoding of `eci`.
///
/// Returns `None` if the input is not valid UTF-8 or a character has no
/// representation in the target set.
pub fn utf8_to_eci(eci: i32, source: &[u8]) -> Option<Vec<u8>> {
    if !is_convertible(eci) {
        return Some(source.to_vec());
    }
    let text = std::str::from_utf8(source).ok()?;
    let mut out = Vec::with_capacity(source.len() * 2);

    match eci {
        25 => text.encode_utf16().for_each(|u| out.extend(u.to_be_bytes())),
        33 => text.encode_utf16().for_each(|u| out.extend(u.to_le_bytes())),
        34 => text.chars().for_each(|c| out.extend((c as u32).to_be_bytes())),
        35 => text.chars().for_each(|c| out.extend((c as u32).to_le_bytes())),
        _ => {
            for ch in text.chars() {
                out.push(single_byte(eci, ch)?);
            }
        }
    }
    Some(out)
}

/// Map one character into a single-byte ECI set.
fn single_byte(eci: i32, ch: char) -> Option<u8> {
    let cp = ch as u32;
    match eci {
        0 | 3 => u8::try_from(cp).ok(),
        27 => (cp < 0x80).then_some(cp as u8),
        170 => (cp < 0x80 && !ISO646_VARIANT.contains(&(cp as u8))).then_some(cp as u8),
        21..=24 => {
            if cp < 0x80 {
                return Some(cp as u8);
            }
            lookup(windows_table(eci), cp).map(|i| 0x80 + i)
        }
        _ => {
            if cp < 0xA0 {
                return Some(cp as u8);
            }
            lookup(iso_table(eci)?, cp).map(|i| 0xA0 + i)
        }
    }
}

fn lookup(table: &[u16], cp: u32) -> Option<u8> {
    if cp > 0xFFFF {
        return None;
    }
    table
        .iter()
        .position(|&u| u != 0 && u as u32 == cp)
        .map(|i| i as u8)
}

fn iso_table(eci: i32) -> Option<&'static [u16; 96]> {
    let table = match eci {
        4 => &ISO8859_2,
        5 => &ISO8859_3,
        6 => &ISO8859_4,
        7 => &ISO8859_5,
        8 => &ISO8859_6,
        9 => &ISO8859_7,
        10 => &ISO8859_8,
        11 => &ISO8859_9,
        12 => &ISO8859_10,
        13 => &ISO8859_11,
        15 => &ISO8859_13,
        16 => &ISO8859_14,
        17 => &ISO8859_15,
        18 => &ISO8859_16,
        _ => return None,
    };
    Some(table)
}

fn windows_table(eci: i32) -> &'static [u16; 128] {
    match eci {
        21 => &WINDOWS_1250,
        22 => &WINDOWS_1251,
        24 => &WINDOWS_1256,
        _ => &WINDOWS_1252,
    }
}

/// First single-byte ECI (3-24, skipping reserved 14, 19 and Shift JIS)
/// that can represent `source`; 26 (UTF-8) if none can; 0 if `source` is
/// not valid UTF-8.
pub fn best_eci(source: &[u8]) -> i32 {
    if std::str::from_utf8(source).is_err() {
        return 0;
    }
    let candidates = (3..=24).filter(|e| !matches!(e, 14 | 19 | 20));
    for eci in candidates {
        if utf8_to_eci(eci, source).is_some() {
            return eci;
        }
    }
    26
}

/// Assign best-fit ECIs to segments that have none.
///
/// Segments whose best fit is the symbology default keep ECI 0 unless
/// they follow a segment with a non-default ECI. Returns the first ECI
/// assigned (0 if none), and whether it was assigned to segment zero.
pub fn best_eci_segs(segs: &mut [Segment], default_eci: i32) -> (i32, bool) {
    let mut first_set = 0;
    let mut on_first_segment = false;

    for i in 0..segs.len() {
        if segs[i].eci != 0 {
            continue;
        }
        let eci = best_eci(&segs[i].source);
        if eci == 0 {
            return (0, false);
        }
        if eci == default_eci {
            if i != 0 && segs[i - 1].eci != 0 && segs[i - 1].eci != default_eci {
                segs[i].eci = eci;
                if first_set == 0 {
                    first_set = eci;
                }
            }
        } else {
            segs[i].eci = eci;
            if first_set == 0 {
                first_set = eci;
                on_first_segment = i == 0;
            }
        }
    }
    (first_set, on_first_segment)
}

/// Copy segments, switching a zero-ECI segment back to the default ECI
/// when it follows a segment with a non-default ECI.
pub fn with_default_ecis(segs: &[Segment], default_eci: i32) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segs.len());
    for seg in segs {
        let mut seg = seg.clone();
        if let Some(prev) = out.last() {
            if seg.eci == 0 && prev.eci != 0 && prev.eci != default_eci {
                seg.eci = default_eci;
            }
        }
        out.push(seg);
    }
    out
}
