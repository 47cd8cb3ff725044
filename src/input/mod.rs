//! # Input Normalization
//!
//! Validates caller segments and turns them into the owned, normalized
//! segment list the dispatcher routes to an encoder backend.
//!
//! ## Stages
//!
//! ```text
//! segments ─► counts/lengths ─► ECI reconcile ─► legacy remap
//!          ─► segment/ECI/option checks ─► GS1 + UTF-8 checks
//!          ─► copy ─► escapes ─► BOM strip ─► GS1 reduction ─► Prepared
//! ```
//!
//! Every stage fails fast with a tagged [`Error`]. Nothing on the symbol is
//! touched until a stage has passed, except the reconciled ECI and the
//! resolved symbology which later stages depend on.

pub mod eci;
mod eci_tables;
pub mod escape;
pub mod gs1;

use crate::error::{Error, Result, Warning};
use crate::symbol::{InputMode, MAX_DATA_LEN, MAX_ROWS, MAX_SEG_COUNT, Segment, Symbol};
use crate::symbology::{Symbology, legacy};

/// UTF-8 byte order mark.
const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Normalized request, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub symbology: Symbology,
    pub segs: Vec<Segment>,
    /// Linear component data for composite symbologies
    pub primary: Vec<u8>,
    /// At least one segment had no explicit ECI
    pub have_zero_eci: bool,
    /// Warning raised by the legacy id remap, if any
    pub warning: Option<Warning>,
}

/// Run every normalization stage over `segs` for `symbol`.
///
/// On success the symbol's symbology is resolved to its canonical id and
/// its ECI is reconciled with segment zero.
pub fn prepare(symbol: &mut Symbol, segs: &[Segment]) -> Result<Prepared> {
    if segs.is_empty() {
        return Err(Error::invalid_data(205, "No input data"));
    }
    if segs.len() > MAX_SEG_COUNT {
        return Err(Error::invalid_option(771, "Too many input segments (maximum 256)"));
    }

    // The empty-data wording needs the requested symbology, before remap
    let requested = Symbology::from_id(symbol.options.symbology);
    check_lengths(symbol, requested, segs)?;

    let mut local: Vec<Segment> = segs.to_vec();
    reconcile_eci(symbol, &mut local)?;

    let remapped = legacy::remap(symbol.options.symbology)?;
    let symbology = remapped.symbology;
    if remapped.warning.is_some() {
        log::debug!("Symbology {} remapped to {}", symbol.options.symbology, symbology);
    }
    symbol.set_symbology(symbology);

    if local.len() > 1 && !symbology.supports_eci() {
        return Err(Error::invalid_option(775, "Symbology does not support multiple segments"));
    }

    let have_zero_eci = check_ecis(symbology, symbol.options.eci, &local)?;
    check_options(symbol, symbology)?;

    let gs1 = symbol.options.input_mode == InputMode::Gs1;
    if gs1 && !symbology.gs1_compliant() {
        return Err(Error::invalid_option(220, "Selected symbology does not support GS1 mode"));
    }
    if gs1 && local.len() > 1 {
        return Err(Error::invalid_option(776, "GS1 mode not supported for multiple segments"));
    }

    let unicode = symbol.options.input_mode == InputMode::Unicode;
    if unicode && local.iter().any(|s| std::str::from_utf8(&s.source).is_err()) {
        return Err(Error::invalid_data(245, "Invalid UTF-8 in input data"));
    }

    let mut primary = symbol.options.primary.as_bytes().to_vec();
    if symbol.options.escape {
        for seg in local.iter_mut() {
            seg.source = escape::process(&seg.source)?;
        }
        if !primary.is_empty() {
            primary = escape::process(&primary)?;
        }
        log::debug!("Escape sequences expanded in {} segments", local.len());
    }

    if unicode {
        strip_bom(&mut local[0].source);
    }

    if gs1 || symbology.forces_gs1() {
        // Forced linear symbologies see raw data and reduce it themselves
        if symbology.is_composite() || !symbology.forces_gs1() {
            let opts = gs1::Gs1Options {
                parens: symbol.options.gs1_parens,
                nocheck: symbol.options.gs1_nocheck,
            };
            let (reduced, _) = gs1::verify(&local[0].source, opts).map_err(|e| {
                if symbology.is_composite() {
                    e.with_suffix(" in 2D component")
                } else {
                    e
                }
            })?;
            local[0].source = reduced;
        }
    }

    Ok(Prepared {
        symbology,
        segs: local,
        primary,
        have_zero_eci,
        warning: remapped.warning,
    })
}

fn check_lengths(symbol: &Symbol, requested: Option<Symbology>, segs: &[Segment]) -> Result<()> {
    let mut total = 0usize;
    for (i, seg) in segs.iter().enumerate() {
        if seg.is_empty() {
            if i > 0 {
                return Err(Error::invalid_data(773, format!("Input segment {} empty", i)));
            }
            let gs1 = symbol.options.input_mode == InputMode::Gs1
                || requested.is_some_and(Symbology::forces_gs1);
            return Err(match requested {
                Some(s) if s.is_composite() && gs1 => {
                    Error::invalid_data(779, "No composite data in 2D component")
                }
                Some(s) if s.supports_eci() => Error::invalid_data(778, "No input data (segment 0 empty)"),
                _ => Error::invalid_data(778, "No input data"),
            });
        }
        if seg.len() > MAX_DATA_LEN {
            return Err(Error::too_long(777, "Input too long"));
        }
        total += seg.len();
    }
    if total > MAX_DATA_LEN {
        return Err(Error::too_long(243, "Input too long"));
    }
    Ok(())
}

fn reconcile_eci(symbol: &mut Symbol, segs: &mut [Segment]) -> Result<()> {
    let symbol_eci = symbol.options.eci;
    let seg_eci = segs[0].eci;
    match (symbol_eci, seg_eci) {
        (0, 0) => {}
        (0, e) => symbol.options.eci = e,
        (e, 0) => segs[0].eci = e,
        (a, b) if a != b => {
            return Err(Error::invalid_option(
                774,
                format!("Symbol ECI {} must match segment zero ECI {}", a, b),
            ));
        }
        _ => {}
    }
    if symbol.options.eci != 0 {
        log::debug!("ECI reconciled to {}", symbol.options.eci);
    }
    Ok(())
}

/// Validates declared ECIs; returns whether any segment has none.
fn check_ecis(symbology: Symbology, symbol_eci: i32, segs: &[Segment]) -> Result<bool> {
    let mut have_zero_eci = false;
    for seg in segs {
        if seg.eci == 0 {
            have_zero_eci = true;
            continue;
        }
        if !symbology.supports_eci() {
            return Err(Error::invalid_option(217, "Symbology does not support ECI switching"));
        }
        if !eci::is_valid(seg.eci) {
            return Err(Error::invalid_option(218, format!("Invalid ECI code {}", seg.eci)));
        }
    }
    if symbol_eci != 0 && !eci::is_valid(symbol_eci) {
        return Err(Error::invalid_option(218, format!("Invalid ECI code {}", symbol_eci)));
    }
    Ok(have_zero_eci)
}

fn check_options(symbol: &Symbol, symbology: Symbology) -> Result<()> {
    let o = &symbol.options;
    if !(0.01..=100.0).contains(&o.scale) {
        return Err(Error::invalid_option(227, "Scale out of range (0.01 to 100)"));
    }
    if !(0.01..=20.0).contains(&o.dot_size) {
        return Err(Error::invalid_option(221, "Invalid dot size"));
    }
    if !(0.0..=2000.0).contains(&o.height) {
        return Err(Error::invalid_option(765, "Height out of range (0 to 2000)"));
    }
    if !(0.0..=50.0).contains(&o.guard_descent) {
        return Err(Error::invalid_option(769, "Guard bar descent out of range (0 to 50)"));
    }
    if !(0..=100).contains(&o.whitespace_width) {
        return Err(Error::invalid_option(766, "Whitespace width out of range (0 to 100)"));
    }
    if !(0..=100).contains(&o.whitespace_height) {
        return Err(Error::invalid_option(767, "Whitespace height out of range (0 to 100)"));
    }
    if !(0..=100).contains(&o.border_width) {
        return Err(Error::invalid_option(768, "Border width out of range (0 to 100)"));
    }
    if symbology.is_stackable() && symbol.rows() + 1 >= MAX_ROWS {
        return Err(Error::too_long(770, "Too many stacked symbols"));
    }
    Ok(())
}

/// Remove a leading BOM when at least one byte follows it.
pub fn strip_bom(source: &mut Vec<u8>) {
    if source.len() > BOM.len() && source.starts_with(&BOM) {
        source.drain(..BOM.len());
        log::debug!("Stripped UTF-8 BOM from segment 0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn symbol(symbology: Symbology) -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = symbology.id();
        s
    }

    #[test]
    fn test_strip_bom() {
        let mut data = vec![0xEF, 0xBB, 0xBF, b'A', b'B'];
        strip_bom(&mut data);
        assert_eq!(data, b"AB");

        let mut bom_only = BOM.to_vec();
        strip_bom(&mut bom_only);
        assert_eq!(bom_only, BOM.to_vec());
    }

    #[test]
    fn test_bom_only_stripped_in_unicode_mode_on_first_segment() {
        let mut s = symbol(Symbology::QrCode);
        s.options.input_mode = InputMode::Unicode;
        let segs = [
            Segment::new([0xEF, 0xBB, 0xBF, b'1'], 0),
            Segment::new([0xEF, 0xBB, 0xBF, b'2'], 0),
        ];
        let p = prepare(&mut s, &segs).unwrap();
        assert_eq!(p.segs[0].source, b"1");
        assert_eq!(p.segs[1].source, vec![0xEF, 0xBB, 0xBF, b'2']);

        let mut data_mode = symbol(Symbology::QrCode);
        let p = prepare(&mut data_mode, &segs[..1]).unwrap();
        assert_eq!(p.segs[0].source.len(), 4);
    }

    #[test]
    fn test_empty_segment_wording() {
        let mut s = symbol(Symbology::Code128);
        let e = prepare(&mut s, &[Segment::new("", 0)]).unwrap_err();
        assert_eq!(e.to_string(), "Error 778: No input data");

        let mut s = symbol(Symbology::QrCode);
        let e = prepare(&mut s, &[Segment::new("A", 0), Segment::new("", 0)]).unwrap_err();
        assert_eq!(e.reason, 773);

        let mut s = symbol(Symbology::EanxCc);
        s.options.primary = "331234567890".to_string();
        let e = prepare(&mut s, &[Segment::new("", 0)]).unwrap_err();
        assert_eq!(e.reason, 779);
    }

    #[test]
    fn test_too_long() {
        let mut s = symbol(Symbology::QrCode);
        let big = vec![b'A'; MAX_DATA_LEN + 1];
        assert_eq!(prepare(&mut s, &[Segment::new(big, 0)]).unwrap_err().reason, 777);

        let half = vec![b'A'; MAX_DATA_LEN / 2 + 1];
        let segs = [Segment::new(half.clone(), 0), Segment::new(half, 0)];
        assert_eq!(prepare(&mut s, &segs).unwrap_err().reason, 243);
    }

    #[test]
    fn test_eci_reconcile() {
        let mut s = symbol(Symbology::QrCode);
        s.options.eci = 7;
        let p = prepare(&mut s, &[Segment::new("A", 0)]).unwrap();
        assert_eq!(p.segs[0].eci, 7);
        assert!(!p.have_zero_eci);

        let mut s = symbol(Symbology::QrCode);
        prepare(&mut s, &[Segment::new("A", 9)]).unwrap();
        assert_eq!(s.options.eci, 9);

        let mut s = symbol(Symbology::QrCode);
        s.options.eci = 7;
        let e = prepare(&mut s, &[Segment::new("A", 9)]).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidOption);
        assert_eq!(e.reason, 774);
    }

    #[test]
    fn test_multi_segment_needs_eci_support() {
        let mut s = symbol(Symbology::Code128);
        let e = prepare(&mut s, &[Segment::from("A"), Segment::from("B")]).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidOption);
        assert_eq!(e.reason, 775);
    }

    #[test]
    fn test_eci_checks() {
        let mut s = symbol(Symbology::Code128);
        assert_eq!(prepare(&mut s, &[Segment::new("A", 3)]).unwrap_err().reason, 217);

        let mut s = symbol(Symbology::QrCode);
        assert_eq!(prepare(&mut s, &[Segment::new("A", 14)]).unwrap_err().reason, 218);
    }

    #[test]
    fn test_option_ranges() {
        let cases: [(fn(&mut Symbol), u16); 7] = [
            (|s| s.options.scale = 0.0, 227),
            (|s| s.options.dot_size = 25.0, 221),
            (|s| s.options.height = 2001.0, 765),
            (|s| s.options.guard_descent = 51.0, 769),
            (|s| s.options.whitespace_width = 101, 766),
            (|s| s.options.whitespace_height = -1, 767),
            (|s| s.options.border_width = 101, 768),
        ];
        for (tweak, reason) in cases {
            let mut s = symbol(Symbology::Code128);
            tweak(&mut s);
            assert_eq!(prepare(&mut s, &[Segment::from("A")]).unwrap_err().reason, reason);
        }
    }

    #[test]
    fn test_gs1_mode_checks() {
        let mut s = symbol(Symbology::Code39);
        s.options.input_mode = InputMode::Gs1;
        let e = prepare(&mut s, &[Segment::from("[01]09501101530003")]).unwrap_err();
        assert_eq!(e.reason, 220);

        let mut s = symbol(Symbology::QrCode);
        s.options.input_mode = InputMode::Gs1;
        let p = prepare(&mut s, &[Segment::from("[01]09501101530003")]).unwrap();
        assert_eq!(p.segs[0].source, b"0109501101530003");
    }

    #[test]
    fn test_gs1_forced_linear_gets_raw_data() {
        let mut s = symbol(Symbology::Gs1_128);
        let p = prepare(&mut s, &[Segment::from("[01]09501101530003")]).unwrap();
        assert_eq!(p.segs[0].source, b"[01]09501101530003");
    }

    #[test]
    fn test_invalid_utf8_in_unicode_mode() {
        let mut s = symbol(Symbology::Code128);
        s.options.input_mode = InputMode::Unicode;
        let e = prepare(&mut s, &[Segment::new([0xC3], 0)]).unwrap_err();
        assert_eq!(e.reason, 245);
    }

    #[test]
    fn test_escape_applies_to_segments_and_primary() {
        let mut s = symbol(Symbology::Code128);
        s.options.escape = true;
        s.options.primary = "\\x41".to_string();
        let p = prepare(&mut s, &[Segment::from("A\\tB")]).unwrap();
        assert_eq!(p.segs[0].source, b"A\tB");
        assert_eq!(p.primary, b"A");
    }

    #[test]
    fn test_legacy_remap_warning_carried() {
        let mut s = Symbol::new();
        s.options.symbology = 94;
        let p = prepare(&mut s, &[Segment::from("A")]).unwrap();
        assert_eq!(p.symbology, Symbology::Code128);
        assert!(p.warning.is_some());
        assert_eq!(s.options.symbology, 20);
    }
}
