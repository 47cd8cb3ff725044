//! Legacy symbology id remapping.
//!
//! Ids 1..=126 were historically shared with another vendor's numbering and
//! several retired ids are still accepted. The mapping below is a
//! compatibility contract: it is kept exactly, including ids that collapse
//! onto Code 128 with a warning.

use super::{LAST_ID, Symbology};
use crate::error::{Error, ErrorKind, Warning, WarningKind};

/// Result of resolving a caller-supplied id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped {
    pub symbology: Symbology,
    /// Set when the id was out of range or unsupported and was replaced.
    pub warning: Option<Warning>,
}

fn plain(symbology: Symbology) -> Remapped {
    Remapped {
        symbology,
        warning: None,
    }
}

fn warned(reason: u16, text: &str) -> Remapped {
    Remapped {
        symbology: Symbology::Code128,
        warning: Some(Warning::new(WarningKind::InvalidOption, reason, text)),
    }
}

/// Resolve `id` to a canonical symbology.
///
/// Canonical ids pass through. Legacy ids map silently or with an
/// `InvalidOption` warning; id 27 (UPCD1) is an error.
pub fn remap(id: i32) -> Result<Remapped, Error> {
    use Symbology::*;

    if let Some(s) = Symbology::from_id(id) {
        return Ok(plain(s));
    }

    let remapped = match id {
        i32::MIN..=0 => warned(206, "Symbology out of range"),
        5 => plain(C25Standard),
        10..=12 | 15 => plain(Eanx),
        17 | 26 | 36 => plain(Upca),
        19 => Remapped {
            symbology: Codabar,
            warning: Some(Warning::new(WarningKind::InvalidOption, 207, "Codabar 18 not supported")),
        },
        27 => return Err(Error::invalid_option(208, "UPCD1 not supported")),
        33 | 88 => plain(Gs1_128),
        39 => plain(Upce),
        41..=45 => plain(Postnet),
        46 => plain(Plessey),
        48 => plain(Nve18),
        59 | 61 => plain(Code128),
        62 => plain(Code93),
        64 | 65 => plain(AusPost),
        78 => plain(DbarOmn),
        83 => plain(Planet),
        91 => warned(212, "Symbology out of range"),
        94 | 95 => warned(213, "Symbology out of range"),
        100 => plain(Hibc128),
        101 => plain(Hibc39),
        103 => plain(HibcDm),
        105 => plain(HibcQr),
        107 => plain(HibcPdf),
        109 => plain(HibcMicPdf),
        111 => plain(HibcBlockF),
        113 | 114 => warned(214, "Symbology out of range"),
        117..=127 => warned(215, "Symbology out of range"),
        n if n > LAST_ID => warned(216, "Symbology out of range"),
        _ => return Err(Error::new(ErrorKind::EncodingProblem, 0, "Internal error")),
    };

    log::debug!("legacy symbology id {} remapped to {}", id, remapped.symbology);
    Ok(remapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_passthrough() {
        let r = remap(58).unwrap();
        assert_eq!(r.symbology, Symbology::QrCode);
        assert!(r.warning.is_none());
    }

    #[test]
    fn test_silent_remaps() {
        assert_eq!(remap(5).unwrap().symbology, Symbology::C25Standard);
        assert_eq!(remap(17).unwrap().symbology, Symbology::Upca);
        assert_eq!(remap(36).unwrap().symbology, Symbology::Upca);
        assert_eq!(remap(11).unwrap().symbology, Symbology::Eanx);
        assert_eq!(remap(101).unwrap().symbology, Symbology::Hibc39);
        assert!(remap(36).unwrap().warning.is_none());
    }

    #[test]
    fn test_warned_remaps() {
        for (id, reason) in [(0, 206), (91, 212), (94, 213), (95, 213), (113, 214), (120, 215), (200, 216)] {
            let r = remap(id).unwrap();
            assert_eq!(r.symbology, Symbology::Code128, "id {}", id);
            let w = r.warning.expect("warning expected");
            assert_eq!(w.kind, WarningKind::InvalidOption);
            assert_eq!(w.reason, reason);
        }
        let codabar = remap(19).unwrap();
        assert_eq!(codabar.symbology, Symbology::Codabar);
        assert_eq!(codabar.warning.map(|w| w.reason), Some(207));
    }

    #[test]
    fn test_mailmark_is_canonical() {
        assert_eq!(remap(121).unwrap().symbology, Symbology::Mailmark);
    }

    #[test]
    fn test_upcd1_rejected() {
        let e = remap(27).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidOption);
        assert_eq!(e.reason, 208);
    }
}
