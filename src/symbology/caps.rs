//! # Capability Table
//!
//! Per-symbology capability bitsets, computed once on first use and then
//! queried read-only.
//!
//! | Flag | Bit | Meaning |
//! |------|-----|---------|
//! | `HRT` | 0x0001 | prints human readable text |
//! | `STACKABLE` | 0x0002 | repeated encodes stack rows |
//! | `EXTENDABLE` | 0x0004 | UPC/EAN add-on digits |
//! | `COMPOSITE` | 0x0008 | linear + 2D component |
//! | `ECI` | 0x0010 | ECI switching and multiple segments |
//! | `GS1` | 0x0020 | accepts GS1 data |
//! | `DOTTY` | 0x0040 | renderable as dots |
//! | `QUIET_ZONES` | 0x0080 | has default quiet zones |
//! | `FIXED_RATIO` | 0x0100 | width/height ratio fixed |
//! | `READER_INIT` | 0x0200 | reader initialisation symbol |
//! | `FULL_MULTIBYTE` | 0x0400 | full multibyte compaction option |
//! | `MASK` | 0x0800 | user-selectable mask |
//! | `STRUCTAPP` | 0x1000 | structured append |
//! | `COMPLIANT_HEIGHT` | 0x2000 | has a standard-defined height |

use std::sync::LazyLock;

use bitflags::bitflags;

use super::{LAST_ID, Symbology};

bitflags! {
    /// Capability bits granted to a symbology.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct CapabilityFlags: u32 {
        const HRT = 0x0001;
        const STACKABLE = 0x0002;
        const EXTENDABLE = 0x0004;
        const COMPOSITE = 0x0008;
        const ECI = 0x0010;
        const GS1 = 0x0020;
        const DOTTY = 0x0040;
        const QUIET_ZONES = 0x0080;
        const FIXED_RATIO = 0x0100;
        const READER_INIT = 0x0200;
        const FULL_MULTIBYTE = 0x0400;
        const MASK = 0x0800;
        const STRUCTAPP = 0x1000;
        const COMPLIANT_HEIGHT = 0x2000;
    }
}

static TABLE: LazyLock<[CapabilityFlags; LAST_ID as usize + 1]> = LazyLock::new(|| {
    let mut table = [CapabilityFlags::empty(); LAST_ID as usize + 1];
    for &s in Symbology::ALL {
        table[s.id() as usize] = compute(s);
    }
    table
});

/// Capabilities of `id` intersected with `requested`.
///
/// Non-canonical ids (legacy aliases, out of range) grant nothing.
pub fn capabilities(id: i32, requested: CapabilityFlags) -> CapabilityFlags {
    match Symbology::from_id(id) {
        Some(s) => s.caps() & requested,
        None => CapabilityFlags::empty(),
    }
}

impl Symbology {
    /// Full capability set.
    pub fn caps(self) -> CapabilityFlags {
        TABLE[self.id() as usize]
    }

    pub fn supports_eci(self) -> bool {
        self.caps().contains(CapabilityFlags::ECI)
    }

    pub fn gs1_compliant(self) -> bool {
        self.caps().contains(CapabilityFlags::GS1)
    }

    pub fn has_hrt(self) -> bool {
        self.caps().contains(CapabilityFlags::HRT)
    }

    pub fn is_dotty(self) -> bool {
        self.caps().contains(CapabilityFlags::DOTTY)
    }

    pub fn is_fixed_ratio(self) -> bool {
        self.caps().contains(CapabilityFlags::FIXED_RATIO)
    }

    pub fn is_stackable(self) -> bool {
        self.caps().contains(CapabilityFlags::STACKABLE)
    }

    pub fn has_quiet_zones(self) -> bool {
        self.caps().contains(CapabilityFlags::QUIET_ZONES)
    }
}

fn compute(s: Symbology) -> CapabilityFlags {
    let mut flags = CapabilityFlags::empty();
    let mut set = |flag, on: bool| flags.set(flag, on);

    set(CapabilityFlags::HRT, has_hrt(s));
    set(CapabilityFlags::STACKABLE, is_stackable(s));
    set(CapabilityFlags::EXTENDABLE, is_extendable(s));
    set(CapabilityFlags::COMPOSITE, s.is_composite());
    set(CapabilityFlags::ECI, supports_eci(s));
    set(CapabilityFlags::GS1, gs1_compliant(s));
    set(CapabilityFlags::DOTTY, is_dotty(s));
    set(CapabilityFlags::QUIET_ZONES, has_quiet_zones(s));
    set(CapabilityFlags::FIXED_RATIO, is_fixed_ratio(s));
    set(CapabilityFlags::READER_INIT, supports_reader_init(s));
    set(CapabilityFlags::FULL_MULTIBYTE, supports_full_multibyte(s));
    set(CapabilityFlags::MASK, supports_mask(s));
    set(CapabilityFlags::STRUCTAPP, supports_structapp(s));
    set(CapabilityFlags::COMPLIANT_HEIGHT, has_compliant_height(s));
    flags
}

// ============================================================================
// PREDICATES
// ============================================================================

use Symbology::*;

fn supports_eci(s: Symbology) -> bool {
    matches!(
        s,
        Aztec | DataMatrix | Maxicode | MicroPdf417 | Pdf417 | Pdf417Comp | QrCode | DotCode
            | CodeOne | GridMatrix | HanXin | Ultra | Rmqr
    )
}

fn gs1_compliant(s: Symbology) -> bool {
    matches!(
        s,
        Code16k | Aztec | DataMatrix | Code49 | QrCode | DotCode | CodeOne | Ultra | Rmqr
    ) || s.forces_gs1()
}

fn is_dotty(s: Symbology) -> bool {
    matches!(
        s,
        QrCode | DataMatrix | MicroQr | HibcDm | Aztec | HibcQr | HibcAztec | AzRune | CodeOne
            | GridMatrix | HanXin | DotCode | UpnQr | Rmqr
    )
}

fn is_fixed_ratio(s: Symbology) -> bool {
    is_dotty(s) || matches!(s, Maxicode | Ultra)
}

fn has_hrt(s: Symbology) -> bool {
    if is_fixed_ratio(s) {
        return false;
    }
    !matches!(
        s,
        Code16k | Code49 | Flat | Postnet | Fim | Pharma | PharmaTwo | Pdf417 | Pdf417Comp
            | AusPost | AusReply | AusRoute | AusRedirect | Rm4scc | CodablockF | JapanPost
            | DbarStk | DbarOmnStk | DbarExpStk | Planet | MicroPdf417 | UspsImail | Kix | Daft
            | HibcPdf | HibcMicPdf | HibcBlockF | Mailmark | DbarStkCc | DbarOmnStkCc
            | DbarExpStkCc
    )
}

fn is_stackable(s: Symbology) -> bool {
    if s.id() < PharmaTwo.id() && s != Postnet {
        return true;
    }
    matches!(
        s,
        Code128B | Isbnx | Ean14 | Nve18 | KoreaPost | Plessey | TelepenNum | Itf14 | Code32
            | CodablockF | HibcBlockF
    )
}

fn is_extendable(s: Symbology) -> bool {
    matches!(
        s,
        Eanx | EanxChk | Upca | UpcaChk | Upce | UpceChk | Isbnx | EanxCc | UpcaCc | UpceCc
    )
}

fn has_quiet_zones(s: Symbology) -> bool {
    matches!(
        s,
        Code16k | Code49 | CodablockF | HibcBlockF | Itf14 | Eanx | EanxChk | EanxCc | Isbnx
            | Upca | UpcaChk | UpcaCc | Upce | UpceChk | UpceCc
    )
}

fn supports_reader_init(s: Symbology) -> bool {
    matches!(
        s,
        Code128 | Code128B | Code16k | CodablockF | Pdf417 | Pdf417Comp | DataMatrix
            | MicroPdf417 | Aztec | DotCode | GridMatrix | Ultra
    )
}

fn supports_full_multibyte(s: Symbology) -> bool {
    matches!(s, QrCode | MicroQr | Rmqr | HanXin | GridMatrix)
}

fn supports_mask(s: Symbology) -> bool {
    matches!(s, QrCode | MicroQr | UpnQr | HanXin | DotCode)
}

fn supports_structapp(s: Symbology) -> bool {
    matches!(
        s,
        Pdf417 | Pdf417Comp | Maxicode | QrCode | DataMatrix | MicroPdf417 | Aztec | HibcDm
            | HibcQr | HibcPdf | HibcMicPdf | HibcAztec | DotCode | CodeOne | GridMatrix | Ultra
    )
}

fn has_compliant_height(s: Symbology) -> bool {
    if is_fixed_ratio(s) {
        return false;
    }
    !matches!(
        s,
        Code11 | C25Standard | C25Iata | C25Logic | C25Ind | Code128 | Code128B | DpLeit
            | DpIdent | Flat | MsiPlessey | Pdf417 | Pdf417Comp | Vin | KoreaPost | MicroPdf417
            | Plessey | Daft | Hibc128 | HibcPdf | HibcMicPdf
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_capabilities() {
        let caps = QrCode.caps();
        assert!(caps.contains(CapabilityFlags::ECI | CapabilityFlags::GS1 | CapabilityFlags::DOTTY));
        assert!(caps.contains(CapabilityFlags::FIXED_RATIO | CapabilityFlags::MASK));
        assert!(!caps.contains(CapabilityFlags::HRT));
    }

    #[test]
    fn test_requested_mask_intersects() {
        let granted = capabilities(20, CapabilityFlags::HRT | CapabilityFlags::ECI);
        assert_eq!(granted, CapabilityFlags::HRT);
        assert_eq!(capabilities(5, CapabilityFlags::all()), CapabilityFlags::empty());
    }

    #[test]
    fn test_stackable() {
        assert!(Code128.is_stackable());
        assert!(Code39.is_stackable());
        assert!(!Postnet.is_stackable());
        assert!(!Pdf417.is_stackable());
        assert!(Itf14.is_stackable());
    }

    #[test]
    fn test_hrt_and_heights() {
        assert!(Code128.has_hrt());
        assert!(!Pdf417.has_hrt());
        assert!(!Maxicode.has_hrt());
        assert!(Upca.caps().contains(CapabilityFlags::COMPLIANT_HEIGHT));
        assert!(!Code128.caps().contains(CapabilityFlags::COMPLIANT_HEIGHT));
    }

    #[test]
    fn test_gs1() {
        assert!(Gs1_128.gs1_compliant());
        assert!(DataMatrix.gs1_compliant());
        assert!(!Code39.gs1_compliant());
        assert!(!Code128.gs1_compliant());
    }

    #[test]
    fn test_composites() {
        for id in 130..=139 {
            let caps = capabilities(id, CapabilityFlags::all());
            assert!(caps.contains(CapabilityFlags::COMPOSITE | CapabilityFlags::GS1), "id {}", id);
        }
    }
}
