//! # Symbologies
//!
//! Canonical symbology identifiers, their classic names, the legacy id
//! remap table and the capability table.
//!
//! ## Identifier space
//!
//! Ids are the classic numeric values (1..=146). Gaps in the range are
//! legacy aliases handled by [`legacy::remap`]; they never appear as a
//! [`Symbology`] variant.
//!
//! ```text
//! caller id ──► legacy::remap ──► Symbology ──► caps::capabilities
//! ```

pub mod caps;
pub mod legacy;

pub use caps::{CapabilityFlags, capabilities};

macro_rules! symbologies {
    ($($variant:ident = $id:literal => $name:literal,)*) => {
        /// A canonical barcode symbology.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        #[allow(non_camel_case_types)]
        pub enum Symbology {
            $($variant = $id,)*
        }

        impl Symbology {
            /// Every canonical symbology in id order.
            pub const ALL: &'static [Symbology] = &[$(Symbology::$variant,)*];

            /// Look up a canonical id. Legacy aliases return `None`.
            pub fn from_id(id: i32) -> Option<Symbology> {
                match id {
                    $($id => Some(Symbology::$variant),)*
                    _ => None,
                }
            }

            /// Classic `BARCODE_*` name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Symbology::$variant => $name,)*
                }
            }
        }
    };
}

symbologies! {
    Code11 = 1 => "BARCODE_CODE11",
    C25Standard = 2 => "BARCODE_C25STANDARD",
    C25Inter = 3 => "BARCODE_C25INTER",
    C25Iata = 4 => "BARCODE_C25IATA",
    C25Logic = 6 => "BARCODE_C25LOGIC",
    C25Ind = 7 => "BARCODE_C25IND",
    Code39 = 8 => "BARCODE_CODE39",
    ExCode39 = 9 => "BARCODE_EXCODE39",
    Eanx = 13 => "BARCODE_EANX",
    EanxChk = 14 => "BARCODE_EANX_CHK",
    Gs1_128 = 16 => "BARCODE_GS1_128",
    Codabar = 18 => "BARCODE_CODABAR",
    Code128 = 20 => "BARCODE_CODE128",
    DpLeit = 21 => "BARCODE_DPLEIT",
    DpIdent = 22 => "BARCODE_DPIDENT",
    Code16k = 23 => "BARCODE_CODE16K",
    Code49 = 24 => "BARCODE_CODE49",
    Code93 = 25 => "BARCODE_CODE93",
    Flat = 28 => "BARCODE_FLAT",
    DbarOmn = 29 => "BARCODE_DBAR_OMN",
    DbarLtd = 30 => "BARCODE_DBAR_LTD",
    DbarExp = 31 => "BARCODE_DBAR_EXP",
    Telepen = 32 => "BARCODE_TELEPEN",
    Upca = 34 => "BARCODE_UPCA",
    UpcaChk = 35 => "BARCODE_UPCA_CHK",
    Upce = 37 => "BARCODE_UPCE",
    UpceChk = 38 => "BARCODE_UPCE_CHK",
    Postnet = 40 => "BARCODE_POSTNET",
    MsiPlessey = 47 => "BARCODE_MSI_PLESSEY",
    Fim = 49 => "BARCODE_FIM",
    Logmars = 50 => "BARCODE_LOGMARS",
    Pharma = 51 => "BARCODE_PHARMA",
    Pzn = 52 => "BARCODE_PZN",
    PharmaTwo = 53 => "BARCODE_PHARMA_TWO",
    Cepnet = 54 => "BARCODE_CEPNET",
    Pdf417 = 55 => "BARCODE_PDF417",
    Pdf417Comp = 56 => "BARCODE_PDF417COMP",
    Maxicode = 57 => "BARCODE_MAXICODE",
    QrCode = 58 => "BARCODE_QRCODE",
    Code128B = 60 => "BARCODE_CODE128B",
    AusPost = 63 => "BARCODE_AUSPOST",
    AusReply = 66 => "BARCODE_AUSREPLY",
    AusRoute = 67 => "BARCODE_AUSROUTE",
    AusRedirect = 68 => "BARCODE_AUSREDIRECT",
    Isbnx = 69 => "BARCODE_ISBNX",
    Rm4scc = 70 => "BARCODE_RM4SCC",
    DataMatrix = 71 => "BARCODE_DATAMATRIX",
    Ean14 = 72 => "BARCODE_EAN14",
    Vin = 73 => "BARCODE_VIN",
    CodablockF = 74 => "BARCODE_CODABLOCKF",
    Nve18 = 75 => "BARCODE_NVE18",
    JapanPost = 76 => "BARCODE_JAPANPOST",
    KoreaPost = 77 => "BARCODE_KOREAPOST",
    DbarStk = 79 => "BARCODE_DBAR_STK",
    DbarOmnStk = 80 => "BARCODE_DBAR_OMNSTK",
    DbarExpStk = 81 => "BARCODE_DBAR_EXPSTK",
    Planet = 82 => "BARCODE_PLANET",
    MicroPdf417 = 84 => "BARCODE_MICROPDF417",
    UspsImail = 85 => "BARCODE_USPS_IMAIL",
    Plessey = 86 => "BARCODE_PLESSEY",
    TelepenNum = 87 => "BARCODE_TELEPEN_NUM",
    Itf14 = 89 => "BARCODE_ITF14",
    Kix = 90 => "BARCODE_KIX",
    Aztec = 92 => "BARCODE_AZTEC",
    Daft = 93 => "BARCODE_DAFT",
    Dpd = 96 => "BARCODE_DPD",
    MicroQr = 97 => "BARCODE_MICROQR",
    Hibc128 = 98 => "BARCODE_HIBC_128",
    Hibc39 = 99 => "BARCODE_HIBC_39",
    HibcDm = 102 => "BARCODE_HIBC_DM",
    HibcQr = 104 => "BARCODE_HIBC_QR",
    HibcPdf = 106 => "BARCODE_HIBC_PDF",
    HibcMicPdf = 108 => "BARCODE_HIBC_MICPDF",
    HibcBlockF = 110 => "BARCODE_HIBC_BLOCKF",
    HibcAztec = 112 => "BARCODE_HIBC_AZTEC",
    DotCode = 115 => "BARCODE_DOTCODE",
    HanXin = 116 => "BARCODE_HANXIN",
    Mailmark = 121 => "BARCODE_MAILMARK",
    AzRune = 128 => "BARCODE_AZRUNE",
    Code32 = 129 => "BARCODE_CODE32",
    EanxCc = 130 => "BARCODE_EANX_CC",
    Gs1_128Cc = 131 => "BARCODE_GS1_128_CC",
    DbarOmnCc = 132 => "BARCODE_DBAR_OMN_CC",
    DbarLtdCc = 133 => "BARCODE_DBAR_LTD_CC",
    DbarExpCc = 134 => "BARCODE_DBAR_EXP_CC",
    UpcaCc = 135 => "BARCODE_UPCA_CC",
    UpceCc = 136 => "BARCODE_UPCE_CC",
    DbarStkCc = 137 => "BARCODE_DBAR_STK_CC",
    DbarOmnStkCc = 138 => "BARCODE_DBAR_OMNSTK_CC",
    DbarExpStkCc = 139 => "BARCODE_DBAR_EXPSTK_CC",
    Channel = 140 => "BARCODE_CHANNEL",
    CodeOne = 141 => "BARCODE_CODEONE",
    GridMatrix = 142 => "BARCODE_GRIDMATRIX",
    UpnQr = 143 => "BARCODE_UPNQR",
    Ultra = 144 => "BARCODE_ULTRA",
    Rmqr = 145 => "BARCODE_RMQR",
    Bc412 = 146 => "BARCODE_BC412",
}

/// Highest valid symbology id.
pub const LAST_ID: i32 = 146;

impl Symbology {
    /// Numeric id.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up by classic name, with or without the `BARCODE_` prefix,
    /// case-insensitive.
    pub fn from_name(name: &str) -> Option<Symbology> {
        let upper = name.trim().to_ascii_uppercase();
        let wanted = upper.strip_prefix("BARCODE_").unwrap_or(&upper);
        Symbology::ALL
            .iter()
            .copied()
            .find(|s| &s.name()["BARCODE_".len()..] == wanted)
    }

    /// Composite (linear + 2D component) symbologies.
    pub fn is_composite(self) -> bool {
        (130..=139).contains(&self.id())
    }

    /// Symbologies that always operate in GS1 mode.
    pub fn forces_gs1(self) -> bool {
        use Symbology::*;
        matches!(self, Gs1_128 | Ean14 | Nve18 | DbarExp | DbarExpStk) || self.is_composite()
    }

    /// HIBC wrappers.
    pub fn is_hibc(self) -> bool {
        use Symbology::*;
        matches!(
            self,
            Hibc128 | Hibc39 | HibcDm | HibcQr | HibcPdf | HibcMicPdf | HibcBlockF | HibcAztec
        )
    }

    /// UPC/EAN family whose text is laid out in fixed positions.
    pub fn is_upcean(self) -> bool {
        use Symbology::*;
        matches!(
            self,
            Eanx | EanxChk | EanxCc | Isbnx | Upca | UpcaChk | UpcaCc | Upce | UpceChk | UpceCc
        )
    }

    /// Extended-charset symbologies that take segments untouched.
    pub fn is_elite(self) -> bool {
        use Symbology::*;
        matches!(self, QrCode | GridMatrix | HanXin | Rmqr)
    }

    /// ECI used when a non-ECI segment follows a segment with an explicit
    /// ECI and must switch back.
    pub fn default_eci(self) -> i32 {
        match self {
            Symbology::GridMatrix => 29,
            Symbology::UpnQr => 4,
            _ => 3,
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `true` if `id` is a canonical symbology id.
pub fn valid_id(id: i32) -> bool {
    Symbology::from_id(id).is_some()
}

/// Classic name for a canonical id.
pub fn barcode_name(id: i32) -> Option<&'static str> {
    Symbology::from_id(id).map(Symbology::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_roundtrips_all() {
        for &s in Symbology::ALL {
            assert_eq!(Symbology::from_id(s.id()), Some(s));
        }
        assert_eq!(Symbology::ALL.last().map(|s| s.id()), Some(LAST_ID));
    }

    #[test]
    fn test_legacy_ids_not_canonical() {
        for id in [0, 5, 10, 17, 36, 94, 95, 147] {
            assert!(!valid_id(id), "id {} should not be canonical", id);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(barcode_name(20), Some("BARCODE_CODE128"));
        assert_eq!(barcode_name(58), Some("BARCODE_QRCODE"));
        assert_eq!(Symbology::from_name("qrcode"), Some(Symbology::QrCode));
        assert_eq!(Symbology::from_name("BARCODE_HIBC_39"), Some(Symbology::Hibc39));
        assert_eq!(Symbology::from_name("nope"), None);
    }

    #[test]
    fn test_gs1_forcing() {
        assert!(Symbology::Gs1_128.forces_gs1());
        assert!(Symbology::EanxCc.forces_gs1());
        assert!(!Symbology::Code128.forces_gs1());
    }
}
