//! # Layout
//!
//! Geometry shared by every plot: margins (whitespace, quiet zones, border),
//! scaled row heights, the UPC/EAN text split and guard bar tables, and the
//! binding/box overlay.
//!
//! ```text
//!  ┌──────────────── border (BOX) ────────────────┐
//!  │ whitespace + quiet zone                      │
//!  │    ┌──────────────────────────────────┐      │
//!  │    │ rows (each its own height)       │      │
//!  │    └──────────────────────────────────┘      │
//!  │    guard descent / text row                  │
//!  └──────────────────────────────────────────────┘
//! ```

use crate::symbol::{OutputOptions, Symbol};
use crate::symbology::Symbology;

use super::canvas::{Canvas, INK};

// ============================================================================
// MARGINS
// ============================================================================

/// Margins in modules.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelMargins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Margins {
    fn new(horizontal: (f32, f32), vertical: (f32, f32)) -> Self {
        Self {
            left: horizontal.0,
            right: horizontal.1,
            top: vertical.0,
            bottom: vertical.1,
        }
    }

    pub fn scaled(&self, scaler: f32) -> PixelMargins {
        PixelMargins {
            left: (self.left * scaler) as i32,
            right: (self.right * scaler) as i32,
            top: (self.top * scaler) as i32,
            bottom: (self.bottom * scaler) as i32,
        }
    }
}

/// Default quiet zones of a symbology.
///
/// Applied when the symbology has them by default or `QUIET_ZONES` is set,
/// never with `NO_QUIET_ZONES`.
pub fn quiet_zones(symbol: &Symbol, upcean: Option<&UpcEan>) -> Margins {
    use Symbology::*;

    let flags = symbol.options.output_options;
    let Some(symbology) = symbol.symbology() else {
        return Margins::default();
    };
    if flags.contains(OutputOptions::NO_QUIET_ZONES)
        || !(flags.contains(OutputOptions::QUIET_ZONES) || symbology.has_quiet_zones())
    {
        return Margins::default();
    }

    if let Some(u) = upcean {
        let (left, right) = match u.kind {
            UpcEanKind::Ean13 => (11.0, 7.0),
            UpcEanKind::Ean8 => (7.0, 7.0),
            UpcEanKind::UpcA => (9.0, 9.0),
            UpcEanKind::UpcE => (9.0, 7.0),
            UpcEanKind::Ean2 | UpcEanKind::Ean5 => (7.0, 5.0),
        };
        let right = if u.addon.is_empty() { right } else { 5.0 };
        return Margins::new((left, right), (0.0, 0.0));
    }

    let all = |q: f32| Margins::new((q, q), (q, q));
    match symbology {
        Code128 | Code128B | Gs1_128 | Gs1_128Cc | Hibc128 | Code39 | ExCode39 | Logmars | Hibc39
        | Code93 | Codabar | Code11 | C25Standard | C25Inter | C25Iata | C25Logic | C25Ind | Itf14 => {
            Margins::new((10.0, 10.0), (0.0, 0.0))
        }
        Code16k | Code49 => Margins::new((10.0, 1.0), (0.0, 0.0)),
        CodablockF | HibcBlockF => Margins::new((10.0, 10.0), (0.0, 0.0)),
        QrCode | HibcQr | UpnQr => all(4.0),
        MicroQr | Rmqr => all(2.0),
        Pdf417 | Pdf417Comp | HibcPdf => all(2.0),
        MicroPdf417 | HibcMicPdf | DataMatrix | HibcDm | Maxicode => all(1.0),
        DotCode => all(3.0),
        _ => Margins::default(),
    }
}

/// Whitespace, quiet zones and border around the symbol, in modules.
pub fn whitespace(symbol: &Symbol, upcean: Option<&UpcEan>) -> Margins {
    let o = &symbol.options;
    let qz = quiet_zones(symbol, upcean);
    let ws = o.whitespace_width as f32;
    let wsh = o.whitespace_height as f32;
    let border = o.border_width as f32;

    let mut m = Margins::new((ws + qz.left, ws + qz.right), (wsh + qz.top, wsh + qz.bottom));
    if o.output_options.contains(OutputOptions::BOX) {
        m.left += border;
        m.right += border;
    }
    if o.output_options.intersects(OutputOptions::BOX | OutputOptions::BIND) {
        m.top += border;
        m.bottom += border;
    }
    m
}

/// Row heights in pixels at integer scale `si`, rounded at two pixels per
/// module first so that doubling `si` doubles every height.
pub fn row_heights_si(symbol: &Symbol, si: i32) -> Vec<i32> {
    symbol
        .grid()
        .iter()
        .map(|row| (row.height * 2.0).round() as i32 * si / 2)
        .collect()
}

// ============================================================================
// UPC / EAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcEanKind {
    UpcE,
    Ean8,
    UpcA,
    Ean13,
    /// Stand-alone 2 digit add-on
    Ean2,
    /// Stand-alone 5 digit add-on
    Ean5,
}

impl UpcEanKind {
    /// Main symbols (not stand-alone add-ons) get guard descent and split text.
    pub fn is_main(self) -> bool {
        !matches!(self, UpcEanKind::Ean2 | UpcEanKind::Ean5)
    }

    /// Guard bar columns extended below the symbol. UPC-A also extends its
    /// whole first and last digit.
    pub fn guard_bars(self) -> &'static [i32] {
        match self {
            UpcEanKind::UpcE => &[0, 2, 46, 48, 50],
            UpcEanKind::Ean8 => &[0, 2, 32, 34, 64, 66],
            UpcEanKind::UpcA => &[46, 48],
            UpcEanKind::Ean13 => &[0, 2, 46, 48, 92, 94],
            UpcEanKind::Ean2 | UpcEanKind::Ean5 => &[],
        }
    }

    /// Lengths of the text parts under the symbol.
    fn split(self) -> &'static [usize] {
        match self {
            UpcEanKind::UpcE => &[1, 6, 1],
            UpcEanKind::Ean8 => &[4, 4],
            UpcEanKind::UpcA => &[1, 5, 5, 1],
            UpcEanKind::Ean13 => &[1, 6, 6],
            UpcEanKind::Ean2 | UpcEanKind::Ean5 => &[],
        }
    }

    /// Centre of each text part in modules, and whether it uses the small
    /// font.
    pub fn text_positions(self) -> &'static [(i32, bool)] {
        // Outer UPC digits sit in the quiet zones, offset by half a small
        // glyph (2 modules), EAN-13's first digit by half a large one (3)
        match self {
            UpcEanKind::UpcE => &[(-7, true), (24, false), (56, true)],
            UpcEanKind::Ean8 => &[(17, false), (50, false)],
            UpcEanKind::UpcA => &[(-7, true), (27, false), (67, false), (102, true)],
            UpcEanKind::Ean13 => &[(-8, false), (24, false), (71, false)],
            UpcEanKind::Ean2 | UpcEanKind::Ean5 => &[],
        }
    }

    /// Add-on text centre before the gap, for 2 and 5 digit add-ons.
    pub fn addon_position(self, digits: usize) -> Option<i32> {
        let (two, five) = match self {
            UpcEanKind::UpcE => (61, 75),
            UpcEanKind::Ean8 => (77, 91),
            UpcEanKind::UpcA | UpcEanKind::Ean13 => (105, 119),
            UpcEanKind::Ean2 | UpcEanKind::Ean5 => return None,
        };
        match digits {
            2 => Some(two),
            5 => Some(five),
            _ => None,
        }
    }

    /// Whether the add-on bars descend with the guard bars.
    pub fn addon_descends(self) -> bool {
        !matches!(self, UpcEanKind::UpcA | UpcEanKind::UpcE)
    }
}

/// UPC/EAN layout derived from a symbol's text and grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcEan {
    pub kind: UpcEanKind,
    /// Width of the main symbol in modules, excluding any add-on
    pub main_width: i32,
    /// Offset of the linear component inside a composite
    pub comp_xoffset: i32,
    pub addon: Vec<u8>,
    pub addon_gap: i32,
}

/// UPC/EAN layout for UPC/EAN symbologies, `None` otherwise.
pub fn upcean(symbol: &Symbol) -> Option<UpcEan> {
    use Symbology::*;

    let symbology = symbol.symbology()?;
    if !symbology.is_upcean() {
        return None;
    }
    let text = symbol.text().as_bytes();

    let addon: Vec<u8> = match text.iter().skip(6).position(|&c| c == b'+') {
        Some(plus) => text[6 + plus + 1..]
            .iter()
            .take(5)
            .map(|&c| if symbol.options.show_hrt { c } else { b' ' })
            .collect(),
        None => Vec::new(),
    };
    let has_addon = text.iter().skip(6).any(|&c| c == b'+');
    let upca = matches!(symbology, Upca | UpcaChk | UpcaCc);
    let addon_gap = if has_addon {
        crate::backends::linear::addon_gap(symbol.options.option_2, upca) as i32
    } else {
        0
    };

    let mut comp_xoffset = 0;
    if symbology.is_composite() && symbol.rows() > 0 {
        let last = symbol.rows() - 1;
        while (comp_xoffset as usize) < symbol.width() && !symbol.grid().is_set(last, comp_xoffset as usize) {
            comp_xoffset += 1;
        }
    }

    let (kind, main_width) = match symbology {
        Upca | UpcaChk | UpcaCc => (UpcEanKind::UpcA, 95 + comp_xoffset),
        Upce | UpceChk | UpceCc => (UpcEanKind::UpcE, 51 + comp_xoffset),
        _ => match text.len() {
            13 | 16 | 19 => (UpcEanKind::Ean13, 95 + comp_xoffset),
            2 => (UpcEanKind::Ean2, symbol.width() as i32),
            5 => (UpcEanKind::Ean5, symbol.width() as i32),
            _ => (UpcEanKind::Ean8, 68 + comp_xoffset),
        },
    };

    Some(UpcEan {
        kind,
        main_width,
        comp_xoffset,
        addon,
        addon_gap,
    })
}

/// Split the main text into the parts drawn under the symbol.
pub fn split_text(kind: UpcEanKind, text: &[u8]) -> Vec<&[u8]> {
    let mut start = 0;
    kind.split()
        .iter()
        .map(|&len| {
            let part = text.get(start..start + len).unwrap_or_default();
            start += len;
            part
        })
        .collect()
}

// ============================================================================
// BINDING / BOX
// ============================================================================

/// Draw the binding bars and, with `BOX`, the side bars.
///
/// Fixed-ratio symbologies take the full image height. CodablockF binding
/// without a box stays within the symbol's own width.
pub fn draw_bind_box(
    canvas: &mut Canvas,
    symbol: &Symbol,
    margins: &PixelMargins,
    symbol_height_si: i32,
    dot_overspill_si: i32,
    si: i32,
) {
    let o = &symbol.options;
    let flags = o.output_options;
    if o.border_width <= 0 || !flags.intersects(OutputOptions::BOX | OutputOptions::BIND) {
        return;
    }
    let symbology = symbol.symbology();
    let is_codablockf = matches!(symbology, Some(Symbology::CodablockF | Symbology::HibcBlockF));
    let horz_outside = symbology.is_some_and(|s| s.is_fixed_ratio());
    let image_width = canvas.width as i32;
    let image_height = canvas.height as i32;
    let bwidth_si = o.border_width * si;

    let (ybind_top, ybind_bot) = if horz_outside {
        (0, image_height - bwidth_si)
    } else {
        (margins.top - bwidth_si, margins.top + symbol_height_si + dot_overspill_si)
    };

    if flags.contains(OutputOptions::BOX) || !is_codablockf {
        canvas.bar(0, image_width, ybind_top, bwidth_si, INK);
        canvas.bar(0, image_width, ybind_bot, bwidth_si, INK);
    } else {
        let width_si = symbol.width() as i32 * si;
        canvas.bar(margins.left, width_si, ybind_top, bwidth_si, INK);
        canvas.bar(margins.left, width_si, ybind_bot, bwidth_si, INK);
    }

    if flags.contains(OutputOptions::BOX) {
        let (box_top, box_height) = if horz_outside {
            (bwidth_si, image_height - bwidth_si * 2)
        } else {
            (margins.top, symbol_height_si + dot_overspill_si)
        };
        canvas.bar(0, bwidth_si, box_top, box_height, INK);
        canvas.bar(image_width - bwidth_si, bwidth_si, box_top, box_height, INK);
    }
}
