//! Linear symbologies encoded with `barcoders`.
//!
//! Every backend here takes a flat byte buffer, appends one row of modules
//! and sets the human readable text.

use barcoders::sym::codabar::Codabar as BcCodabar;
use barcoders::sym::code11::Code11 as BcCode11;
use barcoders::sym::code39::Code39 as BcCode39;
use barcoders::sym::code93::Code93 as BcCode93;
use barcoders::sym::code128::Code128 as BcCode128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean_supp::EANSUPP;
use barcoders::sym::tf::TF;

use crate::dispatch::FlatEncoder;
use crate::error::{Error, ErrorKind, Result, Warning};
use crate::input::gs1::gs1_check_digit;
use crate::symbol::Symbol;
use crate::symbology::Symbology;

/// Code 128 start characters understood by `barcoders`.
const SET_A: char = '\u{00C0}';
const SET_B: char = '\u{0181}';
const SET_C: char = '\u{0106}';

/// Code 39 character set.
const SILVER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

fn invalid_char(reason: u16, allowed: &str) -> Error {
    Error::invalid_data(reason, format!("Invalid character in input data ({} only)", allowed))
}

/// Append the encoded row, set the text and apply the default height.
fn finish(symbol: &mut Symbol, modules: Vec<u8>, text: String) -> Result<Option<Warning>> {
    log::trace!("Linear row of {} modules", modules.len());
    symbol.grid_mut().push_row(modules, 0.0)?;
    symbol.set_text(text);
    symbol.set_height(0.0, 50.0, 0.0);
    Ok(None)
}

/// Printable form of the data for the text line.
fn printable(source: &[u8]) -> String {
    source
        .iter()
        .map(|&c| if c < 32 || c == 127 { ' ' } else { c as char })
        .collect()
}

// ============================================================================
// CODE 128
// ============================================================================

/// Code 128, picking the densest single code set that covers the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Code128 {
    /// Always use code set B
    pub force_b: bool,
}

impl Code128 {
    fn start_char(&self, source: &[u8]) -> Result<char> {
        let digits = source.iter().all(u8::is_ascii_digit);
        if !self.force_b && digits && source.len() >= 4 && source.len() % 2 == 0 {
            return Ok(SET_C);
        }
        let control = source.iter().any(|&c| c < 32);
        let lower = source.iter().any(|&c| c >= 96);
        match (control, lower) {
            (false, _) => Ok(SET_B),
            (true, false) if !self.force_b => Ok(SET_A),
            _ => Err(invalid_char(342, "single code set")),
        }
    }
}

impl FlatEncoder for Code128 {
    fn name(&self) -> &'static str {
        if self.force_b { "code128b" } else { "code128" }
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        if source.len() > 160 {
            return Err(Error::too_long(340, "Input too long (160 character maximum)"));
        }
        if !source.is_ascii() {
            return Err(invalid_char(342, "ASCII"));
        }
        let start = self.start_char(source)?;
        let data: String = std::iter::once(start).chain(source.iter().map(|&c| c as char)).collect();

        let barcode = BcCode128::new(&data).map_err(|e| {
            log::debug!("code128 rejected input: {:?}", e);
            invalid_char(342, "ASCII")
        })?;
        finish(symbol, barcode.encode(), printable(source))
    }
}

// ============================================================================
// CODE 39 / LOGMARS
// ============================================================================

/// Code 39; LOGMARS always carries the mod-43 check character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Code39 {
    pub logmars: bool,
}

impl FlatEncoder for Code39 {
    fn name(&self) -> &'static str {
        if self.logmars { "logmars" } else { "code39" }
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        let max = if self.logmars { 30 } else { 86 };
        if source.len() > max {
            return Err(Error::too_long(
                323,
                format!("Input too long ({} character maximum)", max),
            ));
        }
        let upper = source.to_ascii_uppercase();
        if !upper.iter().all(|c| SILVER.contains(c)) {
            return Err(Error::invalid_data(
                324,
                "Invalid character in input data (alphanumerics, space and \"-.$/+%\" only)",
            ));
        }
        let data = String::from_utf8_lossy(&upper);
        let with_check = self.logmars || symbol.options.option_2 == 1;
        let barcode = if with_check {
            BcCode39::with_checksum(&*data)
        } else {
            BcCode39::new(&*data)
        }
        .map_err(|e| {
            log::debug!("code39 rejected input: {:?}", e);
            Error::invalid_data(324, "Invalid character in input data")
        })?;

        let text = if self.logmars {
            data.into_owned()
        } else {
            format!("*{}*", data)
        };
        finish(symbol, barcode.encode(), text)
    }
}

// ============================================================================
// CODE 93 / CODABAR / CODE 11
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Code93;

impl FlatEncoder for Code93 {
    fn name(&self) -> &'static str {
        "code93"
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        if source.len() > 123 {
            return Err(Error::too_long(330, "Input too long (123 character maximum)"));
        }
        if !source.iter().all(|c| SILVER.contains(c)) {
            return Err(invalid_char(331, "upper case alphanumerics, space and \"-.$/+%\""));
        }
        let data = String::from_utf8_lossy(source);
        let barcode = BcCode93::new(&*data).map_err(|e| {
            log::debug!("code93 rejected input: {:?}", e);
            invalid_char(331, "upper case alphanumerics, space and \"-.$/+%\"")
        })?;
        finish(symbol, barcode.encode(), data.into_owned())
    }
}

/// Codabar; data must carry its A-D start and stop characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codabar;

impl FlatEncoder for Codabar {
    fn name(&self) -> &'static str {
        "codabar"
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        if source.len() > 103 {
            return Err(Error::too_long(356, "Input too long (103 character maximum)"));
        }
        let upper = source.to_ascii_uppercase();
        let is_guard = |c: Option<&u8>| c.is_some_and(|c| (b'A'..=b'D').contains(c));
        if upper.len() < 3 || !is_guard(upper.first()) || !is_guard(upper.last()) {
            return Err(Error::invalid_data(
                358,
                "Does not begin and end with A, B, C or D",
            ));
        }
        let data = String::from_utf8_lossy(&upper);
        let barcode = BcCodabar::new(&*data).map_err(|e| {
            log::debug!("codabar rejected input: {:?}", e);
            invalid_char(357, "digits, \"-$:/.+\" and A-D")
        })?;
        finish(symbol, barcode.encode(), data.into_owned())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Code11;

impl FlatEncoder for Code11 {
    fn name(&self) -> &'static str {
        "code11"
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        if source.len() > 140 {
            return Err(Error::too_long(320, "Input too long (140 character maximum)"));
        }
        if !source.iter().all(|&c| c.is_ascii_digit() || c == b'-') {
            return Err(invalid_char(321, "digits and \"-\""));
        }
        let data = String::from_utf8_lossy(source);
        let barcode = BcCode11::new(&*data).map_err(|e| {
            log::debug!("code11 rejected input: {:?}", e);
            invalid_char(321, "digits and \"-\"")
        })?;
        finish(symbol, barcode.encode(), data.into_owned())
    }
}

// ============================================================================
// 2 OF 5
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOfFive {
    pub interleaved: bool,
}

impl FlatEncoder for TwoOfFive {
    fn name(&self) -> &'static str {
        if self.interleaved { "c25inter" } else { "c25standard" }
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        let max = if self.interleaved { 125 } else { 112 };
        if source.len() > max {
            return Err(Error::too_long(301, format!("Input too long ({} character maximum)", max)));
        }
        if !source.iter().all(u8::is_ascii_digit) {
            return Err(invalid_char(302, "digits"));
        }
        let mut data = String::from_utf8_lossy(source).into_owned();
        // Interleaved pairs need an even digit count
        if self.interleaved && data.len() % 2 == 1 {
            data.insert(0, '0');
        }
        let barcode = if self.interleaved {
            TF::interleaved(&data)
        } else {
            TF::standard(&data)
        }
        .map_err(|e| {
            log::debug!("2 of 5 rejected input: {:?}", e);
            invalid_char(302, "digits")
        })?;
        finish(symbol, barcode.encode(), data)
    }
}

// ============================================================================
// EAN / UPC
// ============================================================================

/// EAN-13, EAN-8 and UPC-A with optional 2 or 5 digit add-on after `+`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ean;

/// Main data and add-on, zero padded to their symbol lengths.
fn split_addon(source: &[u8]) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
    if !source.iter().all(|&c| c.is_ascii_digit() || c == b'+') {
        return Err(invalid_char(284, "digits and \"+\""));
    }
    let mut parts = source.splitn(2, |&c| c == b'+');
    let main = parts.next().unwrap_or_default().to_vec();
    let addon = match parts.next() {
        None => None,
        Some(a) if a.is_empty() || a.len() > 5 || a.contains(&b'+') => {
            return Err(Error::too_long(283, "Add-on input too long (5 character maximum)"));
        }
        Some(a) => {
            let width = if a.len() <= 2 { 2 } else { 5 };
            Some(zero_pad(a, width))
        }
    };
    Ok((main, addon))
}

fn zero_pad(digits: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![b'0'; width.saturating_sub(digits.len())];
    out.extend_from_slice(digits);
    out
}

/// Strip and verify a supplied check digit.
fn verified(digits: &[u8]) -> Result<&[u8]> {
    let (body, check) = digits.split_at(digits.len() - 1);
    let expected = gs1_check_digit(body);
    if check[0] != expected {
        return Err(Error::new(
            ErrorKind::InvalidCheck,
            275,
            format!("Invalid check digit '{}', expecting '{}'", check[0] as char, expected as char),
        ));
    }
    Ok(body)
}

impl Ean {
    /// Encoded main symbol modules and its text digits.
    fn main(symbology: Symbology, main: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        use Symbology::*;

        let upca = matches!(symbology, Upca | UpcaChk);
        let with_check = matches!(symbology, EanxChk | UpcaChk);
        let max = if upca { 12 } else { 13 };
        if main.is_empty() || main.len() > max {
            return Err(Error::too_long(
                if upca { 288 } else { 294 },
                format!("Input too long ({} character maximum)", max),
            ));
        }

        let body = if with_check || main.len() == max {
            verified(main)?.to_vec()
        } else {
            main.to_vec()
        };

        let ean8 = !upca && body.len() <= 7 && main.len() != max;
        let body = match (upca, ean8) {
            (true, _) => zero_pad(&body, 11),
            (false, true) => zero_pad(&body, 7),
            (false, false) => zero_pad(&body, 12),
        };
        let mut digits = body.clone();
        digits.push(gs1_check_digit(&body));

        let data = String::from_utf8_lossy(&body).into_owned();
        let modules = if ean8 {
            EAN8::new(&data).map(|b| b.encode())
        } else if upca {
            // UPC-A is EAN-13 with a leading zero
            EAN13::new(format!("0{}", data)).map(|b| b.encode())
        } else {
            EAN13::new(&data).map(|b| b.encode())
        }
        .map_err(|e| {
            log::debug!("EAN rejected input: {:?}", e);
            invalid_char(284, "digits")
        })?;
        Ok((modules, digits))
    }
}

impl FlatEncoder for Ean {
    fn name(&self) -> &'static str {
        "ean"
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        let symbology = symbol.symbology().unwrap_or(Symbology::Eanx);
        let (main, addon) = split_addon(source)?;
        let (mut modules, digits) = Ean::main(symbology, &main)?;
        let mut text = String::from_utf8_lossy(&digits).into_owned();

        if let Some(addon) = addon {
            let upca = matches!(symbology, Symbology::Upca | Symbology::UpcaChk);
            let gap = addon_gap(symbol.options.option_2, upca);
            let addon_text = String::from_utf8_lossy(&addon).into_owned();
            let supp = EANSUPP::new(&addon_text).map_err(|e| {
                log::debug!("EAN add-on rejected input: {:?}", e);
                invalid_char(284, "digits")
            })?;
            modules.extend(std::iter::repeat_n(0, gap));
            modules.extend(supp.encode());
            text.push('+');
            text.push_str(&addon_text);
        }
        finish(symbol, modules, text)
    }
}

/// Modules between the main symbol and its add-on.
pub fn addon_gap(option_2: i32, upca: bool) -> usize {
    let (min, default) = if upca { (9, 9) } else { (7, 7) };
    if (min..=12).contains(&option_2) {
        option_2 as usize
    } else {
        default
    }
}
