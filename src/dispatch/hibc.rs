//! Health Industry Bar Code wrapping.
//!
//! HIBC symbologies prefix the data with `+`, append a mod-43 check
//! character and hand the result to the wrapped symbology's backend.

use super::{Registry, invoke_flat, invoke_segments};
use crate::error::{Error, Result, Warning};
use crate::symbol::{Segment, Symbol};
use crate::symbology::Symbology;

/// Check character alphabet; a character's value is its position.
pub const TECHNETIUM: &[u8; 43] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Longest payload before the `+` prefix and check character.
pub const MAX_LEN: usize = 110;

/// Symbology a HIBC variant delegates to.
pub fn target(symbology: Symbology) -> Option<Symbology> {
    use Symbology::*;
    let wrapped = match symbology {
        Hibc128 => Code128,
        Hibc39 => Code39,
        HibcDm => DataMatrix,
        HibcQr => QrCode,
        HibcPdf => Pdf417,
        HibcMicPdf => MicroPdf417,
        HibcAztec => Aztec,
        HibcBlockF => CodablockF,
        _ => return None,
    };
    Some(wrapped)
}

/// Mod-43 check character over `data` (already upper case).
pub fn check_char(data: &[u8]) -> Result<u8> {
    let mut counter = 41usize;
    for &c in data {
        let Some(pos) = TECHNETIUM.iter().position(|&t| t == c) else {
            return Err(Error::invalid_data(
                203,
                "Invalid character in data (alphanumerics, space and \"-.$/+%\" only)",
            ));
        };
        counter += pos;
    }
    Ok(TECHNETIUM[counter % 43])
}

/// `+` + upper-cased data + check character.
pub fn payload(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > MAX_LEN {
        return Err(Error::too_long(202, "Data too long for HIBC LIC (110 character maximum)"));
    }
    let upper = data.to_ascii_uppercase();
    let check = check_char(&upper)?;

    let mut out = Vec::with_capacity(upper.len() + 2);
    out.push(b'+');
    out.extend_from_slice(&upper);
    out.push(check);
    Ok(out)
}

/// Encode a HIBC symbology through its wrapped backend.
pub(super) fn encode(
    registry: &Registry,
    symbol: &mut Symbol,
    symbology: Symbology,
    segs: &[Segment],
) -> Result<Option<Warning>> {
    let Some(wrapped) = target(symbology) else {
        return Err(Error::new(
            crate::error::ErrorKind::EncodingProblem,
            0,
            format!("{} is not a HIBC symbology", symbology),
        ));
    };
    let data = payload(&segs[0].source)?;
    log::debug!("HIBC payload {:?} via {}", String::from_utf8_lossy(&data), wrapped);

    let mut local = segs.to_vec();
    local[0].source = data.clone();

    match symbology {
        Symbology::Hibc128 | Symbology::Hibc39 => {
            if symbology == Symbology::Hibc39 {
                symbol.options.option_2 = 0;
            }
            let warning = invoke_flat(registry, wrapped, symbol, &data)?;
            let mut text = String::with_capacity(data.len() + 2);
            text.push('*');
            text.push_str(&String::from_utf8_lossy(&data));
            text.push('*');
            symbol.set_text(text);
            Ok(warning)
        }
        Symbology::HibcBlockF => invoke_flat(registry, wrapped, symbol, &data),
        _ => invoke_segments(registry, wrapped, symbol, &local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_char_golden() {
        assert_eq!(check_char(b"A123BJC5D6E71").unwrap(), b'G');
        assert_eq!(check_char(b"H123ABC01234567890").unwrap(), b'D');
    }

    #[test]
    fn test_payload_upper_cases() {
        assert_eq!(payload(b"a123bjc5d6e71").unwrap(), b"+A123BJC5D6E71G".to_vec());
    }

    #[test]
    fn test_payload_errors() {
        assert_eq!(payload(&[b'1'; 111]).unwrap_err().reason, 202);
        assert!(payload(&[b'1'; 110]).is_ok());
        assert_eq!(payload(b"AB*C").unwrap_err().reason, 203);
    }

    #[test]
    fn test_targets() {
        assert_eq!(target(Symbology::Hibc128), Some(Symbology::Code128));
        assert_eq!(target(Symbology::HibcBlockF), Some(Symbology::CodablockF));
        assert_eq!(target(Symbology::Code128), None);
    }
}
