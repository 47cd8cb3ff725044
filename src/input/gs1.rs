//! # GS1 Syntax Reduction
//!
//! Turns bracketed application identifier (AI) input such as
//! `[01]09501101530003[10]AB-123` into the flat data stream encoders
//! expect: AI digits followed by their data, with a GS (0x1D) separator
//! after every variable-length field that is followed by another AI.
//!
//! With `gs1_parens` the AIs are written `(01)...` instead.

use crate::error::{Error, Result, Warning};

/// Group separator emitted as FNC1 between variable-length fields.
pub const GS: u8 = 0x1D;

/// Longest data field allowed for any AI.
const MAX_FIELD_LEN: usize = 90;

/// Options controlling the reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gs1Options {
    /// AIs delimited by `()` rather than `[]`
    pub parens: bool,
    /// Skip fixed-length and check digit validation
    pub nocheck: bool,
}

/// One parsed AI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub ai: &'a str,
    pub data: &'a [u8],
}

/// Total length (AI + data) of AIs whose length is fixed by their first
/// two digits.
fn predefined_length(ai: &str) -> Option<usize> {
    let prefix: u32 = ai.get(..2)?.parse().ok()?;
    let len = match prefix {
        0 => 20,
        1..=3 => 16,
        4 => 18,
        11..=19 => 8,
        20 => 4,
        31..=36 => 10,
        41 => 16,
        _ => return None,
    };
    Some(len)
}

/// Parse bracketed input into elements.
pub fn parse(source: &[u8], opts: Gs1Options) -> Result<Vec<Element<'_>>> {
    let (open, close) = if opts.parens { (b'(', b')') } else { (b'[', b']') };

    if let Some(&c) = source.iter().find(|&&c| c >= 128) {
        let _ = c;
        return Err(Error::invalid_data(250, "Extended ASCII characters are not supported by GS1"));
    }
    if source.iter().any(|&c| c < 32) {
        return Err(Error::invalid_data(251, "Control characters are not supported by GS1"));
    }
    if source.contains(&127) {
        return Err(Error::invalid_data(263, "DEL characters are not supported by GS1"));
    }
    if source.first() != Some(&open) {
        return Err(Error::invalid_data(252, "Data does not start with an AI"));
    }

    let mut elements = Vec::new();
    let mut pos = 0;
    while pos < source.len() {
        // source[pos] is an opening bracket here
        let rest = &source[pos + 1..];
        let Some(close_at) = rest.iter().position(|&c| c == close) else {
            return Err(Error::invalid_data(253, "Malformed AI in input data (brackets don't match)"));
        };
        if rest[..close_at].contains(&open) {
            return Err(Error::invalid_data(254, "Found nested brackets in input data"));
        }
        let ai_bytes = &rest[..close_at];
        if ai_bytes.len() > 4 {
            return Err(Error::invalid_data(255, "Invalid AI in input data (AI too long)"));
        }
        if !ai_bytes.iter().all(u8::is_ascii_digit) {
            return Err(Error::invalid_data(256, "Invalid AI in input data (non-numeric characters in AI)"));
        }
        if ai_bytes.len() < 2 {
            return Err(Error::invalid_data(257, "Invalid AI in input data (AI too short)"));
        }
        // All ASCII digits, so this cannot fail
        let ai = std::str::from_utf8(ai_bytes).unwrap_or_default();

        let data_start = pos + 1 + close_at + 1;
        let data_end = source[data_start..]
            .iter()
            .position(|&c| c == open)
            .map_or(source.len(), |p| data_start + p);
        let data = &source[data_start..data_end];
        if data.is_empty() {
            return Err(Error::invalid_data(258, "Empty data field in input data"));
        }
        if data.contains(&close) {
            return Err(Error::invalid_data(253, "Malformed AI in input data (brackets don't match)"));
        }
        elements.push(Element { ai, data });
        pos = data_end;
    }
    Ok(elements)
}

fn check_element(el: &Element<'_>, opts: Gs1Options) -> Result<()> {
    if el.data.len() > MAX_FIELD_LEN {
        return Err(Error::invalid_data(259, format!("Invalid data length for AI ({})", el.ai)));
    }
    if opts.nocheck {
        return Ok(());
    }
    if let Some(total) = predefined_length(el.ai) {
        if el.ai.len() + el.data.len() != total {
            return Err(Error::invalid_data(259, format!("Invalid data length for AI ({})", el.ai)));
        }
    }
    if matches!(el.ai, "00" | "01" | "02") {
        if !el.data.iter().all(u8::is_ascii_digit) {
            return Err(Error::invalid_data(260, format!("Non-numeric data for AI ({})", el.ai)));
        }
        let (body, check) = el.data.split_at(el.data.len() - 1);
        let expected = gs1_check_digit(body);
        if check[0] != expected {
            return Err(Error::invalid_data(
                261,
                format!(
                    "AI ({}) position {}: Bad checksum '{}', expected '{}'",
                    el.ai,
                    el.data.len(),
                    check[0] as char,
                    expected as char
                ),
            ));
        }
    }
    Ok(())
}

/// GS1 mod-10 check digit over ASCII digits, weights 3,1 from the right.
pub fn gs1_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let v = (d - b'0') as u32;
            if i % 2 == 0 { v * 3 } else { v }
        })
        .sum();
    b'0' + ((10 - sum % 10) % 10) as u8
}

/// Verify and reduce bracketed GS1 input.
///
/// Returns the reduced data and any warning raised while checking.
pub fn verify(source: &[u8], opts: Gs1Options) -> Result<(Vec<u8>, Option<Warning>)> {
    let elements = parse(source, opts)?;
    let mut reduced = Vec::with_capacity(source.len());
    let last = elements.len() - 1;

    for (i, el) in elements.iter().enumerate() {
        check_element(el, opts)?;
        reduced.extend_from_slice(el.ai.as_bytes());
        reduced.extend_from_slice(el.data);
        if i != last && predefined_length(el.ai).is_none() {
            reduced.push(GS);
        }
    }
    log::debug!("GS1 reduced {} AIs to {} bytes", elements.len(), reduced.len());
    Ok((reduced, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Gs1Options {
        Gs1Options::default()
    }

    #[test]
    fn test_reduce_fixed_then_variable() {
        let (out, _) = verify(b"[01]09501101530003[10]AB-123[21]XYZ", opts()).unwrap();
        let mut expected = b"010950110153000310AB-123".to_vec();
        expected.push(GS);
        expected.extend_from_slice(b"21XYZ");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_parens_mode() {
        let parens = Gs1Options { parens: true, ..opts() };
        let (out, _) = verify(b"(01)09501101530003", parens).unwrap();
        assert_eq!(out, b"0109501101530003".to_vec());
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(gs1_check_digit(b"0950110153000"), b'3');
        let e = verify(b"[01]09501101530004", opts()).unwrap_err();
        assert_eq!(e.reason, 261);
        let nocheck = Gs1Options { nocheck: true, ..opts() };
        assert!(verify(b"[01]09501101530004", nocheck).is_ok());
    }

    #[test]
    fn test_syntax_errors() {
        let cases: [(&[u8], u16); 8] = [
            (b"01]123", 252),
            (b"[01", 253),
            (b"[0[1]]12", 254),
            (b"[12345]1", 255),
            (b"[0A]1", 256),
            (b"[1]1", 257),
            (b"[10][11]010101", 258),
            (b"[10]A\x01", 251),
        ];
        for (input, reason) in cases {
            let e = verify(input, opts()).unwrap_err();
            assert_eq!(e.reason, reason, "{:?}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn test_fixed_length_enforced() {
        let e = verify(b"[11]0101", opts()).unwrap_err();
        assert_eq!(e.reason, 259);
    }
}
