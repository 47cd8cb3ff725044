//! # Escape Sequences
//!
//! Expands backslash escapes in caller data into raw bytes.
//!
//! | Escape | Byte(s) |
//! |--------|---------|
//! | `\0` `\E` `\a` `\b` `\t` `\n` `\v` `\f` `\r` `\e` `\G` `\R` | 0x00 0x04 0x07 0x08 0x09 0x0A 0x0B 0x0C 0x0D 0x1B 0x1D 0x1E |
//! | `\\` | `\` |
//! | `\dNNN` | decimal byte (000-255) |
//! | `\oNNN` | octal byte (000-377) |
//! | `\xHH` | hex byte |
//! | `\uHHHH` | code point, written as UTF-8 |
//! | `\UHHHHHH` | code point, written as UTF-8 (`\U00HHHHHH` also accepted) |
//!
//! The output is never longer than the input.

use crate::error::{Error, Result};

/// Expand all escape sequences in `input`.
///
/// On error nothing is returned; the caller's buffer is untouched.
pub fn process(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        if input[pos] != b'\\' {
            out.push(input[pos]);
            pos += 1;
            continue;
        }
        let Some(&ch) = input.get(pos + 1) else {
            return Err(Error::invalid_data(236, "Incomplete escape character in input data"));
        };
        if let Some(byte) = control(ch) {
            out.push(byte);
            pos += 2;
            continue;
        }
        match ch {
            b'd' | b'o' | b'x' => {
                let (value, used) = parse_base(&input[pos + 2..], ch)?;
                out.push(value);
                pos += 2 + used;
            }
            b'u' | b'U' => {
                let (cp, used) = parse_code_point(&input[pos + 2..], ch)?;
                push_utf8(&mut out, cp);
                pos += 2 + used;
            }
            _ => {
                return Err(Error::invalid_data(
                    234,
                    format!("Unrecognised escape character '\\{}' in input data", ch as char),
                ));
            }
        }
    }

    Ok(out)
}

/// Single-character escapes.
fn control(ch: u8) -> Option<u8> {
    let byte = match ch {
        b'0' => 0x00, // NUL
        b'E' => 0x04, // EOT
        b'a' => 0x07, // BEL
        b'b' => 0x08, // BS
        b't' => 0x09, // HT
        b'n' => 0x0A, // LF
        b'v' => 0x0B, // VT
        b'f' => 0x0C, // FF
        b'r' => 0x0D, // CR
        b'e' => 0x1B, // ESC
        b'G' => 0x1D, // GS
        b'R' => 0x1E, // RS
        b'\\' => b'\\',
        _ => return None,
    };
    Some(byte)
}

/// Parse the digits of `\d`, `\o` or `\x`, returning the byte and the
/// number of digits consumed.
fn parse_base(digits: &[u8], base: u8) -> Result<(u8, usize)> {
    let (radix, count, label) = match base {
        b'd' => (10, 3, "decimal"),
        b'o' => (8, 3, "octal"),
        _ => (16, 2, "hexadecimal"),
    };
    if digits.len() < count {
        return Err(Error::invalid_data(
            232,
            format!("Incomplete '\\{}' escape sequence in input data", base as char),
        ));
    }

    let mut value = 0u32;
    for &c in &digits[..count] {
        let Some(d) = (c as char).to_digit(radix) else {
            return Err(Error::invalid_data(
                233,
                format!(
                    "Invalid character for '\\{}' escape sequence in input data ({} only)",
                    base as char, label
                ),
            ));
        };
        value = value * radix + d;
    }

    let byte = u8::try_from(value).map_err(|_| {
        Error::invalid_data(
            237,
            format!("Value of '\\{}' escape sequence in input data out of range (0 to 255)", base as char),
        )
    })?;
    Ok((byte, count))
}

/// Parse the hex digits of `\u` (4) or `\U` (6, or 8 with two leading
/// zeros).
fn parse_code_point(digits: &[u8], kind: u8) -> Result<(u32, usize)> {
    let count = if kind == b'u' { 4 } else { 6 };
    if digits.len() < count {
        return Err(Error::invalid_data(
            209,
            format!("Incomplete '\\{}' escape sequence in input data", kind as char),
        ));
    }

    let count = if kind == b'U'
        && digits.len() >= 8
        && digits.starts_with(b"00")
        && digits[..8].iter().all(u8::is_ascii_hexdigit)
    {
        8
    } else {
        count
    };

    let mut cp = 0u32;
    for &c in &digits[..count] {
        let Some(d) = (c as char).to_digit(16) else {
            return Err(Error::invalid_data(
                211,
                format!(
                    "Invalid character for '\\{}' escape sequence in input data (hexadecimal only)",
                    kind as char
                ),
            ));
        };
        cp = (cp << 4) | d;
    }

    // Reversed BOM, surrogates and beyond Unicode
    if cp == 0xFFFE || (0xD800..0xE000).contains(&cp) || cp > 0x10FFFF {
        return Err(Error::invalid_data(
            246,
            format!("Invalid value for '\\{}' escape sequence in input data", kind as char),
        ));
    }
    Ok((cp, count))
}

fn push_utf8(out: &mut Vec<u8>, cp: u32) {
    if cp < 0x80 {
        out.push(cp as u8);
    } else if cp < 0x800 {
        out.push(0xC0 | (cp >> 6) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else if cp < 0x10000 {
        out.push(0xE0 | (cp >> 12) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else {
        out.push(0xF0 | (cp >> 18) as u8);
        out.push(0x80 | ((cp >> 12) & 0x3F) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_no_backslash_is_identity() {
        let input = b"Hello, World! 0123 \x00\xff";
        assert_eq!(process(input).unwrap(), input.to_vec());
        assert_eq!(process(b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_newline() {
        assert_eq!(process(b"\\n").unwrap(), vec![0x0A]);
    }

    #[test]
    fn test_all_controls() {
        let out = process(b"\\0\\E\\a\\b\\t\\n\\v\\f\\r\\e\\G\\R\\\\").unwrap();
        assert_eq!(
            out,
            vec![0x00, 0x04, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x1B, 0x1D, 0x1E, b'\\']
        );
    }

    #[test]
    fn test_numeric_bases() {
        assert_eq!(process(b"A\\d065\\o101\\x41Z").unwrap(), b"AAAAZ".to_vec());
        assert_eq!(process(b"\\xfF").unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_numeric_errors() {
        let e = process(b"\\d06").unwrap_err();
        assert_eq!((e.kind, e.reason), (ErrorKind::InvalidData, 232));
        let e = process(b"\\o108").unwrap_err();
        assert_eq!(e.reason, 233);
        assert!(e.text.contains("octal only"));
        let e = process(b"\\xG1").unwrap_err();
        assert!(e.text.contains("hexadecimal only"));
        let e = process(b"\\d256").unwrap_err();
        assert_eq!(e.reason, 237);
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(process(b"\\u00E9").unwrap(), "é".as_bytes().to_vec());
        assert_eq!(process(b"\\u20AC").unwrap(), "€".as_bytes().to_vec());
        assert_eq!(process(b"\\U01F600").unwrap(), vec![0xF0, 0x9F, 0x98, 0x80]);
        assert_eq!(process(b"\\U0001F600").unwrap(), vec![0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn test_unicode_rejects() {
        for bad in [&b"\\uD800"[..], b"\\uFFFE", b"\\U110000"] {
            let e = process(bad).unwrap_err();
            assert_eq!(e.reason, 246, "{:?}", bad);
            assert_eq!(e.kind, ErrorKind::InvalidData);
        }
        assert_eq!(process(b"\\u12").unwrap_err().reason, 209);
        assert_eq!(process(b"\\u12G4").unwrap_err().reason, 211);
    }

    #[test]
    fn test_unrecognised_and_trailing() {
        let e = process(b"\\q").unwrap_err();
        assert_eq!(e.reason, 234);
        assert_eq!(e.to_string(), "Error 234: Unrecognised escape character '\\q' in input data");
        assert_eq!(process(b"abc\\").unwrap_err().reason, 236);
    }
}
