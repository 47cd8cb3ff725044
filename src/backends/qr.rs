//! QR Code and Micro QR Code through the `qrcode` crate.
//!
//! QR Code takes the full segment list: each segment with an ECI is
//! preceded by an ECI designator, then written in byte mode. In GS1 mode
//! the FNC1 first-position indicator leads the bit stream.

use qrcode::bits::Bits;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::dispatch::{FlatEncoder, SegmentEncoder};
use crate::error::{Error, Result, Warning};
use crate::input::eci;
use crate::symbol::{InputMode, Segment, Symbol};

/// Error correction level from `option_1` (1 = L .. 4 = H, default L).
pub fn ec_level(option_1: i32) -> EcLevel {
    match option_1 {
        2 => EcLevel::M,
        3 => EcLevel::Q,
        4 => EcLevel::H,
        _ => EcLevel::L,
    }
}

/// Copy the dark modules of `code` into the symbol's grid.
fn push_code(symbol: &mut Symbol, code: &QrCode) -> Result<()> {
    let width = code.width();
    for y in 0..width {
        let modules = (0..width).map(|x| u8::from(code[(x, y)] == Color::Dark)).collect();
        symbol.grid_mut().push_row(modules, 1.0)?;
    }
    symbol.set_height(0.0, 0.0, 0.0);
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Qr;

impl Qr {
    /// Bytes to write for each segment, with the ECI to announce.
    fn payload(symbol: &Symbol, segs: &[Segment]) -> Result<Vec<(i32, Vec<u8>)>> {
        let unicode = symbol.options.input_mode == InputMode::Unicode;
        segs.iter()
            .map(|seg| {
                let bytes = if unicode {
                    eci::utf8_to_eci(seg.eci, &seg.source)
                        .ok_or_else(|| Error::invalid_data(575, "Invalid character in input data"))?
                } else {
                    seg.source.clone()
                };
                Ok((seg.eci, bytes))
            })
            .collect()
    }

    fn build(version: i16, ec: EcLevel, gs1: bool, payload: &[(i32, Vec<u8>)]) -> Option<QrCode> {
        let mut bits = Bits::new(Version::Normal(version));
        if gs1 {
            bits.push_fnc1_first_position().ok()?;
        }
        for (eci, bytes) in payload {
            if *eci != 0 {
                bits.push_eci_designator(*eci as u32).ok()?;
            }
            bits.push_byte_data(bytes).ok()?;
        }
        bits.push_terminator(ec).ok()?;
        QrCode::with_bits(bits, ec).ok()
    }
}

impl SegmentEncoder for Qr {
    fn name(&self) -> &'static str {
        "qrcode"
    }

    fn encode_segs(&self, symbol: &mut Symbol, segs: &[Segment]) -> Result<Option<Warning>> {
        let payload = Qr::payload(symbol, segs)?;
        let ec = ec_level(symbol.options.option_1);
        let gs1 = symbol.options.input_mode == InputMode::Gs1;

        let mut versions = match symbol.options.option_2 {
            v @ 1..=40 => v as i16..=v as i16,
            _ => 1..=40,
        };
        let code = versions
            .find_map(|v| Qr::build(v, ec, gs1, &payload))
            .ok_or_else(|| Error::too_long(561, "Input too long for selected error correction level"))?;

        log::debug!("QR Code version {:?}, {} modules", code.version(), code.width());
        push_code(symbol, &code)?;
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroQr;

impl FlatEncoder for MicroQr {
    fn name(&self) -> &'static str {
        "microqr"
    }

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>> {
        let ec = ec_level(symbol.options.option_1);
        let mut versions = match symbol.options.option_2 {
            v @ 1..=4 => v as i16..=v as i16,
            _ => 1..=4,
        };
        let code = versions
            .find_map(|v| QrCode::with_version(source, Version::Micro(v), ec).ok())
            .ok_or_else(|| Error::too_long(562, "Input too long for selected error correction level"))?;

        push_code(symbol, &code)?;
        Ok(None)
    }
}
