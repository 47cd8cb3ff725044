//! # Dispatch
//!
//! Routes a normalized request to the encoder backend of its symbology.
//!
//! ## Routes
//!
//! | Symbologies | Backend call |
//! |-------------|--------------|
//! | QR Code, Grid Matrix, Han Xin, rMQR | segments, untouched |
//! | Micro QR, UPNQR | flat, segment 0 only |
//! | ECI capable or HIBC | segments, UTF-8 converted per ECI |
//! | everything else | flat, segment 0 converted to Latin-1 |
//!
//! ## ECI retry
//!
//! In Unicode mode, when an ECI-capable symbology rejects the data as
//! invalid and some segment had no explicit ECI, the best fitting ECI is
//! chosen for those segments and the encode is retried once. A successful
//! retry reports warning 222 naming the ECI used.

pub mod hibc;
pub mod registry;

use std::io::Read;
use std::path::Path;

pub use registry::{Backend, FlatEncoder, Registry, SegmentEncoder};

use crate::error::{self, Error, ErrorKind, Result, Warning, WarningKind};
use crate::input::{self, eci};
use crate::symbol::{InputMode, MAX_DATA_LEN, Segment, Symbol};
use crate::symbology::Symbology;

fn no_encoder(symbology: Symbology) -> Error {
    Error::invalid_option(780, format!("Symbology has no registered encoder ({})", symbology))
}

/// Call the backend of `symbology` with a segment list.
///
/// A flat backend only qualifies for a single segment without ECI.
pub(crate) fn invoke_segments(
    registry: &Registry,
    symbology: Symbology,
    symbol: &mut Symbol,
    segs: &[Segment],
) -> Result<Option<Warning>> {
    match registry.get(symbology) {
        Some(Backend::Segments(b)) => {
            log::debug!("{} -> {} ({} segments)", symbology, b.name(), segs.len());
            b.encode_segs(symbol, segs)
        }
        Some(Backend::Flat(b)) if segs.len() == 1 && segs[0].eci == 0 => {
            log::debug!("{} -> {} (flat)", symbology, b.name());
            b.encode(symbol, &segs[0].source)
        }
        Some(Backend::Flat(_)) => Err(Error::invalid_option(
            780,
            format!("Registered encoder for {} does not accept segments", symbology),
        )),
        None => Err(no_encoder(symbology)),
    }
}

/// Call the backend of `symbology` with one byte buffer.
pub(crate) fn invoke_flat(
    registry: &Registry,
    symbology: Symbology,
    symbol: &mut Symbol,
    source: &[u8],
) -> Result<Option<Warning>> {
    match registry.get(symbology) {
        Some(Backend::Flat(b)) => {
            log::debug!("{} -> {} (flat)", symbology, b.name());
            b.encode(symbol, source)
        }
        Some(Backend::Segments(b)) => {
            log::debug!("{} -> {} (single segment)", symbology, b.name());
            b.encode_segs(symbol, &[Segment::new(source, 0)])
        }
        None => Err(no_encoder(symbology)),
    }
}

/// Pick the backend contract for `symbology` and call it.
pub fn extended_or_reduced_charset(
    registry: &Registry,
    symbol: &mut Symbol,
    symbology: Symbology,
    segs: &[Segment],
) -> Result<Option<Warning>> {
    if symbology.is_elite() {
        return invoke_segments(registry, symbology, symbol, segs);
    }
    if matches!(symbology, Symbology::MicroQr | Symbology::UpnQr) {
        return invoke_flat(registry, symbology, symbol, &segs[0].source);
    }
    reduced_charset(registry, symbol, symbology, segs)
}

fn reduced_charset(
    registry: &Registry,
    symbol: &mut Symbol,
    symbology: Symbology,
    segs: &[Segment],
) -> Result<Option<Warning>> {
    let mut local = eci::with_default_ecis(segs, symbology.default_eci());

    if symbol.options.input_mode == InputMode::Unicode {
        if let Some(convertible) = eci::convertible_segs(&local) {
            for (seg, convert) in local.iter_mut().zip(convertible) {
                if !convert {
                    continue;
                }
                let target = seg.eci;
                seg.source = eci::utf8_to_eci(target, &seg.source).ok_or_else(|| {
                    if target != 0 {
                        Error::invalid_data(244, format!("Invalid character in input data for ECI {}", target))
                    } else {
                        Error::invalid_data(204, "Invalid character in input data (ISO/IEC 8859-1 only)")
                    }
                })?;
            }
        }
    }

    if symbology.is_hibc() {
        hibc::encode(registry, symbol, symbology, &local)
    } else if symbology.supports_eci() {
        invoke_segments(registry, symbology, symbol, &local)
    } else {
        invoke_flat(registry, symbology, symbol, &local[0].source)
    }
}

/// Full encode: normalize, dispatch, retry with an ECI if needed.
///
/// Returns the warning to report, before the warning policy is applied.
pub fn encode_with(registry: &Registry, symbol: &mut Symbol, segs: &[Segment]) -> Result<Option<Warning>> {
    let prepared = input::prepare(symbol, segs)?;
    let symbology = prepared.symbology;
    if !symbology.is_stackable() {
        symbol.grid.clear();
        symbol.text.clear();
        symbol.height = 0.0;
    }
    let start_rows = symbol.rows();
    symbol.raster = None;

    let mut local = prepared.segs;
    let mut result = extended_or_reduced_charset(registry, symbol, symbology, &local);

    let retry = matches!(&result, Err(e) if e.kind == ErrorKind::InvalidData)
        && prepared.have_zero_eci
        && symbology.supports_eci()
        && symbol.options.input_mode == InputMode::Unicode;
    if retry {
        let (first_eci, on_first_segment) = eci::best_eci_segs(&mut local, symbology.default_eci());
        if first_eci != 0 {
            log::debug!("Retrying {} with ECI {}", symbology, first_eci);
            if on_first_segment {
                symbol.options.eci = first_eci;
            }
            symbol.grid.truncate(start_rows);
            result = extended_or_reduced_charset(registry, symbol, symbology, &local).map(|_| {
                Some(Warning::new(
                    WarningKind::UsesEci,
                    222,
                    format!("Encoded data includes ECI {}", first_eci),
                ))
            });
        }
    }

    let warning = result?.or(prepared.warning);

    // Fallback for backends that leave heights unset
    if symbol.height < 0.5 || symbol.grid.iter().any(|row| row.height <= 0.0) {
        symbol.set_height(0.0, 50.0, 0.0);
    }
    Ok(warning)
}

impl Symbol {
    /// Encode one segment of data with the built-in backends.
    pub fn encode(&mut self, data: impl AsRef<[u8]>) -> Result<Option<Warning>> {
        self.encode_segs(&[Segment::new(data.as_ref(), 0)])
    }

    /// Encode segments with the built-in backends.
    pub fn encode_segs(&mut self, segs: &[Segment]) -> Result<Option<Warning>> {
        self.encode_segs_with(Registry::shared(), segs)
    }

    /// Encode segments with the backends of `registry`.
    ///
    /// A stackable symbology appends its rows to any already present, so
    /// encoding twice without [`Symbol::clear`] stacks. Other symbologies
    /// replace the previous result.
    pub fn encode_segs_with(&mut self, registry: &Registry, segs: &[Segment]) -> Result<Option<Warning>> {
        let level = self.options.warn_level;
        let outcome = encode_with(registry, self, segs).and_then(|w| error::escalate(w, level));
        self.record(outcome.map(|w| (w.clone(), w)))
    }

    /// Encode the contents of a file; `-` reads standard input.
    pub fn encode_file(&mut self, path: impl AsRef<Path>) -> Result<Option<Warning>> {
        let outcome = read_input(path.as_ref());
        match outcome {
            Ok(data) => self.encode(data),
            Err(e) => self.record::<Option<Warning>>(Err(e)),
        }
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if path == Path::new("-") {
        std::io::stdin()
            .take(MAX_DATA_LEN as u64 + 1)
            .read_to_end(&mut data)
            .map_err(|e| Error::new(ErrorKind::FileAccess, 230, format!("Input file read error ({})", e)))?;
    } else {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::new(ErrorKind::FileAccess, 229, format!("Unable to read input file ({})", e))
        })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        if size > MAX_DATA_LEN as u64 {
            return Err(Error::too_long(235, "Input file too long"));
        }
        file.take(MAX_DATA_LEN as u64 + 1)
            .read_to_end(&mut data)
            .map_err(|e| Error::new(ErrorKind::FileAccess, 230, format!("Input file read error ({})", e)))?;
    }
    if data.len() > MAX_DATA_LEN {
        return Err(Error::too_long(235, "Input file too long"));
    }
    if data.is_empty() {
        return Err(Error::invalid_data(241, "Input file empty"));
    }
    Ok(data)
}
