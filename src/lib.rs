//! # Barforge - Barcode Symbol Library
//!
//! Barforge turns input data into barcode symbols and renders them. It
//! provides:
//!
//! - **Input normalization**: segments, ECI reconciliation, escape
//!   sequences, GS1 syntax, legacy symbology ids
//! - **Dispatch**: capability-driven routing to encoder backends, HIBC
//!   wrapping, automatic ECI retry
//! - **Raster compositing**: bars, dots, MaxiCode hexagons, human readable
//!   text, rotation and scaling
//! - **Output**: PNG, BMP, GIF, TIFF, PCX and a text dump of the grid
//!
//! ## Quick Start
//!
//! ```no_run
//! use barforge::{Symbol, Symbology};
//!
//! let mut symbol = Symbol::new();
//! symbol.options.symbology = Symbology::QrCode.id();
//! symbol.options.scale = 4.0;
//! symbol.options.outfile = "hello.png".into();
//!
//! symbol.encode_and_print("Hello, world", 0)?;
//!
//! # Ok::<(), barforge::Error>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`symbology`] | Symbology ids, legacy remapping, capability table |
//! | [`symbol`] | The symbol context, options and module grid |
//! | [`input`] | Escape processing and segment normalization |
//! | [`dispatch`] | Backend registry and routing |
//! | [`backends`] | Built-in reference encoders |
//! | [`raster`] | Raster compositor |
//! | [`output`] | File formats |
//! | [`config`] | JSON job configuration |
//! | [`error`] | Error and warning types |

pub mod backends;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod output;
pub mod raster;
pub mod symbol;
pub mod symbology;

// Re-exports for convenience
pub use dispatch::Registry;
pub use error::{Error, ErrorKind, Status, WarnLevel, Warning, WarningKind};
pub use output::Format;
pub use symbol::{InputMode, Keep, Options, OutputOptions, Raster, Segment, Symbol};
pub use symbology::{CapabilityFlags, Symbology, barcode_name, valid_id};

/// Library version as `major * 10000 + minor * 100 + patch`.
pub fn version() -> u32 {
    let part = |s: &str| s.parse::<u32>().unwrap_or(0);
    part(env!("CARGO_PKG_VERSION_MAJOR")) * 10000
        + part(env!("CARGO_PKG_VERSION_MINOR")) * 100
        + part(env!("CARGO_PKG_VERSION_PATCH"))
}

/// Capabilities of symbology `id` among `flags`; empty for unknown ids.
pub fn cap(id: i32, flags: CapabilityFlags) -> CapabilityFlags {
    symbology::capabilities(id, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_package() {
        assert_eq!(version(), 100);
    }

    #[test]
    fn test_cap_helpers() {
        assert!(cap(Symbology::QrCode.id(), CapabilityFlags::ECI).contains(CapabilityFlags::ECI));
        assert!(cap(9999, CapabilityFlags::all()).is_empty());
        assert_eq!(barcode_name(58), Some("BARCODE_QRCODE"));
        assert!(!valid_id(5));
    }
}
