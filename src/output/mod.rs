//! # Output
//!
//! Writes a rendered symbol to a file, standard output or memory.
//!
//! ## Formats
//!
//! | Extension | Writer |
//! |-----------|--------|
//! | `png` `bmp` `gif` `tif` | `image` encoders, RGB or RGBA |
//! | `pcx` | [`pcx`] |
//! | `txt` | [`dump`] of the module grid |
//!
//! The format is picked from the last three characters of the output
//! file name, case-insensitively. Vector formats are not supported.

pub mod dump;
pub mod pcx;

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use image::{ExtendedColorType, ImageFormat};

use crate::error::{self, Error, ErrorKind, Result, Warning};
use crate::raster::{self, Canvas, Palette};
use crate::symbol::{OutputOptions, Pixels, Symbol};

/// An output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Bmp,
    Pcx,
    Gif,
    Tif,
    /// Hex dump of the module grid
    Txt,
}

impl Format {
    /// Format of an output file name.
    pub fn from_path(path: &Path) -> Result<Format> {
        let name = path.to_string_lossy();
        if name.len() <= 3 || !name.is_char_boundary(name.len() - 3) {
            return Err(Error::invalid_option(226, "Unknown output format"));
        }
        let ext = name[name.len() - 3..].to_ascii_lowercase();
        Format::from_extension(&ext).ok_or_else(|| Error::invalid_option(225, "Unknown output format"))
    }

    pub fn from_extension(ext: &str) -> Option<Format> {
        Some(match ext.to_ascii_lowercase().as_str() {
            "png" => Format::Png,
            "bmp" => Format::Bmp,
            "pcx" => Format::Pcx,
            "gif" => Format::Gif,
            "tif" => Format::Tif,
            "txt" => Format::Txt,
            _ => return None,
        })
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Bmp => "bmp",
            Format::Pcx => "pcx",
            Format::Gif => "gif",
            Format::Tif => "tif",
            Format::Txt => "txt",
        }
    }

    /// Reasons for open and write failures.
    fn reasons(self) -> (u16, u16) {
        match self {
            Format::Png => (632, 638),
            Format::Bmp => (601, 603),
            Format::Pcx => (621, 622),
            Format::Gif => (611, 615),
            Format::Tif => (672, 679),
            Format::Txt => (201, 795),
        }
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            Format::Png => Some(ImageFormat::Png),
            Format::Bmp => Some(ImageFormat::Bmp),
            Format::Gif => Some(ImageFormat::Gif),
            Format::Tif => Some(ImageFormat::Tiff),
            Format::Pcx | Format::Txt => None,
        }
    }

    fn write_error(self, e: impl std::fmt::Display) -> Error {
        Error::new(ErrorKind::FileWrite, self.reasons().1, format!("Incomplete write to output ({})", e))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encode a canvas with an `image` encoder, adding an alpha channel when
/// the palette has one.
fn encode_image(canvas: &Canvas, palette: &Palette, format: Format, image_format: ImageFormat) -> Result<Vec<u8>> {
    let Pixels::Rgb { rgb, alpha } = palette.to_rgb(canvas)? else {
        return Err(format.write_error("no RGB pixels"));
    };
    let (buf, colour) = match alpha {
        Some(alpha) => {
            let mut rgba = Vec::new();
            rgba.try_reserve_exact(alpha.len() * 4)
                .map_err(|_| Error::memory(661, "Insufficient memory for bitmap buffer"))?;
            for (px, a) in rgb.chunks_exact(3).zip(alpha) {
                rgba.extend_from_slice(px);
                rgba.push(a);
            }
            (rgba, ExtendedColorType::Rgba8)
        }
        None => (rgb, ExtendedColorType::Rgb8),
    };

    let mut bytes = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut bytes),
        &buf,
        canvas.width as u32,
        canvas.height as u32,
        colour,
        image_format,
    )
    .map_err(|e: image::ImageError| format.write_error(e))?;
    Ok(bytes)
}

/// File bytes of the symbol in `format`, plus any render warning.
pub fn render_bytes(symbol: &Symbol, format: Format, rotation: raster::Rotation) -> Result<(Vec<u8>, Option<Warning>)> {
    if format == Format::Txt {
        return Ok((dump::dump(symbol), None));
    }
    let (canvas, palette, warning) = raster::plot(symbol, rotation)?;
    let bytes = match format.image_format() {
        Some(image_format) => encode_image(&canvas, &palette, format, image_format)?,
        None => pcx::encode(&canvas, &palette)?,
    };
    log::debug!("{} {}x{}, {} bytes", format, canvas.width, canvas.height, bytes.len());
    Ok((bytes, warning))
}

/// Write to the output file, or standard output with `STDOUT`.
fn write_out(symbol: &Symbol, format: Format, bytes: &[u8]) -> Result<()> {
    let (open_reason, _) = format.reasons();
    if symbol.options.output_options.contains(OutputOptions::STDOUT) {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(bytes)
            .and_then(|_| stdout.flush())
            .map_err(|e| format.write_error(e));
    }
    let path = &symbol.options.outfile;
    let mut file = File::create(path).map_err(|e| {
        Error::new(
            ErrorKind::FileAccess,
            open_reason,
            format!("Could not open output file ({})", e),
        )
    })?;
    file.write_all(bytes).map_err(|e| format.write_error(e))
}

impl Symbol {
    /// Write the encoded symbol to `options.outfile`, in the format named by
    /// its extension.
    pub fn print(&mut self, rotate: i32) -> Result<Option<Warning>> {
        let level = self.options.warn_level;
        let outcome = (|| -> Result<Option<Warning>> {
            let rotation = raster::check_output_args(self, rotate)?;
            let format = Format::from_path(&self.options.outfile)?;
            let (bytes, warning) = render_bytes(self, format, rotation)?;
            let warning = error::escalate(warning, level)?;
            write_out(self, format, &bytes)?;
            Ok(warning)
        })();
        self.record(outcome.map(|w| (w.clone(), w)))
    }

    /// Encode one segment then print it, keeping the encode warning when
    /// printing succeeds.
    pub fn encode_and_print(&mut self, data: impl AsRef<[u8]>, rotate: i32) -> Result<Option<Warning>> {
        let first = self.encode(data)?;
        let second = self.print(rotate)?;
        let warning = second.or(first);
        self.record(Ok((warning.clone(), warning)))
    }

    /// File bytes of the encoded symbol without touching the filesystem.
    pub fn render_to_vec(&mut self, format: Format, rotate: i32) -> Result<Vec<u8>> {
        let level = self.options.warn_level;
        let outcome = (|| -> Result<(Vec<u8>, Option<Warning>)> {
            let rotation = raster::check_output_args(self, rotate)?;
            let (bytes, warning) = render_bytes(self, format, rotation)?;
            Ok((bytes, error::escalate(warning, level)?))
        })();
        self.record(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::Symbology;
    use std::path::PathBuf;

    fn code128() -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = Symbology::Code128.id();
        s.options.show_hrt = false;
        s.grid_mut().push_row(vec![1, 0, 1, 1], 5.0).unwrap();
        s.set_height(0.0, 0.0, 0.0);
        s
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("out.PNG")).unwrap(), Format::Png);
        assert_eq!(Format::from_path(Path::new("a/b.tif")).unwrap(), Format::Tif);
        assert_eq!(Format::from_path(Path::new("dump.txt")).unwrap(), Format::Txt);
        assert_eq!(Format::from_path(Path::new("out.svg")).unwrap_err().reason, 225);
        assert_eq!(Format::from_path(Path::new("out.jpeg")).unwrap_err().reason, 225);
        assert_eq!(Format::from_path(Path::new("png")).unwrap_err().reason, 226);
    }

    #[test]
    fn test_render_png_signature() {
        let mut s = code128();
        let bytes = s.render_to_vec(Format::Png, 0).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_render_other_formats() {
        let mut s = code128();
        assert_eq!(&s.render_to_vec(Format::Bmp, 0).unwrap()[..2], b"BM");
        assert_eq!(&s.render_to_vec(Format::Gif, 0).unwrap()[..3], b"GIF");
        assert_eq!(&s.render_to_vec(Format::Tif, 0).unwrap()[..2], b"II");
        assert_eq!(s.render_to_vec(Format::Pcx, 90).unwrap()[0], 10);
        assert_eq!(s.render_to_vec(Format::Txt, 0).unwrap(), b"B\n");
    }

    #[test]
    fn test_png_roundtrips_pixels() {
        let mut s = code128();
        s.options.bg_colour = "ffffff00".into();
        let bytes = s.render_to_vec(Format::Png, 0).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 10));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0xff]);
        assert_eq!(img.get_pixel(2, 0).0, [0xff, 0xff, 0xff, 0]);
    }

    #[test]
    fn test_print_to_file() {
        let dir = std::env::temp_dir().join(format!("barforge-print-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut s = code128();
        s.options.outfile = dir.join("out.bmp");
        assert_eq!(s.print(0).unwrap(), None);
        let bytes = std::fs::read(&s.options.outfile).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_print_unknown_format_is_recorded() {
        let mut s = code128();
        s.options.outfile = PathBuf::from("out.eps");
        assert_eq!(s.print(0).unwrap_err().reason, 225);
        assert_eq!(s.message(), "Error 225: Unknown output format");
    }

    #[test]
    fn test_print_unwritable_path() {
        let mut s = code128();
        s.options.outfile = PathBuf::from("/nonexistent-dir/barforge/out.png");
        let e = s.print(0).unwrap_err();
        assert_eq!(e.kind, ErrorKind::FileAccess);
        assert_eq!(e.reason, 632);
    }

    /// MaxiCode at the minimum scale, whose hexagon area is too narrow.
    fn narrow_maxicode(path: PathBuf) -> Symbol {
        let mut s = Symbol::new();
        s.options.symbology = Symbology::Maxicode.id();
        s.options.scale = 0.2;
        s.options.outfile = path;
        for _ in 0..33 {
            s.grid_mut().push_row(vec![0; 30], 1.0).unwrap();
        }
        s
    }

    #[test]
    fn test_render_warning_reported() {
        let path = std::env::temp_dir().join(format!("barforge-warn-{}.png", std::process::id()));
        let mut s = narrow_maxicode(path.clone());
        assert_eq!(s.print(0).unwrap().map(|w| w.reason), Some(663));
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_fail_all_writes_nothing() {
        let path = std::env::temp_dir().join(format!("barforge-failall-{}.png", std::process::id()));
        let mut s = narrow_maxicode(path.clone());
        s.options.warn_level = error::WarnLevel::FailAll;
        let e = s.print(0).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Noncompliant);
        assert_eq!(e.reason, 663);
        assert!(!path.exists());
    }

    #[test]
    fn test_rotation_checked_before_format() {
        let mut s = code128();
        s.options.outfile = PathBuf::from("out.eps");
        assert_eq!(s.print(45).unwrap_err().reason, 223);
    }
}
