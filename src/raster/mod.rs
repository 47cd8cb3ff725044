//! # Raster Compositor
//!
//! Turns an encoded [`Symbol`]'s module grid into pixels.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────────────────┐   ┌────────┐   ┌──────────────┐
//! │ grid     │──▶│ plot                │──▶│ rotate │──▶│ RGB / palette │
//! │ + text   │   │ bars│dotty│maxicode │   │        │   │ (+ alpha)     │
//! └──────────┘   └─────────────────────┘   └────────┘   └──────────────┘
//! ```
//!
//! Plots draw onto a palette [`Canvas`] of one byte per pixel. MaxiCode
//! always gets hexagons, `DOTTY_MODE` gets dots, everything else gets
//! rectangular modules with optional human readable text.
//!
//! ## Scaling
//!
//! Scale 1 is 2 pixels per module. Scales that are not a multiple of one
//! half are rendered at 2 pixels per module then resampled.

mod bars;
pub mod canvas;
pub mod colour;
mod dotty;
pub mod font;
pub mod layout;
mod maxicode;

pub use canvas::{Canvas, INK, PAPER};
pub use colour::{Colour, Palette};

use crate::error::{self, Error, Result, Warning};
use crate::symbol::{OutputOptions, Pixels, Raster, Symbol};
use crate::symbology::Symbology;

/// Clockwise rotation of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl TryFrom<i32> for Rotation {
    type Error = Error;

    fn try_from(degrees: i32) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Cw180),
            270 => Ok(Rotation::Cw270),
            _ => Err(Error::invalid_option(223, "Invalid rotation angle")),
        }
    }
}

/// Validate the rotation and dot mode before any output.
pub fn check_output_args(symbol: &Symbol, rotate: i32) -> Result<Rotation> {
    let rotation = Rotation::try_from(rotate)?;
    let dotty = symbol.symbology().is_some_and(|s| s.is_dotty());
    if symbol.options.output_options.contains(OutputOptions::DOTTY_MODE) && !dotty {
        return Err(Error::invalid_option(224, "Selected symbology cannot be rendered as dots"));
    }
    Ok(rotation)
}

/// Plot the symbol and rotate it. Colours are checked first so a bad
/// colour fails before any drawing.
pub(crate) fn plot(symbol: &Symbol, rotation: Rotation) -> Result<(Canvas, Palette, Option<Warning>)> {
    let o = &symbol.options;
    let palette = Palette::new(&o.fg_colour, &o.bg_colour)?;

    let (canvas, warning) = if symbol.symbology() == Some(Symbology::Maxicode) {
        maxicode::plot(symbol)?
    } else if o.output_options.contains(OutputOptions::DOTTY_MODE) {
        (dotty::plot(symbol)?, None)
    } else {
        (bars::plot(symbol)?, None)
    };
    Ok((rotate(canvas, rotation)?, palette, warning))
}

/// Rotate a canvas clockwise.
pub fn rotate(canvas: Canvas, rotation: Rotation) -> Result<Canvas> {
    let (w, h) = (canvas.width, canvas.height);
    let src = &canvas.pixels;
    let out = match rotation {
        Rotation::None => return Ok(canvas),
        Rotation::Cw90 => {
            let mut out = Canvas::new(h, w, 650)?;
            for row in 0..w {
                for col in 0..h {
                    out.pixels[row * h + col] = src[w * (h - col - 1) + row];
                }
            }
            out
        }
        Rotation::Cw180 => {
            let mut out = Canvas::new(w, h, 650)?;
            for row in 0..h {
                for col in 0..w {
                    out.pixels[row * w + col] = src[w * (h - row - 1) + (w - col - 1)];
                }
            }
            out
        }
        Rotation::Cw270 => {
            let mut out = Canvas::new(h, w, 650)?;
            for row in 0..w {
                for col in 0..h {
                    out.pixels[row * h + col] = src[w * col + (w - row - 1)];
                }
            }
            out
        }
    };
    Ok(out)
}

/// Render to a [`Raster`]: RGB, or palette bytes with `BUFFER_INTERMEDIATE`.
pub fn render(symbol: &Symbol, rotate: i32) -> Result<(Raster, Option<Warning>)> {
    let rotation = check_output_args(symbol, rotate)?;
    let (canvas, palette, warning) = plot(symbol, rotation)?;
    let pixels = if symbol.options.output_options.contains(OutputOptions::BUFFER_INTERMEDIATE) {
        Pixels::Intermediate(canvas.pixels.clone())
    } else {
        palette.to_rgb(&canvas)?
    };
    let raster = Raster {
        width: canvas.width,
        height: canvas.height,
        pixels,
    };
    Ok((raster, warning))
}

impl Symbol {
    /// Render the encoded symbol into [`Symbol::raster`].
    pub fn buffer(&mut self, rotate: i32) -> Result<Option<Warning>> {
        self.raster = None;
        let level = self.options.warn_level;
        let outcome = render(self, rotate)
            .and_then(|(raster, warning)| Ok((raster, error::escalate(warning, level)?)));
        match outcome {
            Ok((raster, warning)) => {
                log::debug!("buffered {}x{}", raster.width, raster.height);
                self.raster = Some(raster);
                self.record(Ok((warning.clone(), warning)))
            }
            Err(e) => self.record(Err(e)),
        }
    }

    /// Encode one segment then buffer it, keeping the encode warning when
    /// buffering succeeds.
    pub fn encode_and_buffer(&mut self, data: impl AsRef<[u8]>, rotate: i32) -> Result<Option<Warning>> {
        let first = self.encode(data)?;
        let second = self.buffer(rotate)?;
        let warning = second.or(first);
        self.record(Ok((warning.clone(), warning)))
    }
}
