//! # Symbol
//!
//! The mutable context one encode + render call works on.
//!
//! ```text
//! Options ──► Symbol::encode_segs ──► ModuleGrid + text + heights
//!                                          │
//!                                          ▼
//!                      Symbol::buffer ──► Raster (RGB + optional alpha)
//! ```
//!
//! A symbol is owned by its caller. No call keeps a reference to it after
//! returning, so distinct symbols can be used from distinct threads.

use std::path::PathBuf;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Status, WarnLevel, Warning};
use crate::symbology::Symbology;

/// Row ceiling: a symbol always has fewer rows than this.
pub const MAX_ROWS: usize = 200;
/// Maximum width of a row in modules.
pub const MAX_WIDTH: usize = 1152;
/// Maximum bytes in one segment and in all segments combined.
pub const MAX_DATA_LEN: usize = 17400;
/// Maximum number of segments in one request.
pub const MAX_SEG_COUNT: usize = 256;
/// Maximum length of the human readable text.
pub const MAX_TEXT_LEN: usize = 200;

/// How input bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Raw bytes, passed through untouched
    #[default]
    Data,
    /// UTF-8 text, converted to the symbology's character set or an ECI
    Unicode,
    /// GS1 application identifier syntax
    Gs1,
}

bitflags! {
    /// Rendering and output switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct OutputOptions: u32 {
        /// Horizontal boundary bars (and separators for stacked symbols)
        const BIND = 0x0002;
        /// Box around the symbol
        const BOX = 0x0004;
        /// Write file output to stdout
        const STDOUT = 0x0008;
        /// Reader initialisation symbol
        const READER_INIT = 0x0010;
        /// Small human readable text
        const SMALL_TEXT = 0x0020;
        /// Bold human readable text
        const BOLD_TEXT = 0x0040;
        /// Render modules as dots
        const DOTTY_MODE = 0x0100;
        /// Keep the palette-indexed buffer instead of RGB
        const BUFFER_INTERMEDIATE = 0x0400;
        /// Add the symbology's default quiet zones
        const QUIET_ZONES = 0x0800;
        /// Suppress quiet zones
        const NO_QUIET_ZONES = 0x1000;
    }
}

/// Caller-configurable fields of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Requested symbology id (legacy ids are remapped at encode time)
    pub symbology: i32,
    /// Requested height in modules, 0 for the symbology default
    pub height: f32,
    /// Module size multiplier
    pub scale: f32,
    pub whitespace_width: i32,
    pub whitespace_height: i32,
    pub border_width: i32,
    pub output_options: OutputOptions,
    /// Foreground colour, `RRGGBB` or `RRGGBBAA`
    pub fg_colour: String,
    /// Background colour, `RRGGBB` or `RRGGBBAA`
    pub bg_colour: String,
    pub outfile: PathBuf,
    /// Linear component of composite symbols
    pub primary: String,
    pub option_1: i32,
    pub option_2: i32,
    pub option_3: i32,
    pub show_hrt: bool,
    pub input_mode: InputMode,
    /// Expand backslash escape sequences before encoding
    pub escape: bool,
    /// GS1 AIs given in parentheses instead of square brackets
    pub gs1_parens: bool,
    /// Skip GS1 data validation beyond syntax
    pub gs1_nocheck: bool,
    pub eci: i32,
    /// Dot diameter in modules for dot mode
    pub dot_size: f32,
    /// UPC/EAN guard bar descent in modules
    pub guard_descent: f32,
    pub warn_level: WarnLevel,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128.id(),
            height: 0.0,
            scale: 1.0,
            whitespace_width: 0,
            whitespace_height: 0,
            border_width: 0,
            output_options: OutputOptions::empty(),
            fg_colour: "000000".to_string(),
            bg_colour: "ffffff".to_string(),
            outfile: PathBuf::from("out.png"),
            primary: String::new(),
            option_1: -1,
            option_2: 0,
            option_3: 0,
            show_hrt: true,
            input_mode: InputMode::Data,
            escape: false,
            gs1_parens: false,
            gs1_nocheck: false,
            eci: 0,
            dot_size: 4.0 / 5.0,
            guard_descent: 5.0,
            warn_level: WarnLevel::Default,
        }
    }
}

/// One run of input bytes with its ECI (0 = default).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    pub source: Vec<u8>,
    pub eci: i32,
}

impl Segment {
    pub fn new(source: impl Into<Vec<u8>>, eci: i32) -> Self {
        Self {
            source: source.into(),
            eci,
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::new(s.as_bytes(), 0)
    }
}

// ============================================================================
// MODULE GRID
// ============================================================================

/// One row of modules.
///
/// Each cell is 0 (unset) or 1 (set); Ultracode rows use colour indices
/// 1..=8 into the `"0CBMRYGKW"` palette.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub modules: Vec<u8>,
    /// Row height in modules, 0 to share the remaining symbol height
    pub height: f32,
}

/// The encoded module matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleGrid {
    rows: Vec<Row>,
    width: usize,
}

impl ModuleGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows of booleans, all rows sharing `height`.
    pub fn from_bools<I, R>(rows: I, height: f32) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = bool>,
    {
        let mut grid = ModuleGrid::new();
        for row in rows {
            let modules = row.into_iter().map(u8::from).collect();
            grid.push_row(modules, height)?;
        }
        Ok(grid)
    }

    /// Append a row, growing the width to fit.
    pub fn push_row(&mut self, modules: Vec<u8>, height: f32) -> Result<()> {
        if self.rows.len() + 1 >= MAX_ROWS {
            return Err(Error::too_long(770, "Too many stacked symbols"));
        }
        if modules.len() > MAX_WIDTH {
            return Err(Error::too_long(
                781,
                format!("Symbol too wide ({} modules, max {})", modules.len(), MAX_WIDTH),
            ));
        }
        self.width = self.width.max(modules.len());
        self.rows.push(Row { modules, height });
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, r: usize) -> &Row {
        &self.rows[r]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut Row {
        &mut self.rows[r]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Binary state of a module; colour modules count as set.
    pub fn is_set(&self, r: usize, c: usize) -> bool {
        self.colour(r, c) != 0
    }

    /// Raw module value (0 outside the row's occupied width).
    pub fn colour(&self, r: usize, c: usize) -> u8 {
        self.rows
            .get(r)
            .and_then(|row| row.modules.get(c))
            .copied()
            .unwrap_or(0)
    }

    /// Drop rows from `rows` onwards, recomputing the width.
    pub fn truncate(&mut self, rows: usize) {
        self.rows.truncate(rows);
        self.width = self.rows.iter().map(|r| r.modules.len()).max().unwrap_or(0);
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }
}

// ============================================================================
// RASTER
// ============================================================================

/// Pixels produced by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    /// 3 bytes per pixel plus an alpha plane when either colour has alpha
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
    /// One palette byte per pixel: `'0'` paper, `'1'` ink, or a colour letter
    Intermediate(Vec<u8>),
}

/// A rendered bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Pixels,
}

impl Raster {
    /// RGB triple at (x, y); `None` for intermediate buffers.
    pub fn rgb_at(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        match &self.pixels {
            Pixels::Rgb { rgb, .. } => {
                let i = (y * self.width + x) * 3;
                Some([rgb[i], rgb[i + 1], rgb[i + 2]])
            }
            Pixels::Intermediate(_) => None,
        }
    }
}

// ============================================================================
// SYMBOL
// ============================================================================

bitflags! {
    /// Fields carried over by [`Symbol::reset`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Keep: u8 {
        /// Output file path
        const OUTFILE = 0x01;
        /// Every other configured option
        const OPTIONS = 0x02;
    }
}

/// Central encode/render context.
#[derive(Debug, Clone, Default)]
pub struct Symbol {
    pub options: Options,
    resolved: Option<Symbology>,
    pub(crate) grid: ModuleGrid,
    pub(crate) text: String,
    pub(crate) height: f32,
    pub(crate) raster: Option<Raster>,
    status: Status,
}

impl Symbol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Canonical symbology chosen by the last encode, or the requested id
    /// if it is canonical.
    pub fn symbology(&self) -> Option<Symbology> {
        self.resolved.or_else(|| Symbology::from_id(self.options.symbology))
    }

    pub(crate) fn set_symbology(&mut self, s: Symbology) {
        self.resolved = Some(s);
        self.options.symbology = s.id();
    }

    pub fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// Backends write their rows here.
    pub fn grid_mut(&mut self) -> &mut ModuleGrid {
        &mut self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Human readable text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the human readable text, truncated to the fixed maximum.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut text = text.into();
        if text.len() > MAX_TEXT_LEN {
            let mut end = MAX_TEXT_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        self.text = text;
    }

    /// Total symbol height in modules.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Tagged message of the last operation, empty on success.
    pub fn message(&self) -> String {
        self.status.message()
    }

    /// Record the outcome of an operation, keeping status and message in
    /// step.
    pub(crate) fn record<T>(&mut self, result: Result<(T, Option<Warning>)>) -> Result<T> {
        match result {
            Ok((value, warning)) => {
                if let Some(w) = &warning {
                    log::warn!("{}", w);
                }
                self.status = warning.map(Status::Warning).unwrap_or(Status::Success);
                Ok(value)
            }
            Err(e) => {
                self.status = Status::Error(e.clone());
                Err(e)
            }
        }
    }

    /// Distribute the height over rows that have no fixed height.
    ///
    /// Uses the requested height (`options.height`) if set, else
    /// `default_height`, else
    /// `min_row_height`. Returns a warning if the result falls outside the
    /// given bounds.
    pub fn set_height(
        &mut self,
        min_row_height: f32,
        default_height: f32,
        max_height: f32,
    ) -> Option<Warning> {
        use crate::error::WarningKind;

        let mut fixed = 0.0f32;
        let mut zero_count = 0usize;
        for row in self.grid.iter() {
            if row.height > 0.0 {
                fixed += row.height;
            } else {
                zero_count += 1;
            }
        }

        let mut warning = None;
        if zero_count > 0 {
            let requested = self.options.height;
            let mut row_height = if requested > 0.0 {
                (requested - fixed) / zero_count as f32
            } else if default_height > 0.0 {
                default_height / zero_count as f32
            } else {
                min_row_height
            };
            if row_height < 0.5 {
                row_height = 0.5;
            }
            if min_row_height > 0.0 && row_height < min_row_height {
                warning = Some(Warning::new(
                    WarningKind::Noncompliant,
                    247,
                    "Height not compliant with standards",
                ));
            }
            for r in 0..self.grid.rows() {
                let row = self.grid.row_mut(r);
                if row.height <= 0.0 {
                    row.height = row_height;
                }
            }
            self.height = row_height * zero_count as f32 + fixed;
        } else {
            self.height = fixed;
        }

        if max_height > 0.0 && self.height > max_height {
            warning = Some(Warning::new(
                WarningKind::Noncompliant,
                248,
                "Height not compliant with standards",
            ));
        }
        warning
    }

    /// Clear the encoded result and raster, keeping every option.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.text.clear();
        self.height = 0.0;
        self.raster = None;
        self.resolved = None;
        self.status = Status::Success;
    }

    /// A fresh symbol carrying over only the fields in `keep`.
    pub fn reset(&self, keep: Keep) -> Symbol {
        let defaults = Options::default();
        let mut options = if keep.contains(Keep::OPTIONS) {
            self.options.clone()
        } else {
            defaults.clone()
        };
        options.outfile = if keep.contains(Keep::OUTFILE) {
            self.options.outfile.clone()
        } else {
            defaults.outfile
        };
        Symbol::with_options(options)
    }
}
