//! Conversion from job configuration to symbol options.

use std::path::PathBuf;

use crate::error::{Error, Result, WarnLevel};
use crate::symbol::{InputMode, Options, OutputOptions};
use crate::symbology::Symbology;

use super::schema::*;

const ESCAPE_MODE: u32 = 0x08;
const GS1PARENS_MODE: u32 = 0x10;
const GS1NOCHECK_MODE: u32 = 0x20;

impl SymbologyRef {
    /// Numeric id to hand to the encoder; legacy ids pass through for
    /// remapping at encode time.
    pub fn to_id(&self) -> Result<i32> {
        match self {
            SymbologyRef::Id(id) => Ok(*id),
            SymbologyRef::Name(name) => Symbology::from_name(name)
                .map(Symbology::id)
                .ok_or_else(|| Error::invalid_option(206, format!("Symbology out of range ({})", name))),
        }
    }
}

fn input_mode(encoding: u32) -> Result<InputMode> {
    match encoding & 0x07 {
        0 => Ok(InputMode::Data),
        1 => Ok(InputMode::Unicode),
        2 => Ok(InputMode::Gs1),
        other => Err(Error::invalid_option(
            790,
            format!("Invalid encoding mode ({})", other),
        )),
    }
}

impl SymbologyConfig {
    /// Parse a job from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_option(791, format!("Malformed configuration ({})", e)))
    }

    /// Options for a fresh symbol, starting from the defaults.
    pub fn to_options(&self) -> Result<Options> {
        let mut o = Options {
            symbology: self.symbology.to_id()?,
            ..Options::default()
        };
        if let Some(v) = self.height {
            o.height = v;
        }
        if let Some(v) = self.whitespace_width {
            o.whitespace_width = v;
        }
        if let Some(v) = self.whitespace_height {
            o.whitespace_height = v;
        }
        if let Some(v) = self.border_width {
            o.border_width = v;
        }
        if let Some(bits) = self.output_options {
            o.output_options = OutputOptions::from_bits_truncate(bits);
        }
        if let Some(v) = &self.foreground_color {
            o.fg_colour = v.trim_start_matches('#').to_string();
        }
        if let Some(v) = &self.background_color {
            o.bg_colour = v.trim_start_matches('#').to_string();
        }
        if let Some(v) = &self.file_name {
            o.outfile = PathBuf::from(v);
        }
        if let Some(v) = self.scale {
            o.scale = v;
        }
        if let Some(v) = self.option1 {
            o.option_1 = v;
        }
        if let Some(v) = self.option2 {
            o.option_2 = v;
        }
        if let Some(v) = self.option3 {
            o.option_3 = v;
        }
        if let Some(v) = self.show_human_readable_text {
            o.show_hrt = v;
        }
        if let Some(enc) = self.encoding {
            o.input_mode = input_mode(enc)?;
            o.escape = enc & ESCAPE_MODE != 0;
            o.gs1_parens = enc & GS1PARENS_MODE != 0;
            o.gs1_nocheck = enc & GS1NOCHECK_MODE != 0;
        }
        if let Some(v) = self.eci {
            o.eci = v;
        }
        if let Some(v) = &self.primary {
            o.primary = v.clone();
        }
        if let Some(v) = self.dot_size {
            o.dot_size = v;
        }
        if self.fail_on_warning {
            o.warn_level = WarnLevel::FailAll;
        }
        Ok(o)
    }

    pub fn rotation(&self) -> i32 {
        self.rotation.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let cfg = SymbologyConfig::from_json(r#"{"symbology": 58}"#).unwrap();
        let o = cfg.to_options().unwrap();
        assert_eq!(o.symbology, Symbology::QrCode.id());
        assert_eq!(o, Options { symbology: 58, ..Options::default() });
        assert_eq!(cfg.rotation(), 0);
    }

    #[test]
    fn test_symbology_by_name() {
        let cfg = SymbologyConfig::from_json(r#"{"symbology": "barcode_code39"}"#).unwrap();
        assert_eq!(cfg.to_options().unwrap().symbology, Symbology::Code39.id());

        let cfg = SymbologyConfig::from_json(r#"{"symbology": "NOPE"}"#).unwrap();
        assert_eq!(cfg.to_options().unwrap_err().reason, 206);
    }

    #[test]
    fn test_full_config() {
        let json = r##"{
            "symbology": 20,
            "height": 30,
            "whitespaceWidth": 4,
            "borderWidth": 2,
            "outputOptions": 6,
            "foregroundColor": "#ff0000",
            "backgroundColor": "ffffff80",
            "fileName": "out.gif",
            "scale": 2.5,
            "option1": 3,
            "showHumanReadableText": false,
            "encoding": 9,
            "eci": 26,
            "rotation": 90,
            "failOnWarning": true
        }"##;
        let cfg = SymbologyConfig::from_json(json).unwrap();
        let o = cfg.to_options().unwrap();
        assert_eq!(o.height, 30.0);
        assert_eq!(o.whitespace_width, 4);
        assert_eq!(o.border_width, 2);
        assert_eq!(o.output_options, OutputOptions::BIND | OutputOptions::BOX);
        assert_eq!(o.fg_colour, "ff0000");
        assert_eq!(o.bg_colour, "ffffff80");
        assert_eq!(o.outfile, PathBuf::from("out.gif"));
        assert_eq!(o.scale, 2.5);
        assert_eq!(o.option_1, 3);
        assert!(!o.show_hrt);
        assert_eq!(o.input_mode, InputMode::Unicode);
        assert!(o.escape);
        assert_eq!(o.eci, 26);
        assert_eq!(o.warn_level, WarnLevel::FailAll);
        assert_eq!(cfg.rotation(), 90);
    }

    #[test]
    fn test_bad_encoding_mode() {
        let cfg = SymbologyConfig::from_json(r#"{"symbology": 20, "encoding": 5}"#).unwrap();
        assert_eq!(cfg.to_options().unwrap_err().reason, 790);
    }

    #[test]
    fn test_malformed_json() {
        let e = SymbologyConfig::from_json(r#"{"symbology": }"#).unwrap_err();
        assert_eq!(e.reason, 791);
        assert!(e.to_string().starts_with("Error 791: Malformed configuration"));
    }
}
