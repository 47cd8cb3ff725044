//! # Job Configuration
//!
//! JSON job descriptions mapped onto [`Options`](crate::symbol::Options),
//! plus the two one-shot jobs: write a file, or return the file bytes.
//!
//! ## Example
//!
//! ```
//! use barforge::config::{SymbologyConfig, create_stream};
//! use barforge::output::Format;
//!
//! let config = SymbologyConfig::from_json(r#"{"symbology": "CODE128", "scale": 2}"#).unwrap();
//! let result = create_stream(&config, "Hello", Format::Png);
//! assert_eq!(result.code, 0);
//! assert!(result.data.unwrap().starts_with(b"\x89PNG"));
//! ```

mod convert;
mod schema;

pub use schema::{SymbologyConfig, SymbologyRef, SymbologyResult};

use crate::error::{Error, Result};
use crate::output::Format;
use crate::symbol::Symbol;

impl SymbologyResult {
    fn from_symbol(symbol: &Symbol, data: Option<Vec<u8>>) -> Self {
        SymbologyResult {
            data,
            message: symbol.message(),
            code: symbol.status().code(),
        }
    }

    fn from_error(e: &Error) -> Self {
        SymbologyResult {
            data: None,
            message: e.to_string(),
            code: e.kind.code(),
        }
    }
}

fn symbol_for(config: &SymbologyConfig) -> Result<Symbol> {
    Ok(Symbol::with_options(config.to_options()?))
}

/// Encode `data` and write the file named by `fileName`.
pub fn create_file(config: &SymbologyConfig, data: &str) -> SymbologyResult {
    let mut symbol = match symbol_for(config) {
        Ok(s) => s,
        Err(e) => return SymbologyResult::from_error(&e),
    };
    if let Err(e) = symbol.encode_and_print(data, config.rotation()) {
        log::debug!("Job for {} failed: {}", symbol.options.outfile.display(), e);
    }
    SymbologyResult::from_symbol(&symbol, None)
}

/// Encode `data` and return the rendered file bytes in `format`.
pub fn create_stream(config: &SymbologyConfig, data: &str, format: Format) -> SymbologyResult {
    let mut symbol = match symbol_for(config) {
        Ok(s) => s,
        Err(e) => return SymbologyResult::from_error(&e),
    };
    let first = match symbol.encode(data) {
        Ok(w) => w,
        Err(e) => {
            log::debug!("Stream job encode failed: {}", e);
            return SymbologyResult::from_symbol(&symbol, None);
        }
    };
    match symbol.render_to_vec(format, config.rotation()) {
        Ok(bytes) => {
            let mut result = SymbologyResult::from_symbol(&symbol, Some(bytes));
            if let (Some(w), 0) = (first, result.code) {
                result.message = w.to_string();
                result.code = w.kind.code();
            }
            result
        }
        Err(e) => {
            log::debug!("Stream job render failed: {}", e);
            SymbologyResult::from_symbol(&symbol, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> SymbologyConfig {
        SymbologyConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_create_stream_txt() {
        let result = create_stream(&config(r#"{"symbology": 20}"#), "A", Format::Txt);
        assert_eq!(result.code, 0);
        assert_eq!(result.message, "");
        let text = String::from_utf8(result.data.unwrap()).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_create_stream_encode_error() {
        let result = create_stream(&config(r#"{"symbology": 27}"#), "1", Format::Png);
        assert!(result.data.is_none());
        assert_eq!(result.code, 8);
        assert_eq!(result.message, "Error 208: UPCD1 not supported");
    }

    #[test]
    fn test_create_stream_keeps_encode_warning() {
        let result = create_stream(&config(r#"{"symbology": 94}"#), "A", Format::Txt);
        assert!(result.data.is_some());
        assert_eq!(result.code, 2);
        assert!(result.message.starts_with("Warning 213"));
    }

    #[test]
    fn test_create_file_bad_format() {
        let result = create_file(&config(r#"{"symbology": 20, "fileName": "out.svg"}"#), "A");
        assert_eq!(result.code, 8);
        assert_eq!(result.message, "Error 225: Unknown output format");
    }

    #[test]
    fn test_create_file_reports_encode_error() {
        let path = std::env::temp_dir().join(format!("barforge-job-{}.png", std::process::id()));
        let json = format!(r#"{{"symbology": 8, "fileName": {:?}}}"#, path.display().to_string());
        let result = create_file(&config(&json), "A*B");
        assert_eq!(result.code, 6);
        assert!(result.message.starts_with("Error 324"));
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_symbology_name() {
        let result = create_file(&config(r#"{"symbology": "UNKNOWN"}"#), "A");
        assert_eq!(result.code, 8);
        assert!(result.message.starts_with("Error 206"));
    }

    #[test]
    fn test_result_serializes_without_data() {
        let result = SymbologyResult {
            data: None,
            message: String::new(),
            code: 0,
        };
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"message":"","code":0}"#);
    }
}
