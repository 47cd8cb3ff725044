//! # Error Types
//!
//! Every failure and warning raised by the pipeline carries a stable
//! three-digit reason code plus a short text, rendered as
//! `"Error NNN: text"` or `"Warning NNN: text"`.
//!
//! ## Status code space
//!
//! | Value | Meaning |
//! |-------|---------|
//! | 0 | success |
//! | 1..=4 | warnings ([`WarningKind`]) |
//! | 5..=14 | errors ([`ErrorKind`]) |
//!
//! Consumers may branch on [`Status::code`] or on the reason code.

use std::fmt;

use thiserror::Error;

/// Numeric threshold: status values at or above this are errors.
pub const ERROR_THRESHOLD: i32 = 5;

/// Longest payload (`"NNN: text"`) kept after the `"Error "` prefix.
const ERROR_TEXT_MAX: usize = 93;
/// Longest payload kept after the `"Warning "` prefix.
const WARNING_TEXT_MAX: usize = 91;

/// Class of a fatal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input too long or too many rows/segments
    TooLong,
    /// Input contains characters or sequences the target cannot represent
    InvalidData,
    /// Supplied check digit is wrong
    InvalidCheck,
    /// An option is out of range or unsupported for the symbology
    InvalidOption,
    /// Internal inconsistency (unreachable in a correct build)
    EncodingProblem,
    /// Output or input file could not be opened
    FileAccess,
    /// Buffer allocation failed
    Memory,
    /// Writing the output file failed
    FileWrite,
    /// ECI was required but warnings are promoted to errors
    UsesEci,
    /// Result would be non-compliant and warnings are promoted to errors
    Noncompliant,
}

impl ErrorKind {
    /// Numeric status value.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::TooLong => 5,
            ErrorKind::InvalidData => 6,
            ErrorKind::InvalidCheck => 7,
            ErrorKind::InvalidOption => 8,
            ErrorKind::EncodingProblem => 9,
            ErrorKind::FileAccess => 10,
            ErrorKind::Memory => 11,
            ErrorKind::FileWrite => 12,
            ErrorKind::UsesEci => 13,
            ErrorKind::Noncompliant => 14,
        }
    }
}

/// Class of a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// Human readable text was truncated
    HrtTruncated,
    /// An option was ignored or adjusted
    InvalidOption,
    /// The data was encoded with an ECI the caller did not request
    UsesEci,
    /// The symbol does not meet its standard's size rules
    Noncompliant,
}

impl WarningKind {
    /// Numeric status value.
    pub fn code(self) -> i32 {
        match self {
            WarningKind::HrtTruncated => 1,
            WarningKind::InvalidOption => 2,
            WarningKind::UsesEci => 3,
            WarningKind::Noncompliant => 4,
        }
    }

    /// Error kind this warning becomes under [`WarnLevel::FailAll`].
    pub fn promoted(self) -> Option<ErrorKind> {
        match self {
            WarningKind::InvalidOption => Some(ErrorKind::InvalidOption),
            WarningKind::UsesEci => Some(ErrorKind::UsesEci),
            WarningKind::Noncompliant => Some(ErrorKind::Noncompliant),
            WarningKind::HrtTruncated => None,
        }
    }
}

/// Warning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    /// Warnings stay warnings
    #[default]
    Default,
    /// Promote the promotable warnings to errors
    FailAll,
}

/// A fatal, tagged failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error {}", payload(.reason, .text, ERROR_TEXT_MAX))]
pub struct Error {
    pub kind: ErrorKind,
    pub reason: u16,
    pub text: String,
}

impl Error {
    pub fn new(kind: ErrorKind, reason: u16, text: impl Into<String>) -> Self {
        Self {
            kind,
            reason,
            text: text.into(),
        }
    }

    pub fn too_long(reason: u16, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooLong, reason, text)
    }

    pub fn invalid_data(reason: u16, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidData, reason, text)
    }

    pub fn invalid_option(reason: u16, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOption, reason, text)
    }

    pub fn memory(reason: u16, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::Memory, reason, text)
    }

    /// Append a suffix to the reason text (e.g. `" in 2D component"`).
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.text.push_str(suffix);
        self
    }
}

/// A recoverable condition, recorded on the symbol alongside a usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub reason: u16,
    pub text: String,
}

impl Warning {
    pub fn new(kind: WarningKind, reason: u16, text: impl Into<String>) -> Self {
        Self {
            kind,
            reason,
            text: text.into(),
        }
    }

    /// Apply the warning policy: under `FailAll` a promotable warning
    /// becomes an error with the same reason and text.
    pub fn escalate(self, level: WarnLevel) -> std::result::Result<Warning, Error> {
        match (level, self.kind.promoted()) {
            (WarnLevel::FailAll, Some(kind)) => Err(Error::new(kind, self.reason, self.text)),
            _ => Ok(self),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning {}", payload(&self.reason, &self.text, WARNING_TEXT_MAX))
    }
}

/// Outcome of the last operation on a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Success,
    Warning(Warning),
    Error(Error),
}

impl Status {
    /// Numeric status value (0 for success).
    pub fn code(&self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Warning(w) => w.kind.code(),
            Status::Error(e) => e.kind.code(),
        }
    }

    /// Formatted tagged message, empty on success.
    pub fn message(&self) -> String {
        match self {
            Status::Success => String::new(),
            Status::Warning(w) => w.to_string(),
            Status::Error(e) => e.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            Status::Warning(w) => Some(w),
            _ => None,
        }
    }
}

/// `"NNN: text"`, truncated on a char boundary to at most `max` bytes.
fn payload(reason: &u16, text: &str, max: usize) -> String {
    let mut s = format!("{:03}: {}", reason, text);
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// Apply the warning policy to an optional warning.
pub fn escalate(warning: Option<Warning>, level: WarnLevel) -> Result<Option<Warning>> {
    warning.map(|w| w.escalate(level)).transpose()
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_format() {
        let e = Error::invalid_data(204, "Invalid character in input data");
        assert_eq!(e.to_string(), "Error 204: Invalid character in input data");
        assert_eq!(e.kind.code(), 6);
    }

    #[test]
    fn test_warning_format() {
        let w = Warning::new(WarningKind::UsesEci, 222, "Encoded data includes ECI 26");
        assert_eq!(w.to_string(), "Warning 222: Encoded data includes ECI 26");
    }

    #[test]
    fn test_zero_padded_reason() {
        let e = Error::new(ErrorKind::EncodingProblem, 0, "Internal error");
        assert_eq!(e.to_string(), "Error 000: Internal error");
    }

    #[test]
    fn test_message_truncated() {
        let e = Error::invalid_data(100, "x".repeat(200));
        assert_eq!(e.to_string().len(), "Error ".len() + 93);
        let w = Warning::new(WarningKind::Noncompliant, 100, "y".repeat(200));
        assert_eq!(w.to_string().len(), "Warning ".len() + 91);
    }

    #[test]
    fn test_fail_all_promotion() {
        let w = Warning::new(WarningKind::Noncompliant, 663, "Size not within the minimum/maximum ranges");
        let e = w.clone().escalate(WarnLevel::FailAll).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Noncompliant);
        assert_eq!(e.reason, 663);
        assert_eq!(w.clone().escalate(WarnLevel::Default).unwrap(), w);

        let hrt = Warning::new(WarningKind::HrtTruncated, 1, "truncated");
        assert!(hrt.escalate(WarnLevel::FailAll).is_ok());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Success.code(), 0);
        assert!(Status::Success.message().is_empty());
        let s = Status::Error(Error::too_long(770, "Too many stacked symbols"));
        assert_eq!(s.code(), 5);
        assert!(s.is_error());
        assert!(s.code() >= ERROR_THRESHOLD);
    }
}
