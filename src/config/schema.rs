//! JSON schema for symbology jobs.

use serde::{Deserialize, Serialize};

/// A symbology given by numeric id or by name (`"QRCODE"`,
/// `"BARCODE_QRCODE"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbologyRef {
    Id(i32),
    Name(String),
}

impl Default for SymbologyRef {
    fn default() -> Self {
        SymbologyRef::Id(crate::symbology::Symbology::Code128.id())
    }
}

/// One encode job. Every field but `symbology` is optional and falls back
/// to the symbol defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbologyConfig {
    pub symbology: SymbologyRef,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub whitespace_width: Option<i32>,
    #[serde(default)]
    pub whitespace_height: Option<i32>,
    #[serde(default)]
    pub border_width: Option<i32>,
    /// Raw output option bits; unknown bits are ignored.
    #[serde(default)]
    pub output_options: Option<u32>,
    #[serde(default)]
    pub foreground_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub option1: Option<i32>,
    #[serde(default)]
    pub option2: Option<i32>,
    #[serde(default)]
    pub option3: Option<i32>,
    #[serde(default)]
    pub show_human_readable_text: Option<bool>,
    /// Input mode in the low 3 bits (0 data, 1 unicode, 2 GS1), 8 adds
    /// escape processing, 16 parenthesised GS1 AIs, 32 no GS1 check.
    #[serde(default)]
    pub encoding: Option<u32>,
    #[serde(default)]
    pub eci: Option<i32>,
    #[serde(default)]
    pub primary: Option<String>,
    /// 0, 90, 180 or 270 degrees clockwise.
    #[serde(default)]
    pub rotation: Option<i32>,
    #[serde(default)]
    pub dot_size: Option<f32>,
    /// Promote warnings to errors.
    #[serde(default)]
    pub fail_on_warning: bool,
}

/// Outcome of a job, mirroring the symbol's status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbologyResult {
    /// Rendered file bytes (stream jobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    /// Tagged warning or error message, empty on success.
    pub message: String,
    /// Numeric status, 0 on success.
    pub code: i32,
}
