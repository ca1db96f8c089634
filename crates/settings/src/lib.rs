//! Barcode print settings for the barcode bridge.
//!
//! Holds the stored shape of the settings singleton (as an administrator
//! edits it in the host platform), loads it from JSON with structural
//! validation, and normalizes it into a renderer-ready configuration where
//! every layout field has a concrete value.

mod normalize;

pub use normalize::{
    DEFAULT_LABEL_SIZE_NAME, DEFAULT_PRICE_LIST, DEFAULT_PRINTER, NormalizedLabelSize,
    PrintSettings, SettingsLookup, fallback_settings, normalize_settings, seed_label_size,
};

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating stored settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// JSON deserialization failed.
    #[error("invalid settings JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Path of the field that failed validation (e.g. `label_sizes[1].print_speed`).
        field: String,
        /// A human-readable explanation of why the value is invalid.
        reason: String,
    },
}

/// The barcode print settings singleton as stored by the host platform.
///
/// Every scalar is optional: the host stores blanks as nulls, and the
/// normalizer decides what a blank means.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BarcodePrintSettings {
    /// Printer used when a label size names none.
    #[serde(default)]
    pub default_printer: Option<String>,
    /// Price list used when a caller does not name one.
    #[serde(default)]
    pub default_price_list: Option<String>,
    /// Label-size child records, in stored order.
    #[serde(default)]
    pub label_sizes: Vec<LabelSize>,
}

impl BarcodePrintSettings {
    /// The configured default price list, if it is set and non-blank.
    pub fn price_list(&self) -> Option<&str> {
        non_blank(self.default_price_list.as_deref())
    }

    /// The configured default printer, if it is set and non-blank.
    pub fn printer(&self) -> Option<&str> {
        non_blank(self.default_printer.as_deref())
    }
}

/// A stored label-size record: physical geometry plus layout offsets.
///
/// Physical sizes are millimetres; positions and offsets are printer dots.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LabelSize {
    /// Display name, unique within the settings record (e.g. `"35x15mm 2-up"`).
    pub label_name: String,
    /// Marks the size pre-selected in the print dialog.
    #[serde(default, deserialize_with = "flag")]
    pub is_default: bool,
    /// Printer for this size; blank means the settings' default printer.
    pub printer_name: Option<String>,
    /// Media width in mm (the full row, not a single label).
    pub label_width: Option<f64>,
    /// Label height in mm.
    pub label_height: Option<f64>,
    /// Gap between labels in mm.
    pub gap_height: Option<f64>,
    /// Labels printed side by side on one row.
    pub labels_per_row: Option<i32>,
    /// Height of the printable area in mm.
    pub printable_height: Option<f64>,
    /// Left media margin.
    pub left_margin: Option<i32>,
    /// Gap between the labels of one row.
    pub middle_gap: Option<i32>,
    /// Right media margin.
    pub right_margin: Option<i32>,
    /// X origin of the left label.
    pub left_label_x: Option<i32>,
    /// X origin of the right label.
    pub right_label_x: Option<i32>,
    /// Barcode narrow-module width.
    pub barcode_width: Option<i32>,
    /// Barcode bar height.
    pub barcode_height: Option<i32>,
    /// Y offset of the item name line.
    pub name_y_position: Option<i32>,
    /// Y offset of the barcode.
    pub barcode_y_position: Option<i32>,
    /// Y offset of the human-readable barcode text.
    pub barcode_text_y_position: Option<i32>,
    /// Y offset of the price line.
    pub price_y_position: Option<i32>,
    /// Item names are truncated to this many characters.
    pub text_max_chars: Option<i32>,
    /// Printer speed setting.
    pub print_speed: Option<i32>,
    /// Printer density (darkness) setting.
    pub print_density: Option<i32>,
}

/// The host stores check fields as `0`/`1`; accept those as well as booleans.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Upper bound for `labels_per_row`.
const MAX_LABELS_PER_ROW: i32 = 4;
/// Upper bound for `print_speed`.
const MAX_PRINT_SPEED: i32 = 12;
/// Upper bound for `print_density`.
const MAX_PRINT_DENSITY: i32 = 15;

/// Load and validate [`BarcodePrintSettings`] from a JSON string.
///
/// Performs structural validation after deserialization:
/// - every `label_name` must be non-empty and unique
/// - `labels_per_row` must be in 0–4 (if present)
/// - `print_speed` must be in 0–12 (if present)
/// - `print_density` must be in 0–15 (if present)
/// - physical sizes must not be negative (if present)
///
/// Zero values are accepted: they mean "use the default" to the normalizer.
/// Layout offsets are dot positions and are taken as given, negative included.
pub fn load_settings_from_str(s: &str) -> Result<BarcodePrintSettings, SettingsError> {
    let settings: BarcodePrintSettings = serde_json::from_str(s)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Validate an already-deserialized settings record.
pub fn validate_settings(settings: &BarcodePrintSettings) -> Result<(), SettingsError> {
    let mut seen = HashSet::new();

    for (i, size) in settings.label_sizes.iter().enumerate() {
        let field = |name: &str| format!("label_sizes[{i}].{name}");

        if size.label_name.trim().is_empty() {
            return Err(SettingsError::InvalidField {
                field: field("label_name"),
                reason: "must not be empty".into(),
            });
        }
        if !seen.insert(size.label_name.as_str()) {
            return Err(SettingsError::InvalidField {
                field: field("label_name"),
                reason: format!("duplicate label size {:?}", size.label_name),
            });
        }

        if let Some(n) = size.labels_per_row.filter(|n| !(0..=MAX_LABELS_PER_ROW).contains(n)) {
            return Err(SettingsError::InvalidField {
                field: field("labels_per_row"),
                reason: format!("{n} is outside 0..={MAX_LABELS_PER_ROW} labels per row"),
            });
        }
        if let Some(n) = size.print_speed.filter(|n| !(0..=MAX_PRINT_SPEED).contains(n)) {
            return Err(SettingsError::InvalidField {
                field: field("print_speed"),
                reason: format!("{n} is outside the print speed range 0..={MAX_PRINT_SPEED}"),
            });
        }
        if let Some(n) = size.print_density.filter(|n| !(0..=MAX_PRINT_DENSITY).contains(n)) {
            return Err(SettingsError::InvalidField {
                field: field("print_density"),
                reason: format!("{n} is outside the print density range 0..={MAX_PRINT_DENSITY}"),
            });
        }

        for (name, value) in [
            ("label_width", size.label_width),
            ("label_height", size.label_height),
            ("gap_height", size.gap_height),
            ("printable_height", size.printable_height),
        ] {
            if let Some(v) = value.filter(|v| *v < 0.0 || !v.is_finite()) {
                return Err(SettingsError::InvalidField {
                    field: field(name),
                    reason: format!("{v} is not a valid size in mm"),
                });
            }
        }
    }

    Ok(())
}
