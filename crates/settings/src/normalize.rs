//! Label-size normalization.
//!
//! Turns a stored [`BarcodePrintSettings`] record into a [`PrintSettings`]
//! where every layout field has a concrete value. A blank or zero stored
//! value means "use the default", so the defaults below are part of the
//! print bridge's contract and must not drift.

use serde::{Deserialize, Serialize};

use crate::{BarcodePrintSettings, LabelSize, non_blank};

/// Printer used when nothing is configured.
pub const DEFAULT_PRINTER: &str = "Bar Code Printer TT065-50";
/// Price list used when nothing is configured.
pub const DEFAULT_PRICE_LIST: &str = "Standard Selling";
/// Name of the built-in label size.
pub const DEFAULT_LABEL_SIZE_NAME: &str = "35x15mm 2-up";

const LEFT_MARGIN: i32 = 8;
const MIDDLE_GAP: i32 = 16;
const RIGHT_MARGIN: i32 = 8;
const LEFT_LABEL_X: i32 = 8;
const RIGHT_LABEL_X: i32 = 305;
const BARCODE_WIDTH: i32 = 2;
const BARCODE_HEIGHT: i32 = 60;
const NAME_Y: i32 = 2;
const BARCODE_Y: i32 = 16;
const BARCODE_TEXT_Y: i32 = 80;
const PRICE_Y: i32 = 96;
const TEXT_MAX_CHARS: i32 = 14;

/// Outcome of reading the settings singleton, as seen by the normalizer.
///
/// `NotConfigured` and `Failed` produce the same fallback configuration;
/// they are kept apart so callers can log or report them differently.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsLookup {
    /// The singleton exists.
    Configured(BarcodePrintSettings),
    /// The singleton has never been saved.
    NotConfigured,
    /// Loading the singleton failed; the message describes why.
    Failed(String),
}

/// Renderer-ready print configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintSettings {
    /// Printer to use when a label size names none.
    pub default_printer: String,
    /// Price list pre-selected for label prices.
    pub default_price_list: String,
    /// Name of the label size pre-selected in the print dialog.
    pub default_label_size: String,
    /// Every configured label size, in stored order.
    pub label_sizes: Vec<NormalizedLabelSize>,
}

impl PrintSettings {
    /// Look up a label size by name.
    pub fn label_size(&self, name: &str) -> Option<&NormalizedLabelSize> {
        self.label_sizes.iter().find(|s| s.name == name)
    }

    /// The label size named by `default_label_size`, if present.
    pub fn default_size(&self) -> Option<&NormalizedLabelSize> {
        self.label_size(&self.default_label_size)
    }
}

/// A label size with every layout default applied.
///
/// Physical dimensions, speed, and density pass through as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedLabelSize {
    /// Label size name.
    pub name: String,
    /// Printer for this size (falls back to the settings' default printer).
    pub printer_name: Option<String>,
    /// Media width in mm.
    pub width: Option<f64>,
    /// Label height in mm.
    pub height: Option<f64>,
    /// Gap between labels in mm.
    pub gap: Option<f64>,
    /// Labels side by side on one row.
    pub labels_per_row: Option<i32>,
    /// Printable height in mm.
    pub printable_height: Option<f64>,
    /// Left media margin.
    pub left_margin: i32,
    /// Gap between the labels of one row.
    pub middle_gap: i32,
    /// Right media margin.
    pub right_margin: i32,
    /// X origin of the left label.
    pub left_label_x: i32,
    /// X origin of the right label.
    pub right_label_x: i32,
    /// Barcode narrow-module width.
    pub barcode_width: i32,
    /// Barcode bar height.
    pub barcode_height: i32,
    /// Y offset of the item name.
    pub name_y: i32,
    /// Y offset of the barcode.
    pub barcode_y: i32,
    /// Y offset of the barcode text.
    pub barcode_text_y: i32,
    /// Y offset of the price line.
    pub price_y: i32,
    /// Maximum item-name characters.
    pub text_max_chars: i32,
    /// Print speed.
    pub speed: Option<i32>,
    /// Print density.
    pub density: Option<i32>,
    /// Whether this size is flagged as the default.
    pub is_default: bool,
}

/// Zero counts as unset.
fn or_default(value: Option<i32>, default: i32) -> i32 {
    value.filter(|v| *v != 0).unwrap_or(default)
}

fn normalize_label_size(size: &LabelSize, default_printer: Option<&str>) -> NormalizedLabelSize {
    let printer_name = non_blank(size.printer_name.as_deref())
        .or(default_printer)
        .map(str::to_owned);

    NormalizedLabelSize {
        name: size.label_name.clone(),
        printer_name,
        width: size.label_width,
        height: size.label_height,
        gap: size.gap_height,
        labels_per_row: size.labels_per_row,
        printable_height: size.printable_height,
        left_margin: or_default(size.left_margin, LEFT_MARGIN),
        middle_gap: or_default(size.middle_gap, MIDDLE_GAP),
        right_margin: or_default(size.right_margin, RIGHT_MARGIN),
        left_label_x: or_default(size.left_label_x, LEFT_LABEL_X),
        right_label_x: or_default(size.right_label_x, RIGHT_LABEL_X),
        barcode_width: or_default(size.barcode_width, BARCODE_WIDTH),
        barcode_height: or_default(size.barcode_height, BARCODE_HEIGHT),
        name_y: or_default(size.name_y_position, NAME_Y),
        barcode_y: or_default(size.barcode_y_position, BARCODE_Y),
        barcode_text_y: or_default(size.barcode_text_y_position, BARCODE_TEXT_Y),
        price_y: or_default(size.price_y_position, PRICE_Y),
        text_max_chars: or_default(size.text_max_chars, TEXT_MAX_CHARS),
        speed: size.print_speed,
        density: size.print_density,
        is_default: size.is_default,
    }
}

/// Normalize the settings singleton into a [`PrintSettings`].
///
/// Falls back to [`fallback_settings`] when the singleton is missing, failed
/// to load, or has no label sizes. Otherwise each label size is normalized in
/// stored order. The default label size is the last one flagged
/// `is_default`, else the first one.
pub fn normalize_settings(lookup: SettingsLookup) -> PrintSettings {
    let settings = match lookup {
        SettingsLookup::Configured(settings) if !settings.label_sizes.is_empty() => settings,
        SettingsLookup::Configured(_) => {
            tracing::debug!("settings have no label sizes; using built-in configuration");
            return fallback_settings();
        }
        SettingsLookup::NotConfigured => {
            tracing::debug!("settings not configured; using built-in configuration");
            return fallback_settings();
        }
        SettingsLookup::Failed(reason) => {
            tracing::warn!(%reason, "failed to load barcode print settings; using built-in configuration");
            return fallback_settings();
        }
    };

    let default_printer = settings.printer();
    let label_sizes: Vec<NormalizedLabelSize> = settings
        .label_sizes
        .iter()
        .map(|size| normalize_label_size(size, default_printer))
        .collect();

    let default_label_size = label_sizes
        .iter()
        .rev()
        .find(|s| s.is_default)
        .or_else(|| label_sizes.first())
        .map(|s| s.name.clone())
        .unwrap_or_else(|| DEFAULT_LABEL_SIZE_NAME.to_owned());

    PrintSettings {
        default_printer: default_printer.unwrap_or(DEFAULT_PRINTER).to_owned(),
        default_price_list: settings
            .price_list()
            .unwrap_or(DEFAULT_PRICE_LIST)
            .to_owned(),
        default_label_size,
        label_sizes,
    }
}

/// The built-in configuration used when no settings are available.
pub fn fallback_settings() -> PrintSettings {
    PrintSettings {
        default_printer: DEFAULT_PRINTER.to_owned(),
        default_price_list: DEFAULT_PRICE_LIST.to_owned(),
        default_label_size: DEFAULT_LABEL_SIZE_NAME.to_owned(),
        label_sizes: vec![NormalizedLabelSize {
            name: DEFAULT_LABEL_SIZE_NAME.to_owned(),
            printer_name: Some(DEFAULT_PRINTER.to_owned()),
            width: Some(70.0),
            height: Some(15.0),
            gap: Some(3.0),
            labels_per_row: Some(2),
            printable_height: Some(10.0),
            left_margin: LEFT_MARGIN,
            middle_gap: MIDDLE_GAP,
            right_margin: RIGHT_MARGIN,
            left_label_x: LEFT_LABEL_X,
            right_label_x: RIGHT_LABEL_X,
            barcode_width: BARCODE_WIDTH,
            barcode_height: BARCODE_HEIGHT,
            name_y: NAME_Y,
            barcode_y: BARCODE_Y,
            barcode_text_y: BARCODE_TEXT_Y,
            price_y: PRICE_Y,
            text_max_chars: TEXT_MAX_CHARS,
            speed: Some(4),
            density: Some(8),
            is_default: true,
        }],
    }
}

/// The label size written by the installer when settings have none.
///
/// Only geometry is stored; layout offsets stay blank so the normalizer's
/// defaults apply.
pub fn seed_label_size() -> LabelSize {
    LabelSize {
        label_name: DEFAULT_LABEL_SIZE_NAME.to_owned(),
        is_default: true,
        printer_name: Some(DEFAULT_PRINTER.to_owned()),
        label_width: Some(70.0),
        label_height: Some(15.0),
        gap_height: Some(3.0),
        labels_per_row: Some(2),
        printable_height: Some(10.0),
        left_label_x: Some(LEFT_LABEL_X),
        right_label_x: Some(RIGHT_LABEL_X),
        print_speed: Some(4),
        print_density: Some(8),
        ..Default::default()
    }
}
