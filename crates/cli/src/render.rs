//! Terminal rendering for command results.
//!
//! JSON goes to stdout as one pretty-printed document per command. Pretty
//! output is tab-separated text meant for reading or `cut`.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal};

use barcode_bridge_core::{InstallOutcome, ItemDetails, LabelItem, PrintSettings};
use serde::Serialize;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Human-readable text.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a terminal and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

/// Print any serializable value as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON failure envelope printed to stdout when `--output json` is active.
pub(crate) fn print_error_envelope(err: &anyhow::Error) {
    let out = serde_json::json!({
        "success": false,
        "error": "command_failed",
        "message": format!("{err:#}"),
    });
    // A `Value` built from strings always serializes.
    if let Ok(text) = serde_json::to_string_pretty(&out) {
        println!("{text}");
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

pub(crate) fn barcodes(map: &BTreeMap<String, String>) {
    for (code, barcode) in map {
        println!("{code}\t{barcode}");
    }
}

pub(crate) fn details(map: &BTreeMap<String, ItemDetails>) {
    for (code, d) in map {
        println!("{code}\t{}\t{}", d.barcode, d.price);
    }
}

pub(crate) fn price_lists(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

pub(crate) fn label_items(items: &[LabelItem]) {
    for item in items {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            item.item_code, item.item_name, item.qty, item.barcode, item.rate
        );
    }
}

/// Summary header followed by one line per label size.
pub(crate) fn settings(settings: &PrintSettings) {
    println!("printer:     {}", settings.default_printer);
    println!("price list:  {}", settings.default_price_list);
    println!("label size:  {}", settings.default_label_size);
    for size in &settings.label_sizes {
        let marker = if size.is_default { "*" } else { " " };
        let printer = size.printer_name.as_deref().unwrap_or("-");
        let dims = match (size.width, size.height) {
            (Some(w), Some(h)) => format!("{w}x{h}mm"),
            _ => "-".to_owned(),
        };
        let per_row = size
            .labels_per_row
            .map_or_else(|| "-".to_owned(), |n| n.to_string());
        println!("{marker} {}\t{printer}\t{dims}\t{per_row}/row", size.name);
    }
}

pub(crate) fn install(outcome: InstallOutcome) {
    match outcome {
        InstallOutcome::Seeded => eprintln!("seeded default label size"),
        InstallOutcome::AlreadyConfigured => eprintln!("settings already configured"),
    }
}

/// One-line status on stderr, or a small JSON object on stdout.
pub(crate) fn status(format: Format, status: &str, detail: &str) -> anyhow::Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({ "status": status, "detail": detail })),
        Format::Pretty => {
            eprintln!("{status}: {detail}");
            Ok(())
        }
    }
}
