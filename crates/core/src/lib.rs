//! Barcode bridge core library.
//!
//! Resolves display barcodes and selling prices for batches of items and
//! exposes the query surface a print-bridge client calls. All data comes
//! from an injected [`RecordStore`]; the main entry points are
//! [`Resolver::resolve_items`] and the endpoints on [`BarcodeApi`].

#![warn(missing_docs)]

/// The query surface consumed by print-bridge clients.
pub mod api;
/// Resolver configuration.
pub mod config;
/// Install-time seeding of default settings.
pub mod install;
/// Typed item-code input.
pub mod item_codes;
/// In-memory record store.
pub mod memory;
/// Host-platform record shapes.
pub mod records;
/// Barcode and price resolution.
pub mod resolve;
/// Record-store traits and query rows.
pub mod store;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use api::{BarcodeApi, LabelItem};
pub use config::{PriceMode, ResolverConfig};
pub use install::{InstallOutcome, install_default_settings};
pub use item_codes::ItemCodes;
pub use memory::{MemoryStore, Snapshot};
pub use resolve::{ItemDetails, Resolver};
pub use store::{
    BarcodeRow, InvoiceLine, PriceRow, RecordStore, SettingsStore, StandardRateRow, StoreError,
};

// Settings types travel through the API; re-export so callers need one crate.
pub use barcode_bridge_settings::{
    BarcodePrintSettings, LabelSize, NormalizedLabelSize, PrintSettings, SettingsLookup,
    fallback_settings, normalize_settings,
};
