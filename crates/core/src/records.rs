//! Host-platform records as the stores hold them.
//!
//! Field names follow the host's column names so snapshots exported from it
//! load without mapping.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An item master record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Unique item code.
    pub item_code: String,
    /// Human-readable name.
    #[serde(default)]
    pub item_name: Option<String>,
    /// Standard selling rate.
    #[serde(default)]
    pub standard_rate: Option<Decimal>,
}

/// A barcode child row of an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemBarcode {
    /// Owning item code.
    pub parent: String,
    /// Barcode value.
    pub barcode: String,
    /// Position among the item's barcodes.
    #[serde(default)]
    pub idx: i64,
}

/// A price-list entry for an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemPrice {
    /// Item code.
    pub item_code: String,
    /// Price list the entry belongs to.
    pub price_list: String,
    /// Applies to sales (as opposed to purchasing).
    #[serde(default)]
    pub selling: bool,
    /// Price list rate.
    #[serde(default)]
    pub price_list_rate: Option<Decimal>,
    /// First day the entry applies.
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
}

/// A price list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceList {
    /// Price list name.
    pub name: String,
    /// Used for selling.
    #[serde(default)]
    pub selling: bool,
    /// Selectable.
    #[serde(default)]
    pub enabled: bool,
}

/// A purchase invoice item row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseInvoiceItem {
    /// Invoice the row belongs to.
    pub parent: String,
    /// Row position.
    #[serde(default)]
    pub idx: i64,
    /// Item code.
    pub item_code: String,
    /// Item name as printed on the invoice.
    #[serde(default)]
    pub item_name: Option<String>,
    /// Quantity.
    #[serde(default)]
    pub qty: Decimal,
}
