//! Shared fixtures for `barcode_bridge_core` integration tests.

#![allow(unreachable_pub, dead_code)]

use barcode_bridge_core::records::{Item, ItemBarcode, ItemPrice, PriceList, PurchaseInvoiceItem};
use barcode_bridge_core::{
    BarcodePrintSettings, BarcodeRow, InvoiceLine, MemoryStore, PriceRow, RecordStore,
    SettingsStore, StandardRateRow, StoreError,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn item(code: &str, standard_rate: Option<i64>) -> Item {
    Item {
        item_code: code.into(),
        item_name: Some(format!("{code} name")),
        standard_rate: standard_rate.map(Decimal::from),
    }
}

pub fn barcode(parent: &str, barcode: &str, idx: i64) -> ItemBarcode {
    ItemBarcode {
        parent: parent.into(),
        barcode: barcode.into(),
        idx,
    }
}

pub fn selling_price(code: &str, list: &str, rate: i64, valid_from: &str) -> ItemPrice {
    ItemPrice {
        item_code: code.into(),
        price_list: list.into(),
        selling: true,
        price_list_rate: Some(Decimal::from(rate)),
        valid_from: NaiveDate::parse_from_str(valid_from, "%Y-%m-%d").ok(),
    }
}

pub fn price_list(name: &str, selling: bool, enabled: bool) -> PriceList {
    PriceList {
        name: name.into(),
        selling,
        enabled,
    }
}

pub fn invoice_line(invoice: &str, idx: i64, code: &str, qty: i64) -> PurchaseInvoiceItem {
    PurchaseInvoiceItem {
        parent: invoice.into(),
        idx,
        item_code: code.into(),
        item_name: Some(format!("{code} name")),
        qty: Decimal::from(qty),
    }
}

/// A small shop: barcoded and unbarcoded items on two price lists.
pub fn shop() -> MemoryStore {
    MemoryStore::new()
        .with_item(item("PEN-BLUE", Some(15)))
        .with_item(item("PEN-RED", Some(15)))
        .with_item(item("NOTEBOOK", Some(50)))
        .with_item(item("ERASER", None))
        .with_barcode(barcode("PEN-BLUE", "8901000000011", 2))
        .with_barcode(barcode("PEN-BLUE", "8901000000004", 1))
        .with_barcode(barcode("NOTEBOOK", "8902000000003", 1))
        .with_price(selling_price("PEN-BLUE", "Standard Selling", 10, "2024-01-01"))
        .with_price(selling_price("PEN-BLUE", "Standard Selling", 12, "2024-06-01"))
        .with_price(selling_price("PEN-RED", "Wholesale", 9, "2024-03-01"))
        .with_price(ItemPrice {
            selling: false,
            ..selling_price("PEN-RED", "Standard Selling", 7, "2024-03-01")
        })
        .with_price_list(price_list("Standard Selling", true, true))
        .with_price_list(price_list("Wholesale", true, true))
        .with_price_list(price_list("Standard Buying", false, true))
        .with_price_list(price_list("Festival", true, false))
}

/// A store whose every query fails, as when the database is down.
pub struct DownStore;

impl DownStore {
    fn down<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database is down".into()))
    }
}

impl RecordStore for DownStore {
    fn query_barcodes_by_parents(&self, _: &[String]) -> Result<Vec<BarcodeRow>, StoreError> {
        Self::down()
    }

    fn query_selling_prices(&self, _: &[String], _: &str) -> Result<Vec<PriceRow>, StoreError> {
        Self::down()
    }

    fn query_standard_rates(&self, _: &[String]) -> Result<Vec<StandardRateRow>, StoreError> {
        Self::down()
    }

    fn query_enabled_selling_price_lists(&self) -> Result<Vec<String>, StoreError> {
        Self::down()
    }

    fn query_invoice_lines(&self, _: &str) -> Result<Vec<InvoiceLine>, StoreError> {
        Self::down()
    }
}

impl SettingsStore for DownStore {
    fn load_singleton_settings(&self) -> Result<BarcodePrintSettings, StoreError> {
        Self::down()
    }

    fn save_singleton_settings(&self, _: &BarcodePrintSettings) -> Result<(), StoreError> {
        Self::down()
    }
}
