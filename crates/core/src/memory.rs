//! A record store held entirely in memory.
//!
//! Loadable from a JSON [`Snapshot`] so tests and the CLI can run without a
//! database. Queries mirror the SQL a database-backed store would run.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use barcode_bridge_settings::BarcodePrintSettings;
use serde::{Deserialize, Serialize};

use crate::records::{Item, ItemBarcode, ItemPrice, PriceList, PurchaseInvoiceItem};
use crate::store::{
    BarcodeRow, InvoiceLine, PriceRow, RecordStore, SettingsStore, StandardRateRow, StoreError,
};

/// Serialized contents of a [`MemoryStore`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Snapshot {
    /// Item master records.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Item barcode rows.
    #[serde(default)]
    pub item_barcodes: Vec<ItemBarcode>,
    /// Item price rows.
    #[serde(default)]
    pub item_prices: Vec<ItemPrice>,
    /// Price lists.
    #[serde(default)]
    pub price_lists: Vec<PriceList>,
    /// Purchase invoice item rows.
    #[serde(default)]
    pub purchase_invoice_items: Vec<PurchaseInvoiceItem>,
    /// The settings singleton, if saved.
    #[serde(default)]
    pub settings: Option<BarcodePrintSettings>,
}

/// In-memory [`RecordStore`] and [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Vec<Item>,
    item_barcodes: Vec<ItemBarcode>,
    item_prices: Vec<ItemPrice>,
    price_lists: Vec<PriceList>,
    purchase_invoice_items: Vec<PurchaseInvoiceItem>,
    settings: Mutex<Option<BarcodePrintSettings>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            items: snapshot.items,
            item_barcodes: snapshot.item_barcodes,
            item_prices: snapshot.item_prices,
            price_lists: snapshot.price_lists,
            purchase_invoice_items: snapshot.purchase_invoice_items,
            settings: Mutex::new(snapshot.settings),
        }
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_snapshot(serde_json::from_str(s)?))
    }

    /// Copy the current contents out as a snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            items: self.items.clone(),
            item_barcodes: self.item_barcodes.clone(),
            item_prices: self.item_prices.clone(),
            price_lists: self.price_lists.clone(),
            purchase_invoice_items: self.purchase_invoice_items.clone(),
            settings: self.lock_settings()?.clone(),
        })
    }

    /// Add an item.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Add a barcode row.
    pub fn with_barcode(mut self, barcode: ItemBarcode) -> Self {
        self.item_barcodes.push(barcode);
        self
    }

    /// Add a price row.
    pub fn with_price(mut self, price: ItemPrice) -> Self {
        self.item_prices.push(price);
        self
    }

    /// Add a price list.
    pub fn with_price_list(mut self, price_list: PriceList) -> Self {
        self.price_lists.push(price_list);
        self
    }

    /// Add a purchase invoice row.
    pub fn with_invoice_item(mut self, row: PurchaseInvoiceItem) -> Self {
        self.purchase_invoice_items.push(row);
        self
    }

    /// Set the settings singleton.
    pub fn with_settings(self, settings: BarcodePrintSettings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
            ..self
        }
    }

    fn lock_settings(&self) -> Result<MutexGuard<'_, Option<BarcodePrintSettings>>, StoreError> {
        self.settings
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("settings lock poisoned: {e}")))
    }
}

fn key_set(keys: &[String]) -> HashSet<&str> {
    keys.iter().map(String::as_str).collect()
}

impl RecordStore for MemoryStore {
    fn query_barcodes_by_parents(&self, parents: &[String]) -> Result<Vec<BarcodeRow>, StoreError> {
        let wanted = key_set(parents);
        let mut rows: Vec<BarcodeRow> = self
            .item_barcodes
            .iter()
            .filter(|b| wanted.contains(b.parent.as_str()))
            .map(|b| BarcodeRow {
                parent: b.parent.clone(),
                barcode: b.barcode.clone(),
                idx: b.idx,
            })
            .collect();
        rows.sort_by_key(|r| r.idx);
        Ok(rows)
    }

    fn query_selling_prices(
        &self,
        item_codes: &[String],
        price_list: &str,
    ) -> Result<Vec<PriceRow>, StoreError> {
        let wanted = key_set(item_codes);
        let mut rows: Vec<PriceRow> = self
            .item_prices
            .iter()
            .filter(|p| p.selling && p.price_list == price_list)
            .filter(|p| wanted.contains(p.item_code.as_str()))
            .map(|p| PriceRow {
                item_code: p.item_code.clone(),
                rate: p.price_list_rate,
                valid_from: p.valid_from,
            })
            .collect();
        rows.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        Ok(rows)
    }

    fn query_standard_rates(
        &self,
        item_codes: &[String],
    ) -> Result<Vec<StandardRateRow>, StoreError> {
        let wanted = key_set(item_codes);
        Ok(self
            .items
            .iter()
            .filter(|i| wanted.contains(i.item_code.as_str()))
            .map(|i| StandardRateRow {
                item_code: i.item_code.clone(),
                standard_rate: i.standard_rate,
            })
            .collect())
    }

    fn query_enabled_selling_price_lists(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .price_lists
            .iter()
            .filter(|p| p.selling && p.enabled)
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn query_invoice_lines(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>, StoreError> {
        let mut rows: Vec<&PurchaseInvoiceItem> = self
            .purchase_invoice_items
            .iter()
            .filter(|r| r.parent == invoice_id)
            .collect();
        rows.sort_by_key(|r| r.idx);
        Ok(rows
            .into_iter()
            .map(|r| InvoiceLine {
                item_code: r.item_code.clone(),
                item_name: r.item_name.clone(),
                qty: r.qty,
            })
            .collect())
    }
}

impl SettingsStore for MemoryStore {
    fn load_singleton_settings(&self) -> Result<BarcodePrintSettings, StoreError> {
        self.lock_settings()?
            .clone()
            .ok_or_else(|| StoreError::not_found("Barcode Print Settings", "singleton"))
    }

    fn save_singleton_settings(&self, settings: &BarcodePrintSettings) -> Result<(), StoreError> {
        *self.lock_settings()? = Some(settings.clone());
        Ok(())
    }
}
