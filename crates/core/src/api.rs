//! Endpoints called by the print-bridge client.
//!
//! Each method is one request: it reads what it needs from the store and
//! returns a serializable value. Nothing is cached between calls.

use std::collections::BTreeMap;

use barcode_bridge_settings::{PrintSettings, SettingsLookup, normalize_settings};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::install::{InstallOutcome, install_default_settings};
use crate::item_codes::ItemCodes;
use crate::resolve::{ItemDetails, Resolver};
use crate::store::{RecordStore, SettingsStore, StoreError};

/// One invoice line ready for the label dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelItem {
    /// Item code.
    pub item_code: String,
    /// Item name; the code when the line has no name.
    pub item_name: String,
    /// Quantity on the line, used as the default label count. A zero
    /// quantity reads as 1 so every line prints at least one label.
    pub qty: Decimal,
    /// Resolved display barcode.
    pub barcode: String,
    /// Resolved selling price.
    pub rate: Decimal,
}

/// The query surface over a record store.
#[derive(Debug)]
pub struct BarcodeApi<S> {
    store: S,
    config: ResolverConfig,
}

impl<S> BarcodeApi<S>
where
    S: RecordStore + SettingsStore,
{
    /// Wrap `store` with the given configuration.
    pub fn new(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn resolver(&self) -> Resolver<'_, S> {
        Resolver::new(&self.store, &self.config)
    }

    /// First barcode of each item that has one.
    pub fn get_item_barcodes(
        &self,
        item_codes: &ItemCodes,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        self.resolver().resolve_barcodes(item_codes)
    }

    /// Barcode and selling price for every requested item.
    ///
    /// Without an explicit `price_list`, the stored settings' default price
    /// list is used, then the configured one. A failure to read settings
    /// only affects which price list is chosen.
    pub fn get_item_details(
        &self,
        item_codes: &ItemCodes,
        price_list: Option<&str>,
    ) -> Result<BTreeMap<String, ItemDetails>, StoreError> {
        if item_codes.is_empty() {
            return Ok(BTreeMap::new());
        }
        let price_list = self.price_list_for(price_list);
        self.resolver()
            .resolve_items(item_codes, price_list.as_deref())
    }

    /// Normalized print settings, or the built-in configuration.
    pub fn get_barcode_print_settings(&self) -> PrintSettings {
        normalize_settings(self.settings_lookup())
    }

    /// Enabled selling price lists, sorted by name.
    pub fn get_price_lists(&self) -> Result<Vec<String>, StoreError> {
        let mut names = self.store.query_enabled_selling_price_lists()?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Label items for every line of a purchase invoice, in line order.
    ///
    /// All distinct items on the invoice are resolved in one batch.
    pub fn get_purchase_invoice_items(
        &self,
        invoice_id: &str,
        price_list: Option<&str>,
    ) -> Result<Vec<LabelItem>, StoreError> {
        let lines: Vec<_> = self
            .store
            .query_invoice_lines(invoice_id)?
            .into_iter()
            .filter(|l| !l.item_code.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Err(StoreError::not_found("Purchase Invoice", invoice_id));
        }

        let codes: ItemCodes = lines.iter().map(|l| l.item_code.as_str()).collect();
        let details = self.get_item_details(&codes, price_list)?;

        Ok(lines
            .into_iter()
            .map(|line| {
                let code = line.item_code.trim().to_owned();
                let (barcode, rate) = match details.get(&code) {
                    Some(d) => (d.barcode.clone(), d.price),
                    None => (code.clone(), Decimal::ZERO),
                };
                LabelItem {
                    item_name: line
                        .item_name
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| code.clone()),
                    item_code: code,
                    qty: if line.qty.is_zero() {
                        Decimal::ONE
                    } else {
                        line.qty
                    },
                    barcode,
                    rate,
                }
            })
            .collect())
    }

    /// Seed default settings; see [`install_default_settings`].
    pub fn install_default_settings(&self) -> Result<InstallOutcome, StoreError> {
        install_default_settings(&self.store)
    }

    fn settings_lookup(&self) -> SettingsLookup {
        match self.store.load_singleton_settings() {
            Ok(settings) => SettingsLookup::Configured(settings),
            Err(e) if e.is_not_found() => SettingsLookup::NotConfigured,
            Err(e) => SettingsLookup::Failed(e.to_string()),
        }
    }

    /// Explicit price list, else the stored default. `None` lets the resolver
    /// use its configured default.
    fn price_list_for(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(p) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
            return Some(p.to_owned());
        }
        match self.settings_lookup() {
            SettingsLookup::Configured(settings) => settings.price_list().map(str::to_owned),
            SettingsLookup::NotConfigured => None,
            SettingsLookup::Failed(reason) => {
                tracing::warn!(%reason, "could not read default price list from settings");
                None
            }
        }
    }
}
