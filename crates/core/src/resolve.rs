//! Barcode and selling-price resolution for a batch of items.
//!
//! Each table is queried once per batch with the whole key set, so the
//! number of store round-trips does not grow with the batch size.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PriceMode, ResolverConfig};
use crate::item_codes::ItemCodes;
use crate::store::{RecordStore, StoreError};

/// What a label shows for one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetails {
    /// Barcode to print; the item code when the item has none.
    pub barcode: String,
    /// Selling price to print.
    pub price: Decimal,
}

/// Resolves display barcodes and prices against a [`RecordStore`].
#[derive(Debug)]
pub struct Resolver<'a, S: ?Sized> {
    store: &'a S,
    config: &'a ResolverConfig,
}

impl<'a, S: RecordStore + ?Sized> Resolver<'a, S> {
    /// Create a resolver over `store`.
    pub fn new(store: &'a S, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Resolve barcode and price for every requested item.
    ///
    /// `price_list` overrides the configured default. Every normalized code
    /// appears exactly once in the result. An empty request returns an empty
    /// map without touching the store.
    pub fn resolve_items(
        &self,
        item_codes: &ItemCodes,
        price_list: Option<&str>,
    ) -> Result<BTreeMap<String, ItemDetails>, StoreError> {
        let codes = item_codes.normalized();
        if codes.is_empty() {
            return Ok(BTreeMap::new());
        }

        let price_list = price_list
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.config.default_price_list.as_str());

        let _span = tracing::debug_span!("resolve_items", items = codes.len(), price_list).entered();

        let mut prices = match self.config.price_mode {
            PriceMode::PriceList => self.latest_selling_prices(&codes, price_list)?,
            PriceMode::StandardRate => HashMap::new(),
        };

        let unpriced: Vec<String> = codes
            .iter()
            .filter(|c| !prices.contains_key(c.as_str()))
            .cloned()
            .collect();
        if !unpriced.is_empty() {
            tracing::debug!(count = unpriced.len(), "falling back to standard rates");
            for row in self.store.query_standard_rates(&unpriced)? {
                prices
                    .entry(row.item_code)
                    .or_insert(row.standard_rate.unwrap_or(Decimal::ZERO));
            }
        }

        let barcodes = self.first_barcodes(&codes)?;

        Ok(codes
            .into_iter()
            .map(|code| {
                let details = ItemDetails {
                    barcode: barcodes.get(&code).cloned().unwrap_or_else(|| code.clone()),
                    price: prices.get(&code).copied().unwrap_or(Decimal::ZERO),
                };
                (code, details)
            })
            .collect())
    }

    /// Resolve the authoritative barcode of each item that has one.
    ///
    /// Items without barcode rows are left out.
    pub fn resolve_barcodes(
        &self,
        item_codes: &ItemCodes,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let codes = item_codes.normalized();
        if codes.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(self.first_barcodes(&codes)?.into_iter().collect())
    }

    /// Lowest-`idx` barcode per item; the first row wins a tie.
    fn first_barcodes(&self, codes: &[String]) -> Result<HashMap<String, String>, StoreError> {
        let mut best: HashMap<String, (i64, String)> = HashMap::new();
        for row in self.store.query_barcodes_by_parents(codes)? {
            match best.get(&row.parent) {
                Some((idx, _)) if *idx <= row.idx => {}
                _ => {
                    best.insert(row.parent, (row.idx, row.barcode));
                }
            }
        }
        Ok(best
            .into_iter()
            .map(|(parent, (_, barcode))| (parent, barcode))
            .collect())
    }

    /// Latest-dated selling price per item; the first row wins a tie.
    fn latest_selling_prices(
        &self,
        codes: &[String],
        price_list: &str,
    ) -> Result<HashMap<String, Decimal>, StoreError> {
        let mut latest: HashMap<String, (Option<NaiveDate>, Decimal)> = HashMap::new();
        for row in self.store.query_selling_prices(codes, price_list)? {
            let rate = row.rate.unwrap_or(Decimal::ZERO);
            match latest.get(&row.item_code) {
                Some((valid_from, _)) if *valid_from >= row.valid_from => {}
                _ => {
                    latest.insert(row.item_code, (row.valid_from, rate));
                }
            }
        }
        Ok(latest
            .into_iter()
            .map(|(code, (_, rate))| (code, rate))
            .collect())
    }
}
