use barcode_bridge_settings::BarcodePrintSettings;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Record-store failures.
///
/// Missing *related* records (an item without a barcode or price) are not
/// errors; they resolve to fallbacks. These variants cover the store itself.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record that must exist does not (e.g. the settings singleton).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up.
        entity: String,
        /// Key of the missing record.
        id: String,
    },

    /// The store could not be reached or the query failed.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt {entity} record: {reason}")]
    Corrupt {
        /// Kind of record that failed to decode.
        entity: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// One barcode belonging to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRow {
    /// Item code the barcode belongs to.
    pub parent: String,
    /// The barcode value.
    pub barcode: String,
    /// Sibling ordering index; the lowest is authoritative.
    pub idx: i64,
}

/// A selling price for an item on one price list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
    /// Item code.
    pub item_code: String,
    /// Price; `None` is treated as zero.
    pub rate: Option<Decimal>,
    /// First day the price applies; undated prices rank below dated ones.
    pub valid_from: Option<NaiveDate>,
}

/// An item's standard selling rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardRateRow {
    /// Item code.
    pub item_code: String,
    /// Standard rate; `None` is treated as zero.
    pub standard_rate: Option<Decimal>,
}

/// A purchase invoice line, in invoice order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    /// Item on the line.
    pub item_code: String,
    /// Item name as printed on the invoice.
    pub item_name: Option<String>,
    /// Quantity received.
    pub qty: Decimal,
}

/// Read access to the host platform's item tables.
///
/// Every batch query takes the full set of keys at once; implementations
/// should answer each call with a single membership query.
pub trait RecordStore {
    /// Barcodes whose parent is in `parents`, ordered by `idx` ascending.
    fn query_barcodes_by_parents(&self, parents: &[String]) -> Result<Vec<BarcodeRow>, StoreError>;

    /// Selling-flagged prices on `price_list` for the given items.
    fn query_selling_prices(
        &self,
        item_codes: &[String],
        price_list: &str,
    ) -> Result<Vec<PriceRow>, StoreError>;

    /// Standard rates for the given items. Unknown items are omitted.
    fn query_standard_rates(&self, item_codes: &[String])
    -> Result<Vec<StandardRateRow>, StoreError>;

    /// Names of price lists that are both selling and enabled.
    fn query_enabled_selling_price_lists(&self) -> Result<Vec<String>, StoreError>;

    /// Lines of a purchase invoice, ordered by `idx`. Empty when the invoice is unknown.
    fn query_invoice_lines(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>, StoreError>;
}

/// Access to the barcode print settings singleton.
pub trait SettingsStore {
    /// Load the singleton. Returns [`StoreError::NotFound`] if it was never saved.
    fn load_singleton_settings(&self) -> Result<BarcodePrintSettings, StoreError>;

    /// Replace the singleton.
    fn save_singleton_settings(&self, settings: &BarcodePrintSettings) -> Result<(), StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn query_barcodes_by_parents(&self, parents: &[String]) -> Result<Vec<BarcodeRow>, StoreError> {
        (**self).query_barcodes_by_parents(parents)
    }

    fn query_selling_prices(
        &self,
        item_codes: &[String],
        price_list: &str,
    ) -> Result<Vec<PriceRow>, StoreError> {
        (**self).query_selling_prices(item_codes, price_list)
    }

    fn query_standard_rates(
        &self,
        item_codes: &[String],
    ) -> Result<Vec<StandardRateRow>, StoreError> {
        (**self).query_standard_rates(item_codes)
    }

    fn query_enabled_selling_price_lists(&self) -> Result<Vec<String>, StoreError> {
        (**self).query_enabled_selling_price_lists()
    }

    fn query_invoice_lines(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>, StoreError> {
        (**self).query_invoice_lines(invoice_id)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn load_singleton_settings(&self) -> Result<BarcodePrintSettings, StoreError> {
        (**self).load_singleton_settings()
    }

    fn save_singleton_settings(&self, settings: &BarcodePrintSettings) -> Result<(), StoreError> {
        (**self).save_singleton_settings(settings)
    }
}
