//! SQLite-backed record store for the barcode bridge.
//!
//! Tables mirror the host platform's layout (`tabItem`, `tabItem Barcode`,
//! `tabItem Price`, ...) so a database exported from it can be queried
//! directly. Every batch query is a single statement with an `IN (...)`
//! membership predicate over the full key set.

mod error;
mod schema;

pub use error::{SqliteResult, SqliteStoreError};

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use barcode_bridge_core::records::{Item, ItemBarcode, ItemPrice, PriceList, PurchaseInvoiceItem};
use barcode_bridge_core::{
    BarcodeRow, InvoiceLine, PriceRow, RecordStore, SettingsStore, Snapshot, StandardRateRow,
    StoreError,
};
use barcode_bridge_settings::{BarcodePrintSettings, LabelSize};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A [`RecordStore`] and [`SettingsStore`] over one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> SqliteResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening sqlite store");
        Self::from_connection(Connection::open(path)?)
    }

    /// A fresh in-memory database.
    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection. Pragmas and schema are applied (idempotent).
    pub fn from_connection(conn: Connection) -> SqliteResult<Self> {
        schema::configure_connection(&conn)?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get_conn(&self) -> SqliteResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SqliteStoreError::Lock(e.to_string()))
    }

    // ── Writes (fixtures and imports) ───────────────────────────────────

    /// Insert or replace an item.
    pub fn insert_item(&self, item: &Item) -> SqliteResult<()> {
        let conn = self.get_conn()?;
        insert_item(&conn, item)
    }

    /// Insert a barcode row.
    pub fn insert_barcode(&self, barcode: &ItemBarcode) -> SqliteResult<()> {
        let conn = self.get_conn()?;
        insert_barcode(&conn, barcode)
    }

    /// Insert a price row.
    pub fn insert_price(&self, price: &ItemPrice) -> SqliteResult<()> {
        let conn = self.get_conn()?;
        insert_price(&conn, price)
    }

    /// Insert or replace a price list.
    pub fn insert_price_list(&self, list: &PriceList) -> SqliteResult<()> {
        let conn = self.get_conn()?;
        insert_price_list(&conn, list)
    }

    /// Insert a purchase invoice row.
    pub fn insert_invoice_item(&self, row: &PurchaseInvoiceItem) -> SqliteResult<()> {
        let conn = self.get_conn()?;
        insert_invoice_item(&conn, row)
    }

    /// Load every record of a snapshot in one transaction.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> SqliteResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for item in &snapshot.items {
            insert_item(&tx, item)?;
        }
        for barcode in &snapshot.item_barcodes {
            insert_barcode(&tx, barcode)?;
        }
        for price in &snapshot.item_prices {
            insert_price(&tx, price)?;
        }
        for list in &snapshot.price_lists {
            insert_price_list(&tx, list)?;
        }
        for row in &snapshot.purchase_invoice_items {
            insert_invoice_item(&tx, row)?;
        }
        if let Some(settings) = &snapshot.settings {
            write_settings(&tx, settings)?;
        }
        tx.commit()?;
        tracing::info!(
            items = snapshot.items.len(),
            barcodes = snapshot.item_barcodes.len(),
            prices = snapshot.item_prices.len(),
            "imported snapshot"
        );
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    fn barcodes_by_parents(&self, parents: &[String]) -> SqliteResult<Vec<BarcodeRow>> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT parent, barcode, idx FROM "tabItem Barcode"
               WHERE parent IN ({})
               ORDER BY idx ASC"#,
            placeholders(parents.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(parents.iter()), |row| {
                Ok(BarcodeRow {
                    parent: row.get(0)?,
                    barcode: row.get(1)?,
                    idx: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn selling_prices(&self, item_codes: &[String], price_list: &str) -> SqliteResult<Vec<PriceRow>> {
        if item_codes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT item_code, price_list_rate, valid_from FROM "tabItem Price"
               WHERE price_list = ? AND selling = 1 AND item_code IN ({})
               ORDER BY valid_from DESC"#,
            placeholders(item_codes.len())
        );
        let params = std::iter::once(price_list).chain(item_codes.iter().map(String::as_str));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(PriceRow {
                    item_code: row.get(0)?,
                    rate: decimal_at(row, 1)?,
                    valid_from: date_at(row, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn standard_rates(&self, item_codes: &[String]) -> SqliteResult<Vec<StandardRateRow>> {
        if item_codes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT name, standard_rate FROM "tabItem" WHERE name IN ({})"#,
            placeholders(item_codes.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(item_codes.iter()), |row| {
                Ok(StandardRateRow {
                    item_code: row.get(0)?,
                    standard_rate: decimal_at(row, 1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn enabled_selling_price_lists(&self) -> SqliteResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT name FROM "tabPrice List"
               WHERE selling = 1 AND enabled = 1
               ORDER BY name ASC"#,
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn invoice_lines(&self, invoice_id: &str) -> SqliteResult<Vec<InvoiceLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT item_code, item_name, qty FROM "tabPurchase Invoice Item"
               WHERE parent = ?1
               ORDER BY idx ASC"#,
        )?;
        let rows = stmt
            .query_map(params![invoice_id], |row| {
                Ok(InvoiceLine {
                    item_code: row.get(0)?,
                    item_name: row.get(1)?,
                    qty: decimal_at(row, 2)?.unwrap_or(Decimal::ZERO),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn load_settings(&self) -> SqliteResult<BarcodePrintSettings> {
        let conn = self.get_conn()?;
        let head = conn
            .query_row(
                r#"SELECT default_printer, default_price_list
                   FROM "tabBarcode Print Settings" WHERE id = 1"#,
                [],
                |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;
        let Some((default_printer, default_price_list)) = head else {
            return Err(SqliteStoreError::SettingsNotFound);
        };

        let mut stmt = conn.prepare(
            r#"SELECT label_name, is_default, printer_name,
                      label_width, label_height, gap_height, labels_per_row, printable_height,
                      left_margin, middle_gap, right_margin, left_label_x, right_label_x,
                      barcode_width, barcode_height,
                      name_y_position, barcode_y_position, barcode_text_y_position, price_y_position,
                      text_max_chars, print_speed, print_density
               FROM "tabBarcode Label Size"
               ORDER BY idx ASC"#,
        )?;
        let label_sizes = stmt
            .query_map([], label_size_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(BarcodePrintSettings {
            default_printer,
            default_price_list,
            label_sizes,
        })
    }

    fn save_settings(&self, settings: &BarcodePrintSettings) -> SqliteResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        write_settings(&tx, settings)?;
        tx.commit()?;
        Ok(())
    }
}

// ── Trait impls ─────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
    fn query_barcodes_by_parents(&self, parents: &[String]) -> Result<Vec<BarcodeRow>, StoreError> {
        Ok(self.barcodes_by_parents(parents)?)
    }

    fn query_selling_prices(
        &self,
        item_codes: &[String],
        price_list: &str,
    ) -> Result<Vec<PriceRow>, StoreError> {
        Ok(self.selling_prices(item_codes, price_list)?)
    }

    fn query_standard_rates(
        &self,
        item_codes: &[String],
    ) -> Result<Vec<StandardRateRow>, StoreError> {
        Ok(self.standard_rates(item_codes)?)
    }

    fn query_enabled_selling_price_lists(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.enabled_selling_price_lists()?)
    }

    fn query_invoice_lines(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>, StoreError> {
        Ok(self.invoice_lines(invoice_id)?)
    }
}

impl SettingsStore for SqliteStore {
    fn load_singleton_settings(&self) -> Result<BarcodePrintSettings, StoreError> {
        Ok(self.load_settings()?)
    }

    fn save_singleton_settings(&self, settings: &BarcodePrintSettings) -> Result<(), StoreError> {
        Ok(self.save_settings(settings)?)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// `?, ?, ?` for an `IN (...)` list of `n` keys.
fn placeholders(n: usize) -> String {
    std::iter::repeat_n("?", n).collect::<Vec<_>>().join(", ")
}

/// Read a decimal column stored as TEXT, INTEGER, or REAL.
fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let conversion = |e: rust_decimal::Error, ty: Type| {
        rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
    };
    match row.get::<_, Value>(idx)? {
        Value::Null => Ok(None),
        Value::Integer(n) => Ok(Some(Decimal::from(n))),
        Value::Real(f) => Decimal::try_from(f)
            .map(Some)
            .map_err(|e| conversion(e, Type::Real)),
        Value::Text(s) if s.trim().is_empty() => Ok(None),
        Value::Text(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| conversion(e, Type::Text)),
        Value::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".into(),
            Type::Blob,
        )),
    }
}

/// Read an ISO date column. NULL and blank TEXT read as no date.
fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Value>(idx)? {
        Value::Null => Ok(None),
        Value::Text(s) if s.trim().is_empty() => Ok(None),
        // Datetime values carry a time part after the date.
        Value::Text(s) => {
            let s = s.trim();
            let date = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        }
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "date".into(),
            other.data_type(),
        )),
    }
}

fn label_size_from_row(row: &Row<'_>) -> rusqlite::Result<LabelSize> {
    Ok(LabelSize {
        label_name: row.get(0)?,
        is_default: row.get(1)?,
        printer_name: row.get(2)?,
        label_width: row.get(3)?,
        label_height: row.get(4)?,
        gap_height: row.get(5)?,
        labels_per_row: row.get(6)?,
        printable_height: row.get(7)?,
        left_margin: row.get(8)?,
        middle_gap: row.get(9)?,
        right_margin: row.get(10)?,
        left_label_x: row.get(11)?,
        right_label_x: row.get(12)?,
        barcode_width: row.get(13)?,
        barcode_height: row.get(14)?,
        name_y_position: row.get(15)?,
        barcode_y_position: row.get(16)?,
        barcode_text_y_position: row.get(17)?,
        price_y_position: row.get(18)?,
        text_max_chars: row.get(19)?,
        print_speed: row.get(20)?,
        print_density: row.get(21)?,
    })
}

fn insert_item(conn: &Connection, item: &Item) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO "tabItem" (name, item_name, standard_rate)
           VALUES (?1, ?2, ?3)"#,
        params![
            item.item_code,
            item.item_name,
            item.standard_rate.map(|d| d.to_string()),
        ],
    )?;
    Ok(())
}

fn insert_barcode(conn: &Connection, barcode: &ItemBarcode) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT INTO "tabItem Barcode" (parent, barcode, idx) VALUES (?1, ?2, ?3)"#,
        params![barcode.parent, barcode.barcode, barcode.idx],
    )?;
    Ok(())
}

fn insert_price(conn: &Connection, price: &ItemPrice) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT INTO "tabItem Price" (item_code, price_list, selling, price_list_rate, valid_from)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
        params![
            price.item_code,
            price.price_list,
            price.selling,
            price.price_list_rate.map(|d| d.to_string()),
            price.valid_from,
        ],
    )?;
    Ok(())
}

fn insert_price_list(conn: &Connection, list: &PriceList) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO "tabPrice List" (name, selling, enabled) VALUES (?1, ?2, ?3)"#,
        params![list.name, list.selling, list.enabled],
    )?;
    Ok(())
}

fn insert_invoice_item(conn: &Connection, row: &PurchaseInvoiceItem) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT INTO "tabPurchase Invoice Item" (parent, idx, item_code, item_name, qty)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
        params![
            row.parent,
            row.idx,
            row.item_code,
            row.item_name,
            row.qty.to_string(),
        ],
    )?;
    Ok(())
}

/// Replace the settings singleton and all its label sizes.
fn write_settings(conn: &Connection, settings: &BarcodePrintSettings) -> SqliteResult<()> {
    conn.execute(
        r#"INSERT INTO "tabBarcode Print Settings" (id, default_printer, default_price_list)
           VALUES (1, ?1, ?2)
           ON CONFLICT(id) DO UPDATE SET
               default_printer = excluded.default_printer,
               default_price_list = excluded.default_price_list"#,
        params![settings.default_printer, settings.default_price_list],
    )?;
    conn.execute(r#"DELETE FROM "tabBarcode Label Size""#, [])?;

    let mut stmt = conn.prepare(
        r#"INSERT INTO "tabBarcode Label Size" (
               idx, label_name, is_default, printer_name,
               label_width, label_height, gap_height, labels_per_row, printable_height,
               left_margin, middle_gap, right_margin, left_label_x, right_label_x,
               barcode_width, barcode_height,
               name_y_position, barcode_y_position, barcode_text_y_position, price_y_position,
               text_max_chars, print_speed, print_density
           ) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
               ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
           )"#,
    )?;
    for (i, size) in settings.label_sizes.iter().enumerate() {
        stmt.execute(params![
            (i + 1) as i64,
            size.label_name,
            size.is_default,
            size.printer_name,
            size.label_width,
            size.label_height,
            size.gap_height,
            size.labels_per_row,
            size.printable_height,
            size.left_margin,
            size.middle_gap,
            size.right_margin,
            size.left_label_x,
            size.right_label_x,
            size.barcode_width,
            size.barcode_height,
            size.name_y_position,
            size.barcode_y_position,
            size.barcode_text_y_position,
            size.price_y_position,
            size.text_max_chars,
            size.print_speed,
            size.print_density,
        ])?;
    }
    Ok(())
}
