//! Table layout, named after the host platform's tables.

use std::time::Duration;

use rusqlite::Connection;

/// How long a statement waits on a locked database before failing.
pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "tabItem" (
  name TEXT PRIMARY KEY,
  item_name TEXT,
  standard_rate TEXT
);

CREATE TABLE IF NOT EXISTS "tabItem Barcode" (
  parent TEXT NOT NULL,
  barcode TEXT NOT NULL,
  idx INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_item_barcode_parent
  ON "tabItem Barcode"(parent, idx);

CREATE TABLE IF NOT EXISTS "tabItem Price" (
  item_code TEXT NOT NULL,
  price_list TEXT NOT NULL,
  selling INTEGER NOT NULL DEFAULT 0,
  price_list_rate TEXT,
  valid_from TEXT
);
CREATE INDEX IF NOT EXISTS idx_item_price_lookup
  ON "tabItem Price"(price_list, item_code);

CREATE TABLE IF NOT EXISTS "tabPrice List" (
  name TEXT PRIMARY KEY,
  selling INTEGER NOT NULL DEFAULT 0,
  enabled INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS "tabPurchase Invoice Item" (
  parent TEXT NOT NULL,
  idx INTEGER NOT NULL DEFAULT 0,
  item_code TEXT NOT NULL,
  item_name TEXT,
  qty TEXT NOT NULL DEFAULT '0'
);
CREATE INDEX IF NOT EXISTS idx_purchase_invoice_item_parent
  ON "tabPurchase Invoice Item"(parent, idx);

CREATE TABLE IF NOT EXISTS "tabBarcode Print Settings" (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  default_printer TEXT,
  default_price_list TEXT
);

CREATE TABLE IF NOT EXISTS "tabBarcode Label Size" (
  idx INTEGER NOT NULL,
  label_name TEXT NOT NULL,
  is_default INTEGER NOT NULL DEFAULT 0,
  printer_name TEXT,
  label_width REAL,
  label_height REAL,
  gap_height REAL,
  labels_per_row INTEGER,
  printable_height REAL,
  left_margin INTEGER,
  middle_gap INTEGER,
  right_margin INTEGER,
  left_label_x INTEGER,
  right_label_x INTEGER,
  barcode_width INTEGER,
  barcode_height INTEGER,
  name_y_position INTEGER,
  barcode_y_position INTEGER,
  barcode_text_y_position INTEGER,
  price_y_position INTEGER,
  text_max_chars INTEGER,
  print_speed INTEGER,
  print_density INTEGER
);
"#;

/// Create any missing tables and indexes. Idempotent.
pub(crate) fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Connection pragmas applied on open.
pub(crate) fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)
}
