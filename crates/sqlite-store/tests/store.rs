//! End-to-end tests of the SQLite store through the query surface.

use barcode_bridge_core::records::{Item, ItemBarcode, ItemPrice, PriceList, PurchaseInvoiceItem};
use barcode_bridge_core::{
    BarcodeApi, BarcodePrintSettings, InstallOutcome, ItemCodes, RecordStore, ResolverConfig,
    SettingsStore, Snapshot, StoreError,
};
use barcode_bridge_sqlite::SqliteStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn price(code: &str, list: &str, rate: i64, valid_from: Option<&str>) -> ItemPrice {
    ItemPrice {
        item_code: code.into(),
        price_list: list.into(),
        selling: true,
        price_list_rate: Some(Decimal::from(rate)),
        valid_from: valid_from.and_then(date),
    }
}

fn shop_snapshot() -> Snapshot {
    Snapshot {
        items: vec![
            Item {
                item_code: "PEN".into(),
                item_name: Some("Blue pen".into()),
                standard_rate: Some(Decimal::new(1550, 2)),
            },
            Item {
                item_code: "INK".into(),
                item_name: None,
                standard_rate: Some(Decimal::from(40)),
            },
            Item {
                item_code: "CLIP".into(),
                item_name: Some("Paper clip".into()),
                standard_rate: None,
            },
        ],
        item_barcodes: vec![
            ItemBarcode {
                parent: "PEN".into(),
                barcode: "200".into(),
                idx: 2,
            },
            ItemBarcode {
                parent: "PEN".into(),
                barcode: "100".into(),
                idx: 1,
            },
            ItemBarcode {
                parent: "INK".into(),
                barcode: "300".into(),
                idx: 1,
            },
        ],
        item_prices: vec![
            price("PEN", "Standard Selling", 10, Some("2024-01-01")),
            price("PEN", "Standard Selling", 12, Some("2024-06-01")),
            price("PEN", "Standard Selling", 99, None),
            price("PEN", "Wholesale", 8, Some("2024-01-01")),
            ItemPrice {
                selling: false,
                ..price("INK", "Standard Selling", 5, Some("2024-01-01"))
            },
        ],
        price_lists: vec![
            PriceList {
                name: "Wholesale".into(),
                selling: true,
                enabled: true,
            },
            PriceList {
                name: "Standard Selling".into(),
                selling: true,
                enabled: true,
            },
            PriceList {
                name: "Standard Buying".into(),
                selling: false,
                enabled: true,
            },
            PriceList {
                name: "Old".into(),
                selling: true,
                enabled: false,
            },
        ],
        purchase_invoice_items: vec![
            PurchaseInvoiceItem {
                parent: "PINV-0001".into(),
                idx: 2,
                item_code: "INK".into(),
                item_name: None,
                qty: Decimal::from(3),
            },
            PurchaseInvoiceItem {
                parent: "PINV-0001".into(),
                idx: 1,
                item_code: "PEN".into(),
                item_name: Some("Blue pen".into()),
                qty: Decimal::new(25, 1),
            },
        ],
        settings: None,
    }
}

fn shop() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.import_snapshot(&shop_snapshot()).unwrap();
    store
}

#[test]
fn barcodes_come_back_in_idx_order() {
    let store = shop();
    let rows = store
        .query_barcodes_by_parents(&["PEN".into(), "INK".into()])
        .unwrap();
    let pen: Vec<_> = rows
        .iter()
        .filter(|r| r.parent == "PEN")
        .map(|r| r.barcode.as_str())
        .collect();
    assert_eq!(pen, ["100", "200"]);
}

#[test]
fn selling_prices_filter_list_and_selling_flag() {
    let store = shop();
    let rows = store
        .query_selling_prices(&["PEN".into(), "INK".into()], "Standard Selling")
        .unwrap();
    assert!(rows.iter().all(|r| r.item_code == "PEN"));
    assert_eq!(rows.len(), 3);
    // newest first, undated last
    assert_eq!(rows[0].rate, Some(Decimal::from(12)));
    assert_eq!(rows[2].valid_from, None);
}

#[test]
fn price_lists_are_enabled_selling_only() {
    let store = shop();
    assert_eq!(
        store.query_enabled_selling_price_lists().unwrap(),
        ["Standard Selling", "Wholesale"]
    );
}

#[test]
fn item_details_resolve_through_api() {
    let api = BarcodeApi::new(shop(), ResolverConfig::default());
    let codes = ItemCodes::from(vec!["PEN".to_string(), "INK".into(), "CLIP".into()]);
    let details = api.get_item_details(&codes, None).unwrap();

    assert_eq!(details["PEN"].barcode, "100");
    assert_eq!(details["PEN"].price, Decimal::from(12));
    // non-selling row ignored, standard rate used
    assert_eq!(details["INK"].price, Decimal::from(40));
    assert_eq!(details["CLIP"].barcode, "CLIP");
    assert_eq!(details["CLIP"].price, Decimal::ZERO);

    let wholesale = api.get_item_details(&codes, Some("Wholesale")).unwrap();
    assert_eq!(wholesale["PEN"].price, Decimal::from(8));
    assert_eq!(wholesale["INK"].price, Decimal::from(40));
}

#[test]
fn invoice_items_follow_line_order() {
    let api = BarcodeApi::new(shop(), ResolverConfig::default());
    let items = api.get_purchase_invoice_items("PINV-0001", None).unwrap();

    let codes: Vec<_> = items.iter().map(|i| i.item_code.as_str()).collect();
    assert_eq!(codes, ["PEN", "INK"]);
    assert_eq!(items[0].qty, Decimal::new(25, 1));
    assert_eq!(items[0].rate, Decimal::from(12));
    assert_eq!(items[1].item_name, "INK");
    assert_eq!(items[1].barcode, "300");
}

#[test]
fn unknown_invoice_is_not_found() {
    let api = BarcodeApi::new(shop(), ResolverConfig::default());
    let err = api.get_purchase_invoice_items("PINV-9999", None).unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[test]
fn settings_missing_until_installed() {
    let store = shop();
    let err = store.load_singleton_settings().unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    let api = BarcodeApi::new(store, ResolverConfig::default());
    assert_eq!(api.install_default_settings().unwrap(), InstallOutcome::Seeded);
    assert_eq!(
        api.install_default_settings().unwrap(),
        InstallOutcome::AlreadyConfigured
    );

    let stored = api.store().load_singleton_settings().unwrap();
    assert_eq!(stored.label_sizes.len(), 1);
    assert_eq!(stored.label_sizes[0].label_name, "35x15mm 2-up");
    assert!(stored.label_sizes[0].is_default);
    assert_eq!(
        api.get_barcode_print_settings(),
        barcode_bridge_core::fallback_settings()
    );
}

#[test]
fn settings_save_replaces_label_sizes() {
    let store = SqliteStore::open_in_memory().unwrap();
    let json = r#"{
        "default_printer": "Zebra",
        "default_price_list": "Wholesale",
        "label_sizes": [
            {"label_name": "50x25", "is_default": 0, "label_width": 50, "print_speed": 4},
            {"label_name": "38x25", "is_default": 1, "labels_per_row": 1}
        ]
    }"#;
    let settings: BarcodePrintSettings = serde_json::from_str(json).unwrap();
    store.save_singleton_settings(&settings).unwrap();
    assert_eq!(store.load_singleton_settings().unwrap(), settings);

    let trimmed = BarcodePrintSettings {
        label_sizes: settings.label_sizes[1..].to_vec(),
        ..settings.clone()
    };
    store.save_singleton_settings(&trimmed).unwrap();
    let loaded = store.load_singleton_settings().unwrap();
    assert_eq!(loaded.label_sizes.len(), 1);
    assert_eq!(loaded.label_sizes[0].label_name, "38x25");
}

#[test]
fn stored_default_price_list_drives_details() {
    let store = shop();
    store
        .save_singleton_settings(&BarcodePrintSettings {
            default_price_list: Some("Wholesale".into()),
            ..BarcodePrintSettings::default()
        })
        .unwrap();
    let api = BarcodeApi::new(store, ResolverConfig::default());
    let details = api.get_item_details(&ItemCodes::from("PEN"), None).unwrap();
    assert_eq!(details["PEN"].price, Decimal::from(8));
}

#[test]
fn database_file_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.sqlite");
    {
        let store = SqliteStore::open(&path).unwrap();
        store.import_snapshot(&shop_snapshot()).unwrap();
    }
    let reopened = SqliteStore::open(&path).unwrap();
    let rows = reopened.query_standard_rates(&["PEN".into()]).unwrap();
    assert_eq!(rows[0].standard_rate, Some(Decimal::new(1550, 2)));
}

/// A file-backed store plus a second raw connection for writing rows the
/// typed inserts would never produce.
fn store_with_raw_access() -> (tempfile::TempDir, SqliteStore, rusqlite::Connection) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.sqlite");
    let store = SqliteStore::open(&path).unwrap();
    let raw = rusqlite::Connection::open(&path).unwrap();
    (dir, store, raw)
}

#[test]
fn single_row_inserts() {
    let store = SqliteStore::open_in_memory().unwrap();
    let snap = shop_snapshot();
    for item in &snap.items {
        store.insert_item(item).unwrap();
    }
    for barcode in &snap.item_barcodes {
        store.insert_barcode(barcode).unwrap();
    }
    for price in &snap.item_prices {
        store.insert_price(price).unwrap();
    }
    for list in &snap.price_lists {
        store.insert_price_list(list).unwrap();
    }
    for row in &snap.purchase_invoice_items {
        store.insert_invoice_item(row).unwrap();
    }

    let api = BarcodeApi::new(store, ResolverConfig::default());
    let items = api.get_purchase_invoice_items("PINV-0001", None).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].barcode, "100");
    assert_eq!(items[0].rate, Decimal::from(12));
}

#[test]
fn blank_valid_from_counts_as_undated() {
    let (_dir, store, raw) = store_with_raw_access();
    raw.execute_batch(
        r#"INSERT INTO "tabItem" (name, standard_rate) VALUES ('A', '5'), ('B', '7');
           INSERT INTO "tabItem Price" (item_code, price_list, selling, price_list_rate, valid_from)
           VALUES ('A', 'Standard Selling', 1, '9', '');"#,
    )
    .unwrap();

    let api = BarcodeApi::new(store, ResolverConfig::default());
    let codes = ItemCodes::from(vec!["A".to_string(), "B".into()]);
    let details = api.get_item_details(&codes, None).unwrap();
    assert_eq!(details["A"].price, Decimal::from(9));
    assert_eq!(details["B"].price, Decimal::from(7));
}

#[test]
fn negative_stored_offset_keeps_configured_settings() {
    let (_dir, store, raw) = store_with_raw_access();
    raw.execute_batch(
        r#"INSERT INTO "tabBarcode Print Settings" (id, default_printer, default_price_list)
           VALUES (1, 'Shop', 'Retail');
           INSERT INTO "tabBarcode Label Size" (idx, label_name, is_default, left_margin)
           VALUES (1, '38x25', 1, -2);"#,
    )
    .unwrap();

    let api = BarcodeApi::new(store, ResolverConfig::default());
    let settings = api.get_barcode_print_settings();
    assert_eq!(settings.default_printer, "Shop");
    assert_eq!(settings.default_label_size, "38x25");
    assert_eq!(settings.label_sizes[0].left_margin, -2);
    assert_eq!(settings.label_sizes[0].middle_gap, 16);
}
