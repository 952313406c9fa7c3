mod common;

use std::fs;

use calamine::Reader;
use rust_xlsxwriter::Workbook;
use stock_ledger::{
    core::{LoadOrigin, StockManager},
    errors::LedgerError,
    ledger::{DuplicatePolicy, StockRow},
    storage::{load_rows_from_path, save_rows_to_path, XlsxStorage},
};

use common::{open, setup_test_env, stock_path, triples};

fn seed_rows() -> Vec<StockRow> {
    vec![
        StockRow::new("Brand A", "Flavour 1", 50),
        StockRow::new("Brand B", "Flavour 2", 30),
        StockRow::new("Brand C", "Flavour 3", 20),
    ]
}

#[test]
fn missing_file_is_seeded_and_persisted() {
    let (manager, path) = setup_test_env();
    assert_eq!(manager.origin(), LoadOrigin::Seeded);
    assert!(path.exists(), "seeded stock should be written immediately");
    assert_eq!(manager.ledger().rows(), seed_rows());

    let reopened = open(&path, DuplicatePolicy::Allow);
    assert_eq!(reopened.origin(), LoadOrigin::Loaded);
    assert_eq!(reopened.ledger().rows(), seed_rows());
}

#[test]
fn mutations_round_trip_through_the_file() {
    let (mut manager, path) = setup_test_env();
    manager.add_product("Zest", "Lime, Mint", 0).unwrap();
    manager.update_quantity_at(1, 7).unwrap();
    manager.remove_product_at(0).unwrap();

    let reopened = open(&path, DuplicatePolicy::Allow);
    assert_eq!(triples(&reopened), triples(&manager));
    assert_eq!(
        reopened.ledger().rows(),
        vec![
            StockRow::new("Brand B", "Flavour 2", 7),
            StockRow::new("Brand C", "Flavour 3", 20),
            StockRow::new("Zest", "Lime, Mint", 0),
        ]
    );
}

#[test]
fn padded_names_survive_a_reload_unchanged() {
    let (mut manager, path) = setup_test_env();
    manager.add_product("Brand A ", " Mint", 1).unwrap();
    manager.add_product("  Brand E", "Ice  ", 2).unwrap();

    let reopened = open(&path, DuplicatePolicy::Allow);
    assert_eq!(triples(&reopened), triples(&manager));
    assert_eq!(
        reopened.ledger().rows()[3..],
        [
            StockRow::new("Brand A", "Mint", 1),
            StockRow::new("Brand E", "Ice", 2),
        ]
    );
}

#[test]
fn blank_name_cell_fails_the_load() {
    let path = stock_path();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Brand").unwrap();
    sheet.write_string(0, 1, "Flavour").unwrap();
    sheet.write_string(0, 2, "Estimated Quantity").unwrap();
    sheet.write_string(1, 0, "Brand A").unwrap();
    sheet.write_number(1, 2, 5.0).unwrap();
    workbook.save(&path).unwrap();

    match load_rows_from_path(&path) {
        Err(LedgerError::MalformedSheet(message)) => {
            assert!(message.contains("row 2"), "{message}");
            assert!(message.contains("Flavour"), "{message}");
        }
        other => panic!("expected MalformedSheet, got {other:?}"),
    }
}

#[test]
fn written_sheet_has_exactly_the_three_headers() {
    let path = stock_path();
    save_rows_to_path(&seed_rows(), &path).unwrap();

    let mut workbook: calamine::Xlsx<_> = calamine::open_workbook(&path).unwrap();
    let names = workbook.sheet_names();
    assert_eq!(names, ["Stock"]);
    let range = workbook.worksheet_range("Stock").unwrap();
    assert_eq!(range.get_size(), (4, 3));
    let header: Vec<String> = range
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    assert_eq!(header, ["Brand", "Flavour", "Estimated Quantity"]);
}

#[test]
fn hand_edited_sheet_with_reordered_columns_loads() {
    let path = stock_path();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Estimated Quantity").unwrap();
    sheet.write_string(0, 1, "Notes").unwrap();
    sheet.write_string(0, 2, "Flavour").unwrap();
    sheet.write_string(0, 3, "Brand").unwrap();
    sheet.write_number(1, 0, 4.0).unwrap();
    sheet.write_string(1, 1, "back shelf").unwrap();
    sheet.write_string(1, 2, "Grape").unwrap();
    sheet.write_string(1, 3, "Brand Q").unwrap();
    sheet.write_string(3, 0, "12").unwrap();
    sheet.write_string(3, 2, "Melon").unwrap();
    sheet.write_string(3, 3, "Brand R").unwrap();
    workbook.save(&path).unwrap();

    let rows = load_rows_from_path(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            StockRow::new("Brand Q", "Grape", 4),
            StockRow::new("Brand R", "Melon", 12),
        ]
    );
}

#[test]
fn malformed_quantity_fails_the_load_without_reseeding() {
    let path = stock_path();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Brand").unwrap();
    sheet.write_string(0, 1, "Flavour").unwrap();
    sheet.write_string(0, 2, "Estimated Quantity").unwrap();
    sheet.write_string(1, 0, "Brand A").unwrap();
    sheet.write_string(1, 1, "Flavour 1").unwrap();
    sheet.write_number(1, 2, -3.0).unwrap();
    workbook.save(&path).unwrap();
    let before = fs::read(&path).unwrap();

    let result = StockManager::open(
        Box::new(XlsxStorage::new(path.clone())),
        DuplicatePolicy::Allow,
    );
    match result {
        Err(LedgerError::MalformedSheet(message)) => assert!(message.contains("row 2")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("negative quantity must not load"),
    }
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn missing_column_is_reported() {
    let path = stock_path();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Brand").unwrap();
    sheet.write_string(0, 1, "Quantity").unwrap();
    workbook.save(&path).unwrap();

    let err = load_rows_from_path(&path).expect_err("missing Flavour column");
    assert!(err.to_string().contains("Flavour"), "{err}");
}

#[test]
fn garbage_file_is_a_load_error() {
    let path = stock_path();
    fs::write(&path, b"not a workbook").unwrap();
    let err = load_rows_from_path(&path).expect_err("garbage");
    assert!(matches!(err, LedgerError::SheetRead(_)), "{err:?}");
}

#[test]
fn failed_save_keeps_file_and_memory_consistent() {
    let (mut manager, path) = setup_test_env();
    let original = fs::read(&path).unwrap();
    let before = triples(&manager);

    // A directory squatting on the temp file name makes the staged write fail.
    let tmp = path.with_extension("xlsx.tmp");
    fs::create_dir_all(&tmp).unwrap();

    let err = manager
        .add_product("Brand D", "Flavour 4", 1)
        .expect_err("staged write should fail");
    assert!(matches!(err, LedgerError::Persistence(_)), "{err:?}");
    assert!(manager.update_quantity_at(0, 1).is_err());
    assert!(manager.remove_product_at(0).is_err());

    assert_eq!(triples(&manager), before);
    assert_eq!(fs::read(&path).unwrap(), original);

    fs::remove_dir(&tmp).unwrap();
    manager.add_product("Brand D", "Flavour 4", 1).unwrap();
    let reopened = open(&path, DuplicatePolicy::Allow);
    assert_eq!(reopened.ledger().len(), 4);
}
