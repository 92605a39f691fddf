//! Shared fixtures for integration tests.
#![allow(dead_code)]

use soma_bi::model::Unit;
use soma_bi::store::{Row, SqliteStore};
use soma_bi::value::Value;

pub const RESULT_ID: i64 = 7;

/// Empty in-memory store with the schema in place.
pub fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

/// A building row in `RESULT_ID`.
pub fn building(area: &str, date: &str) -> Row {
    Row::new()
        .with("data_set_result_id", RESULT_ID)
        .with("area_group", area)
        .with("reference_date", date)
}

pub fn insert_all(store: &SqliteStore, unit: Unit, rows: impl IntoIterator<Item = Row>) -> Vec<i64> {
    rows.into_iter()
        .map(|row| store.insert(unit, &row).unwrap())
        .collect()
}

/// Buildings with flood depths 0, 10, 15, 20, 21, 30, 45 and 100, one
/// household member each except depth 45, whose size is NULL.
pub fn seed_depths(store: &SqliteStore) {
    let rows = [0, 10, 15, 20, 21, 30, 45, 100].map(|depth| {
        let size = if depth == 45 { Value::Null } else { Value::Integer(1) };
        building("北区", "2024-04-01")
            .with("depth", depth)
            .with("household_size", size)
    });
    insert_all(store, Unit::Building, rows);
}

/// `n` buildings in `RESULT_ID` plus one row in another result set.
pub fn seed_buildings(store: &SqliteStore, n: usize) -> Vec<i64> {
    let ids = insert_all(
        store,
        Unit::Building,
        (0..n).map(|i| building("北区", "2024-04-01").with("household_size", i as i64)),
    );
    store
        .insert(
            Unit::Building,
            &Row::new()
                .with("data_set_result_id", RESULT_ID + 1)
                .with("area_group", "南区"),
        )
        .unwrap();
    ids
}

/// Column values of every row, in order.
pub fn column(rows: &[Row], name: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}
