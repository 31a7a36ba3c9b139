use crate::db::properties::upsert_properties;
use crate::domain::{OwnerOccupied, PropertyRecord};
use crate::errors::PipelineError;
use crate::load::{load_properties, IdentityStore, PersistenceSink};
use crate::tests::utils::{make_db, make_table};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashSet;

struct MemoryStore(HashSet<String>);

impl MemoryStore {
    fn with_keys(keys: &[&str]) -> Self {
        MemoryStore(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl IdentityStore for MemoryStore {
    fn existing_keys(&self) -> Result<HashSet<String>, PipelineError> {
        Ok(self.0.clone())
    }
}

/// Records every batch it is handed; never conflicts.
struct MemorySink {
    batches: RefCell<Vec<Vec<PropertyRecord>>>,
}

impl MemorySink {
    fn new() -> Self {
        MemorySink {
            batches: RefCell::new(Vec::new()),
        }
    }
}

impl PersistenceSink for MemorySink {
    fn upsert_batch(&self, records: &[PropertyRecord]) -> Result<(), PipelineError> {
        self.batches.borrow_mut().push(records.to_vec());
        Ok(())
    }
}

fn listing_row(id: &str, bedrooms: Value, owner_occupied: Value) -> Vec<Value> {
    vec![json!(id), json!("Austin"), bedrooms, owner_occupied]
}

fn listing_table(rows: Vec<Vec<Value>>) -> crate::table::DataTable {
    make_table(&["property_id", "city", "bedrooms", "owner_occupied"], rows)
}

#[test]
fn no_op_when_every_key_is_already_known() {
    let table = listing_table(vec![
        listing_row("P1", json!("3"), json!("1")),
        listing_row("P2", json!("2"), json!("0")),
    ]);
    let store = MemoryStore::with_keys(&["P1", "P2"]);
    let sink = MemorySink::new();

    let report = load_properties(&table, &store, &sink).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.existing, 2);
    assert_eq!(report.loaded, 0);

    // Zero writes: the upsert is never attempted, not even for known rows.
    assert!(sink.batches.borrow().is_empty());
}

#[test]
fn loads_only_the_new_partition() {
    let table = listing_table(vec![
        listing_row("P1", json!("3"), json!("1")),
        listing_row("P2", Value::Null, json!("maybe")),
        listing_row("P3", json!(4), json!(false)),
    ]);
    let store = MemoryStore::with_keys(&["P2"]);
    let sink = MemorySink::new();

    let report = load_properties(&table, &store, &sink).unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.existing, 1);
    assert_eq!(report.loaded, 2);

    let batches = sink.batches.borrow();
    assert_eq!(batches.len(), 1);
    let ids: Vec<&str> = batches[0].iter().map(|r| r.property_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P3"]);

    // Typing happened on the way through.
    assert_eq!(batches[0][0].bedrooms, Some(3.0));
    assert_eq!(batches[0][0].owner_occupied, OwnerOccupied::Yes);
    assert_eq!(batches[0][1].bedrooms, Some(4.0));
    assert_eq!(batches[0][1].owner_occupied, OwnerOccupied::No);
}

#[test]
fn unrecognized_boolean_loads_as_unknown() {
    let table = listing_table(vec![listing_row("P9", Value::Null, json!("maybe"))]);
    let sink = MemorySink::new();

    load_properties(&table, &MemoryStore::with_keys(&[]), &sink).unwrap();
    let batches = sink.batches.borrow();
    assert_eq!(batches[0][0].owner_occupied, OwnerOccupied::Unknown);
    assert_eq!(batches[0][0].bedrooms, None);
}

#[test]
fn malformed_numeric_aborts_the_whole_batch() {
    let table = listing_table(vec![
        listing_row("P1", json!("3"), json!("1")),
        listing_row("P2", json!("abc"), json!("0")),
    ]);
    let store = MemoryStore::with_keys(&[]);
    let sink = MemorySink::new();

    let err = load_properties(&table, &store, &sink).unwrap_err();
    assert!(matches!(err, PipelineError::Coercion { .. }));

    // No partial-batch recovery: the good row was not written either.
    assert!(sink.batches.borrow().is_empty());
}

#[test]
fn table_without_property_id_column_is_fatal() {
    let table = make_table(&["city"], vec![vec![json!("Austin")]]);
    let err = load_properties(&table, &MemoryStore::with_keys(&[]), &MemorySink::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}

#[test]
fn sqlite_load_twice_never_duplicates_rows() {
    let db = make_db("load_twice");
    let table = listing_table(vec![
        listing_row("P1", json!("3"), json!("1")),
        listing_row("P2", json!("2"), Value::Null),
    ]);

    let first = load_properties(&table, &db, &db).unwrap();
    assert_eq!(first.loaded, 2);

    // Second run takes a fresh key snapshot that now contains both ids.
    let second = load_properties(&table, &db, &db).unwrap();
    assert_eq!(second.loaded, 0);
    assert_eq!(second.existing, 2);

    let count: i64 = db
        .with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))
                .map_err(Into::into)
        })
        .unwrap();
    assert_eq!(count, 2);
}

fn sample_record(id: &str, bedrooms: Option<f64>) -> PropertyRecord {
    PropertyRecord {
        property_id: id.to_string(),
        full_address: Some("123 Main St, Austin, TX 78701".into()),
        address_line1: Some("123 Main St".into()),
        address_line2: None,
        city: Some("Austin".into()),
        state: Some("TX".into()),
        state_fips: None,
        zip_code: Some("78701".into()),
        county: None,
        county_fips: None,
        latitude: Some(30.2672),
        longitude: Some(-97.7431),
        property_type: Some("Single Family".into()),
        bedrooms,
        bathrooms: Some(2.0),
        square_footage: Some(1800.0),
        year_built: Some(1995.0),
        features: None,
        tax_assessments: None,
        property_taxes: None,
        lot_size: None,
        assessor_id: None,
        legal_description: None,
        subdivision: None,
        owner: None,
        owner_occupied: OwnerOccupied::Unknown,
    }
}

#[test]
fn sqlite_upsert_overwrites_fields_but_preserves_created_at() {
    let db = make_db("upsert_conflict");

    upsert_properties(&db, &[sample_record("P1", Some(3.0))]).unwrap();
    let (created_first, updated_first): (String, String) = db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT created_at, updated_at FROM properties WHERE property_id = 'P1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(Into::into)
        })
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(10));

    // Same key again: conflict path must replace mutable columns and
    // refresh updated_at only.
    upsert_properties(&db, &[sample_record("P1", Some(4.0))]).unwrap();

    let (count, bedrooms, created_second, updated_second): (i64, f64, String, String) = db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*), bedrooms, created_at, updated_at FROM properties",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .map_err(Into::into)
        })
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(bedrooms, 4.0);
    assert_eq!(created_second, created_first);
    assert_ne!(updated_second, updated_first);
}

#[test]
fn sqlite_unknown_owner_occupied_is_stored_as_null() {
    let db = make_db("tri_state");
    upsert_properties(&db, &[sample_record("P1", None)]).unwrap();

    let stored: Option<bool> = db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT owner_occupied FROM properties WHERE property_id = 'P1'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
        .unwrap();
    assert_eq!(stored, None);
}
