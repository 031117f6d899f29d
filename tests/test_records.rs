//! Record store tests: identity lookup, inserts and the combined write path.

mod common;

use common::{count_rows, date, price, record, setup_sample_db, setup_tracker};
use vinyl_tracker::queries::prices::today;

// ---------------------------------------------------------------------------
// find_id / insert
// ---------------------------------------------------------------------------

#[test]
fn find_id_returns_none_for_unknown_record() {
    let tracker = setup_tracker();
    let id = tracker.records().find_id("Aphex Twin", "Syro").unwrap();
    assert!(id.is_none());
}

#[test]
fn insert_then_find_id_round_trips() {
    let tracker = setup_tracker();
    let store = tracker.records();

    let id = store.insert("Aphex Twin", "Syro").unwrap();
    assert_eq!(store.find_id("Aphex Twin", "Syro").unwrap(), Some(id));
}

#[test]
fn find_id_is_case_sensitive() {
    let tracker = setup_tracker();
    let store = tracker.records();
    store.insert("Aphex Twin", "Syro").unwrap();

    assert!(store.find_id("aphex twin", "Syro").unwrap().is_none());
    assert!(store.find_id("Aphex Twin", "SYRO").unwrap().is_none());
}

#[test]
fn find_id_requires_both_fields_to_match() {
    let tracker = setup_tracker();
    let store = tracker.records();
    store.insert("Bon Iver", "Bon Iver").unwrap();

    assert!(store.find_id("Bon Iver", "22, A Million").unwrap().is_none());
}

#[test]
fn insert_assigns_distinct_ids() {
    let tracker = setup_tracker();
    let store = tracker.records();

    let a = store.insert("Bon Iver", "Bon Iver").unwrap();
    let b = store.insert("Diana Ross", "Diana").unwrap();
    assert_ne!(a, b);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn insert_rejects_duplicate_pair() {
    let tracker = setup_tracker();
    let store = tracker.records();

    store.insert("Bon Iver", "Bon Iver").unwrap();
    assert!(store.insert("Bon Iver", "Bon Iver").is_err());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn get_returns_record_or_none() {
    let tracker = setup_tracker();
    let store = tracker.records();
    let id = store.insert("Diana Ross", "Diana").unwrap();

    let entity = store.get(id).unwrap().unwrap();
    assert_eq!(entity.artist, "Diana Ross");
    assert_eq!(entity.album, "Diana");

    assert!(store.get(id + 100).unwrap().is_none());
}

#[test]
fn list_returns_records_in_insert_order() {
    let tracker = setup_sample_db();
    let records = tracker.records().list().unwrap();

    let albums: Vec<&str> = records.iter().map(|r| r.album.as_str()).collect();
    assert_eq!(
        albums,
        vec!["What Kinda Music", "Lost & Found", "Not Waving, But Drowning"]
    );
}

// ---------------------------------------------------------------------------
// insert_with_price
// ---------------------------------------------------------------------------

#[test]
fn same_day_writes_keep_one_observation_with_latest_price() {
    let tracker = setup_tracker();
    let store = tracker.records();

    let first = store.insert_with_price(&record("Tom Misch", "Geography", "25")).unwrap();
    let second = store.insert_with_price(&record("Tom Misch", "Geography", "27.50")).unwrap();

    assert_eq!(first, second);
    assert_eq!(count_rows(&tracker, "records"), 1);
    assert_eq!(count_rows(&tracker, "prices"), 1);

    let history = tracker.prices().history(first).unwrap().unwrap();
    assert_eq!(history.price_history.len(), 1);
    assert_eq!(history.price_history[0].price, price("27.50"));
    assert_eq!(history.price_history[0].date, today());
}

#[test]
fn different_days_add_observations_to_one_record() {
    let tracker = setup_tracker();
    let store = tracker.records();
    let rec = record("Tom Misch", "Geography", "25");

    let a = store.insert_with_price_on(&rec, date("2022-04-15")).unwrap();
    let b = store.insert_with_price_on(&rec, date("2022-04-16")).unwrap();

    assert_eq!(a, b);
    assert_eq!(count_rows(&tracker, "records"), 1);
    assert_eq!(count_rows(&tracker, "prices"), 2);
}

#[test]
fn insert_with_price_reuses_existing_record() {
    let tracker = setup_tracker();
    let store = tracker.records();

    let id = store.insert("Bon Iver", "Bon Iver").unwrap();
    let written = store.insert_with_price(&record("Bon Iver", "Bon Iver", "20")).unwrap();

    assert_eq!(id, written);
    assert_eq!(count_rows(&tracker, "records"), 1);
}

#[test]
fn failed_price_write_rolls_back_new_record() {
    let tracker = setup_tracker();
    let store = tracker.records();

    // DECIMAL(10, 2) cannot hold this, so the price insert fails after the
    // record insert inside the same transaction.
    let too_big = record("Chaka Khan", "I Feel for You", "123456789012");
    assert!(store.insert_with_price(&too_big).is_err());

    assert!(store.find_id("Chaka Khan", "I Feel for You").unwrap().is_none());
    assert_eq!(count_rows(&tracker, "records"), 0);
    assert_eq!(count_rows(&tracker, "prices"), 0);
}

#[test]
fn ingest_writes_every_record() {
    let tracker = setup_tracker();
    let batch = vec![
        record("Tom Misch", "What Kinda Music", "25"),
        record("Bon Iver", "Bon Iver", "20"),
        record("Diana Ross", "Diana", "10"),
    ];

    let ids = tracker.ingest(&batch).unwrap();
    assert_eq!(ids.len(), 3);

    let latest = tracker.prices().latest().unwrap();
    assert_eq!(latest.len(), 3);
    let diana = latest.iter().find(|r| r.artist == "Diana Ross").unwrap();
    assert_eq!(diana.price, price("10"));
}

#[test]
fn ingest_of_empty_batch_writes_nothing() {
    let tracker = setup_tracker();
    assert!(tracker.ingest(&[]).unwrap().is_empty());
    assert_eq!(count_rows(&tracker, "records"), 0);
}
