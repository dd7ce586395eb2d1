//! JournalStore interface tests.
//!
//! These tests verify the contract of the JournalStore trait.
//! Each storage implementation should run these tests.

use uuid::Uuid;

use chronicle::model::{EventRecord, PersistentRepr, StreamAddress};
use chronicle::storage::JournalStore;
use chronicle::JournalError;

/// Unique persistence id so tests sharing a database never collide.
pub fn make_pid(prefix: &str) -> String {
    format!("test_{}_{}", prefix, Uuid::new_v4().simple())
}

/// Create a test record with given sequence number.
pub fn make_record(pid: &str, seq: u64) -> EventRecord {
    let repr = PersistentRepr::new(pid, seq, vec![1, 2, 3, seq as u8])
        .with_manifest(format!("test.Event{}", seq))
        .with_writer_uuid("writer-test");
    EventRecord::from_repr(repr, 1_700_000_000_000)
}

/// Create records for the given sequence numbers.
pub fn make_records(pid: &str, seqs: &[u64]) -> Vec<EventRecord> {
    seqs.iter().map(|seq| make_record(pid, *seq)).collect()
}

async fn append<S: JournalStore>(store: &S, pid: &str, seqs: &[u64]) {
    store
        .append_to_stream(StreamAddress::for_persistence_id(pid), make_records(pid, seqs))
        .await
        .expect("append should succeed");
}

fn seqs(records: &[EventRecord]) -> Vec<u64> {
    records.iter().map(|r| r.sequence_nr).collect()
}

// =============================================================================
// JournalStore::append_to_stream tests
// =============================================================================

pub async fn test_append_single_record<S: JournalStore>(store: &S) {
    let pid = make_pid("append_single");
    append(store, &pid, &[1]).await;

    let records = store
        .query_events(&pid, 1, u64::MAX, u64::MAX, false)
        .await
        .expect("query should succeed");
    assert_eq!(records.len(), 1, "should have 1 record");
    assert_eq!(records[0].id, format!("{}_1", pid));
}

pub async fn test_append_empty_records<S: JournalStore>(store: &S) {
    let pid = make_pid("append_empty");

    store
        .append_to_stream(StreamAddress::for_persistence_id(&pid), vec![])
        .await
        .expect("empty append should succeed");

    let meta = store
        .query_metadata(&pid)
        .await
        .expect("metadata query should succeed");
    assert!(meta.is_none(), "empty append should not create metadata");
}

pub async fn test_append_updates_metadata<S: JournalStore>(store: &S) {
    let pid = make_pid("append_meta");
    append(store, &pid, &[1, 2, 3]).await;

    let meta = store
        .query_metadata(&pid)
        .await
        .expect("metadata query should succeed")
        .expect("metadata should exist");
    assert_eq!(meta.persistence_id, pid);
    assert_eq!(meta.highest_sequence_nr, 3);
    assert_eq!(meta.stream, StreamAddress::for_persistence_id(&pid));
}

pub async fn test_append_sequential_batches<S: JournalStore>(store: &S) {
    let pid = make_pid("append_sequential");
    append(store, &pid, &[1, 2]).await;
    append(store, &pid, &[3, 5, 8]).await;

    let records = store
        .query_events(&pid, 1, u64::MAX, u64::MAX, false)
        .await
        .expect("query should succeed");
    assert_eq!(seqs(&records), vec![1, 2, 3, 5, 8]);

    let meta = store.query_metadata(&pid).await.unwrap().unwrap();
    assert_eq!(meta.highest_sequence_nr, 8);
}

pub async fn test_append_never_lowers_highest<S: JournalStore>(store: &S) {
    let pid = make_pid("append_lower");
    append(store, &pid, &[10]).await;
    append(store, &pid, &[4]).await;

    let meta = store.query_metadata(&pid).await.unwrap().unwrap();
    assert_eq!(meta.highest_sequence_nr, 10, "highest should never decrease");
}

pub async fn test_append_duplicate_fails_atomically<S: JournalStore>(store: &S) {
    let pid = make_pid("append_duplicate");
    append(store, &pid, &[1, 2]).await;

    // 3 is new but 2 already exists, so nothing from this batch lands
    let result = store
        .append_to_stream(
            StreamAddress::for_persistence_id(&pid),
            make_records(&pid, &[3, 2]),
        )
        .await;
    assert!(
        matches!(result, Err(JournalError::IntegrityViolation(_))),
        "duplicate record id should be an integrity violation, got {:?}",
        result
    );

    let records = store
        .query_events(&pid, 1, u64::MAX, u64::MAX, false)
        .await
        .unwrap();
    assert_eq!(seqs(&records), vec![1, 2]);
    let meta = store.query_metadata(&pid).await.unwrap().unwrap();
    assert_eq!(meta.highest_sequence_nr, 2);
}

pub async fn test_append_preserves_record_data<S: JournalStore>(store: &S) {
    let pid = make_pid("append_data");
    let payload: Vec<u8> = (0..=255).collect();
    let record = EventRecord::from_repr(
        PersistentRepr::new(&pid, 7, payload.clone())
            .with_manifest("orders.ItemAdded/v2")
            .with_writer_uuid("writer-42")
            .with_timestamp(1_234_567),
        0,
    );
    store
        .append_to_stream(StreamAddress::for_persistence_id(&pid), vec![record.clone()])
        .await
        .expect("append should succeed");

    let records = store.query_events(&pid, 7, 7, 1, false).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], record, "record should round-trip unchanged");
}

// =============================================================================
// JournalStore::query_events tests
// =============================================================================

pub async fn test_query_events_bounds_and_limit<S: JournalStore>(store: &S) {
    let pid = make_pid("query_bounds");
    append(store, &pid, &[1, 2, 3, 5, 8]).await;

    let records = store.query_events(&pid, 2, 8, 3, true).await.unwrap();
    assert_eq!(seqs(&records), vec![2, 3, 5]);

    let records = store.query_events(&pid, 4, 7, 10, true).await.unwrap();
    assert_eq!(seqs(&records), vec![5]);
}

pub async fn test_query_events_empty_cases<S: JournalStore>(store: &S) {
    let pid = make_pid("query_empty");
    append(store, &pid, &[1, 2, 3]).await;

    assert!(store
        .query_events(&pid, 1, 3, 0, true)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .query_events(&pid, 3, 1, 10, true)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .query_events("test_nobody", 1, u64::MAX, u64::MAX, true)
        .await
        .unwrap()
        .is_empty());
}

pub async fn test_query_events_isolates_entities<S: JournalStore>(store: &S) {
    let pid_a = make_pid("query_iso_a");
    let pid_b = make_pid("query_iso_b");
    append(store, &pid_a, &[1, 2]).await;
    append(store, &pid_b, &[1, 2, 3]).await;

    let records = store
        .query_events(&pid_a, 1, u64::MAX, u64::MAX, true)
        .await
        .unwrap();
    assert_eq!(seqs(&records), vec![1, 2]);
    assert!(records.iter().all(|r| r.persistence_id == pid_a));
}

// =============================================================================
// JournalStore::mark_deleted tests
// =============================================================================

pub async fn test_mark_deleted_hides_from_filtered_query<S: JournalStore>(store: &S) {
    let pid = make_pid("delete_filter");
    append(store, &pid, &[1, 2, 3, 5, 8]).await;

    let changed = store.mark_deleted(&pid, 3).await.unwrap();
    assert_eq!(changed, 3);

    let visible = store
        .query_events(&pid, 1, u64::MAX, u64::MAX, true)
        .await
        .unwrap();
    assert_eq!(seqs(&visible), vec![5, 8]);

    let all = store
        .query_events(&pid, 1, u64::MAX, u64::MAX, false)
        .await
        .unwrap();
    assert_eq!(all.len(), 5, "deleted records are retained");
    assert!(all.iter().filter(|r| r.sequence_nr <= 3).all(|r| r.is_deleted));
}

pub async fn test_mark_deleted_idempotent<S: JournalStore>(store: &S) {
    let pid = make_pid("delete_idem");
    append(store, &pid, &[1, 2, 3]).await;

    assert_eq!(store.mark_deleted(&pid, 2).await.unwrap(), 2);
    assert_eq!(store.mark_deleted(&pid, 2).await.unwrap(), 0);
    assert_eq!(store.mark_deleted(&pid, 1).await.unwrap(), 0);
}

pub async fn test_mark_deleted_scoped_to_entity<S: JournalStore>(store: &S) {
    let pid_a = make_pid("delete_scope_a");
    let pid_b = make_pid("delete_scope_b");
    append(store, &pid_a, &[1, 2, 3]).await;
    append(store, &pid_b, &[1, 2, 3]).await;

    store.mark_deleted(&pid_a, u64::MAX).await.unwrap();

    let other = store
        .query_events(&pid_b, 1, u64::MAX, u64::MAX, true)
        .await
        .unwrap();
    assert_eq!(seqs(&other), vec![1, 2, 3]);

    let meta = store.query_metadata(&pid_a).await.unwrap().unwrap();
    assert_eq!(meta.highest_sequence_nr, 3, "deletion keeps metadata");
}

pub async fn test_mark_deleted_unknown_entity<S: JournalStore>(store: &S) {
    let pid = make_pid("delete_unknown");
    assert_eq!(store.mark_deleted(&pid, 10).await.unwrap(), 0);
}

// =============================================================================
// JournalStore::read_stream tests
// =============================================================================

pub async fn test_read_stream_in_append_order<S: JournalStore>(store: &S) {
    let pid = make_pid("read_stream");
    let stream = StreamAddress::for_persistence_id(&pid);
    append(store, &pid, &[1, 2]).await;
    append(store, &pid, &[5]).await;
    store.mark_deleted(&pid, 1).await.unwrap();

    let all = store.read_stream(stream, 1, u64::MAX).await.unwrap();
    assert_eq!(seqs(&all), vec![1, 2, 5]);
    assert!(all[0].is_deleted, "raw reads include deleted records");

    let tail = store.read_stream(stream, 2, 3).await.unwrap();
    assert_eq!(seqs(&tail), vec![2, 5]);
}

pub async fn test_read_stream_unknown<S: JournalStore>(store: &S) {
    let stream = StreamAddress::for_persistence_id(&make_pid("read_unknown"));
    assert!(store
        .read_stream(stream, 1, u64::MAX)
        .await
        .unwrap()
        .is_empty());
}

// =============================================================================
// JournalStore::query_metadata tests
// =============================================================================

pub async fn test_query_metadata_absent<S: JournalStore>(store: &S) {
    let pid = make_pid("meta_absent");
    assert!(store.query_metadata(&pid).await.unwrap().is_none());
}

/// Run all JournalStore tests against a store implementation.
#[macro_export]
macro_rules! run_journal_store_tests {
    ($store:expr) => {
        use $crate::storage::journal_store_tests::*;

        // append tests
        test_append_single_record($store).await;
        println!("  test_append_single_record: PASSED");

        test_append_empty_records($store).await;
        println!("  test_append_empty_records: PASSED");

        test_append_updates_metadata($store).await;
        println!("  test_append_updates_metadata: PASSED");

        test_append_sequential_batches($store).await;
        println!("  test_append_sequential_batches: PASSED");

        test_append_never_lowers_highest($store).await;
        println!("  test_append_never_lowers_highest: PASSED");

        test_append_duplicate_fails_atomically($store).await;
        println!("  test_append_duplicate_fails_atomically: PASSED");

        test_append_preserves_record_data($store).await;
        println!("  test_append_preserves_record_data: PASSED");

        // query tests
        test_query_events_bounds_and_limit($store).await;
        println!("  test_query_events_bounds_and_limit: PASSED");

        test_query_events_empty_cases($store).await;
        println!("  test_query_events_empty_cases: PASSED");

        test_query_events_isolates_entities($store).await;
        println!("  test_query_events_isolates_entities: PASSED");

        // delete tests
        test_mark_deleted_hides_from_filtered_query($store).await;
        println!("  test_mark_deleted_hides_from_filtered_query: PASSED");

        test_mark_deleted_idempotent($store).await;
        println!("  test_mark_deleted_idempotent: PASSED");

        test_mark_deleted_scoped_to_entity($store).await;
        println!("  test_mark_deleted_scoped_to_entity: PASSED");

        test_mark_deleted_unknown_entity($store).await;
        println!("  test_mark_deleted_unknown_entity: PASSED");

        // stream tests
        test_read_stream_in_append_order($store).await;
        println!("  test_read_stream_in_append_order: PASSED");

        test_read_stream_unknown($store).await;
        println!("  test_read_stream_unknown: PASSED");

        // metadata tests
        test_query_metadata_absent($store).await;
        println!("  test_query_metadata_absent: PASSED");
    };
}
