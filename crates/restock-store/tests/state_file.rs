//! Integration tests for `StateFile` against a real temporary directory.

use restock_store::{StateFile, UnavailableSet};

const A: &str = "https://shop.example.com/en/product/a";
const B: &str = "https://shop.example.com/en/product/b";

#[test]
fn missing_file_is_first_run_with_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    let snapshot = store.load().expect("load should succeed");

    assert!(snapshot.first_run);
    assert!(snapshot.set.is_empty());
}

#[test]
fn save_then_load_round_trips_without_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    let set: UnavailableSet = [B, A, B].into_iter().collect();
    store.save(&set).expect("save should succeed");

    let snapshot = store.load().expect("load should succeed");
    assert!(!snapshot.first_run);
    assert_eq!(snapshot.set.len(), 2);
    assert!(snapshot.set.contains(A));
    assert!(snapshot.set.contains(B));
}

#[test]
fn save_fully_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    store
        .save(&[A, B].into_iter().collect())
        .expect("first save");
    store.save(&[B].into_iter().collect()).expect("second save");

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw, format!("{B}\n"));
}

#[test]
fn saving_empty_set_leaves_existing_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    store.save(&UnavailableSet::new()).expect("save");

    let snapshot = store.load().expect("load");
    assert!(!snapshot.first_run, "an empty file is not a first run");
    assert!(snapshot.set.is_empty());
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("nested/state/out_of_stock.txt"));

    store.save(&[A].into_iter().collect()).expect("save");

    assert!(store.path().exists());
}

#[test]
fn save_does_not_leave_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    store.save(&[A].into_iter().collect()).expect("save");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 1, "unexpected files: {entries:?}");
}

#[test]
fn clear_removes_file_and_reports_whether_it_existed() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path().join("out_of_stock.txt"));

    assert!(!store.clear().unwrap());
    store.save(&[A].into_iter().collect()).unwrap();
    assert!(store.clear().unwrap());
    assert!(store.load().unwrap().first_run);
}

#[test]
fn load_reads_hand_edited_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out_of_stock.txt");
    std::fs::write(&path, format!("\n  {A}  \n{A}\n\n{B}")).unwrap();

    let snapshot = StateFile::new(&path).load().unwrap();

    let ids: Vec<&str> = snapshot.set.iter().collect();
    assert_eq!(ids, vec![A, B]);
}

#[test]
fn load_of_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateFile::new(dir.path());

    let err = store.load().unwrap_err();
    assert!(matches!(err, restock_store::StoreError::Io { .. }));
}
