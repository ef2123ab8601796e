// Integration tests for the document store intake and batch arithmetic.

use doc_renamer::document_store::{BATCH_SIZE, DocumentStore, InputFile};

fn pdf(name: &str) -> InputFile {
    InputFile::new(name, Some("application/pdf"), b"%PDF-1.4".to_vec())
}

#[test]
fn test_unsupported_media_type_is_dropped() {
    let mut store = DocumentStore::new();
    let before = store.len();

    let accepted = store.add(vec![InputFile::new(
        "photo.png",
        Some("image/png"),
        vec![0x89, 0x50],
    )]);

    assert_eq!(accepted, 0);
    assert_eq!(store.len(), before);
}

#[test]
fn test_uppercase_extension_is_accepted() {
    let mut store = DocumentStore::new();
    let accepted = store.add(vec![InputFile::new("report.PDF", None, b"x".to_vec())]);

    assert_eq!(accepted, 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0).unwrap().name, "report.PDF");
}

#[test]
fn test_declared_type_accepted_without_matching_extension() {
    let mut store = DocumentStore::new();
    let accepted = store.add(vec![InputFile::new(
        "scan.bin",
        Some("application/pdf"),
        b"x".to_vec(),
    )]);

    assert_eq!(accepted, 1);
}

#[test]
fn test_mixed_add_keeps_arrival_order() {
    let mut store = DocumentStore::new();
    let accepted = store.add(vec![
        pdf("a.pdf"),
        InputFile::new("skip.zip", None, b"x".to_vec()),
        pdf("b.pdf"),
    ]);

    assert_eq!(accepted, 2);
    let names: Vec<&str> = store.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf"]);
}

#[test]
fn test_duplicate_files_are_permitted() {
    let mut store = DocumentStore::new();
    store.add(vec![pdf("same.pdf"), pdf("same.pdf")]);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_remove_out_of_range_is_noop() {
    let mut store = DocumentStore::new();
    store.add(vec![pdf("a.pdf")]);

    store.remove(5);
    assert_eq!(store.len(), 1);

    store.remove(0);
    assert!(store.is_empty());
    store.remove(0);
    assert!(store.is_empty());
}

#[test]
fn test_remove_shifts_later_entries() {
    let mut store = DocumentStore::new();
    store.add(vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")]);

    store.remove(1);
    let names: Vec<&str> = store.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "c.pdf"]);
}

#[test]
fn test_total_batches_arithmetic() {
    let mut store = DocumentStore::new();
    assert_eq!(store.total_batches(), 0);

    store.add(vec![pdf("one.pdf")]);
    assert_eq!(store.total_batches(), 1);

    store.add((1..BATCH_SIZE).map(|i| pdf(&format!("f{i}.pdf"))).collect());
    assert_eq!(store.len(), BATCH_SIZE);
    assert_eq!(store.total_batches(), 1);

    store.add(vec![pdf("eleventh.pdf")]);
    assert_eq!(store.total_batches(), 2);

    store.add((0..14).map(|i| pdf(&format!("g{i}.pdf"))).collect());
    assert_eq!(store.len(), 25);
    assert_eq!(store.total_batches(), 3);
}
