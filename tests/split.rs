//! Integration tests for exporting page ranges

mod common;

use common::{page_labels, Workspace};
use pdf_collate::pdf::WriteOptions;
use pdf_collate::ranges::PageRange;
use pdf_collate::session::SplitSession;
use pdf_collate::Error;
use rstest::rstest;

fn uncompressed() -> WriteOptions {
    WriteOptions {
        compress: false,
        ..Default::default()
    }
}

#[test]
fn test_ranges_exported_in_list_order() {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 10);
    let output = ws.path("out.pdf");

    let mut session = SplitSession::new(uncompressed());
    assert_eq!(session.load(&source).unwrap(), 10);
    session.add_range(1, 3).unwrap();
    session.add_range(5, 5).unwrap();

    let summary = session.export(&output).unwrap();
    assert_eq!(summary.page_count, 4);
    assert_eq!(
        page_labels(&output),
        vec!["src 0", "src 1", "src 2", "src 4"]
    );
}

#[test]
fn test_reordered_ranges() {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 6);
    let output = ws.path("out.pdf");

    let mut session = SplitSession::new(uncompressed());
    session.load(&source).unwrap();
    session.add_range(1, 2).unwrap();
    session.add_range(5, 6).unwrap();
    let ids = session.ranges().ids();

    assert!(session.reorder(&[ids[1], ids[0]]));
    session.export(&output).unwrap();
    assert_eq!(
        page_labels(&output),
        vec!["src 4", "src 5", "src 0", "src 1"]
    );
}

#[test]
fn test_overlapping_ranges_repeat_pages() {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 4);
    let output = ws.path("out.pdf");

    let mut session = SplitSession::new(uncompressed());
    session.load(&source).unwrap();
    session.add_range(1, 2).unwrap();
    session.add_range(2, 3).unwrap();

    let summary = session.export(&output).unwrap();
    assert_eq!(summary.page_count, 4);
    assert_eq!(
        page_labels(&output),
        vec!["src 0", "src 1", "src 1", "src 2"]
    );
}

#[rstest(
    start, end,
    case(0, 1),
    case(1, 5),
    case(3, 2)
)]
fn test_invalid_range_leaves_list_unchanged(start: u32, end: u32) {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 4);

    let mut session = SplitSession::default();
    session.load(&source).unwrap();
    session.add_range(2, 3).unwrap();

    let err = session.add_range(start, end).unwrap_err();
    assert!(matches!(err, Error::InvalidRange { total_pages: 4, .. }));
    assert_eq!(session.ranges().len(), 1);
}

#[test]
fn test_remove_range_then_export() {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 5);
    let output = ws.path("out.pdf");

    let mut session = SplitSession::new(uncompressed());
    session.load(&source).unwrap();
    session.add_range(1, 1).unwrap();
    session.add_range(3, 4).unwrap();

    assert!(session.remove_range(0));
    assert!(!session.remove_range(5));

    session.export(&output).unwrap();
    assert_eq!(page_labels(&output), vec!["src 2", "src 3"]);
}

#[test]
fn test_parsed_ranges() {
    let ws = Workspace::new();
    let source = ws.pdf("src.pdf", 8);

    let mut session = SplitSession::default();
    let total = session.load(&source).unwrap();
    for expr in ["7-8", "2"] {
        let range = PageRange::parse(expr, total).unwrap();
        session.add_range(range.start(), range.end()).unwrap();
    }

    let indices: Vec<u32> = session
        .plan()
        .unwrap()
        .iter()
        .map(|entry| entry.page_index)
        .collect();
    assert_eq!(indices, vec![6, 7, 1]);
}

#[test]
fn test_load_bad_file() {
    let ws = Workspace::new();
    let bad = ws.garbage("bad.pdf");

    let mut session = SplitSession::default();
    let err = session.load(&bad).unwrap_err();
    assert!(err.is_load_error());
    assert!(session.source().is_none());
}
