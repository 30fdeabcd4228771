use std::time::Duration;

use folio::document::{Document, live_handles};
use folio::render::{RenderParams, RenderResponse, RenderService};
use folio::test_utils::fixtures;
use folio::viewer::{Command, ViewerState, Zoom};
use serial_test::serial;

#[test]
#[serial]
fn dropping_a_document_releases_its_handle() {
    let dir = tempfile::tempdir().unwrap();
    let docx = fixtures::write_docx(dir.path(), "a.docx", &[&["a"], &["b"]]);
    let pptx = fixtures::write_pptx(dir.path(), "b.pptx", &[&["Slide"]]);
    let baseline = live_handles();

    let first = Document::open(&docx).unwrap();
    let second = Document::open(&pptx).unwrap();
    assert_eq!(live_handles(), baseline + 2);

    drop(first);
    assert_eq!(live_handles(), baseline + 1);
    drop(second);
    assert_eq!(live_handles(), baseline);
}

#[test]
#[serial]
fn failed_opens_leave_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = live_handles();

    let garbage = fixtures::write_garbage(dir.path(), "broken.docx");
    assert!(Document::open(&garbage).is_err());
    let empty_deck = fixtures::write_pptx(dir.path(), "empty.pptx", &[]);
    assert!(Document::open(&empty_deck).is_err());
    assert!(Document::open(dir.path().join("missing.docx")).is_err());

    assert_eq!(live_handles(), baseline);
}

#[test]
#[serial]
fn viewer_holds_one_handle_per_open_document() {
    let dir = tempfile::tempdir().unwrap();
    let a = fixtures::write_docx(dir.path(), "a.docx", &[&["a"]]);
    let b = fixtures::write_docx(dir.path(), "b.docx", &[&["b"]]);
    let baseline = live_handles();

    let mut viewer = ViewerState::new(Zoom::default());
    viewer.apply(Command::Open(a)).unwrap();
    assert_eq!(live_handles(), baseline + 1);

    // Switching documents releases the previous one
    viewer.apply(Command::Open(b)).unwrap();
    assert_eq!(live_handles(), baseline + 1);

    // A failed open keeps the current document and leaks nothing
    let garbage = fixtures::write_garbage(dir.path(), "c.docx");
    assert!(viewer.apply(Command::Open(garbage)).is_err());
    assert_eq!(live_handles(), baseline + 1);

    viewer.apply(Command::Close).unwrap();
    assert_eq!(live_handles(), baseline);
}

#[test]
#[serial]
fn render_service_releases_its_handle_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_docx(dir.path(), "r.docx", &[&["page"]]);
    let baseline = live_handles();

    let mut service = RenderService::new(&path);
    service.request_page(0, RenderParams::default());
    let response = service.wait(Duration::from_secs(10));
    assert!(matches!(response, Some(RenderResponse::Page { .. })));
    assert_eq!(live_handles(), baseline + 1);

    drop(service);
    assert_eq!(live_handles(), baseline);
}
