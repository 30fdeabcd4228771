use std::time::{Duration, Instant};

use folio::render::{RenderFault, RenderParams, RenderResponse, RenderService};
use folio::test_utils::fixtures;

const TIMEOUT: Duration = Duration::from_secs(10);

fn five_page_docx(dir: &std::path::Path) -> std::path::PathBuf {
    fixtures::write_docx(
        dir,
        "five.docx",
        &[&["one"], &["two"], &["three"], &["four"], &["five"]],
    )
}

#[test]
fn only_the_newest_request_is_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = RenderService::new(&five_page_docx(dir.path()));

    let ids: Vec<_> = (0..5)
        .map(|page| service.request_page(page, RenderParams::default()))
        .collect();
    let newest = *ids.last().unwrap();
    assert_eq!(service.latest_request(), Some(newest));

    match service.wait(TIMEOUT) {
        Some(RenderResponse::Page { id, data }) => {
            assert_eq!(id, newest);
            assert_eq!(data.page, 4);
        }
        other => panic!("expected page 4, got {other:?}"),
    }
}

#[test]
fn poll_never_yields_stale_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = RenderService::new(&five_page_docx(dir.path()));

    service.request_page(0, RenderParams::default());
    let newest = service.request_page(3, RenderParams::default());

    let deadline = Instant::now() + TIMEOUT;
    let response = loop {
        if let Some(response) = service.poll() {
            break response;
        }
        assert!(Instant::now() < deadline, "render timed out");
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(response.id(), Some(newest));

    // Nothing older shows up afterwards
    std::thread::sleep(Duration::from_millis(50));
    assert!(service.poll().is_none());
}

#[test]
fn render_params_reach_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = RenderService::new(&five_page_docx(dir.path()));

    let params = RenderParams {
        zoom: 0.5,
        brightness: 1.0,
        night_mode: true,
    };
    service.request_page(0, params);
    let Some(RenderResponse::Page { data, .. }) = service.wait(TIMEOUT) else {
        panic!("render failed");
    };
    assert_eq!((data.width(), data.height()), (306, 396));
    assert_eq!(data.params, params);
    // Blank paper turns black at night
    assert_eq!(data.image.get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn repeated_requests_are_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = RenderService::new(&five_page_docx(dir.path()));

    service.request_page(1, RenderParams::default());
    assert!(service.wait(TIMEOUT).is_some());
    assert_eq!(service.cached_pages(), 1);

    service.request_page(1, RenderParams::default());
    assert!(matches!(
        service.wait(TIMEOUT),
        Some(RenderResponse::Page { .. })
    ));
    assert_eq!(service.cached_pages(), 1);

    service.clear_cache();
    assert_eq!(service.cached_pages(), 0);
}

#[test]
fn out_of_range_page_reports_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = RenderService::new(&five_page_docx(dir.path()));

    let id = service.request_page(9, RenderParams::default());
    match service.wait(TIMEOUT) {
        Some(RenderResponse::Error { id: got, error }) => {
            assert_eq!(got, id);
            assert!(matches!(error, RenderFault::Document(_)));
        }
        other => panic!("expected an error, got {other:?}"),
    }
}

#[test]
fn unreadable_document_makes_the_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_garbage(dir.path(), "broken.docx");
    let mut service = RenderService::new(&path);

    service.request_page(0, RenderParams::default());
    assert!(matches!(
        service.wait(TIMEOUT),
        Some(RenderResponse::Unavailable(_))
    ));
}
