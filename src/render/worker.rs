//! Render worker thread

use std::path::Path;
use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::adjust;
use super::cache::{CacheKey, PageCache};
use super::cancel::LatestRequest;
use super::request::{PageImage, RenderFault, RenderParams, RenderRequest, RenderResponse, RequestId};
use crate::document::Document;

/// Main worker function - runs in a dedicated thread.
///
/// Opens its own handle on the document, so nothing it touches is shared
/// with the UI thread apart from the cache.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    doc_path: &Path,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
    cache: Arc<Mutex<PageCache>>,
    latest: LatestRequest,
) {
    let doc = match Document::open(doc_path) {
        Ok(d) => d,
        Err(e) => {
            warn!("Render worker cannot open {doc_path:?}: {e}");
            let _ = responses.send(RenderResponse::Unavailable(RenderFault::Document(e)));
            return;
        }
    };

    for request in requests {
        match request {
            RenderRequest::Page { id, page, params } => {
                if latest.is_stale(id) {
                    debug!("Skipping stale request {id:?} for page {page}");
                    let _ = responses.send(RenderResponse::Cancelled(id));
                    continue;
                }
                handle_page_request(&doc, id, page, &params, &cache, &responses);
            }

            RenderRequest::Shutdown => break,
        }
    }
    debug!("Render worker for {doc_path:?} stopped");
}

fn handle_page_request(
    doc: &Document,
    id: RequestId,
    page: usize,
    params: &RenderParams,
    cache: &Arc<Mutex<PageCache>>,
    responses: &Sender<RenderResponse>,
) {
    let key = CacheKey::from_params(page, params);

    let cached = cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(&key);
    if let Some(data) = cached {
        let _ = responses.send(RenderResponse::Page { id, data });
        return;
    }

    match render_page(doc, page, params) {
        Ok(image) => {
            let data = cache
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(key, image);
            let _ = responses.send(RenderResponse::Page { id, data });
        }
        Err(error) => {
            let _ = responses.send(RenderResponse::Error { id, error });
        }
    }
}

/// Render a single page and apply display adjustments
pub fn render_page(
    doc: &Document,
    page: usize,
    params: &RenderParams,
) -> Result<PageImage, RenderFault> {
    let mut image = doc.render_page(page, params.zoom)?;
    adjust::apply(&mut image, params.brightness, params.night_mode);
    debug!(
        "Rendered page {page} at {:.2} ({}x{})",
        params.zoom,
        image.width(),
        image.height()
    );
    Ok(PageImage {
        page,
        params: *params,
        image,
    })
}
