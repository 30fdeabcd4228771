//! Render service - owns the worker thread and cache

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::cache::PageCache;
use super::cancel::LatestRequest;
use super::request::{RenderFault, RenderParams, RenderRequest, RenderResponse, RequestId};
use super::worker::render_worker;

/// Rendered pages kept per document
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// Renders pages of one document off the UI thread.
///
/// Only the newest request matters: older requests still queued are skipped
/// by the worker, and results for them are dropped by [`poll`].
///
/// [`poll`]: RenderService::poll
pub struct RenderService {
    doc_path: PathBuf,
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    latest: LatestRequest,
    cache: Arc<Mutex<PageCache>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderService {
    #[must_use]
    pub fn new(doc_path: &Path) -> Self {
        Self::with_cache_size(doc_path, DEFAULT_CACHE_SIZE)
    }

    #[must_use]
    pub fn with_cache_size(doc_path: &Path, cache_size: usize) -> Self {
        let cache = Arc::new(Mutex::new(PageCache::new(cache_size)));
        let latest = LatestRequest::new();
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let worker = {
            let path = doc_path.to_path_buf();
            let cache = Arc::clone(&cache);
            let latest = latest.clone();
            std::thread::Builder::new()
                .name("render-worker".into())
                .spawn(move || render_worker(&path, request_rx, response_tx, cache, latest))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to spawn render worker: {e}");
                None
            }
        };

        Self {
            doc_path: doc_path.to_path_buf(),
            request_tx,
            response_rx,
            next_request_id: 1,
            latest,
            cache,
            worker,
        }
    }

    pub fn doc_path(&self) -> &Path {
        &self.doc_path
    }

    /// Request a page; supersedes every earlier request
    pub fn request_page(&mut self, page: usize, params: RenderParams) -> RequestId {
        let id = self.next_id();
        self.latest.mark(id);

        if self
            .request_tx
            .send(RenderRequest::Page { id, page, params })
            .is_err()
        {
            debug!("Render worker gone, request {id:?} dropped");
        }
        id
    }

    /// Id of the newest request, if any was made
    pub fn latest_request(&self) -> Option<RequestId> {
        (self.next_request_id > 1).then(|| self.latest.get())
    }

    fn is_current(&self, response: &RenderResponse) -> bool {
        match response.id() {
            Some(id) => id == self.latest.get(),
            None => true,
        }
    }

    /// Drain finished work and return the outcome of the newest request.
    ///
    /// Stale results and cancellations are discarded.
    pub fn poll(&mut self) -> Option<RenderResponse> {
        let mut newest = None;
        while let Ok(response) = self.response_rx.try_recv() {
            if matches!(response, RenderResponse::Cancelled(_)) {
                continue;
            }
            if self.is_current(&response) {
                newest = Some(response);
            } else {
                debug!("Dropping stale render response {:?}", response.id());
            }
        }
        newest
    }

    /// Block until the newest request completes or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Option<RenderResponse> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.response_rx.recv_timeout(remaining) {
                Ok(RenderResponse::Cancelled(_)) => {}
                Ok(response) if self.is_current(&response) => return Some(response),
                Ok(_) => {}
                Err(flume::RecvTimeoutError::Timeout) => return None,
                Err(flume::RecvTimeoutError::Disconnected) => {
                    return Some(RenderResponse::Unavailable(RenderFault::Disconnected));
                }
            }
        }
    }

    /// Drop every cached page
    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn cached_pages(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Stop the worker and wait for it to release the document
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Render worker for {:?} panicked", self.doc_path);
            }
        }
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
