//! Background page rendering

pub mod adjust;
mod cache;
mod cancel;
mod request;
mod service;
mod worker;

pub use cache::{CacheKey, PageCache};
pub use cancel::LatestRequest;
pub use request::{PageImage, RenderFault, RenderParams, RenderRequest, RenderResponse, RequestId};
pub use service::{DEFAULT_CACHE_SIZE, RenderService};
pub use worker::render_page;
