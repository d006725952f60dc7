pub mod api;
pub mod collector;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod page;
pub mod record;
pub mod registry;
pub mod resource;

pub use api::ApiFetcher;
pub use collector::ResultCollector;
pub use crawler::{
    CrawlSummary, Crawler, ProgressCallback, ResultCallback, WorkItem, crawl,
};
pub use error::{CrawlError, FetchError};
pub use fetcher::Fetcher;
pub use page::PageFetcher;
pub use record::{FetchedResource, MetadataRecord};
pub use registry::VisitedRegistry;
pub use resource::ResourceId;
