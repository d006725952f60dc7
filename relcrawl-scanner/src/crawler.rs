use crate::collector::ResultCollector;
use crate::error::{CrawlError, FetchError, Result};
use crate::fetcher::Fetcher;
use crate::record::{FetchedResource, MetadataRecord};
use crate::registry::VisitedRegistry;
use crate::resource::ResourceId;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(&ResourceId) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(&MetadataRecord) + Send + Sync>;

/// One unit of work: a resource and the hops still allowed past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: ResourceId,
    pub remaining_depth: usize,
}

impl WorkItem {
    pub fn new(id: ResourceId, remaining_depth: usize) -> Self {
        Self { id, remaining_depth }
    }

    /// Children exist only while hops remain, so no item is ever created
    /// further than `max_depth` edges from the seed.
    fn child(&self, id: ResourceId) -> Option<Self> {
        self.remaining_depth
            .checked_sub(1)
            .map(|remaining_depth| Self { id, remaining_depth })
    }
}

#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub records: Vec<MetadataRecord>,
    pub visited: usize,
    pub failed: usize,
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    max_depth: usize,
    max_fanout: usize,
    max_in_flight: Option<usize>,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

/// State owned by a single `crawl` invocation and shared with every task it
/// spawns.
struct CrawlRun {
    fetcher: Arc<dyn Fetcher>,
    registry: VisitedRegistry,
    collector: ResultCollector,
    max_fanout: usize,
    in_flight: Option<Semaphore>,
    failed: AtomicUsize,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            max_depth: 3,
            max_fanout: 10,
            max_in_flight: None,
            progress_callback: None,
            result_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_fanout(mut self, fanout: usize) -> Self {
        self.max_fanout = fanout;
        self
    }

    /// Caps concurrent fetches. Branches still spawn freely; only the fetch
    /// itself waits for a permit.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit.max(1));
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, seed: &str) -> Result<Vec<MetadataRecord>> {
        Ok(self.crawl_with_summary(seed).await?.records)
    }

    /// Explores everything within `max_depth` hops of `seed` and returns once
    /// every spawned branch has joined.
    pub async fn crawl_with_summary(&self, seed: &str) -> Result<CrawlSummary> {
        let seed = ResourceId::new(seed);
        if seed.is_empty() {
            return Err(CrawlError::EmptySeed);
        }
        if let Ok(url) = Url::parse(seed.as_str())
            && !matches!(url.scheme(), "http" | "https")
        {
            return Err(CrawlError::InvalidSeed(seed.to_string()));
        }
        let seed = self.fetcher.canonical(&seed);

        info!(
            "Starting crawl of {} (depth {}, fanout {})",
            seed, self.max_depth, self.max_fanout
        );

        let run = Arc::new(CrawlRun {
            fetcher: self.fetcher.clone(),
            registry: VisitedRegistry::new(),
            collector: ResultCollector::new(),
            max_fanout: self.max_fanout,
            in_flight: self.max_in_flight.map(Semaphore::new),
            failed: AtomicUsize::new(0),
            progress_callback: self.progress_callback.clone(),
            result_callback: self.result_callback.clone(),
        });

        explore(run.clone(), WorkItem::new(seed, self.max_depth)).await;

        let summary = CrawlSummary {
            records: run.collector.drain(),
            visited: run.registry.len(),
            failed: run.failed.load(Ordering::Relaxed),
        };
        info!(
            "Crawl complete. Visited {} resources, {} records, {} failed",
            summary.visited,
            summary.records.len(),
            summary.failed
        );
        Ok(summary)
    }
}

/// Convenience wrapper around [`Crawler`] for one-off crawls.
pub async fn crawl(
    fetcher: Arc<dyn Fetcher>,
    seed: &str,
    max_depth: usize,
    max_fanout: usize,
) -> Result<Vec<MetadataRecord>> {
    Crawler::new(fetcher)
        .with_max_depth(max_depth)
        .with_max_fanout(max_fanout)
        .crawl(seed)
        .await
}

impl CrawlRun {
    async fn fetch(&self, id: &ResourceId) -> std::result::Result<FetchedResource, FetchError> {
        // acquire() only fails on a closed semaphore, which never happens here
        let _permit = match &self.in_flight {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };
        self.fetcher.fetch(id).await
    }
}

fn explore(run: Arc<CrawlRun>, item: WorkItem) -> BoxFuture<'static, ()> {
    async move {
        if !run.registry.try_visit(&item.id) {
            debug!("Skipping {} (already visited)", item.id);
            return;
        }

        if let Some(ref callback) = run.progress_callback {
            callback(&item.id);
        }

        let FetchedResource { record, related } = match run.fetch(&item.id).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Fetch failed for {}: {}", item.id, e);
                run.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        if record.has_title() {
            if let Some(ref callback) = run.result_callback {
                callback(&record);
            }
            run.collector.append(record);
        } else {
            debug!("No title for {}, not recording", item.id);
        }

        let children: Vec<WorkItem> = related
            .into_iter()
            .take(run.max_fanout)
            .filter_map(|id| item.child(run.fetcher.canonical(&id)))
            .collect();
        if children.is_empty() {
            return;
        }

        debug!(
            "Expanding {} into {} children (remaining depth {})",
            item.id,
            children.len(),
            item.remaining_depth
        );
        let handles: Vec<_> = children
            .into_iter()
            .map(|child| tokio::spawn(explore(run.clone(), child)))
            .collect();

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("Branch under {} did not complete: {}", item.id, e);
            }
        }
    }
    .boxed()
}
