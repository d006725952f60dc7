use crate::config::{Config, FetcherKind};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use relcrawl_scanner::{
    ApiFetcher, CrawlSummary, Crawler, Fetcher, MetadataRecord, PageFetcher, ResourceId,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seed: String,
    pub max_depth: usize,
    pub max_fanout: usize,
    pub fetcher: FetcherKind,
    pub concurrency: usize,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_depth: 3,
            max_fanout: 10,
            fetcher: FetcherKind::Scrape,
            concurrency: 16,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for reporting individual records as they are collected
pub type CrawlResultCallback = Arc<dyn Fn(MetadataRecord) + Send + Sync>;

/// `max_fanout` sizes the API's related lookups so a node can expand that
/// many children.
pub fn build_fetcher(
    kind: FetcherKind,
    config: &Config,
    max_fanout: usize,
) -> Result<Arc<dyn Fetcher>> {
    let fetcher: Arc<dyn Fetcher> = match kind {
        FetcherKind::Scrape => Arc::new(PageFetcher::with_timeout(
            config.base_url.clone(),
            config.timeout_secs,
        )?),
        FetcherKind::Api => Arc::new(ApiFetcher::with_timeout(
            &config.api_url,
            config.base_url.clone(),
            config.require_api_key()?,
            config.timeout_secs,
        )?
        .with_max_related(max_fanout)),
    };
    Ok(fetcher)
}

/// Brings a user supplied seed into the identifier space the fetchers
/// report relations in: bare video ids become watch URLs under `base_url`,
/// scheme-less links get `https://`.
pub fn seed_identifier(seed: &str, base_url: &Url) -> String {
    let seed = seed.trim();
    if seed.is_empty() || Url::parse(seed).is_ok() {
        return seed.to_string();
    }

    if seed.contains('/') {
        let with_scheme = format!("https://{}", seed);
        if Url::parse(&with_scheme).is_ok() {
            return with_scheme;
        }
    }

    ResourceId::watch_url(base_url, seed)
        .map(|watch| watch.to_string())
        .unwrap_or_else(|| seed.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl summary
pub async fn execute_crawl(
    options: CrawlOptions,
    config: &Config,
    progress_callback: Option<CrawlProgressCallback>,
    result_callback: Option<CrawlResultCallback>,
) -> Result<CrawlSummary, String> {
    let CrawlOptions {
        seed,
        max_depth,
        max_fanout,
        fetcher,
        concurrency,
        show_progress_bars,
    } = options;

    let fetcher_impl =
        build_fetcher(fetcher, config, max_fanout).map_err(|e| format!("{:#}", e))?;
    let seed = seed_identifier(&seed, &config.base_url);
    debug!("Using {:?} fetcher, timeout {}s", fetcher, config.timeout_secs);

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let claimed_count = Arc::new(AtomicUsize::new(0));
    let claimed_clone = claimed_count.clone();
    let pb_clone = progress_bar.clone();
    let internal_progress: relcrawl_scanner::ProgressCallback =
        Arc::new(move |id: &ResourceId| {
            let count = claimed_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} visited, now {}", count, id));
            }
        });

    let mut crawler = Crawler::new(fetcher_impl)
        .with_max_depth(max_depth)
        .with_max_fanout(max_fanout)
        .with_max_in_flight(concurrency)
        .with_progress_callback(internal_progress);

    if let Some(cb) = result_callback {
        let result_cb: relcrawl_scanner::ResultCallback =
            Arc::new(move |record: &MetadataRecord| cb(record.clone()));
        crawler = crawler.with_result_callback(result_cb);
    }

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawling from {} (depth {}, fanout {})",
            seed, max_depth, max_fanout
        ));
    }

    let outcome = crawler.crawl_with_summary(&seed).await;

    if let Some(ref pb) = progress_bar {
        let total = claimed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} videos visited", total));
    }

    let summary = outcome.map_err(|e| e.to_string())?;
    if summary.failed > 0
        && let Some(ref callback) = progress_callback
    {
        callback(format!(
            "[!] {} video(s) could not be fetched and were skipped",
            summary.failed
        ));
    }
    Ok(summary)
}
