//! Watch-page scraping fetcher.

use crate::error::{FetchError, Result};
use crate::fetcher::Fetcher;
use crate::record::{FetchedResource, MetadataRecord, parse_count};
use crate::resource::ResourceId;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

static CONTENT: LazyLock<Selector> = LazyLock::new(|| selector("div#content"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("span.watch-title"));
static DOCUMENT_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static CATEGORY: LazyLock<Selector> = LazyLock::new(|| selector("ul.watch-info-tag-list a"));
static VIEWS: LazyLock<Selector> = LazyLock::new(|| selector("div.watch-view-count"));
static LIKES: LazyLock<Selector> =
    LazyLock::new(|| selector(".like-button-renderer-like-button span"));
static DISLIKES: LazyLock<Selector> =
    LazyLock::new(|| selector(".like-button-renderer-dislike-button span"));
static RELATED: LazyLock<Selector> = LazyLock::new(|| selector("a.content-link[href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

pub struct PageFetcher {
    client: Client,
    base_url: Url,
}

impl PageFetcher {
    pub fn new(base_url: Url) -> Result<Self> {
        Self::with_timeout(base_url, 10)
    }

    pub fn with_timeout(base_url: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("relcrawl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Opaque ids are fetched through the watch URL under the base URL.
    fn page_url(&self, id: &ResourceId) -> std::result::Result<Url, FetchError> {
        if let Ok(url) = Url::parse(id.as_str())
            && url.has_host()
        {
            return Ok(url);
        }
        ResourceId::watch_url(&self.base_url, id.as_str())
            .and_then(|watch| Url::parse(watch.as_str()).ok())
            .ok_or_else(|| FetchError::ParseFailure(format!("cannot build a page URL for {}", id)))
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self, id: &ResourceId) -> std::result::Result<FetchedResource, FetchError> {
        let url = self.page_url(id)?;
        debug!("Fetching page {}", url);

        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let body = response.text().await?;

        Ok(parse_watch_page(&body, &url, id))
    }

    fn canonical(&self, id: &ResourceId) -> ResourceId {
        id.rebase(&self.base_url)
    }
}

/// Extracts the record and the related links of a watch page. Missing
/// fields never fail the parse; counters fall back to zero.
pub fn parse_watch_page(html: &str, page_url: &Url, id: &ResourceId) -> FetchedResource {
    let document = Html::parse_document(html);
    let scope = document
        .select(&CONTENT)
        .next()
        .unwrap_or_else(|| document.root_element());

    let title = extract_title(&document, scope);
    let category = scope
        .select(&CATEGORY)
        .next()
        .map(collapse_text)
        .filter(|c| !c.is_empty());
    let views = scope.select(&VIEWS).next().map(collapse_text).unwrap_or_default();
    let likes = scope.select(&LIKES).next().map(collapse_text).unwrap_or_default();
    let dislikes = scope.select(&DISLIKES).next().map(collapse_text);

    let record = MetadataRecord::new(id.clone(), title)
        .with_counts(
            parse_count(&views),
            parse_count(&likes),
            dislikes.as_deref().map(parse_count),
        )
        .with_category(category);

    let related = scope
        .select(&RELATED)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| ResourceId::resolve(page_url, href))
        .collect();

    FetchedResource::new(record, related)
}

fn extract_title(document: &Html, scope: ElementRef<'_>) -> String {
    if let Some(span) = scope.select(&TITLE).next() {
        if let Some(title) = span.value().attr("title")
            && !title.trim().is_empty()
        {
            return title.trim().to_string();
        }
        let text = collapse_text(span);
        if !text.is_empty() {
            return text;
        }
    }

    document
        .select(&DOCUMENT_TITLE)
        .next()
        .map(collapse_text)
        .map(|t| t.trim_end_matches("- YouTube").trim().to_string())
        .unwrap_or_default()
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    const WATCH_PAGE: &str = r#"<html><head><title>Ignored - YouTube</title></head><body>
        <div id="content">
            <span class="watch-title" title="Rust in 100 Seconds">Rust in 100 Seconds</span>
            <ul class="watch-info-tag-list"><li><a href="/channel/x">Science &amp; Technology</a></li></ul>
            <div class="watch-view-count">1,234,567 views</div>
            <button class="like-button-renderer-like-button"><span>12,345</span></button>
            <button class="like-button-renderer-dislike-button"><span>67</span></button>
            <a class="content-link" href="/watch?v=second&amp;list=PL">Second</a>
            <a class="content-link" href="https://www.youtube.com/watch?v=third#t=1">Third</a>
            <a class="content-link" href="javascript:void(0)">Nope</a>
            <a class="content-link" href="/watch?v=second">Second again</a>
            <a href="/watch?v=not-related">Plain link</a>
        </div></body></html>"#;

    #[test]
    fn test_parse_watch_page_metadata() {
        let url = Url::parse("https://www.youtube.com/watch?v=first").unwrap();
        let id = ResourceId::new(url.as_str());
        let fetched = parse_watch_page(WATCH_PAGE, &url, &id);

        assert_eq!(fetched.record.id, id);
        assert_eq!(fetched.record.title, "Rust in 100 Seconds");
        assert_eq!(fetched.record.view_count, 1_234_567);
        assert_eq!(fetched.record.like_count, 12_345);
        assert_eq!(fetched.record.dislike_count, Some(67));
        assert_eq!(fetched.record.category.as_deref(), Some("Science & Technology"));
    }

    #[test]
    fn test_parse_watch_page_related_order_and_duplicates() {
        let url = Url::parse("https://www.youtube.com/watch?v=first").unwrap();
        let fetched = parse_watch_page(WATCH_PAGE, &url, &ResourceId::new(url.as_str()));

        let related: Vec<&str> = fetched.related.iter().map(|r| r.as_str()).collect();
        assert_eq!(
            related,
            vec![
                "https://www.youtube.com/watch?v=second",
                "https://www.youtube.com/watch?v=third",
                "https://www.youtube.com/watch?v=second",
            ]
        );
    }

    #[test]
    fn test_parse_page_with_missing_fields() {
        let url = Url::parse("https://www.youtube.com/watch?v=bare").unwrap();
        let html = "<html><head><title>Only A Title - YouTube</title></head><body></body></html>";
        let fetched = parse_watch_page(html, &url, &ResourceId::new(url.as_str()));

        assert_eq!(fetched.record.title, "Only A Title");
        assert_eq!(fetched.record.view_count, 0);
        assert_eq!(fetched.record.like_count, 0);
        assert_eq!(fetched.record.dislike_count, None);
        assert!(fetched.related.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_resolves_opaque_id_against_base() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "first"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(WATCH_PAGE),
            )
            .mount(&mock_server)
            .await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let fetcher = PageFetcher::new(base).unwrap();
        let fetched = fetcher.fetch(&ResourceId::new("first")).await.unwrap();

        assert_eq!(fetched.record.title, "Rust in 100 Seconds");
        assert_eq!(fetched.related.len(), 3);
        assert!(fetched.related[0].as_str().starts_with(&mock_server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_maps_http_status_to_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let fetcher = PageFetcher::new(base).unwrap();

        let missing = fetcher
            .fetch(&ResourceId::new(&format!("{}/missing", mock_server.uri())))
            .await;
        assert!(matches!(missing, Err(FetchError::NotFound(_))));

        let busy = fetcher
            .fetch(&ResourceId::new(&format!("{}/busy", mock_server.uri())))
            .await;
        assert!(matches!(busy, Err(FetchError::RateLimited(_))));

        let broken = fetcher
            .fetch(&ResourceId::new(&format!("{}/broken", mock_server.uri())))
            .await;
        assert!(matches!(broken, Err(FetchError::Network(_))));
    }
}
