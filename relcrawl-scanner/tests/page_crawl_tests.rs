// End-to-end crawl over scraped watch pages

use relcrawl_scanner::{Crawler, PageFetcher};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn page(title: &str, related: &[&str]) -> String {
    let links: String = related
        .iter()
        .map(|href| format!(r#"<a class="content-link" href="{}">x</a>"#, href))
        .collect();
    format!(
        r#"<html><body><div id="content"><span class="watch-title" title="{}"></span>{}</div></body></html>"#,
        title, links
    )
}

async fn mount(server: &MockServer, video: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", video))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cyclic_pages_are_each_fetched_once() {
    let server = MockServer::start().await;
    let absolute_a = format!("{}/watch?v=a#comments", server.uri());

    // a -> {b, c}, b -> {c, a}, c -> {a (absolute), b (with playlist noise)}
    mount(&server, "a", page("A", &["/watch?v=b", "/watch?v=c"])).await;
    mount(&server, "b", page("B", &["/watch?v=c", "/watch?v=a"])).await;
    mount(&server, "c", page("C", &[absolute_a.as_str(), "/watch?v=b&list=PL9"])).await;

    let base = Url::parse(&server.uri()).unwrap();
    let fetcher = Arc::new(PageFetcher::new(base).unwrap());
    let seed = format!("{}/watch?v=a", server.uri());

    let summary = Crawler::new(fetcher)
        .with_max_depth(4)
        .with_max_fanout(5)
        .crawl_with_summary(&seed)
        .await
        .unwrap();

    let titles: HashSet<&str> = summary.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, HashSet::from(["A", "B", "C"]));
    assert_eq!(summary.records.len(), 3);
    assert_eq!(summary.visited, 3);
    assert_eq!(summary.failed, 0);
    // `.expect(1)` on each mock is verified when the server drops
}

#[tokio::test]
async fn test_missing_page_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount(&server, "root", page("Root", &["/watch?v=gone", "/watch?v=ok"])).await;
    mount(&server, "ok", page("Ok", &[])).await;

    let base = Url::parse(&server.uri()).unwrap();
    let fetcher = Arc::new(PageFetcher::new(base).unwrap());

    let summary = Crawler::new(fetcher)
        .with_max_depth(1)
        .crawl_with_summary("root")
        .await
        .unwrap();

    let titles: HashSet<&str> = summary.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, HashSet::from(["Root", "Ok"]));
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_bare_seed_is_not_revisited_through_its_own_links() {
    let server = MockServer::start().await;
    // Relative, absolute-on-base and short-link spellings of the same video
    let on_base = format!("{}/watch?v=a&t=10s", server.uri());
    mount(
        &server,
        "a",
        page("A", &["/watch?v=a", on_base.as_str(), "https://youtu.be/a"]),
    )
    .await;

    let base = Url::parse(&server.uri()).unwrap();
    let fetcher = Arc::new(PageFetcher::new(base).unwrap());

    let summary = Crawler::new(fetcher)
        .with_max_depth(5)
        .crawl_with_summary("a")
        .await
        .unwrap();

    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.visited, 1);
    assert_eq!(
        summary.records[0].id.as_str(),
        format!("{}/watch?v=a", server.uri())
    );
}
