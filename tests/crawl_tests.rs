//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawls
//! end-to-end through `run_crawl`.

use kite_crawler::config::CrawlConfig;
use kite_crawler::crawler::run_crawl;
use kite_crawler::state::PageState;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, at: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(server)
        .await;
}

fn config(server: &MockServer, max_depth: u32) -> CrawlConfig {
    CrawlConfig::builder(server.uri())
        .max_depth(max_depth)
        .delay(Duration::ZERO)
        .request_timeout(Duration::from_secs(5))
        .build()
        .expect("valid test config")
}

#[tokio::test]
async fn test_depth_one_crawl_skips_external_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="{}/page2">Page 2</a>
            <a href="https://external.test/elsewhere">Elsewhere</a>
            </body></html>"#,
            base
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<html><body><a href="/page1/deeper">Deeper</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/page2",
        "<html><body><p>Two</p></body></html>".to_string(),
        1,
    )
    .await;
    mount_page(&server, "/page1/deeper", "<p>never</p>".to_string(), 0).await;

    let result = run_crawl(config(&server, 1), Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 3);
    let urls: Vec<&str> = result.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
        ]
    );
    assert_eq!(result.records[0].title, "Home");
    assert_eq!(result.records[0].depth, 0);
    assert_eq!(result.records[1].depth, 1);

    // Present in the aggregate list, never fetched
    assert!(result
        .links
        .contains(&"https://external.test/elsewhere".to_string()));
    assert_eq!(result.visited_urls, 3);
    for record in &result.records {
        assert!(record.url.starts_with(&base));
    }
}

#[tokio::test]
async fn test_robots_disallowed_link_is_never_fetched() {
    let server = MockServer::start().await;

    mount_robots(&server, "User-agent: *\nDisallow: /private/\n".to_string()).await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/public", "<p>public</p>".to_string(), 1).await;
    mount_page(&server, "/private/secret", "<p>secret</p>".to_string(), 0).await;

    let result = run_crawl(config(&server, 2), Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 2);
    assert!(result
        .records
        .iter()
        .all(|r| !r.url.contains("/private/")));
    assert!(result
        .links
        .contains(&format!("{}/private/secret", server.uri())));
    assert_eq!(result.stats.count(PageState::RobotsDenied), 1);
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;

    mount_robots(&server, "User-agent: *\nDisallow: /\n".to_string()).await;
    mount_page(&server, "/", "<p>home</p>".to_string(), 1).await;

    let config = CrawlConfig::builder(server.uri())
        .max_depth(0)
        .delay(Duration::ZERO)
        .respect_robots(false)
        .build()
        .unwrap();
    let result = run_crawl(config, Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 1);
}

#[tokio::test]
async fn test_inter_request_delay_is_enforced() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/a", "<p>a</p>".to_string(), 1).await;
    mount_page(&server, "/b", "<p>b</p>".to_string(), 1).await;

    let config = CrawlConfig::builder(server.uri())
        .max_depth(1)
        .delay(Duration::from_millis(500))
        .build()
        .unwrap();

    let start = Instant::now();
    let result = run_crawl(config, Vec::new()).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result.pages_scraped, 3);
    assert!(
        elapsed >= Duration::from_millis(1000),
        "three fetches at 0.5s spacing took only {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_robots_crawl_delay_raises_spacing() {
    let server = MockServer::start().await;

    mount_robots(&server, "User-agent: *\nCrawl-delay: 1\n".to_string()).await;
    mount_page(&server, "/", r#"<a href="/a">a</a>"#.to_string(), 1).await;
    mount_page(&server, "/a", "<p>a</p>".to_string(), 1).await;

    let start = Instant::now();
    let result = run_crawl(config(&server, 1), Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 2);
    assert!(start.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_sitemap_declared_in_robots_seeds_frontier() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("User-agent: *\nSitemap: {}/index.xml\n", base)).await;
    Mock::given(method("GET"))
        .and(path("/index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <sitemap><loc>{0}/pages.xml</loc></sitemap></sitemapindex>"#,
                base
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>{0}/docs</loc></url><url><loc>{0}/blog</loc></url></urlset>"#,
                base
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    mount_page(&server, "/docs", "<p>docs</p>".to_string(), 1).await;
    mount_page(&server, "/blog", "<p>blog</p>".to_string(), 1).await;
    mount_page(&server, "/", "<p>home</p>".to_string(), 0).await;

    let config = CrawlConfig::builder(base.clone())
        .max_depth(0)
        .delay(Duration::ZERO)
        .use_sitemap(true)
        .build()
        .unwrap();
    let result = run_crawl(config, Vec::new()).await.unwrap();

    let urls: Vec<&str> = result.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/docs", base), format!("{}/blog", base)]);
}

#[tokio::test]
async fn test_robots_and_sitemap_fetches_are_paced() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, format!("User-agent: *\nSitemap: {}/index.xml\n", base)).await;
    Mock::given(method("GET"))
        .and(path("/index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<sitemapindex><sitemap><loc>{0}/one.xml</loc></sitemap>
                <sitemap><loc>{0}/two.xml</loc></sitemap></sitemapindex>"#,
                base
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    for (at, page) in [("/one.xml", "/docs"), ("/two.xml", "/docs")] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!(r#"<urlset><url><loc>{}{}</loc></url></urlset>"#, base, page),
                "application/xml",
            ))
            .mount(&server)
            .await;
    }
    mount_page(&server, "/docs", "<p>docs</p>".to_string(), 1).await;

    let config = CrawlConfig::builder(base.clone())
        .max_depth(0)
        .delay(Duration::from_millis(300))
        .use_sitemap(true)
        .build()
        .unwrap();

    let start = Instant::now();
    let result = run_crawl(config, Vec::new()).await.unwrap();
    let elapsed = start.elapsed();

    // robots.txt, three sitemap documents and one page: four gaps
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 5);
    assert_eq!(result.pages_scraped, 1);
    assert!(
        elapsed >= Duration::from_millis(1200),
        "five fetches at 0.3s spacing took only {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_sitemap_discovered_at_conventional_path() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<urlset><url><loc>{0}/only</loc></url></urlset>"#,
                base
            ),
            "application/xml",
        ))
        .mount(&server)
        .await;
    mount_page(&server, "/only", "<p>only</p>".to_string(), 1).await;

    let config = CrawlConfig::builder(base.clone())
        .max_depth(0)
        .delay(Duration::ZERO)
        .use_sitemap(true)
        .build()
        .unwrap();
    let result = run_crawl(config, Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.records[0].url, format!("{}/only", base));
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_the_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/broken">broken</a><a href="/report.pdf">pdf</a><a href="/fine">fine</a>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/fine", "<p>fine</p>".to_string(), 1).await;

    let result = run_crawl(config(&server, 1), Vec::new()).await.unwrap();

    assert_eq!(result.pages_scraped, 2);
    assert_eq!(result.visited_urls, 4);
    assert_eq!(result.stats.count(PageState::FetchFailed), 2);
}

#[tokio::test]
async fn test_redirect_target_is_recorded_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/old">old</a><a href="/new">new</a>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<title>New</title>".to_string(), 1).await;

    let result = run_crawl(config(&server, 1), Vec::new()).await.unwrap();

    let urls: Vec<&str> = result.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/new", base)]);
    assert_eq!(result.records[1].title, "New");
    assert_eq!(result.stats.count(PageState::AlreadyVisited), 1);
}

#[tokio::test]
async fn test_explicit_seeds_replace_base_url() {
    let server = MockServer::start().await;

    mount_page(&server, "/about", "<p>about</p>".to_string(), 1).await;
    mount_page(&server, "/team", "<p>team</p>".to_string(), 1).await;
    mount_page(&server, "/", "<p>home</p>".to_string(), 0).await;

    let seeds = vec!["/about".to_string(), format!("{}/team/", server.uri())];
    let result = run_crawl(config(&server, 0), seeds).await.unwrap();

    assert_eq!(result.pages_scraped, 2);
}
