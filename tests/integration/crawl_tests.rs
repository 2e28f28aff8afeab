//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, with downloads landing in a temporary
//! directory.

use chrono::Duration;
use paap_crawler::config::{Config, VisitedBackend, VisitedConfig};
use paap_crawler::crawler::Crawler;
use paap_crawler::visited::{MemoryVisitedSet, SqliteVisitedSet, VisitedSet};
use std::path::Path;
use std::sync::{Arc, Barrier};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seeds` into `download_dir`
fn create_test_config(seeds: Vec<String>, download_dir: &Path) -> Config {
    let mut config = Config::default();
    config.seeds = seeds;
    config.crawler.max_concurrent_visits = 4;
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.download_dir = download_dir.to_string_lossy().to_string();
    config
}

async fn mount_page(server: &MockServer, page: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

fn downloaded(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_file_link_is_downloaded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/docs/plan.xlsx">Programul anual al achizițiilor publice</a>
            <a href="/achizitii/">Achizitii publice</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/docs/plan.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04plan".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    // file links short-circuit navigation
    Mock::given(method("GET"))
        .and(path("/achizitii/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(vec![format!("{}/", server.uri())], dir.path());
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.files_saved, 1);
    assert_eq!(stats.links_enqueued, 0);
    assert_eq!(downloaded(&dir), vec!["plan.xlsx"]);
    assert_eq!(
        std::fs::read(dir.path().join("plan.xlsx")).unwrap(),
        b"PK\x03\x04plan"
    );
}

#[tokio::test]
async fn test_navigation_is_followed_to_files() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/achizitii/pagina2">achizitii publice</a>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/achizitii/pagina2",
        r#"<a href="anexa/paap-2024.ods">PAAP 2024</a>"#.to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/achizitii/anexa/paap-2024.ods"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ods".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()], dir.path());
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.links_enqueued, 1);
    assert_eq!(stats.files_saved, 1);
    assert_eq!(downloaded(&dir), vec!["paap-2024.ods"]);
}

#[tokio::test]
async fn test_cross_domain_links_are_not_followed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();

    // same server, different host name
    mount_page(
        &server,
        "/",
        format!(
            r#"<a href="http://localhost:{}/achizitii/alt-site">achizitii publice</a>"#,
            port
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/achizitii/alt-site"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()], dir.path());
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.links_cross_domain, 1);
    assert_eq!(stats.links_enqueued, 0);
}

#[tokio::test]
async fn test_unreachable_seed_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    mount_page(
        &server,
        "/",
        r#"<a href="/f/program.xls">Program achizitii</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/f/program.xls"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"xls".to_vec()))
        .mount(&server)
        .await;

    let config = create_test_config(
        vec![format!("http://127.0.0.1:{}/", dead_port), server.uri()],
        dir.path(),
    );
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.pages_skipped, 1);
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(downloaded(&dir), vec!["program.xls"]);
}

#[tokio::test]
async fn test_failed_file_does_not_abort_others() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"
            <a href="/f/a.xlsx">PAAP 2022</a>
            <a href="/f/b.xlsx">PAAP 2023</a>
            <a href="/f/c.xlsx">PAAP 2024</a>
        "#
        .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/f/b.xlsx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/f/[ac]\.xlsx$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()], dir.path());
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.files_found, 3);
    assert_eq!(stats.files_saved, 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(downloaded(&dir), vec!["a.xlsx", "c.xlsx"]);
}

#[tokio::test]
async fn test_percent_in_file_name_becomes_dash() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/docs/raport%202023.xlsx">Programul anual</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/docs/raport.*\.xlsx$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"r".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()], dir.path());
    Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(downloaded(&dir), vec!["raport-202023.xlsx"]);
}

#[tokio::test]
async fn test_each_page_is_crawled_once() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // pages link to each other and to themselves
    let hub = r#"
        <a href="/achizitii/a">achizitii publice</a>
        <a href="/achizitii/b">achizitii publice</a>
    "#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(hub, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    for page in ["/achizitii/a", "/achizitii/b"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_raw(hub, "text/html"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(vec![server.uri()], dir.path());
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.links_enqueued, 2);
    assert_eq!(stats.links_already_visited, 4);
}

#[tokio::test]
async fn test_depth_ceiling() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/achizitii/1">achizitii publice</a>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/achizitii/1",
        r#"<a href="/achizitii/2">achizitii publice</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/achizitii/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![server.uri()], dir.path());
    config.crawler.max_depth = 1;
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.links_too_deep, 1);
}

#[tokio::test]
async fn test_page_ceiling() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"
            <a href="/achizitii/1">achizitii publice</a>
            <a href="/achizitii/2">achizitii publice</a>
            <a href="/achizitii/3">achizitii publice</a>
        "#
        .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/achizitii/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/achizitii/[23]$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![server.uri()], dir.path());
    config.crawler.max_pages = 1;
    let stats = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.links_enqueued, 1);
    assert_eq!(stats.enqueue_failures, 2);
}

#[tokio::test]
async fn test_sqlite_visited_backend() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("visited.db");

    mount_page(
        &server,
        "/",
        r#"<a href="/achizitii/">achizitii publice</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/achizitii/", "<p>gol</p>".to_string()).await;

    let mut config = create_test_config(vec![server.uri()], dir.path());
    config.visited = VisitedConfig {
        backend: VisitedBackend::Sqlite,
        database_path: Some(db_path.to_string_lossy().to_string()),
    };

    // a second run resets the set and crawls the same pages again
    for _ in 0..2 {
        let stats = Crawler::new(config.clone()).unwrap().run().await.unwrap();
        assert_eq!(stats.pages_visited, 2);
        assert_eq!(stats.links_enqueued, 1);
    }

    let visited = SqliteVisitedSet::open(&db_path, Duration::hours(24)).unwrap();
    assert_eq!(visited.len().unwrap(), 1);
}

fn race_two_claims(visited: Arc<dyn VisitedSet>) -> usize {
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let visited = visited.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                visited.claim("https://mfe.gov.ro/achizitii/").unwrap()
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count()
}

#[test]
fn test_concurrent_claims_memory() {
    for _ in 0..50 {
        let visited: Arc<dyn VisitedSet> = Arc::new(MemoryVisitedSet::default());
        assert_eq!(race_two_claims(visited), 1);
    }
}

#[test]
fn test_concurrent_claims_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("visited.db");

    let first = SqliteVisitedSet::open(&db_path, Duration::hours(24)).unwrap();
    let second = SqliteVisitedSet::open(&db_path, Duration::hours(24)).unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|visited| {
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                visited.claim("https://mfe.gov.ro/achizitii/").unwrap()
            })
        })
        .collect();

    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(wins, 1);
}
