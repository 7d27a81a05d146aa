// Tests for the map/tree handler helpers

use sitegraph::handlers::{MapOptions, display_path, load_sitemap, resolve_origin, run_map};
use sitegraph_core::render::{
    DEPENDENCIES_FILE, GRAPH_FILE, HIERARCHY_FILE, JSON_FILE, OutputFormat,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn write_sitemap(dir: &Path, urls: &[String]) -> std::path::PathBuf {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );
    for url in urls {
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", url));
    }
    xml.push_str("</urlset>\n");

    let sitemap = dir.join("sitemap.xml");
    fs::write(&sitemap, xml).unwrap();
    sitemap
}

fn options(sitemap: &Path, output_dir: &Path, format: OutputFormat) -> MapOptions {
    MapOptions {
        sitemap: sitemap.to_path_buf(),
        origin: None,
        selector: sitegraph_scanner::DEFAULT_LINK_SELECTOR.to_string(),
        output_dir: output_dir.to_path_buf(),
        format,
        workers: 2,
        timeout_secs: Some(5),
        user_agent: "sitegraph-tests".to_string(),
        resolve_relative: false,
        crawl: true,
    }
}

// ============================================================================
// display_path
// ============================================================================

#[test]
fn test_display_path_extracts_path() {
    assert_eq!(display_path("https://example.com/a/b?x=1"), "/a/b");
    assert_eq!(display_path("https://example.com"), "/");
    assert_eq!(display_path("https://example.com/"), "/");
}

#[test]
fn test_display_path_falls_back_to_input() {
    assert_eq!(display_path("not a url"), "not a url");
}

// ============================================================================
// resolve_origin
// ============================================================================

#[test]
fn test_resolve_origin_prefers_explicit() {
    let urls = vec!["https://other.org/page".to_string()];
    assert_eq!(
        resolve_origin(Some("https://example.com/"), &urls).unwrap(),
        "https://example.com"
    );
}

#[test]
fn test_resolve_origin_keeps_explicit_origin_as_typed() {
    let urls = vec!["https://Example.com:443/a/b".to_string()];
    let origin = resolve_origin(Some("https://Example.com:443"), &urls).unwrap();
    assert_eq!(origin, "https://Example.com:443");
    assert!(urls[0].starts_with(&origin));
}

#[test]
fn test_resolve_origin_rejects_invalid_explicit() {
    assert!(resolve_origin(Some("not a url"), &[]).is_err());
}

#[test]
fn test_resolve_origin_from_first_url() {
    let urls = vec![
        "https://www.example.com/a".to_string(),
        "https://cdn.example.com/b".to_string(),
    ];
    assert_eq!(
        resolve_origin(None, &urls).unwrap(),
        "https://www.example.com"
    );
}

#[test]
fn test_resolve_origin_from_first_url_keeps_host_case() {
    let urls = vec!["https://WWW.Example.com/a".to_string()];
    assert_eq!(
        resolve_origin(None, &urls).unwrap(),
        "https://WWW.Example.com"
    );
}

#[test]
fn test_resolve_origin_empty_sitemap_without_origin_fails() {
    assert!(resolve_origin(None, &[]).is_err());
    assert_eq!(
        resolve_origin(Some("https://example.com"), &[]).unwrap(),
        "https://example.com"
    );
}

// ============================================================================
// load_sitemap
// ============================================================================

#[test]
fn test_load_sitemap_reads_urls() {
    let dir = TempDir::new().unwrap();
    let urls = vec![
        "https://example.com/".to_string(),
        "https://example.com/about".to_string(),
    ];
    let sitemap = write_sitemap(dir.path(), &urls);

    assert_eq!(load_sitemap(&sitemap).unwrap(), urls);
}

#[test]
fn test_load_sitemap_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.xml");

    let err = load_sitemap(&missing).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.xml"));
}

// ============================================================================
// run_map
// ============================================================================

#[tokio::test]
async fn test_run_map_writes_all_documents() {
    let server = MockServer::start().await;
    let base = server.uri();
    let home = format!("{}/", base);
    let about = format!("{}/about/team", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(format!(
                    r#"<html><body><p class="link link-arrow"><a href="{}">Team</a></p></body></html>"#,
                    about
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about/team"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes("<html><body>team</body></html>"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sitemap = write_sitemap(dir.path(), &[home.clone(), about.clone()]);
    let out = dir.path().join("out");

    let summary = run_map(&options(&sitemap, &out, OutputFormat::All), None)
        .await
        .unwrap();

    assert_eq!(summary.origin, base);
    assert_eq!(summary.sitemap_urls, 2);
    assert_eq!(summary.hierarchy_nodes, 2);
    assert_eq!(summary.written.len(), 4);
    for file in [HIERARCHY_FILE, DEPENDENCIES_FILE, GRAPH_FILE, JSON_FILE] {
        assert!(out.join(file).exists(), "{} missing", file);
    }

    let graph = summary.graph.unwrap();
    assert_eq!(graph.linked_from(&about), &[home.clone()]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(JSON_FILE)).unwrap()).unwrap();
    assert_eq!(json["hierarchy"], serde_json::json!({"about": {"team": {}}}));
}

#[tokio::test]
async fn test_run_map_without_crawl_skips_network() {
    let dir = TempDir::new().unwrap();
    // Nothing listens here; a crawl would record failures, not abort
    let sitemap = write_sitemap(
        dir.path(),
        &[
            "http://127.0.0.1:9/".to_string(),
            "http://127.0.0.1:9/docs/intro".to_string(),
        ],
    );
    let out = dir.path().join("out");

    let mut opts = options(&sitemap, &out, OutputFormat::Html);
    opts.crawl = false;

    let summary = run_map(&opts, None).await.unwrap();
    assert!(summary.graph.is_none());
    assert_eq!(summary.written, vec![out.join(HIERARCHY_FILE)]);
    assert!(!out.join(DEPENDENCIES_FILE).exists());
}

#[tokio::test]
async fn test_run_map_rejects_bad_selector_before_reading() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(
        &dir.path().join("missing.xml"),
        dir.path(),
        OutputFormat::Html,
    );
    opts.selector = "p[".to_string();

    let err = run_map(&opts, None).await.unwrap_err();
    assert!(format!("{:#}", err).contains("p["));
}

#[tokio::test]
async fn test_run_map_malformed_sitemap_fails() {
    let dir = TempDir::new().unwrap();
    let sitemap = dir.path().join("sitemap.xml");
    fs::write(&sitemap, "<urlset><url><loc>https://example.com/</loc></url>").unwrap();

    let result = run_map(&options(&sitemap, dir.path(), OutputFormat::Json), None).await;
    assert!(result.is_err());
}
