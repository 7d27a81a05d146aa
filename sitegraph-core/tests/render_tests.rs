// Tests for writing rendered documents to disk

use sitegraph_core::graph::DependencyGraph;
use sitegraph_core::hierarchy::build_hierarchy;
use sitegraph_core::graph::build_dependency_graph;
use sitegraph_core::render::{
    DEPENDENCIES_FILE, GRAPH_FILE, HIERARCHY_FILE, JSON_FILE, OutputFormat, SiteReport,
    generate_dependencies_html, generate_graph_html, generate_hierarchy_html, write_site_report,
};
use sitegraph_scanner::{FetchFailure, FetchOutcome, LinkSource};
use std::fs;
use tempfile::TempDir;

const ORIGIN: &str = "https://example.com";

struct FixedLinks;

impl LinkSource for FixedLinks {
    async fn fetch_links(&self, url: &str) -> FetchOutcome {
        match url {
            "https://example.com/" => FetchOutcome::Success(vec![
                "https://example.com/about".to_string(),
                "https://example.com/a<b>".to_string(),
            ]),
            "https://example.com/about" => {
                FetchOutcome::Success(vec!["https://example.com/".to_string()])
            }
            _ => FetchOutcome::Success(Vec::new()),
        }
    }
}

fn urls() -> Vec<String> {
    vec![
        "https://example.com/".to_string(),
        "https://example.com/about".to_string(),
        "https://example.com/a<b>".to_string(),
        "https://example.com/lonely".to_string(),
    ]
}

async fn crawled() -> DependencyGraph {
    build_dependency_graph(&urls(), FixedLinks).await
}

#[tokio::test]
async fn test_write_all_formats() {
    let graph = crawled().await;
    let tree = build_hierarchy(&urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, Some(&graph));

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("out");
    let written = write_site_report(&report, &out, OutputFormat::All).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![HIERARCHY_FILE, DEPENDENCIES_FILE, GRAPH_FILE, JSON_FILE]);
    for path in &written {
        assert!(path.exists(), "{} was not written", path.display());
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(JSON_FILE)).unwrap()).unwrap();
    assert_eq!(json["summary"]["pages"], 4);
    assert_eq!(json["summary"]["internal_links"], 3);
    assert_eq!(json["pages"][1]["url"], "https://example.com/about");
    assert_eq!(json["pages"][1]["linked_from"][0], "https://example.com/");
    assert_eq!(json["pages"][0]["crawl"]["status"], "crawled");
}

#[tokio::test]
async fn test_hierarchy_only_run_writes_one_document() {
    let tree = build_hierarchy(&urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, None);

    let dir = TempDir::new().unwrap();
    let written = write_site_report(&report, dir.path(), OutputFormat::Html).unwrap();

    assert_eq!(written, vec![dir.path().join(HIERARCHY_FILE)]);
    assert!(!dir.path().join(DEPENDENCIES_FILE).exists());
}

#[tokio::test]
async fn test_dependencies_html_lists_both_directions() {
    let graph = crawled().await;
    let tree = build_hierarchy(&urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, Some(&graph));

    let html = generate_dependencies_html(&report, &graph);

    assert!(html.contains("<h2 id=\"_about\">"));
    assert!(html.contains("No pages link to this page."));
    assert!(html.contains("No outbound links from this page."));
    assert!(html.contains("https://example.com/a&lt;b&gt;"));
    assert!(!html.contains("a<b>"));
}

#[tokio::test]
async fn test_graph_html_embeds_nodes_and_edges() {
    let graph = crawled().await;
    let tree = build_hierarchy(&urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, Some(&graph));

    let html = generate_graph_html(&report, &graph);

    assert!(html.contains("vis.min.js"));
    assert!(html.contains(r#""url":"https://example.com/lonely""#));
    // home (1) -> about (2), home (1) -> a<b> (3), about (2) -> home (1)
    assert_eq!(html.matches(r#""arrows":"to""#).count(), 3);
    assert!(html.contains(r#""from":1"#));
}

/// Sitemap that lists its section page with a trailing slash; that page errors.
struct SlashedSection;

impl LinkSource for SlashedSection {
    async fn fetch_links(&self, url: &str) -> FetchOutcome {
        match url {
            "https://example.com/" => {
                FetchOutcome::Success(vec!["https://example.com/docs/".to_string()])
            }
            _ => FetchOutcome::Failure(FetchFailure::Status { status: 503 }),
        }
    }
}

fn slashed_urls() -> Vec<String> {
    vec![
        "https://example.com/".to_string(),
        "https://example.com/docs/".to_string(),
    ]
}

#[tokio::test]
async fn test_hierarchy_links_trailing_slash_pages_to_dependencies() {
    let graph = build_dependency_graph(&slashed_urls(), SlashedSection).await;
    let tree = build_hierarchy(&slashed_urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, Some(&graph));

    let html = generate_hierarchy_html(&report);

    assert!(html.contains(&format!("{}#_docs_", DEPENDENCIES_FILE)));
    // Nothing links to the home page, so it gets no arrow
    assert_eq!(html.matches(DEPENDENCIES_FILE).count(), 1);
}

#[tokio::test]
async fn test_dependencies_html_notes_failed_pages() {
    let graph = build_dependency_graph(&slashed_urls(), SlashedSection).await;
    let tree = build_hierarchy(&slashed_urls(), ORIGIN);
    let report = SiteReport::new(ORIGIN, &tree, Some(&graph));

    let html = generate_dependencies_html(&report, &graph);

    assert_eq!(html.matches("Not crawled: HTTP status 503").count(), 1);
}
