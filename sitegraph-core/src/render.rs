// Static documents rendered from the hierarchy and link graph

use crate::graph::{DependencyGraph, PageStatus};
use crate::hierarchy::HierarchyNode;
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const HIERARCHY_FILE: &str = "website_hierarchy_graph.html";
pub const DEPENDENCIES_FILE: &str = "all_dependencies.html";
pub const GRAPH_FILE: &str = "site_graph.html";
pub const JSON_FILE: &str = "site_graph.json";

const VIS_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/vis/4.21.0/vis.min.js";
const VIS_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/vis/4.21.0/vis.min.css";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
    All,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "all" => Some(OutputFormat::All),
            _ => None,
        }
    }

    fn includes_html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::All)
    }

    fn includes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }
}

/// Everything a renderer needs. `graph` is absent for hierarchy-only runs.
pub struct SiteReport<'a> {
    pub origin: &'a str,
    pub hierarchy: &'a HierarchyNode,
    pub graph: Option<&'a DependencyGraph>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> SiteReport<'a> {
    pub fn new(
        origin: &'a str,
        hierarchy: &'a HierarchyNode,
        graph: Option<&'a DependencyGraph>,
    ) -> Self {
        Self {
            origin,
            hierarchy,
            graph,
            generated_at: Utc::now(),
        }
    }

    fn footer(&self) -> String {
        format!(
            "<p class=\"footer\">Generated by sitegraph {} at {}</p>\n",
            env!("CARGO_PKG_VERSION"),
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Write the documents for `format` into `dir`, creating it if needed.
pub fn write_site_report(
    report: &SiteReport<'_>,
    dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if format.includes_html() {
        written.push(save_document(
            &generate_hierarchy_html(report),
            &dir.join(HIERARCHY_FILE),
        )?);

        if let Some(graph) = report.graph {
            written.push(save_document(
                &generate_dependencies_html(report, graph),
                &dir.join(DEPENDENCIES_FILE),
            )?);
            written.push(save_document(
                &generate_graph_html(report, graph),
                &dir.join(GRAPH_FILE),
            )?);
        }
    }

    if format.includes_json() {
        written.push(save_document(
            &generate_json_report(report)?,
            &dir.join(JSON_FILE),
        )?);
    }

    Ok(written)
}

fn save_document(content: &str, path: &Path) -> Result<PathBuf, RenderError> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    info!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// Nested box tree of the path hierarchy, numbered depth-first.
pub fn generate_hierarchy_html(report: &SiteReport<'_>) -> String {
    let mut html = String::new();
    html.push_str(&html_head("Website Hierarchy", HIERARCHY_STYLE, ""));
    html.push_str("<body>\n<h1>Website Hierarchy</h1>\n<div class=\"tree\">\n");

    let mut counter = 0usize;
    html.push_str(&format!(
        "<div class=\"node\" style=\"border-color: {};\">\n",
        level_color(0)
    ));
    html.push_str(&format!(
        "  <a href=\"{}\">Home{}</a>\n",
        escape_html(report.origin),
        dependency_arrow(report, report.origin)
    ));
    if !report.hierarchy.is_leaf() {
        html.push_str("  <div class=\"children\">\n");
        render_hierarchy_nodes(report, report.hierarchy, "", 1, &mut counter, &mut html);
        html.push_str("  </div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("</div>\n");
    html.push_str(&report.footer());
    html.push_str("</body>\n</html>\n");
    html
}

fn render_hierarchy_nodes(
    report: &SiteReport<'_>,
    node: &HierarchyNode,
    path: &str,
    level: usize,
    counter: &mut usize,
    html: &mut String,
) {
    for (segment, child) in node.children() {
        *counter += 1;
        let child_path = format!("{}/{}", path, segment);
        let url = format!("{}{}", report.origin, child_path);

        html.push_str(&format!(
            "<div class=\"node\" style=\"border-color: {};\">\n",
            level_color(level)
        ));
        html.push_str(&format!(
            "  <a href=\"{}\">{}: {}{}</a>\n",
            escape_html(&url),
            counter,
            escape_html(segment),
            dependency_arrow(report, &url)
        ));
        if !child.is_leaf() {
            html.push_str("  <div class=\"children\">\n");
            render_hierarchy_nodes(report, child, &child_path, level + 1, counter, html);
            html.push_str("  </div>\n");
        }
        html.push_str("</div>\n");
    }
}

/// Link into the dependency page when some other page links here.
fn dependency_arrow(report: &SiteReport<'_>, url: &str) -> String {
    let Some(graph) = report.graph else {
        return String::new();
    };

    match lookup_page(graph, url) {
        Some(page) if !graph.linked_from(page).is_empty() => format!(
            " <a href=\"{}#{}\">&#10132;</a>",
            DEPENDENCIES_FILE,
            escape_html(&page_anchor(page, report.origin))
        ),
        _ => String::new(),
    }
}

/// Hierarchy nodes are rebuilt from segments, so the sitemap may list the
/// same page with a trailing slash.
fn lookup_page<'g>(graph: &'g DependencyGraph, url: &str) -> Option<&'g str> {
    let pages = graph.forward();
    pages
        .get_key_value(url)
        .or_else(|| pages.get_key_value(format!("{}/", url).as_str()))
        .map(|(page, _)| page.as_str())
}

/// Inbound and outbound lists for every page.
pub fn generate_dependencies_html(report: &SiteReport<'_>, graph: &DependencyGraph) -> String {
    let mut html = String::new();
    html.push_str(&html_head("All Dependencies", DEPENDENCIES_STYLE, ""));
    html.push_str("<body>\n<h1>Page Dependencies</h1>\n");

    for page in graph.urls() {
        html.push_str(&format!(
            "<h2 id=\"{}\">Page: <a href=\"{}\">{}</a></h2>\n",
            escape_html(&page_anchor(page, report.origin)),
            escape_html(page),
            escape_html(page)
        ));

        html.push_str("<div class=\"tree\"><h3>Links to this page:</h3><ul>\n");
        let inbound = graph.linked_from(page);
        if inbound.is_empty() {
            html.push_str("<li>No pages link to this page.</li>\n");
        }
        for source in inbound {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(source),
                escape_html(source)
            ));
        }
        html.push_str("</ul></div>\n");

        html.push_str("<div class=\"tree\"><h3>This page links to:</h3><ul>\n");
        let outbound = graph.links_to(page);
        if outbound.is_empty() {
            html.push_str("<li>No outbound links from this page.</li>\n");
        }
        for target in outbound {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(target),
                escape_html(target)
            ));
        }
        html.push_str("</ul></div>\n");

        let external = graph.external_links(page);
        if external > 0 {
            html.push_str(&format!(
                "<p class=\"note\">{} link(s) to pages outside the sitemap not shown.</p>\n",
                external
            ));
        }
        if let Some(PageStatus::Skipped(reason) | PageStatus::Failed(reason)) = graph.status(page) {
            html.push_str(&format!(
                "<p class=\"note\">Not crawled: {}</p>\n",
                escape_html(&reason.to_string())
            ));
        }
    }

    html.push_str(&report.footer());
    html.push_str("</body>\n</html>\n");
    html
}

/// Searchable vis.js network with one node per page and one edge per link.
pub fn generate_graph_html(report: &SiteReport<'_>, graph: &DependencyGraph) -> String {
    let node_ids: indexmap::IndexMap<&str, usize> = graph
        .urls()
        .enumerate()
        .map(|(i, url)| (url, i + 1))
        .collect();

    let nodes: Vec<serde_json::Value> = node_ids
        .iter()
        .map(|(url, id)| {
            serde_json::json!({
                "id": id,
                "label": page_anchor(url, report.origin),
                "title": url,
                "url": url,
            })
        })
        .collect();

    let edges: Vec<serde_json::Value> = graph
        .edges()
        .filter_map(|(source, target)| {
            Some(serde_json::json!({
                "from": node_ids.get(source)?,
                "to": node_ids.get(target)?,
                "arrows": "to",
                "color": { "color": "#6495ED" },
            }))
        })
        .collect();

    let head_extra = format!(
        "<script type=\"text/javascript\" src=\"{}\"></script>\n\
         <link href=\"{}\" rel=\"stylesheet\" type=\"text/css\" />\n",
        VIS_JS, VIS_CSS
    );

    let mut html = String::new();
    html.push_str(&html_head("Site Link Graph", GRAPH_STYLE, &head_extra));
    html.push_str("<body>\n");
    html.push_str(&format!(
        "<h1>{} link graph</h1>\n",
        escape_html(report.origin)
    ));
    html.push_str(
        "<div id=\"search-container\">\n\
         <input type=\"text\" id=\"search-input\" placeholder=\"Search for a page...\" onkeyup=\"searchNode()\" />\n\
         </div>\n<div id=\"graph\"></div>\n",
    );
    html.push_str("<script type=\"text/javascript\">\n");
    html.push_str(&format!(
        "var nodes = new vis.DataSet({});\n",
        script_json(&serde_json::Value::Array(nodes))
    ));
    html.push_str(&format!(
        "var edges = new vis.DataSet({});\n",
        script_json(&serde_json::Value::Array(edges))
    ));
    html.push_str(GRAPH_SCRIPT);
    html.push_str("</script>\n");
    html.push_str(&report.footer());
    html.push_str("</body>\n</html>\n");
    html
}

/// Machine-readable export of both structures.
pub fn generate_json_report(report: &SiteReport<'_>) -> Result<String, serde_json::Error> {
    let pages = report.graph.map(|graph| {
        graph
            .urls()
            .map(|url| {
                serde_json::json!({
                    "url": url,
                    "linked_from": graph.linked_from(url),
                    "links_to": graph.links_to(url),
                    "external_links": graph.external_links(url),
                    "crawl": graph.status(url),
                })
            })
            .collect::<Vec<_>>()
    });

    let json_report = serde_json::json!({
        "metadata": {
            "generator": "sitegraph",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": report.generated_at.to_rfc3339(),
            "origin": report.origin,
        },
        "summary": {
            "hierarchy_nodes": report.hierarchy.len(),
            "hierarchy_depth": report.hierarchy.depth(),
            "pages": report.graph.map(|g| g.len()),
            "internal_links": report.graph.map(|g| g.edge_count()),
            "external_links": report.graph.map(|g| g.total_external_links()),
        },
        "hierarchy": report.hierarchy,
        "pages": pages,
    });

    serde_json::to_string_pretty(&json_report)
}

/// Plain-text tree of the hierarchy for terminals.
pub fn generate_text_tree(origin: &str, hierarchy: &HierarchyNode) -> String {
    let mut tree = String::new();
    tree.push_str(origin);
    tree.push('\n');
    render_text_nodes(hierarchy, "", &mut tree);
    tree
}

fn render_text_nodes(node: &HierarchyNode, prefix: &str, tree: &mut String) {
    let count = node.children().len();
    for (i, (segment, child)) in node.children().iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        tree.push_str(&format!("{}{}{}\n", prefix, branch, segment));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        render_text_nodes(child, &child_prefix, tree);
    }
}

/// Anchor id for a page: origin-relative path with `/` turned into `_`.
pub fn page_anchor(url: &str, origin: &str) -> String {
    let anchor = url.strip_prefix(origin).unwrap_or(url).replace('/', "_");
    if anchor.is_empty() {
        "_".to_string()
    } else {
        anchor
    }
}

fn level_color(level: usize) -> String {
    let step = (level * 50).min(255);
    format!("rgb({}, {}, 100)", step, 255 - step)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON safe to inline in a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn html_head(title: &str, style: &str, extra: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{}</title>\n<style>\n{}</style>\n{}</head>\n",
        escape_html(title),
        style,
        extra
    )
}

const HIERARCHY_STYLE: &str = r#"body { font-family: Arial, sans-serif; }
.tree { padding: 10px; }
.node { border-left: 4px solid #ccc; margin: 6px 0 6px 10px; padding: 4px 8px; }
.node > a { text-decoration: none; color: #333; font-size: 13px; }
.node > a:hover { color: #000; background: #c8e4f8; }
.children { margin-left: 20px; }
.footer { color: #999; font-size: 11px; margin-top: 30px; }
"#;

const DEPENDENCIES_STYLE: &str = r#"body { font-family: Arial, sans-serif; }
.tree ul { padding-top: 20px; position: relative; display: flex; flex-wrap: wrap; justify-content: center; }
.tree li { list-style-type: none; margin: 0 20px; text-align: center; position: relative; padding: 20px 5px 0 5px; }
.tree li a { border: 2px solid #ccc; padding: 5px 10px; text-decoration: none; color: #666; font-size: 12px; display: inline-block; border-radius: 5px; transition: all 0.5s; }
.tree li a:hover { background: #c8e4f8; color: #000; border: 2px solid #94a0b4; }
.note { color: #888; font-size: 12px; }
.footer { color: #999; font-size: 11px; margin-top: 30px; }
"#;

const GRAPH_STYLE: &str = r#"body { font-family: Arial, sans-serif; text-align: center; }
#graph { width: 100%; height: 800px; margin: 20px 0; }
#search-container { margin: 20px; }
#search-input { padding: 8px; width: 300px; font-size: 16px; }
.footer { color: #999; font-size: 11px; }
"#;

const GRAPH_SCRIPT: &str = r#"var container = document.getElementById('graph');
var data = { nodes: nodes, edges: edges };
var options = {
    nodes: { shape: 'dot', size: 15, font: { size: 12 }, borderWidth: 2 },
    edges: { width: 2, arrows: { to: { enabled: true, scaleFactor: 1.2 } }, smooth: { type: 'dynamic' } },
    interaction: { hover: true, tooltipDelay: 200 },
    physics: { enabled: true, stabilization: { iterations: 200 } }
};
var network = new vis.Network(container, data, options);

network.on("click", function (params) {
    if (params.nodes.length > 0) {
        var clicked = nodes.get(params.nodes[0]);
        if (clicked.url) {
            window.open(clicked.url, '_blank');
        }
    }
});

function searchNode() {
    var input = document.getElementById("search-input").value.toLowerCase();
    var found = nodes.get({
        filter: function (node) {
            return node.label.toLowerCase().includes(input);
        }
    });
    if (input.length > 0 && found.length > 0) {
        var ids = found.map(function (node) { return node.id; });
        network.selectNodes(ids);
        network.focus(ids[0], {
            scale: 1.2,
            animation: { duration: 500, easingFunction: "easeInOutQuad" }
        });
    } else {
        network.unselectAll();
    }
}
"#;
