use colored::Colorize;

pub mod graph;
pub mod hierarchy;
pub mod render;
pub mod sitemap;

pub use graph::{DependencyGraph, GraphBuilder, PageStatus, build_dependency_graph};
pub use hierarchy::{HierarchyBuilder, HierarchyNode, build_hierarchy, derive_origin};
pub use render::{OutputFormat, RenderError, SiteReport, write_site_report};
pub use sitemap::{SitemapError, parse_sitemap, read_sitemap_file};

pub fn print_banner() {
    println!(
        "{}",
        r#"
     _ _                              _
 ___(_) |_ ___  __ _ _ __ __ _ _ __ | |__
/ __| | __/ _ \/ _` | '__/ _` | '_ \| '_ \
\__ \ | ||  __/ (_| | | | (_| | |_) | | | |
|___/_|\__\___|\__, |_|  \__,_| .__/|_| |_|
               |___/          |_|
"#
        .bright_cyan()
        .bold()
    );
    println!(
        "  {} {}\n",
        "sitemap hierarchy & link dependency mapper".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
