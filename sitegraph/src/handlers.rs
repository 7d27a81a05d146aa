use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitegraph_core::graph::{DependencyGraph, GraphBuilder, ProgressCallback};
use sitegraph_core::hierarchy::{build_hierarchy, derive_origin};
use sitegraph_core::render::{OutputFormat, SiteReport, generate_text_tree, write_site_report};
use sitegraph_core::sitemap::read_sitemap_file;
use sitegraph_scanner::{FetcherConfig, HttpLinkSource, LinkExtractor, PageFetcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Settings for one `map` run.
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub sitemap: PathBuf,
    pub origin: Option<String>,
    pub selector: String,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub workers: usize,
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    pub resolve_relative: bool,
    pub crawl: bool,
}

/// What a `map` run produced, for the closing summary.
#[derive(Debug)]
pub struct MapSummary {
    pub origin: String,
    pub sitemap_urls: usize,
    pub hierarchy_nodes: usize,
    pub graph: Option<DependencyGraph>,
    pub written: Vec<PathBuf>,
}

/// Log to stderr; `RUST_LOG` wins over the `--verbose` default.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Expand `~` in a user supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Read the sitemap, attaching the path to any failure.
pub fn load_sitemap(path: &Path) -> Result<Vec<String>> {
    read_sitemap_file(path).with_context(|| format!("Failed to load sitemap {}", path.display()))
}

/// The prefix stripped from sitemap URLs when building the hierarchy.
///
/// An explicit origin must parse as a URL and is used as typed, minus trailing
/// slashes; otherwise the scheme and authority of the first sitemap URL.
pub fn resolve_origin(explicit: Option<&str>, urls: &[String]) -> Result<String> {
    if let Some(origin) = explicit {
        Url::parse(origin).with_context(|| format!("Invalid --origin '{}'", origin))?;
        return Ok(origin.trim_end_matches('/').to_string());
    }

    let Some(first) = urls.first() else {
        bail!("The sitemap lists no URLs; pass --origin to render an empty hierarchy");
    };

    derive_origin(first).with_context(|| format!("Cannot derive a site origin from '{}'", first))
}

/// Path component of a URL for progress display.
pub fn display_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

pub fn map_options_from_matches(sub_matches: &ArgMatches) -> Result<MapOptions> {
    let sitemap = sub_matches
        .get_one::<String>("SITEMAP")
        .context("A sitemap path is required")?;
    let output_dir = sub_matches
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or(".");
    let format_name = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("html");
    let format = OutputFormat::from_str(format_name)
        .with_context(|| format!("Unknown output format '{}'", format_name))?;

    Ok(MapOptions {
        sitemap: expand_path(sitemap),
        origin: sub_matches.get_one::<String>("origin").cloned(),
        selector: sub_matches
            .get_one::<String>("selector")
            .cloned()
            .unwrap_or_else(|| sitegraph_scanner::DEFAULT_LINK_SELECTOR.to_string()),
        output_dir: expand_path(output_dir),
        format,
        workers: *sub_matches.get_one::<usize>("workers").unwrap_or(&1),
        timeout_secs: sub_matches.get_one::<u64>("timeout").copied(),
        user_agent: sub_matches
            .get_one::<String>("user-agent")
            .cloned()
            .unwrap_or_else(|| sitegraph_scanner::fetcher::DEFAULT_USER_AGENT.to_string()),
        resolve_relative: sub_matches.get_flag("resolve-relative"),
        crawl: !sub_matches.get_flag("no-crawl"),
    })
}

/// Sitemap -> hierarchy (+ crawled link graph) -> documents on disk.
pub async fn run_map(
    options: &MapOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<MapSummary> {
    // Surface a bad selector before any IO happens
    let extractor = LinkExtractor::new(&options.selector)?
        .with_resolve_relative(options.resolve_relative);

    let urls = load_sitemap(&options.sitemap)?;
    let origin = resolve_origin(options.origin.as_deref(), &urls)?;
    info!("{} URLs in sitemap, origin {}", urls.len(), origin);

    let hierarchy = build_hierarchy(&urls, &origin);

    let graph = if options.crawl {
        let mut config = FetcherConfig::default().with_user_agent(options.user_agent.as_str());
        if let Some(secs) = options.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        let fetcher = PageFetcher::with_config(config)?;

        let mut builder = GraphBuilder::new(HttpLinkSource::new(fetcher, extractor))
            .with_workers(options.workers);
        if let Some(callback) = progress_callback {
            builder = builder.with_progress_callback(callback);
        }
        Some(builder.build(&urls).await)
    } else {
        None
    };

    let report = SiteReport::new(&origin, &hierarchy, graph.as_ref());
    let written = write_site_report(&report, &options.output_dir, options.format)
        .with_context(|| format!("Failed to write output to {}", options.output_dir.display()))?;

    Ok(MapSummary {
        sitemap_urls: urls.len(),
        hierarchy_nodes: hierarchy.len(),
        origin,
        graph,
        written,
    })
}

pub async fn handle_map(sub_matches: &ArgMatches, quiet: bool) {
    let options = match map_options_from_matches(sub_matches) {
        Ok(options) => options,
        Err(e) => exit_with_error(&e),
    };

    if !quiet {
        println!(
            "{} Mapping {}",
            "→".blue(),
            options.sitemap.display().to_string().bright_white()
        );
        println!("  Selector: {}", options.selector.cyan());
        println!("  Workers:  {}", options.workers.to_string().cyan());
        if !options.crawl {
            println!("  Crawl:    {}", "disabled (hierarchy only)".yellow());
        }
        println!();
    }

    let progress_bar = if options.crawl && !quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let progress_callback: Option<ProgressCallback> = progress_bar.clone().map(|pb| {
        let callback: ProgressCallback = Arc::new(move |done: usize, total: usize, url: &str| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
            pb.set_message(display_path(url));
        });
        callback
    });

    let result = run_map(&options, progress_callback).await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    match result {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
        }
        Err(e) => exit_with_error(&e),
    }
}

pub fn handle_tree(sub_matches: &ArgMatches) {
    let Some(sitemap) = sub_matches.get_one::<String>("SITEMAP") else {
        exit_with_error(&anyhow::anyhow!("A sitemap path is required"));
    };

    let tree = load_sitemap(&expand_path(sitemap)).and_then(|urls| {
        let origin = resolve_origin(
            sub_matches.get_one::<String>("origin").map(String::as_str),
            &urls,
        )?;
        Ok(generate_text_tree(&origin, &build_hierarchy(&urls, &origin)))
    });

    match tree {
        Ok(tree) => print!("{}", tree),
        Err(e) => exit_with_error(&e),
    }
}

pub fn print_summary(summary: &MapSummary) {
    println!("{} Map complete!\n", "✓".green().bold());
    println!("# Summary:");
    println!("  Origin:           {}", summary.origin.bright_white());
    println!("  Sitemap URLs:     {}", summary.sitemap_urls);
    println!("  Hierarchy nodes:  {}", summary.hierarchy_nodes);

    if let Some(ref graph) = summary.graph {
        println!("  Pages crawled:    {}", graph.len());
        println!("  Internal links:   {}", graph.edge_count());
        println!("  External links:   {}", graph.total_external_links());

        let unreached: Vec<_> = graph.unreached().collect();
        if !unreached.is_empty() {
            println!(
                "\n{} {} page(s) contributed no links:",
                "⚠".yellow().bold(),
                unreached.len()
            );
            for (url, reason) in unreached {
                println!("  {} {} {}", "•".yellow(), url, reason.to_string().bright_black());
            }
        }
    }

    println!();
    for path in &summary.written {
        println!("{} {}", "✓".green(), path.display().to_string().bright_white());
    }
}

fn exit_with_error(error: &anyhow::Error) -> ! {
    eprintln!("{} {:#}", "✗".red().bold(), error);
    std::process::exit(1);
}
