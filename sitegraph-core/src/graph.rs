// Page-to-page link graph discovered by crawling the sitemap

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Serialize;
use sitegraph_scanner::{FetchFailure, FetchOutcome, LinkSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called once per page as its outcome is folded in: (done, total, url).
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// How a page's crawl went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PageStatus {
    Pending,
    Crawled,
    /// Reachable, but not something links can be scraped from.
    Skipped(FetchFailure),
    Failed(FetchFailure),
}

/// Forward (inbound) and reverse (outbound) adjacency between sitemap pages.
///
/// Every sitemap URL is a key of both maps, in sitemap order. Links that
/// point outside the sitemap are only counted in `external`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    forward: IndexMap<String, Vec<String>>,
    reverse: IndexMap<String, Vec<String>>,
    external: IndexMap<String, usize>,
    status: IndexMap<String, PageStatus>,
}

impl DependencyGraph {
    /// Graph with every URL present and no edges.
    pub fn with_pages(urls: &[String]) -> Self {
        let mut graph = Self {
            forward: IndexMap::with_capacity(urls.len()),
            reverse: IndexMap::with_capacity(urls.len()),
            external: IndexMap::with_capacity(urls.len()),
            status: IndexMap::with_capacity(urls.len()),
        };

        for url in urls {
            if graph.forward.contains_key(url) {
                debug!("Duplicate sitemap entry {}", url);
                continue;
            }
            graph.forward.insert(url.clone(), Vec::new());
            graph.reverse.insert(url.clone(), Vec::new());
            graph.external.insert(url.clone(), 0);
            graph.status.insert(url.clone(), PageStatus::Pending);
        }

        graph
    }

    /// Sitemap pages in sitemap order, duplicates removed.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.forward.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pages `url` links to (outbound).
    pub fn links_to(&self, url: &str) -> &[String] {
        self.reverse.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pages linking to `url` (inbound).
    pub fn linked_from(&self, url: &str) -> &[String] {
        self.forward.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn forward(&self) -> &IndexMap<String, Vec<String>> {
        &self.forward
    }

    pub fn reverse(&self) -> &IndexMap<String, Vec<String>> {
        &self.reverse
    }

    /// Outbound links from `url` that were dropped for leaving the sitemap.
    pub fn external_links(&self, url: &str) -> usize {
        self.external.get(url).copied().unwrap_or(0)
    }

    pub fn total_external_links(&self) -> usize {
        self.external.values().sum()
    }

    pub fn status(&self, url: &str) -> Option<&PageStatus> {
        self.status.get(url)
    }

    /// (source, target) pairs in crawl order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reverse.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |target| (source.as_str(), target.as_str()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.reverse.values().map(Vec::len).sum()
    }

    /// Pages whose fetch did not produce links, skipped ones included.
    pub fn unreached(&self) -> impl Iterator<Item = (&str, &FetchFailure)> {
        self.status.iter().filter_map(|(url, status)| match status {
            PageStatus::Skipped(reason) | PageStatus::Failed(reason) => {
                Some((url.as_str(), reason))
            }
            _ => None,
        })
    }

    fn record(&mut self, url: &str, outcome: FetchOutcome) {
        let status = match outcome {
            FetchOutcome::Success(links) => {
                let mut external = 0usize;
                for link in links {
                    match self.forward.get_mut(&link) {
                        Some(inbound) => {
                            inbound.push(url.to_string());
                            if let Some(outbound) = self.reverse.get_mut(url) {
                                outbound.push(link);
                            }
                        }
                        None => external += 1,
                    }
                }
                if let Some(count) = self.external.get_mut(url) {
                    *count += external;
                }
                PageStatus::Crawled
            }
            FetchOutcome::Failure(reason) if reason.is_skip() => {
                info!("Skipping {}: {}", url, reason);
                PageStatus::Skipped(reason)
            }
            FetchOutcome::Failure(reason) => {
                warn!("Error crawling {}: {}", url, reason);
                PageStatus::Failed(reason)
            }
        };

        if let Some(slot) = self.status.get_mut(url) {
            *slot = status;
        }
    }
}

/// Crawls every sitemap page through a [`LinkSource`] and folds the links
/// into a [`DependencyGraph`].
pub struct GraphBuilder<S> {
    source: S,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<S: LinkSource> GraphBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            workers: 1,
            progress_callback: None,
        }
    }

    /// Keep up to `workers` fetches in flight. Outcomes are still applied in
    /// sitemap order, so the graph matches a sequential run.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn build(&self, urls: &[String]) -> DependencyGraph {
        let mut graph = DependencyGraph::with_pages(urls);
        let pages: Vec<String> = graph.urls().map(str::to_string).collect();
        let total = pages.len();

        info!("Crawling {} pages with {} worker(s)", total, self.workers);

        let mut outcomes = stream::iter(pages.iter())
            .map(|url| async move { (url, self.source.fetch_links(url).await) })
            .buffered(self.workers);

        let mut done = 0usize;
        while let Some((url, outcome)) = outcomes.next().await {
            done += 1;
            if let Some(ref callback) = self.progress_callback {
                callback(done, total, url.as_str());
            }
            graph.record(url.as_str(), outcome);
        }

        info!(
            "Crawl complete. {} pages, {} internal links, {} external links dropped",
            graph.len(),
            graph.edge_count(),
            graph.total_external_links()
        );

        graph
    }
}

/// Sequential crawl of `urls` through `source`.
///
/// A URL listed more than once in the sitemap is fetched once, at its first
/// position; later repeats add no edges.
pub async fn build_dependency_graph<S: LinkSource>(
    urls: &[String],
    source: S,
) -> DependencyGraph {
    GraphBuilder::new(source).build(urls).await
}
