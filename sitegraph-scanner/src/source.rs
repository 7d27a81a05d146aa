use crate::error::ScanError;
use crate::extractor::LinkExtractor;
use crate::fetcher::PageFetcher;
use crate::result::{FetchFailure, FetchOutcome, FetchedPage};
use std::future::Future;
use tracing::debug;

/// Anything that can turn a page URL into its outbound links.
///
/// The graph builder only talks to this trait, so crawls can be replayed
/// against fixed link lists without a network.
pub trait LinkSource {
    fn fetch_links(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// Live link source: one HTTP fetch followed by selector-based extraction.
pub struct HttpLinkSource {
    fetcher: PageFetcher,
    extractor: LinkExtractor,
}

impl HttpLinkSource {
    pub fn new(fetcher: PageFetcher, extractor: LinkExtractor) -> Self {
        Self { fetcher, extractor }
    }
}

impl LinkSource for HttpLinkSource {
    async fn fetch_links(&self, url: &str) -> FetchOutcome {
        match self.fetcher.fetch(url).await {
            Ok(FetchedPage::Html(body)) => {
                let links = self.extractor.extract(&body, url);
                debug!("{} links matched on {}", links.len(), url);
                FetchOutcome::Success(links)
            }
            Ok(FetchedPage::NotHtml { content_type }) => {
                FetchOutcome::Failure(FetchFailure::NotHtml { content_type })
            }
            Err(e) => FetchOutcome::Failure(e.into()),
        }
    }
}

impl From<ScanError> for FetchFailure {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::StatusError { status, .. } => FetchFailure::Status { status },
            ScanError::InvalidUrl(message) => FetchFailure::InvalidUrl { message },
            other => FetchFailure::Network {
                message: other.to_string(),
            },
        }
    }
}
