use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a page the fetcher was willing to hand to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedPage {
    Html(String),
    /// 2xx response whose content type can't be scraped for links.
    NotHtml { content_type: Option<String> },
}

/// Why a page contributed no links to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    Status { status: u16 },
    NotHtml { content_type: Option<String> },
    Network { message: String },
    InvalidUrl { message: String },
}

impl FetchFailure {
    /// Non-HTML resources are expected on most sites and only worth an info line.
    pub fn is_skip(&self) -> bool {
        matches!(self, FetchFailure::NotHtml { .. })
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Status { status } => write!(f, "HTTP status {}", status),
            FetchFailure::NotHtml { content_type } => write!(
                f,
                "non-HTML content ({})",
                content_type.as_deref().unwrap_or("no content-type")
            ),
            FetchFailure::Network { message } => write!(f, "network error: {}", message),
            FetchFailure::InvalidUrl { message } => write!(f, "invalid URL: {}", message),
        }
    }
}

/// Result of one fetch-and-extract cycle for a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Vec<String>),
    Failure(FetchFailure),
}

impl FetchOutcome {
    /// Links to attribute to the page; failures degrade to none.
    pub fn links(&self) -> &[String] {
        match self {
            FetchOutcome::Success(links) => links,
            FetchOutcome::Failure(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_contributes_no_links() {
        let outcome = FetchOutcome::Failure(FetchFailure::Status { status: 500 });
        assert!(outcome.links().is_empty());
        assert_eq!(
            outcome.failure(),
            Some(&FetchFailure::Status { status: 500 })
        );
    }

    #[test]
    fn test_only_not_html_is_a_skip() {
        assert!(FetchFailure::NotHtml { content_type: None }.is_skip());
        assert!(
            !FetchFailure::Network {
                message: "connection refused".to_string()
            }
            .is_skip()
        );
    }

    #[test]
    fn test_failure_display() {
        let reason = FetchFailure::NotHtml {
            content_type: Some("application/pdf".to_string()),
        };
        assert_eq!(reason.to_string(), "non-HTML content (application/pdf)");
    }
}
