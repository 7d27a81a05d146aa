use crate::error::{Result, ScanError};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Anchors inside `<p class="link link-arrow">`, the reference-link convention
/// of the site this tool was first pointed at.
pub const DEFAULT_LINK_SELECTOR: &str = "p.link.link-arrow a";

/// Pulls outbound `href` values out of page markup using a CSS selector.
pub struct LinkExtractor {
    selector: Selector,
    source: String,
    resolve_relative: bool,
}

impl LinkExtractor {
    pub fn new(selector: &str) -> Result<Self> {
        let parsed = Selector::parse(selector).map_err(|e| ScanError::SelectorError {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            selector: parsed,
            source: selector.to_string(),
            resolve_relative: false,
        })
    }

    /// Join relative hrefs against the page URL instead of keeping them verbatim.
    pub fn with_resolve_relative(mut self, resolve_relative: bool) -> Self {
        self.resolve_relative = resolve_relative;
        self
    }

    pub fn selector(&self) -> &str {
        &self.source
    }

    /// Matching `href` values in document order. Anchors without `href` are
    /// skipped; unparseable markup yields whatever html5ever could recover.
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for element in document.select(&self.selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if !self.resolve_relative {
                links.push(href.to_string());
                continue;
            }

            match resolve_url(page_url, href) {
                Some(absolute) => links.push(absolute),
                None => debug!("Dropping unresolvable link {} on {}", href, page_url),
            }
        }

        links
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_SELECTOR).unwrap()
    }
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    // Skip empty, javascript:, mailto:, tel: and same-page anchors
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}
