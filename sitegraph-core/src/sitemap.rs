// Sitemap protocol reader

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("Malformed sitemap document: {0}")]
    MalformedDocument(String),

    #[error("Sitemap <url> entry #{index} has no <loc>")]
    MissingLocation { index: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SitemapError>;

/// Parse a sitemap held in memory.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    parse_sitemap_reader(xml.as_bytes())
}

/// Open and parse the sitemap at `path`.
pub fn read_sitemap_file(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    parse_sitemap_reader(BufReader::new(file))
}

/// Collect every `<urlset>/<url>/<loc>` value in document order.
///
/// Only elements bound to the sitemap namespace count. A `<url>` without a
/// non-empty `<loc>` aborts the parse, as does any well-formedness error.
pub fn parse_sitemap_reader<R: BufRead>(input: R) -> Result<Vec<String>> {
    let mut reader = NsReader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut urls = Vec::new();

    // Number of currently open elements; the document element sits at level 0
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut url_index = 0usize;
    let mut in_url = false;
    let mut in_loc = false;
    let mut loc_text = String::new();
    let mut location: Option<String> = None;

    loop {
        let position = reader.buffer_position();

        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                if depth == 0 && saw_root {
                    return Err(SitemapError::MalformedDocument(format!(
                        "multiple root elements (near byte {})",
                        position
                    )));
                }
                saw_root = true;

                let sitemap_element = in_sitemap_namespace(&ns);
                let local = e.local_name();

                if depth == 1 && sitemap_element && local.as_ref() == b"url" {
                    in_url = true;
                    url_index += 1;
                    location = None;
                } else if in_url && depth == 2 && sitemap_element && local.as_ref() == b"loc" {
                    in_loc = true;
                    loc_text.clear();
                }

                depth += 1;
            }
            Ok((ns, Event::Empty(e))) => {
                if depth == 0 && saw_root {
                    return Err(SitemapError::MalformedDocument(format!(
                        "multiple root elements (near byte {})",
                        position
                    )));
                }
                saw_root = true;

                // A self-closing <url/> can never carry a location
                if depth == 1 && in_sitemap_namespace(&ns) && e.local_name().as_ref() == b"url" {
                    url_index += 1;
                    return Err(SitemapError::MissingLocation { index: url_index });
                }
            }
            Ok((_, Event::Text(e))) => {
                if in_loc {
                    let text = e
                        .unescape()
                        .map_err(|err| SitemapError::MalformedDocument(err.to_string()))?;
                    loc_text.push_str(&text);
                }
            }
            Ok((_, Event::CData(e))) => {
                if in_loc {
                    let text = std::str::from_utf8(&e)
                        .map_err(|err| SitemapError::MalformedDocument(err.to_string()))?;
                    loc_text.push_str(text);
                }
            }
            Ok((_, Event::End(_))) => {
                if depth == 0 {
                    return Err(SitemapError::MalformedDocument(format!(
                        "unexpected closing tag (near byte {})",
                        position
                    )));
                }
                depth -= 1;

                if in_loc && depth == 2 {
                    in_loc = false;
                    let trimmed = loc_text.trim();
                    // First non-empty <loc> wins
                    if location.is_none() && !trimmed.is_empty() {
                        location = Some(trimmed.to_string());
                    }
                } else if in_url && depth == 1 {
                    in_url = false;
                    match location.take() {
                        Some(loc) => urls.push(loc),
                        None => return Err(SitemapError::MissingLocation { index: url_index }),
                    }
                }
            }
            Ok((_, Event::Eof)) => {
                if !saw_root {
                    return Err(SitemapError::MalformedDocument(
                        "document has no root element".to_string(),
                    ));
                }
                if depth != 0 {
                    return Err(SitemapError::MalformedDocument(format!(
                        "unexpected end of document with {} unclosed element(s)",
                        depth
                    )));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                return Err(SitemapError::MalformedDocument(format!(
                    "{} (near byte {})",
                    e, position
                )));
            }
        }

        buf.clear();
    }

    debug!("Sitemap lists {} URLs", urls.len());
    Ok(urls)
}

fn in_sitemap_namespace(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE.as_bytes())
}
