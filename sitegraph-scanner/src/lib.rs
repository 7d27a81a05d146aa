pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod result;
pub mod source;

pub use error::ScanError;
pub use extractor::{DEFAULT_LINK_SELECTOR, LinkExtractor};
pub use fetcher::{FetcherConfig, PageFetcher};
pub use result::{FetchFailure, FetchOutcome, FetchedPage};
pub use source::{HttpLinkSource, LinkSource};
