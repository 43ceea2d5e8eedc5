pub mod config;
pub mod content;
pub mod deadline;
pub mod error;
pub mod extract;
pub mod providers;
pub mod sanitize;
pub mod screenshot;
pub mod search;
pub mod types;

pub use config::Config;
pub use content::{ContentFetcher, CONTENT_DEADLINE, FALLBACK_TIMEOUT};
pub use deadline::{Deadline, Expired};
pub use error::{AcquireError, Result};
pub use extract::MAX_FALLBACK_CHARS;
pub use providers::{NativeRetriever, PageRetriever, PageScraper, WebSearcher};
pub use sanitize::sanitize_quotes;
pub use screenshot::{ScreenshotFetcher, SCREENSHOT_DEADLINE};
pub use search::{CandidateSearcher, MAX_ECHOED_CANDIDATES, SEARCH_DEADLINE};
pub use types::{
    FetchRequest, FetchResult, ImagePayload, NormalizedContent, ProvenanceMetadata,
    SearchCandidate, SearchParams, SearchRequest, SearchSelection, Source,
};
