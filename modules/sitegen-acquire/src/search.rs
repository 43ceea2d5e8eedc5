// Multi-query search aggregation and keyword-filtered candidate selection.

use std::sync::Arc;
use std::time::Duration;

use serper_client::{SearchQuery, SerperClient, SerperResponse};
use tracing::{info, warn};

use crate::deadline::Deadline;
use crate::error::{AcquireError, Result};
use crate::providers::WebSearcher;
use crate::types::{SearchCandidate, SearchParams, SearchSelection};

/// Ceiling across all queries of one search.
pub const SEARCH_DEADLINE: Duration = Duration::from_secs(60);
/// Results requested from the provider per query.
pub const RESULTS_PER_QUERY: u32 = 10;
/// Candidates echoed back to the caller. Selection sees all of them.
pub const MAX_ECHOED_CANDIDATES: usize = 10;

pub struct CandidateSearcher {
    searcher: Arc<dyn WebSearcher>,
    deadline: Duration,
}

impl CandidateSearcher {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            searcher,
            deadline: SEARCH_DEADLINE,
        }
    }

    pub fn serper(api_key: &str) -> Result<Self> {
        let client = SerperClient::new(api_key)
            .map_err(|e| AcquireError::Configuration(format!("Failed to build Serper client: {e}")))?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run every query in order and pick one URL.
    ///
    /// Failed queries are skipped. Once the deadline fires no further queries
    /// are issued and selection runs over what was gathered; `tried` counts
    /// the queries actually issued.
    pub async fn search(&self, params: &SearchParams) -> SearchSelection {
        let deadline = Deadline::after(self.deadline);
        let mut candidates = Vec::new();
        let mut tried = 0;

        for q in &params.queries {
            if deadline.is_expired() {
                break;
            }
            tried += 1;

            let query = SearchQuery {
                q: q.clone(),
                num: RESULTS_PER_QUERY,
                gl: params.region.clone(),
                hl: params.language.clone(),
            };

            match deadline.run(self.searcher.search(&query)).await {
                Ok(Ok(response)) => candidates.extend(collect_candidates(&response, q)),
                Ok(Err(e)) => {
                    warn!(query = %q, error = %e, "Search query failed, skipping");
                }
                Err(expired) => {
                    warn!(query = %q, error = %expired, "Search deadline reached, stopping");
                    break;
                }
            }
        }

        let url = select_candidate(&candidates, &params.include_keywords, &params.exclude_keywords)
            .map(|c| c.url.clone());

        info!(
            tried,
            total_queries = params.queries.len(),
            candidates = candidates.len(),
            selected = ?url,
            "Candidate search complete"
        );

        candidates.truncate(MAX_ECHOED_CANDIDATES);
        SearchSelection {
            url,
            tried,
            candidates,
        }
    }
}

/// Candidates from one response, in organic → news → answer-box order.
/// Links that are not absolute http(s) URLs are dropped.
pub fn collect_candidates(response: &SerperResponse, query: &str) -> Vec<SearchCandidate> {
    response
        .links()
        .filter(|link| is_http_url(link))
        .map(|link| SearchCandidate {
            url: link.to_string(),
            query: query.to_string(),
        })
        .collect()
}

fn is_http_url(link: &str) -> bool {
    let has_prefix = |prefix: &str| {
        link.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// True when the lower-cased `url` contains every include keyword and no
/// exclude keyword. Plain substring matching, not tokenized.
pub fn keyword_pass(url: &str, include: &[String], exclude: &[String]) -> bool {
    let text = url.to_lowercase();
    let includes = include.iter().all(|k| text.contains(&k.to_lowercase()));
    let excludes = exclude.iter().any(|k| text.contains(&k.to_lowercase()));
    includes && !excludes
}

/// First candidate passing the keyword filter, else the first candidate.
pub fn select_candidate<'a>(
    candidates: &'a [SearchCandidate],
    include: &[String],
    exclude: &[String],
) -> Option<&'a SearchCandidate> {
    candidates
        .iter()
        .find(|c| keyword_pass(&c.url, include, exclude))
        .or_else(|| candidates.first())
}
