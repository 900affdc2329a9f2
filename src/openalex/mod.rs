//! OpenAlex API client.
//!
//! Knows the endpoints, query parameters and response shapes of the
//! OpenAlex REST API. Every call goes through the shared
//! [`RequestScheduler`], so it is concurrency-limited, staggered by
//! `priority`, retried on transient errors and bounded by the request
//! timeout.
//!
//! Status mapping: 429 becomes [`OpenLensError::RateLimited`] (with the
//! `Retry-After` hint), any other non-2xx becomes [`OpenLensError::Api`].
//! Lookups by id turn a 404 into `Ok(None)`; searches turn an empty result
//! list into `Ok(None)`.

mod wire;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::debug;

use crate::http::{DEFAULT_TIMEOUT, HttpResponse, RequestScheduler, Transport};
use crate::types::{
    GroupCount, Institution, InstitutionDetail, TermQuery, Topic, WorkRecord, WorksSummary, short_id,
};
use crate::{OpenLensError, Result, telemetry};

use wire::{GroupedResponse, ListResponse, TopicRecord, WorksAggregateResponse};

/// Default base URL of the OpenAlex API.
pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Fields requested for institution records.
pub const INSTITUTION_FIELDS: &str =
    "id,display_name,relevance_score,works_count,cited_by_count,summary_stats,counts_by_year,geo,topics";

const RECENT_WORK_FIELDS: &str = "id,display_name,publication_year,cited_by_count,doi";

/// Longest error body excerpt kept in [`OpenLensError::Api`].
const MAX_ERROR_BODY: usize = 200;

/// Client for the OpenAlex REST API.
pub struct OpenAlexClient {
    transport: Arc<dyn Transport>,
    scheduler: RequestScheduler,
    base_url: String,
    timeout: Duration,
}

impl OpenAlexClient {
    /// Create a client against the public API.
    pub fn new(transport: Arc<dyn Transport>, scheduler: RequestScheduler) -> Self {
        Self {
            transport,
            scheduler,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different base URL (for testing with wiremock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheduler(&self) -> &RequestScheduler {
        &self.scheduler
    }

    /// Resolve a term value: institution reference or relevance search.
    pub async fn lookup(&self, query: TermQuery<'_>, priority: usize) -> Result<Option<Institution>> {
        match query {
            TermQuery::Search(term) => self.search_institution(term, priority).await,
            TermQuery::Institution(id) => self.institution(id, priority).await,
        }
    }

    /// Top relevance hit for a free-text search, if any.
    pub async fn search_institution(
        &self,
        term: &str,
        priority: usize,
    ) -> Result<Option<Institution>> {
        let url = self.url(
            "institutions",
            &[("search", term), ("select", INSTITUTION_FIELDS)],
        )?;
        let response = self.get("institutions", &url, priority).await?;
        let list: ListResponse<Institution> = response.json()?;
        Ok(list.results.into_iter().next())
    }

    /// Institution by OpenAlex id (short or full form).
    pub async fn institution(&self, id: &str, priority: usize) -> Result<Option<Institution>> {
        let id = validate_id(id)?;
        let url = self.url(&format!("institutions/{id}"), &[])?;
        match self.get("institutions", &url, priority).await {
            Ok(response) => Ok(Some(response.json()?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Works aggregate for an institution's lineage, optionally within one topic.
    pub async fn works_summary(
        &self,
        institution_id: &str,
        topic_id: Option<&str>,
        priority: usize,
    ) -> Result<WorksSummary> {
        let mut filter = lineage_filter(validate_id(institution_id)?);
        if let Some(topic) = crate::types::filter_id(topic_id) {
            filter.push_str(",primary_topic.id:");
            filter.push_str(validate_id(topic)?);
        }
        let url = self.url(
            "works",
            &[
                ("filter", filter.as_str()),
                ("apc_sum", "true"),
                ("cited_by_count_sum", "true"),
                ("per-page", "1"),
            ],
        )?;
        let response = self.get("works", &url, priority).await?;
        let aggregate: WorksAggregateResponse = response.json()?;
        Ok(aggregate.meta)
    }

    /// Topic by id; `None` when OpenAlex does not know it.
    ///
    /// The returned topic keeps the id it was requested by.
    pub async fn topic(&self, id: &str) -> Result<Option<Topic>> {
        let short = validate_id(id)?;
        let url = self.url(&format!("topics/{short}"), &[])?;
        match self.get("topics", &url, 0).await {
            Ok(response) => {
                let record: TopicRecord = response.json()?;
                Ok(Some(Topic::new(id, record.display_name)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Everything the detail view needs, fetched concurrently.
    ///
    /// All-or-nothing: any failing part fails the whole detail.
    pub async fn institution_detail(&self, id: &str) -> Result<Option<InstitutionDetail>> {
        let id = validate_id(id)?;
        let lineage = lineage_filter(id);

        let (info, open_access, recent_works, funders, retractions) = tokio::try_join!(
            self.institution(id, 0),
            self.group_by(&lineage, "open_access.is_oa", 200, 1),
            self.recent_works(&lineage, 2),
            self.group_by(&lineage, "grants.funder", 5, 3),
            self.group_by(&lineage, "is_retracted", 200, 4),
        )?;

        let Some(info) = info else {
            return Ok(None);
        };
        let mut yearly_output = info.counts_by_year.clone();
        yearly_output.sort_by_key(|point| point.year);
        let top_topics = info.topics.clone().unwrap_or_default();

        Ok(Some(InstitutionDetail {
            info,
            yearly_output,
            top_topics,
            open_access,
            recent_works,
            funders,
            retractions,
        }))
    }

    async fn group_by(
        &self,
        filter: &str,
        field: &str,
        per_page: u32,
        priority: usize,
    ) -> Result<Vec<GroupCount>> {
        let per_page = per_page.to_string();
        let url = self.url(
            "works",
            &[
                ("filter", filter),
                ("group_by", field),
                ("per-page", per_page.as_str()),
            ],
        )?;
        let response = self.get("works", &url, priority).await?;
        let grouped: GroupedResponse = response.json()?;
        Ok(grouped.group_by)
    }

    async fn recent_works(
        &self,
        filter: &str,
        priority: usize,
    ) -> Result<Vec<WorkRecord>> {
        let url = self.url(
            "works",
            &[
                ("filter", filter),
                ("sort", "publication_year:desc"),
                ("select", RECENT_WORK_FIELDS),
                ("page", "1"),
            ],
        )?;
        let response = self.get("works", &url, priority).await?;
        let list: ListResponse<WorkRecord> = response.json()?;
        Ok(list.results)
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|e| OpenLensError::Configuration(format!("invalid API URL: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Scheduled, retried, timeout-bound GET with status mapping.
    async fn get(&self, endpoint: &'static str, url: &Url, priority: usize) -> Result<HttpResponse> {
        self.scheduler
            .schedule(endpoint, priority, || async move {
                let start = Instant::now();
                let result = self
                    .transport
                    .get(url.as_str(), self.timeout)
                    .await
                    .and_then(check_status);

                metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "endpoint" => endpoint)
                    .record(start.elapsed().as_secs_f64());
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "endpoint" => endpoint,
                    "status" => status,
                )
                .increment(1);
                debug!(endpoint, url = %url, status, "openalex request");

                result
            })
            .await
    }
}

/// Turn non-2xx responses into errors.
fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    match response.status {
        _ if response.is_success() => Ok(response),
        429 => Err(OpenLensError::RateLimited {
            retry_after: response.retry_after,
        }),
        status => Err(OpenLensError::Api {
            status,
            message: truncate(&response.body, MAX_ERROR_BODY),
        }),
    }
}

fn lineage_filter(institution_id: &str) -> String {
    format!("authorships.institutions.lineage:{institution_id}")
}

/// Short form of an OpenAlex id; rejects anything that is not alphanumeric.
fn validate_id(id: &str) -> Result<&str> {
    let short = short_id(id.trim());
    if short.is_empty() || !short.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(OpenLensError::InvalidInput(format!(
            "not an OpenAlex id: {id:?}"
        )));
    }
    Ok(short)
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
