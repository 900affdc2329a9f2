//! Response envelopes of the OpenAlex list endpoints.

use serde::Deserialize;

use crate::types::{GroupCount, WorksSummary};

/// `{ "results": [...] }` list response.
#[derive(Debug, Deserialize)]
pub(super) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Works query with `apc_sum` / `cited_by_count_sum`: the aggregate is in `meta`.
#[derive(Debug, Deserialize)]
pub(super) struct WorksAggregateResponse {
    pub meta: WorksSummary,
}

/// `{ "group_by": [...] }` aggregation response.
#[derive(Debug, Deserialize)]
pub(super) struct GroupedResponse {
    #[serde(default)]
    pub group_by: Vec<GroupCount>,
}

/// The one field of a topic record we use.
#[derive(Debug, Deserialize)]
pub(super) struct TopicRecord {
    pub display_name: String,
}
