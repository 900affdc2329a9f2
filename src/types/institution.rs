//! Institution records as returned by the OpenAlex `/institutions` endpoint.

use serde::{Deserialize, Serialize};

/// Prefix OpenAlex puts in front of every entity id.
pub const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";

/// Strip the `https://openalex.org/` prefix from an entity id.
///
/// Ids that are already short (`I63966007`) are returned unchanged.
pub fn short_id(id: &str) -> &str {
    id.strip_prefix(OPENALEX_ID_PREFIX).unwrap_or(id)
}

/// A research institution.
///
/// Immutable once fetched, apart from the [`works`](Self::works) sub-record
/// which is fetched and cached separately (it depends on the topic filter)
/// and merged in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Full OpenAlex id, e.g. `https://openalex.org/I63966007`.
    pub id: String,
    pub display_name: String,
    /// Search relevance. Absent when the record was looked up by id.
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub works_count: u64,
    #[serde(default)]
    pub cited_by_count: u64,
    #[serde(default)]
    pub summary_stats: SummaryStats,
    #[serde(default)]
    pub counts_by_year: Vec<YearCount>,
    #[serde(default)]
    pub geo: Option<Geo>,
    #[serde(default)]
    pub topics: Option<Vec<TopicShare>>,
    /// Works aggregate for the topic filter it was fetched under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub works: Option<WorksSummary>,
}

impl Institution {
    /// Id without the OpenAlex URL prefix.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// This record with `works` replaced.
    pub fn with_works(self, works: WorksSummary) -> Self {
        Self {
            works: Some(works),
            ..self
        }
    }
}

/// Citation summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "2yr_mean_citedness", default)]
    pub two_year_mean_citedness: f64,
    #[serde(default)]
    pub h_index: u64,
    #[serde(default)]
    pub i10_index: u64,
}

/// One point of the yearly output series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    #[serde(default)]
    pub works_count: u64,
    #[serde(default)]
    pub cited_by_count: u64,
}

/// Institution location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Share of an institution's output within one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicShare {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub count: u64,
}

/// Aggregated publication, citation and APC metrics.
///
/// Scoped to `(institution, topic filter)`: the same institution has one
/// summary per topic it was viewed under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorksSummary {
    #[serde(default)]
    pub apc_list_sum_usd: Option<f64>,
    #[serde(default)]
    pub apc_paid_sum_usd: Option<f64>,
    #[serde(default)]
    pub cited_by_count_sum: Option<u64>,
    #[serde(default)]
    pub count: u64,
}
