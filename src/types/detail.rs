//! Per-institution detail page data.

use serde::{Deserialize, Serialize};

use super::institution::{Institution, TopicShare, YearCount};

/// Everything the institution detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionDetail {
    pub info: Institution,
    /// Yearly output, oldest year first.
    pub yearly_output: Vec<YearCount>,
    pub top_topics: Vec<TopicShare>,
    /// Works split by `open_access.is_oa`.
    pub open_access: Vec<GroupCount>,
    /// Most recently published works.
    pub recent_works: Vec<WorkRecord>,
    /// Top funders by number of funded works.
    pub funders: Vec<GroupCount>,
    /// Works split by `is_retracted`.
    pub retractions: Vec<GroupCount>,
}

/// One bucket of a `group_by` aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    #[serde(default)]
    pub key_display_name: String,
    pub count: u64,
}

/// A single work, as listed on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub cited_by_count: u64,
    #[serde(default)]
    pub doi: Option<String>,
}
