//! Public types for the OpenLens API.
//!
//! Records decoded from OpenAlex ([`Institution`], [`WorksSummary`],
//! [`Topic`], [`InstitutionDetail`]) and the comparison slot snapshot
//! ([`Term`]) published by the term store.

mod detail;
mod institution;
mod term;
mod topic;

pub use detail::{GroupCount, InstitutionDetail, WorkRecord};
pub use institution::{
    Geo, Institution, OPENALEX_ID_PREFIX, SummaryStats, TopicShare, WorksSummary, YearCount,
    short_id,
};
pub use term::{
    INSTITUTION_REF_PREFIX, MAX_TERMS, TERM_COLORS, Term, TermQuery, TermType, slot_color, slot_id,
};
pub use topic::{ALL_TOPICS_ID, ALL_TOPICS_NAME, Topic};

pub(crate) use topic::filter_id;
