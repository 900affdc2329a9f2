//! Comparison slots.

use serde::Serialize;

use super::institution::Institution;

/// Maximum number of slots shown at once.
pub const MAX_TERMS: usize = 5;

/// Slot colours, by position.
pub const TERM_COLORS: [&str; MAX_TERMS] = ["#4c8df6", "#e46962", "#f7ce52", "#1ea446", "#886cd5"];

/// Term values with this prefix reference an institution by id (`/i/I63966007`).
pub const INSTITUTION_REF_PREFIX: &str = "/i/";

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    /// Editable, not yet committed.
    Search,
    /// Committed comparison target; has or is fetching institution data.
    Selected,
    /// Value-less trailing placeholder inviting the next comparison.
    Compare,
}

/// One comparison slot as seen by consumers.
///
/// `id` and `color` are derived from the slot's position in the snapshot
/// it belongs to. They are not stable across mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub id: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: TermType,
    pub color: &'static str,
    pub is_loading: bool,
    pub data: Option<Institution>,
}

impl Term {
    pub fn is_selected(&self) -> bool {
        self.kind == TermType::Selected
    }
}

/// Positional id of the slot at `index` (1-based string).
pub fn slot_id(index: usize) -> String {
    (index + 1).to_string()
}

/// Colour of the slot at `index`.
pub fn slot_color(index: usize) -> &'static str {
    TERM_COLORS[index % TERM_COLORS.len()]
}

/// How a term value is resolved against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermQuery<'a> {
    /// Free-text relevance search; the top hit is canonical.
    Search(&'a str),
    /// Direct lookup of an institution id.
    Institution(&'a str),
}

impl<'a> TermQuery<'a> {
    pub fn parse(value: &'a str) -> Self {
        match value.strip_prefix(INSTITUTION_REF_PREFIX) {
            Some(id) if !id.is_empty() => Self::Institution(id),
            _ => Self::Search(value),
        }
    }
}
