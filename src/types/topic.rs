//! Topic filter.

use serde::{Deserialize, Serialize};

use super::institution::short_id;

/// Sentinel id meaning "no topic filter".
pub const ALL_TOPICS_ID: &str = "allTopics";

/// Display name of the sentinel topic.
pub const ALL_TOPICS_NAME: &str = "All Topics";

/// The single global topic filter.
///
/// Narrows works aggregation to one OpenAlex topic, or to nothing when it
/// is the [`all`](Self::all) sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub display_name: String,
}

impl Topic {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// The "All Topics" sentinel.
    pub fn all() -> Self {
        Self::new(ALL_TOPICS_ID, ALL_TOPICS_NAME)
    }

    /// Whether this is the "All Topics" sentinel.
    pub fn is_all(&self) -> bool {
        self.id == ALL_TOPICS_ID
    }

    /// Short OpenAlex topic id to filter by, or `None` for "All Topics".
    pub fn filter_id(&self) -> Option<&str> {
        filter_id(Some(&self.id))
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::all()
    }
}

/// Normalise an optional topic id into a filter value.
///
/// `None`, empty and the `allTopics` sentinel all mean "no filter".
pub(crate) fn filter_id(topic_id: Option<&str>) -> Option<&str> {
    match topic_id {
        None | Some("") | Some(ALL_TOPICS_ID) => None,
        Some(id) => Some(short_id(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_topics() {
        let topic = Topic::default();
        assert!(topic.is_all());
        assert_eq!(topic.display_name, "All Topics");
        assert_eq!(topic.filter_id(), None);
    }

    #[test]
    fn filter_id_normalises() {
        assert_eq!(filter_id(None), None);
        assert_eq!(filter_id(Some("")), None);
        assert_eq!(filter_id(Some("allTopics")), None);
        assert_eq!(filter_id(Some("T10017")), Some("T10017"));
        assert_eq!(
            filter_id(Some("https://openalex.org/T10017")),
            Some("T10017")
        );
    }
}
