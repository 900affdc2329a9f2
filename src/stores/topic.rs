//! Topic filter store.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use super::navigator::Navigator;
use super::query::{self, TOPIC_PARAM};
use crate::data::InstitutionDataService;
use crate::types::{ALL_TOPICS_ID, Topic};

/// Holds the single selected [`Topic`] and mirrors it into the `topic`
/// URL parameter.
///
/// Changing the topic does not refresh term data by itself; the caller
/// follows up with [`TermStore::refresh_topic_data`](super::TermStore::refresh_topic_data)
/// (or uses [`Explorer::select_topic`](crate::Explorer::select_topic), which
/// does both).
pub struct TopicStore {
    state: watch::Sender<Topic>,
    data: Arc<InstitutionDataService>,
    navigator: Arc<dyn Navigator>,
}

impl TopicStore {
    pub fn new(data: Arc<InstitutionDataService>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(Topic::all());
        Self {
            state,
            data,
            navigator,
        }
    }

    /// Currently selected topic.
    pub fn get(&self) -> Topic {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Topic> {
        self.state.subscribe()
    }

    pub fn stream(&self) -> WatchStream<Topic> {
        WatchStream::new(self.subscribe())
    }

    /// Restore the topic from a query string.
    ///
    /// Resolves the display name through the API. A missing parameter, an
    /// unknown topic or a failed lookup all fall back to "All Topics".
    pub async fn initialize(&self, query: &str) {
        let Some(id) = query::parse_topic(query).filter(|id| id != ALL_TOPICS_ID) else {
            self.state.send_replace(Topic::all());
            return;
        };

        let topic = match self.data.topic(&id).await {
            Ok(Some(topic)) => topic,
            Ok(None) => {
                debug!(topic = %id, "unknown topic, using all topics");
                Topic::all()
            }
            Err(e) => {
                warn!(topic = %id, error = %e, "topic lookup failed, using all topics");
                Topic::all()
            }
        };
        self.state.send_replace(topic);
    }

    /// Select a topic and write it to the URL (removed for "All Topics").
    pub fn update_topic(&self, topic: Topic) {
        let value = (!topic.is_all()).then(|| topic.id.clone());
        self.state.send_replace(topic);
        let next = query::with_param(&self.navigator.query(), TOPIC_PARAM, value.as_deref());
        self.navigator.replace(&next);
    }
}
