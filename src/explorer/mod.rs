//! Explorer session.
//!
//! An [`Explorer`] owns everything one comparison session needs: the data
//! service (with its caches and scheduler), the three state stores and the
//! [`Navigator`] they write the URL to. Build one with
//! [`Explorer::builder()`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use openlens::Explorer;
//! use openlens::stores::MemoryNavigator;
//!
//! #[tokio::main]
//! async fn main() -> openlens::Result<()> {
//!     let navigator = Arc::new(MemoryNavigator::default());
//!     let explorer = Explorer::builder().navigator(navigator.clone()).build()?;
//!
//!     explorer.initialize("q=MIT,Stanford").await;
//!     explorer.terms().update_term("3", "Harvard").await;
//!
//!     for term in explorer.terms().terms() {
//!         println!("{} {} {:?}", term.id, term.value, term.kind);
//!     }
//!     println!("{}", navigator.location());
//!     Ok(())
//! }
//! ```

mod builder;

use std::sync::Arc;

use tracing::info;

pub use builder::ExplorerBuilder;

use crate::Result;
use crate::data::InstitutionDataService;
use crate::stores::{LoadingStore, Navigator, TermStore, TopicStore};
use crate::types::{InstitutionDetail, Topic};

/// One institution comparison session.
pub struct Explorer {
    data: Arc<InstitutionDataService>,
    topic: Arc<TopicStore>,
    terms: TermStore,
    loading: Arc<LoadingStore>,
    navigator: Arc<dyn Navigator>,
}

impl Explorer {
    /// Create a new builder for configuring a session.
    pub fn builder() -> ExplorerBuilder {
        ExplorerBuilder::new()
    }

    /// Wire the stores around an existing data service.
    pub fn new(data: Arc<InstitutionDataService>, navigator: Arc<dyn Navigator>) -> Self {
        let loading = Arc::new(LoadingStore::new());
        let topic = Arc::new(TopicStore::new(data.clone(), navigator.clone()));
        let terms = TermStore::new(data.clone(), topic.clone(), loading.clone(), navigator.clone());
        Self {
            data,
            topic,
            terms,
            loading,
            navigator,
        }
    }

    /// Restore the session from a query string.
    ///
    /// The topic is resolved first so the term batch is fetched under it.
    pub async fn initialize(&self, query: &str) {
        self.topic.initialize(query).await;
        self.terms.initialize(query).await;
        info!(
            terms = self.terms.terms().len(),
            topic = %self.topic.get().id,
            "session initialized"
        );
    }

    /// Switch the topic filter and re-fetch every committed term under it.
    pub async fn select_topic(&self, topic: Topic) {
        let id = topic.id.clone();
        self.topic.update_topic(topic);
        self.terms.refresh_topic_data(&id).await;
    }

    /// Detail view data for one institution.
    pub async fn institution_detail(&self, id: &str) -> Result<Option<InstitutionDetail>> {
        self.data.institution_detail(id).await
    }

    pub fn terms(&self) -> &TermStore {
        &self.terms
    }

    pub fn topic(&self) -> &TopicStore {
        &self.topic
    }

    pub fn loading(&self) -> &LoadingStore {
        &self.loading
    }

    pub fn data(&self) -> &InstitutionDataService {
        &self.data
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }
}
