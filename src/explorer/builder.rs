//! Builder for configuring explorer sessions

use std::sync::Arc;
use std::time::Duration;

use super::Explorer;
use crate::Result;
use crate::cache::{CacheConfig, default_topic_cache_config};
use crate::data::InstitutionDataService;
use crate::http::{
    DEFAULT_TIMEOUT, RequestScheduler, RetryConfig, RetryPolicy, ReqwestTransport,
    SchedulerConfig, Transport,
};
use crate::openalex::{DEFAULT_BASE_URL, OpenAlexClient};
use crate::stores::{MemoryNavigator, Navigator};

/// Builder for configuring [`Explorer`] sessions.
pub struct ExplorerBuilder {
    base_url: String,
    timeout: Duration,
    scheduler: SchedulerConfig,
    retry: RetryConfig,
    institution_cache: CacheConfig,
    works_cache: CacheConfig,
    topic_cache: CacheConfig,
    transport: Option<Arc<dyn Transport>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ExplorerBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scheduler: SchedulerConfig::default(),
            retry: RetryConfig::default(),
            institution_cache: CacheConfig::institutions(),
            works_cache: CacheConfig::works(),
            topic_cache: default_topic_cache_config(),
            transport: None,
            navigator: None,
        }
    }

    /// Point at a different API root (e.g. a wiremock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request deadline (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Turn off retries entirely.
    pub fn disable_retry(mut self) -> Self {
        self.retry = RetryConfig::disabled();
        self
    }

    pub fn institution_cache(mut self, config: CacheConfig) -> Self {
        self.institution_cache = config;
        self
    }

    pub fn works_cache(mut self, config: CacheConfig) -> Self {
        self.works_cache = config;
        self
    }

    pub fn topic_cache(mut self, config: CacheConfig) -> Self {
        self.topic_cache = config;
        self
    }

    /// Use a custom [`Transport`] instead of the default reqwest client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where URL updates go. Defaults to an in-memory `/explore` location.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the data service only, without stores.
    pub fn build_data_service(&self) -> Result<InstitutionDataService> {
        let transport: Arc<dyn Transport> = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(ReqwestTransport::new()?),
        };
        let scheduler = RequestScheduler::new(
            self.scheduler.clone(),
            RetryPolicy::new(self.retry.clone()),
        );
        let client = OpenAlexClient::new(transport, scheduler)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout);
        Ok(InstitutionDataService::new(
            client,
            self.institution_cache.clone(),
            self.works_cache.clone(),
        )
        .with_topic_cache(&self.topic_cache))
    }

    /// Build the session.
    pub fn build(self) -> Result<Explorer> {
        let data = Arc::new(self.build_data_service()?);
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryNavigator::default()));
        Ok(Explorer::new(data, navigator))
    }
}

impl Default for ExplorerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
