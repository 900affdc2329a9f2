//! Institution data service.
//!
//! Resolves comparison terms into [`Institution`] records with their
//! topic-scoped [`WorksSummary`] merged in, consulting two session-lifetime
//! caches before going to the API:
//!
//! - institution records, keyed on the raw term (`"MIT"`, `"/i/I63966007"`);
//! - works aggregates, keyed on `"{institution_id}-{topic_id|all}"`.
//!
//! A hit on the institution cache says nothing about the works cache: the
//! works aggregate depends on the topic filter and expires sooner.
//!
//! # Batch pipeline
//!
//! [`fetch_many`](InstitutionDataService::fetch_many) runs one pipeline per
//! distinct term, all concurrently (bounded by the scheduler): look up the
//! institution unless cached, then attach its works aggregate unless cached.
//! A term's works lookup starts as soon as its own institution id is known.
//!
//! Scheduler priorities count cache misses only: the n-th institution miss
//! and the n-th works miss of a batch each get priority n, so cached terms
//! add no stagger to the rest.
//!
//! # Error isolation
//!
//! Failures are isolated per term. A failed institution lookup yields
//! `None` for that term; a failed works lookup yields the institution
//! without `works`. Neither affects sibling terms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::Result;
use crate::cache::{CacheConfig, CacheService, TopicCache};
use crate::openalex::OpenAlexClient;
use crate::types::{Institution, InstitutionDetail, TermQuery, Topic, WorksSummary, filter_id};

/// Works cache key suffix used when no topic filter applies.
const ALL_TOPICS_KEY: &str = "all";

/// Orchestrates cached, scheduled institution and works lookups.
pub struct InstitutionDataService {
    client: OpenAlexClient,
    institutions: CacheService<Institution>,
    works: CacheService<WorksSummary>,
    topics: TopicCache,
}

impl InstitutionDataService {
    pub fn new(client: OpenAlexClient, institutions: CacheConfig, works: CacheConfig) -> Self {
        Self {
            client,
            institutions: CacheService::new("institutions", institutions),
            works: CacheService::new("works", works),
            topics: TopicCache::default(),
        }
    }

    /// Replace the topic-name cache configuration.
    pub fn with_topic_cache(mut self, config: &CacheConfig) -> Self {
        self.topics = TopicCache::new(config);
        self
    }

    pub fn client(&self) -> &OpenAlexClient {
        &self.client
    }

    pub fn institution_cache(&self) -> &CacheService<Institution> {
        &self.institutions
    }

    pub fn works_cache(&self) -> &CacheService<WorksSummary> {
        &self.works
    }

    /// Resolve every term under the given topic filter.
    ///
    /// The map has one entry per distinct term; `None` means no institution
    /// was found or the lookup failed.
    pub async fn fetch_many<S: AsRef<str>>(
        &self,
        terms: &[S],
        topic_id: Option<&str>,
    ) -> HashMap<String, Option<Institution>> {
        let topic = filter_id(topic_id);

        let mut distinct: Vec<&str> = Vec::with_capacity(terms.len());
        for term in terms {
            let term = term.as_ref();
            if !distinct.contains(&term) {
                distinct.push(term);
            }
        }

        let mut misses = 0;
        let works_misses = AtomicUsize::new(0);
        let works_misses = &works_misses;
        let pipelines = distinct.into_iter().map(|term| {
            let cached = self.institutions.get(term);
            let miss_priority = misses;
            if cached.is_none() {
                misses += 1;
            }
            async move {
                let institution = match cached {
                    Some(institution) => Some(institution),
                    None => self.lookup_institution(term, miss_priority).await,
                };
                let institution = match institution {
                    Some(institution) if institution.works.is_none() => {
                        Some(self.attach_works(institution, topic, works_misses).await)
                    }
                    other => other,
                };
                (term.to_string(), institution)
            }
        });

        let pipelines: Vec<_> = pipelines.collect();
        debug!(
            terms = pipelines.len(),
            misses,
            topic = topic.unwrap_or(ALL_TOPICS_KEY),
            "fetching institutions"
        );
        join_all(pipelines).await.into_iter().collect()
    }

    /// Resolve a single term.
    pub async fn fetch_one(&self, term: &str, topic_id: Option<&str>) -> Option<Institution> {
        self.fetch_many(&[term], topic_id)
            .await
            .remove(term)
            .flatten()
    }

    /// Topic display name lookup, cached.
    pub async fn topic(&self, id: &str) -> Result<Option<Topic>> {
        if let Some(topic) = self.topics.get(id).await {
            return Ok(Some(topic));
        }
        let topic = self.client.topic(id).await?;
        if let Some(ref topic) = topic {
            self.topics.insert(id, topic.clone()).await;
        }
        Ok(topic)
    }

    /// Detail view data for one institution (not cached).
    pub async fn institution_detail(&self, id: &str) -> Result<Option<InstitutionDetail>> {
        self.client.institution_detail(id).await
    }

    async fn lookup_institution(&self, term: &str, priority: usize) -> Option<Institution> {
        if term.trim().is_empty() {
            return None;
        }
        match self.client.lookup(TermQuery::parse(term), priority).await {
            Ok(Some(institution)) => {
                self.institutions.set(term, institution.clone());
                Some(institution)
            }
            Ok(None) => {
                debug!(term, "no institution matches term");
                None
            }
            Err(e) => {
                warn!(term, error = %e, "institution lookup failed");
                None
            }
        }
    }

    async fn attach_works(
        &self,
        institution: Institution,
        topic: Option<&str>,
        misses: &AtomicUsize,
    ) -> Institution {
        let key = works_key(institution.short_id(), topic);
        if let Some(works) = self.works.get(&key) {
            return institution.with_works(works);
        }

        let priority = misses.fetch_add(1, Ordering::Relaxed);
        let fetched = self
            .client
            .works_summary(institution.short_id(), topic, priority)
            .await;
        match fetched {
            Ok(works) => {
                self.works.set(key, works.clone());
                institution.with_works(works)
            }
            Err(e) => {
                warn!(
                    institution = institution.short_id(),
                    topic = topic.unwrap_or(ALL_TOPICS_KEY),
                    error = %e,
                    "works lookup failed, returning institution without works"
                );
                institution
            }
        }
    }
}

/// Works cache key for an institution under a topic filter.
pub fn works_key(institution_id: &str, topic_id: Option<&str>) -> String {
    format!(
        "{}-{}",
        crate::types::short_id(institution_id),
        filter_id(topic_id).unwrap_or(ALL_TOPICS_KEY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn works_key_scopes_by_topic() {
        assert_eq!(works_key("I1", None), "I1-all");
        assert_eq!(works_key("I1", Some("allTopics")), "I1-all");
        assert_eq!(works_key("https://openalex.org/I1", Some("T5")), "I1-T5");
    }
}
