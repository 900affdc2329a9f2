//! Comparison slot state machine.
//!
//! The store keeps an ordered list of slots. Each slot is `search`
//! (editable, uncommitted), `selected` (committed, has or is fetching
//! institution data) or `compare` (the trailing placeholder inviting the
//! next comparison).
//!
//! Invariants after every structural mutation:
//!
//! - at most [`MAX_TERMS`] slots;
//! - at most one `compare` slot, present whenever there is room for it
//!   and at least one slot is `selected`;
//! - if no slot is `selected`, the list is a single empty `search` slot
//!   (after [`delete_term`](TermStore::delete_term)).
//!
//! Slot ids and colours are positional and computed when a snapshot is
//! published. Internally each slot has a stable key and, while it waits for
//! data, a request generation: results that come back for a slot that has
//! since been deleted or re-targeted are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use super::loading::LoadingStore;
use super::navigator::Navigator;
use super::query;
use super::topic::TopicStore;
use crate::data::InstitutionDataService;
use crate::telemetry;
use crate::types::{Institution, MAX_TERMS, Term, TermType, slot_color, slot_id};

#[derive(Debug, Clone)]
struct Slot {
    key: u64,
    value: String,
    kind: TermType,
    is_loading: bool,
    data: Option<Institution>,
    generation: u64,
}

/// A pending fetch for one slot.
#[derive(Debug, Clone)]
struct Request {
    key: u64,
    generation: u64,
    value: String,
}

struct Slots {
    slots: Vec<Slot>,
    next_key: u64,
    next_generation: u64,
}

impl Slots {
    fn new() -> Self {
        let mut slots = Self {
            slots: Vec::new(),
            next_key: 0,
            next_generation: 0,
        };
        slots.reset();
        slots
    }

    fn slot(&mut self, value: impl Into<String>, kind: TermType) -> Slot {
        let key = self.next_key;
        self.next_key += 1;
        Slot {
            key,
            value: value.into(),
            kind,
            is_loading: false,
            data: None,
            generation: 0,
        }
    }

    /// One empty `search` slot.
    fn reset(&mut self) {
        let initial = self.slot("", TermType::Search);
        self.slots = vec![initial];
    }

    /// Mark a slot as waiting for data and issue its request.
    fn begin_request(&mut self, index: usize) -> Request {
        self.next_generation += 1;
        let generation = self.next_generation;
        let slot = &mut self.slots[index];
        slot.is_loading = true;
        slot.generation = generation;
        Request {
            key: slot.key,
            generation,
            value: slot.value.clone(),
        }
    }

    /// Append a `compare` placeholder if there is room and none exists.
    fn ensure_compare(&mut self) {
        let has_compare = self.slots.iter().any(|s| s.kind == TermType::Compare);
        if self.slots.len() < MAX_TERMS && !has_compare {
            let compare = self.slot("", TermType::Compare);
            self.slots.push(compare);
        }
    }

    /// Apply a fetch result if its slot still waits for that request.
    fn resolve(&mut self, request: &Request, data: Option<Institution>) -> bool {
        let slot = self.slots.iter_mut().find(|s| {
            s.key == request.key
                && s.generation == request.generation
                && s.kind == TermType::Selected
        });
        match slot {
            Some(slot) => {
                slot.data = data;
                slot.is_loading = false;
                true
            }
            None => {
                metrics::counter!(telemetry::STALE_RESULTS_TOTAL, "store" => "terms").increment(1);
                debug!(term = %request.value, "dropping stale result");
                false
            }
        }
    }

    fn committed(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.kind == TermType::Selected)
            .map(|s| s.value.as_str())
            .collect()
    }

    fn snapshot(&self) -> Vec<Term> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| Term {
                id: slot_id(index),
                value: slot.value.clone(),
                kind: slot.kind,
                color: slot_color(index),
                is_loading: slot.is_loading,
                data: slot.data.clone(),
            })
            .collect()
    }
}

/// Owns the comparison slots, drives data fetches and mirrors committed
/// terms into the `q` URL parameter.
pub struct TermStore {
    inner: Mutex<Slots>,
    snapshot: watch::Sender<Vec<Term>>,
    data: Arc<InstitutionDataService>,
    topic: Arc<TopicStore>,
    loading: Arc<LoadingStore>,
    navigator: Arc<dyn Navigator>,
}

impl TermStore {
    pub fn new(
        data: Arc<InstitutionDataService>,
        topic: Arc<TopicStore>,
        loading: Arc<LoadingStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let slots = Slots::new();
        let (snapshot, _) = watch::channel(slots.snapshot());
        Self {
            inner: Mutex::new(slots),
            snapshot,
            data,
            topic,
            loading,
            navigator,
        }
    }

    /// Current slots.
    pub fn terms(&self) -> Vec<Term> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Term>> {
        self.snapshot.subscribe()
    }

    pub fn stream(&self) -> WatchStream<Vec<Term>> {
        WatchStream::new(self.subscribe())
    }

    /// Restore slots from the `q` parameter and fetch them in one batch.
    ///
    /// An empty or absent `q` resets to a single `search` slot. Does not
    /// write the URL.
    pub async fn initialize(&self, query: &str) {
        let mut values = query::parse_terms(query);
        if values.is_empty() {
            self.mutate(false, Slots::reset);
            self.loading.stop_loading();
            return;
        }
        if values.len() > MAX_TERMS {
            warn!(
                count = values.len(),
                max = MAX_TERMS,
                "too many terms in query, keeping the first ones"
            );
            values.truncate(MAX_TERMS);
        }

        let requests = self.mutate(false, |s| {
            s.slots = Vec::with_capacity(MAX_TERMS);
            for value in values {
                let slot = s.slot(value, TermType::Selected);
                s.slots.push(slot);
            }
            let requests = (0..s.slots.len())
                .map(|i| s.begin_request(i))
                .collect::<Vec<_>>();
            s.ensure_compare();
            requests
        });

        let topic = self.topic.get();
        self.load(requests, Some(&topic.id)).await;
    }

    /// Commit `value` into slot `id` and fetch its data.
    ///
    /// The `compare` placeholder is dropped and re-appended at the end if
    /// there is room. The URL is written immediately and again once the
    /// data arrives.
    pub async fn update_term(&self, id: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            debug!(id, "ignoring empty term");
            return;
        }
        let Some(index) = slot_index(id) else {
            debug!(id, "ignoring malformed slot id");
            return;
        };

        let request = self.try_mutate(true, |s| {
            if index >= s.slots.len() {
                return None;
            }
            let slot = &mut s.slots[index];
            slot.value = value.to_string();
            slot.kind = TermType::Selected;
            slot.data = None;
            let request = s.begin_request(index);
            s.slots.retain(|slot| slot.kind != TermType::Compare);
            s.ensure_compare();
            Some(request)
        });
        let Some(request) = request else {
            debug!(id, "ignoring update of unknown slot");
            return;
        };

        let topic = self.topic.get();
        let data = self.data.fetch_one(&request.value, Some(&topic.id)).await;
        self.mutate(true, |s| s.resolve(&request, data));
    }

    /// Remove slot `id`.
    ///
    /// When no `selected` slot remains the list resets to a single `search`
    /// slot; otherwise a `compare` placeholder is appended if there is room.
    pub fn delete_term(&self, id: &str) {
        let Some(index) = slot_index(id) else {
            return;
        };
        let removed = self.try_mutate(true, |s| {
            if index >= s.slots.len() {
                return None;
            }
            s.slots.remove(index);
            if !s.slots.iter().any(|slot| slot.kind == TermType::Selected) {
                s.reset();
            } else {
                s.ensure_compare();
            }
            Some(())
        });
        if removed.is_none() {
            debug!(id, "ignoring delete of unknown slot");
        }
    }

    /// Re-fetch every `selected` slot under a new topic filter, in one
    /// batch, keeping the slot structure.
    pub async fn refresh_topic_data(&self, topic_id: &str) {
        let requests = self.mutate(false, |s| {
            let selected: Vec<usize> = s
                .slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.kind == TermType::Selected)
                .map(|(index, _)| index)
                .collect();
            selected
                .into_iter()
                .map(|index| s.begin_request(index))
                .collect::<Vec<_>>()
        });
        if requests.is_empty() {
            return;
        }
        self.load(requests, Some(topic_id)).await;
    }

    /// Demote a `compare` placeholder to an editable `search` slot.
    pub fn convert_compare_to_search(&self, id: &str) {
        let Some(index) = slot_index(id) else {
            return;
        };
        self.try_mutate(true, |s| {
            let slot = s.slots.get_mut(index)?;
            if slot.kind != TermType::Compare {
                return None;
            }
            slot.kind = TermType::Search;
            Some(())
        });
    }

    /// Force a slot's type. Leaving `selected` abandons any pending fetch.
    pub fn set_type(&self, id: &str, kind: TermType) {
        let Some(index) = slot_index(id) else {
            return;
        };
        self.try_mutate(true, |s| {
            let slot = s.slots.get_mut(index)?;
            slot.kind = kind;
            if kind != TermType::Selected {
                slot.is_loading = false;
            }
            Some(())
        });
    }

    /// Back to a single empty `search` slot.
    pub fn reset_to_initial(&self) {
        self.mutate(true, Slots::reset);
    }

    /// Fetch a batch of requests and apply the results.
    async fn load(&self, requests: Vec<Request>, topic_id: Option<&str>) {
        self.loading.start_loading();

        let values: Vec<&str> = requests.iter().map(|r| r.value.as_str()).collect();
        let results: HashMap<String, Option<Institution>> =
            self.data.fetch_many(&values, topic_id).await;

        let found = results.values().any(Option::is_some);
        self.mutate(false, |s| {
            for request in &requests {
                let data = results.get(&request.value).cloned().flatten();
                s.resolve(request, data);
            }
        });

        if found {
            self.loading.stop_loading();
        } else {
            self.loading.set_error(format!(
                "No institutions found for: {}",
                values.join(", ")
            ));
        }
    }

    /// Apply `f` under the lock, publish the snapshot and optionally write
    /// the URL, all before releasing the lock.
    fn mutate<R>(&self, sync_url: bool, f: impl FnOnce(&mut Slots) -> R) -> R {
        let mut slots = self.lock();
        let result = f(&mut slots);
        self.publish(&slots, sync_url);
        result
    }

    /// Like [`mutate`](Self::mutate), but publishes nothing when `f`
    /// returns `None`.
    fn try_mutate<R>(&self, sync_url: bool, f: impl FnOnce(&mut Slots) -> Option<R>) -> Option<R> {
        let mut slots = self.lock();
        let result = f(&mut slots)?;
        self.publish(&slots, sync_url);
        Some(result)
    }

    fn publish(&self, slots: &Slots, sync_url: bool) {
        self.snapshot.send_replace(slots.snapshot());
        if sync_url {
            let next = query::terms_query(&self.navigator.query(), &slots.committed());
            self.navigator.replace(&next);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Index of the slot with positional id `id` ("1" is index 0).
fn slot_index(id: &str) -> Option<usize> {
    id.trim().parse::<usize>().ok()?.checked_sub(1)
}
