//! Per-topic pagination results with incremental invalidation

use crate::content::{hash_text, ContentStore, StoreChange, TopicKey};
use crate::measure::{Measurer, StyleProfile};
use crate::paginate::{paginate_text, Page, PageBudget};
use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

/// Pagination state of one topic
#[derive(Debug, Clone, PartialEq)]
pub enum TopicPagination {
    /// Paginated against the current budget
    Ready {
        /// Hash of the text the pages were computed from
        content_hash: u64,
        pages: Vec<Page>,
    },
    /// Waiting for the measurement surface
    Pending,
}

impl TopicPagination {
    pub fn is_ready(&self) -> bool {
        matches!(self, TopicPagination::Ready { .. })
    }

    pub fn pages(&self) -> Option<&[Page]> {
        match self {
            TopicPagination::Ready { pages, .. } => Some(pages),
            TopicPagination::Pending => None,
        }
    }
}

/// Pagination results keyed by topic
pub type PaginationResults = FxHashMap<TopicKey, TopicPagination>;

/// What a refresh did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Topics paginated during this refresh
    pub paginated: usize,
    /// Topics reused from earlier passes
    pub reused: usize,
    /// Topics left pending
    pub pending: usize,
    /// Overflow pages among freshly paginated topics
    pub overflow_pages: usize,
}

/// Pagination results for every topic in the store.
///
/// Store changes mark individual topics dirty; a new budget or style
/// invalidates everything. `refresh` only re-paginates what is dirty,
/// missing, pending or whose text hash no longer matches.
#[derive(Debug, Clone, Default)]
pub struct PaginationCache {
    entries: PaginationResults,
    dirty: FxHashSet<TopicKey>,
    budget: Option<PageBudget>,
    style: Option<StyleProfile>,
}

impl PaginationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark topics touched by a store mutation
    pub fn invalidate(&mut self, change: &StoreChange) {
        for key in &change.upserted {
            self.dirty.insert(key.clone());
        }

        for key in &change.removed {
            self.entries.remove(key);
            self.dirty.remove(key);
        }
    }

    /// Mark every known topic dirty (for full repagination)
    pub fn invalidate_all(&mut self) {
        self.dirty.extend(self.entries.keys().cloned());
    }

    /// Set the budget and style for following refreshes.
    ///
    /// Returns true if they differ from the previous ones, in which case all
    /// results are invalidated.
    pub fn set_layout(&mut self, budget: PageBudget, style: &StyleProfile) -> bool {
        let changed = self.budget != Some(budget) || self.style.as_ref() != Some(style);
        if changed {
            self.budget = Some(budget);
            self.style = Some(style.clone());
            self.invalidate_all();
        }
        changed
    }

    pub fn budget(&self) -> Option<&PageBudget> {
        self.budget.as_ref()
    }

    /// Drop results for topics the store no longer has.
    ///
    /// Each dropped entry is returned as an `InconsistentStore` error; the
    /// caller only needs to log them since the topics are gone anyway.
    pub fn prune(&mut self, store: &ContentStore) -> Vec<Error> {
        let stale: Vec<TopicKey> = self
            .entries
            .keys()
            .filter(|key| !store.contains(key))
            .cloned()
            .collect();

        stale
            .into_iter()
            .map(|key| {
                self.entries.remove(&key);
                self.dirty.remove(&key);
                Error::inconsistent(key.chapter, key.topic)
            })
            .collect()
    }

    fn needs_pagination(&self, key: &TopicKey, text: &str) -> bool {
        if self.dirty.contains(key) {
            return true;
        }
        match self.entries.get(key) {
            Some(TopicPagination::Ready { content_hash, .. }) => *content_hash != hash_text(text),
            Some(TopicPagination::Pending) | None => true,
        }
    }

    /// Calibrate the measurer and paginate every topic that needs it.
    ///
    /// Once the measurer reports `MeasurementUnavailable`, the remaining
    /// topics that need work are marked pending without being measured.
    pub fn refresh<M: Measurer + ?Sized>(
        &mut self,
        store: &ContentStore,
        measurer: &mut M,
    ) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();
        let (Some(budget), Some(style)) = (self.budget, self.style.clone()) else {
            // Nothing can be measured without a layout
            for (key, _) in store.topics() {
                self.entries.entry(key).or_insert(TopicPagination::Pending);
                report.pending += 1;
            }
            return Ok(report);
        };

        let mut surface_ready = match measurer.calibrate(&budget) {
            Ok(()) => true,
            Err(Error::MeasurementUnavailable) => false,
            Err(err) => return Err(err),
        };

        for (key, text) in store.topics() {
            if !self.needs_pagination(&key, text) {
                report.reused += 1;
                continue;
            }

            if !surface_ready {
                self.dirty.remove(&key);
                self.entries.insert(key, TopicPagination::Pending);
                report.pending += 1;
                continue;
            }

            match paginate_text(text, &budget, measurer, &style) {
                Ok(pages) => {
                    report.paginated += 1;
                    report.overflow_pages += pages.iter().filter(|p| p.overflow).count();
                    self.dirty.remove(&key);
                    self.entries.insert(
                        key,
                        TopicPagination::Ready {
                            content_hash: hash_text(text),
                            pages,
                        },
                    );
                }
                Err(Error::MeasurementUnavailable) => {
                    log::debug!("measurement unavailable at '{}', deferring", key);
                    surface_ready = false;
                    self.dirty.remove(&key);
                    self.entries.insert(key, TopicPagination::Pending);
                    report.pending += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    pub fn get(&self, key: &TopicKey) -> Option<&TopicPagination> {
        self.entries.get(key)
    }

    pub fn results(&self) -> &PaginationResults {
        &self.entries
    }

    /// Number of topics waiting for measurement
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|e| !e.is_ready()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
