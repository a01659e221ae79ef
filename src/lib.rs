//! Flipbook: a page-flipping study book built from chapters of topics
//!
//! This crate provides the pagination engine behind the reader:
//! - Greedy, measurement-driven pagination of topic text into fixed-size pages
//! - Incremental repagination (only edited topics are measured again)
//! - Stable slide numbering recomputed from store order on every pass
//! - Debounced, generation-checked passes with keyed slide diffs

pub mod book;
pub mod config;
pub mod content;
pub mod error;
pub mod measure;
pub mod paginate;
pub mod schedule;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmBook;

// Re-export primary types
pub use book::{Assembly, PageKind, Slide, SlideDiff, SlideKey, SlidePatch};
pub use config::{BookConfig, PendingPolicy};
pub use content::{ContentStore, StoreChange, TopicKey};
pub use error::{Error, Result};
pub use measure::{CachedMeasurer, GridMeasurer, Measurer, MetricsMeasurer, StyleProfile};
pub use paginate::{paginate, paginate_text, Page, PageBudget, PaginationCache, RefreshReport};
pub use schedule::{SubscriptionId, Viewport};

use schedule::{Debouncer, GenerationCounter, Subscribers};

/// Sent to subscribers after every pass that changed the slides
#[derive(Debug, Clone)]
pub struct BookUpdate {
    pub assembly: Assembly,
    pub diff: SlideDiff,
}

/// What a completed pass did to the book
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// New slides were published
    Updated(SlideDiff),
    /// The pass produced the slides already on screen
    Unchanged,
    /// The store or viewport changed while the pass ran; result dropped
    Stale,
}

/// A pagination pass detached from the book.
///
/// Holds a snapshot of everything it needs, so the book stays free to take
/// mutations while the pass runs.
#[derive(Debug)]
pub struct Pass {
    generation: u64,
    store: ContentStore,
    cache: PaginationCache,
    policy: PendingPolicy,
}

/// A finished pass, handed back with [`Book::complete_pass`]
#[derive(Debug)]
pub struct PassOutput {
    generation: u64,
    cache: PaginationCache,
    result: Result<Assembly>,
}

impl Pass {
    /// Generation this pass was started at
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Repaginate what changed and assemble the slides
    pub fn run<M: Measurer + ?Sized>(self, measurer: &mut M) -> PassOutput {
        let Pass {
            generation,
            store,
            mut cache,
            policy,
        } = self;

        for stale in cache.prune(&store) {
            log::warn!("{}", stale);
        }

        let result = match cache.refresh(&store, measurer) {
            Ok(report) => {
                log::debug!(
                    "pass {}: {} paginated, {} reused, {} pending, {} overflow",
                    generation,
                    report.paginated,
                    report.reused,
                    report.pending,
                    report.overflow_pages
                );
                book::assemble(&store, cache.results(), policy, generation)
            }
            Err(err) => Err(err),
        };

        PassOutput {
            generation,
            cache,
            result,
        }
    }
}

/// The book state combining all components
pub struct Book {
    config: BookConfig,
    store: ContentStore,
    viewport: Viewport,
    cache: PaginationCache,
    debouncer: Debouncer,
    generation: GenerationCounter,
    assembly: Assembly,
    subscribers: Subscribers<BookUpdate>,
    clock: fn() -> u64,
}

impl Book {
    /// Create an empty book
    pub fn new(config: BookConfig) -> Self {
        Self::with_clock(config, schedule::now_ms)
    }

    /// Create an empty book reading time from `clock` (milliseconds)
    pub fn with_clock(config: BookConfig, clock: fn() -> u64) -> Self {
        let viewport = config.initial_viewport.sanitized();
        let mut cache = PaginationCache::new();
        cache.set_layout(config.budget_for(viewport), &config.style);

        Self {
            debouncer: Debouncer::new(config.debounce_ms),
            config,
            store: ContentStore::new(),
            viewport,
            cache,
            generation: GenerationCounter::new(),
            assembly: Assembly::empty(0),
            subscribers: Subscribers::new(),
            clock,
        }
    }

    /// Create a book over an existing store; the first pass is scheduled
    pub fn with_store(config: BookConfig, store: ContentStore) -> Self {
        let mut book = Self::new(config);
        book.replace_store(store);
        book
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Raw content, e.g. for printing with a different pagination
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Page budget for the current viewport
    pub fn budget(&self) -> PageBudget {
        self.config.budget_for(self.viewport)
    }

    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// Latest published slides
    pub fn slides(&self) -> &[Slide] {
        &self.assembly.slides
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Whether a change is waiting for a pass
    pub fn is_dirty(&self) -> bool {
        self.debouncer.is_armed()
    }

    fn schedule(&mut self) {
        self.generation.bump();
        self.debouncer.touch((self.clock)());
    }

    fn apply(&mut self, change: StoreChange) -> bool {
        if !change.has_changes() {
            return false;
        }
        self.cache.invalidate(&change);
        self.schedule();
        true
    }

    /// Create or replace a topic. Returns false if the text is unchanged.
    pub fn upsert_topic(&mut self, chapter: &str, topic: &str, text: &str) -> bool {
        let change = self.store.upsert_topic(chapter, topic, text);
        self.apply(change)
    }

    /// Returns false if the topic did not exist
    pub fn delete_topic(&mut self, chapter: &str, topic: &str) -> bool {
        match self.store.delete_topic(chapter, topic) {
            Some(change) => self.apply(change),
            None => false,
        }
    }

    /// Returns false if the chapter did not exist
    pub fn delete_chapter(&mut self, chapter: &str) -> bool {
        match self.store.delete_chapter(chapter) {
            Some(change) => self.apply(change),
            None => false,
        }
    }

    /// Swap in a whole new store and repaginate everything
    pub fn replace_store(&mut self, store: ContentStore) {
        self.store = store;
        self.cache = PaginationCache::new();
        self.cache
            .set_layout(self.config.budget_for(self.viewport), &self.config.style);
        self.schedule();
    }

    /// Follow a viewport resize. Returns false if the size did not change.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let viewport = Viewport::new(width, height).sanitized();
        if viewport == self.viewport {
            return false;
        }

        self.viewport = viewport;
        self.cache
            .set_layout(self.config.budget_for(viewport), &self.config.style);
        self.schedule();
        true
    }

    /// Force every topic to be measured again, e.g. after the measurer changed
    pub fn invalidate_layout(&mut self) {
        self.cache.invalidate_all();
        self.schedule();
    }

    /// Register a callback for published slide updates
    pub fn subscribe(&mut self, callback: impl FnMut(&BookUpdate) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Snapshot the current state into a pass
    pub fn begin_pass(&self) -> Pass {
        Pass {
            generation: self.generation.current(),
            store: self.store.clone(),
            cache: self.cache.clone(),
            policy: self.config.pending_policy,
        }
    }

    /// Publish a finished pass unless a newer change superseded it
    pub fn complete_pass(&mut self, output: PassOutput) -> Result<PassOutcome> {
        if !self.generation.is_current(output.generation) {
            log::debug!(
                "dropping pass from generation {} (now {})",
                output.generation,
                self.generation.current()
            );
            return Ok(PassOutcome::Stale);
        }

        self.cache = output.cache;
        let assembly = match output.result {
            Ok(assembly) => assembly,
            Err(err) => {
                if err.is_transient() {
                    // Retry after the next quiet period
                    self.debouncer.touch((self.clock)());
                }
                return Err(err);
            }
        };
        let pending = self.cache.pending_count();
        if pending > 0 {
            // Shown unpaginated for now; measure again after the next quiet period
            log::debug!("{} topics still pending, pass rescheduled", pending);
            self.debouncer.touch((self.clock)());
        } else {
            self.debouncer.reset();
        }

        if assembly.same_slides(&self.assembly) {
            self.assembly.generation = assembly.generation;
            return Ok(PassOutcome::Unchanged);
        }

        let diff = book::diff_slides(&self.assembly.slides, &assembly.slides, assembly.generation);
        log::info!(
            "published {} slides ({} patches) at generation {}",
            assembly.len(),
            diff.patch_count(),
            assembly.generation
        );
        self.assembly = assembly;

        if !self.subscribers.is_empty() {
            let update = BookUpdate {
                assembly: self.assembly.clone(),
                diff: diff.clone(),
            };
            self.subscribers.notify(&update);
        }

        Ok(PassOutcome::Updated(diff))
    }

    /// Run a pass now, ignoring the debouncer
    pub fn recompute<M: Measurer + ?Sized>(&mut self, measurer: &mut M) -> Result<PassOutcome> {
        let output = self.begin_pass().run(measurer);
        self.complete_pass(output)
    }

    /// Whether a change is waiting and its quiet period has passed
    pub fn is_due(&self) -> bool {
        self.debouncer.ready((self.clock)())
    }

    /// Run a pass if a change is waiting and its quiet period has passed.
    ///
    /// Returns `Ok(None)` when there was nothing to do. On error the previous
    /// slides stay published.
    pub fn tick<M: Measurer + ?Sized>(
        &mut self,
        measurer: &mut M,
    ) -> Result<Option<PassOutcome>> {
        if !self.is_due() {
            return Ok(None);
        }

        match self.recompute(measurer) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                match err {
                    Error::NotReady { .. } | Error::MeasurementUnavailable => {
                        log::debug!("pass deferred: {}", err)
                    }
                    _ => log::warn!("pass failed: {}", err),
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("viewport", &self.viewport)
            .field("generation", &self.generation.current())
            .field("chapters", &self.store.chapter_count())
            .field("slides", &self.assembly.len())
            .finish()
    }
}
