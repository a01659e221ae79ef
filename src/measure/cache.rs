//! Memoizing measurer wrapper

use crate::content::hash_text;
use crate::measure::{Measurer, StyleProfile};
use crate::paginate::PageBudget;
use crate::Result;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MeasureKey {
    text_hash: u64,
    width_bits: u32,
}

/// Texts sharing a key, with their heights
type Bucket = SmallVec<[(Box<str>, f32); 1]>;

/// Remembers heights reported by an inner measurer.
///
/// Greedy accretion re-measures every growing prefix of a page, and an
/// unchanged topic is measured again on each pass; both hit this cache. The
/// cache is dropped whenever calibration sees a different budget, since the
/// inner surface may have been resized, and whenever the style changes. A hit
/// compares the stored text, not just its hash. Failures are never cached.
#[derive(Debug)]
pub struct CachedMeasurer<M> {
    inner: M,
    heights: FxHashMap<MeasureKey, Bucket>,
    budget: Option<PageBudget>,
    style: Option<StyleProfile>,
    hits: u64,
    misses: u64,
}

impl<M: Measurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            heights: FxHashMap::default(),
            budget: None,
            style: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Mutable access to the inner measurer; clears the cache
    pub fn inner_mut(&mut self) -> &mut M {
        self.clear();
        &mut self.inner
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }

    /// Number of remembered heights
    pub fn len(&self) -> usize {
        self.heights.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl<M: Measurer> Measurer for CachedMeasurer<M> {
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32> {
        if self.style.as_ref() != Some(style) {
            self.heights.clear();
            self.style = Some(style.clone());
        }

        let key = MeasureKey {
            text_hash: hash_text(text),
            width_bits: max_width.to_bits(),
        };

        let cached = self
            .heights
            .get(&key)
            .and_then(|bucket| bucket.iter().find(|(seen, _)| &**seen == text));
        if let Some(&(_, height)) = cached {
            self.hits += 1;
            return Ok(height);
        }

        let height = self.inner.measure(text, max_width, style)?;
        self.misses += 1;
        self.heights
            .entry(key)
            .or_default()
            .push((text.into(), height));
        Ok(height)
    }

    fn calibrate(&mut self, budget: &PageBudget) -> Result<()> {
        if self.budget.as_ref() != Some(budget) {
            log::debug!(
                "measure cache dropped ({} entries) for new budget",
                self.len()
            );
            self.heights.clear();
            self.budget = Some(*budget);
        }
        self.inner.calibrate(budget)
    }
}
