//! Keyed diff between two slide sequences

use crate::book::{Slide, SlideKey};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// A single patch for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum SlidePatch {
    /// A slide whose key did not exist before, at its new position
    Insert { position: usize, slide: Slide },
    /// A slide whose key is gone
    Remove { key: SlideKey },
    /// Same key, different content
    Update {
        position: usize,
        key: SlideKey,
        slide: Slide,
    },
}

/// Patches turning one slide sequence into the next
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideDiff {
    pub generation: u64,
    pub patches: Vec<SlidePatch>,
}

impl SlideDiff {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            patches: Vec::new(),
        }
    }

    pub fn has_patches(&self) -> bool {
        !self.patches.is_empty()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

/// Compare slides by key.
///
/// Removals come first (in previous order), then inserts and updates in
/// current order, so applying patches front to back is safe.
pub fn diff_slides(previous: &[Slide], current: &[Slide], generation: u64) -> SlideDiff {
    let mut diff = SlideDiff::new(generation);

    let prev_by_key: FxHashMap<SlideKey, &Slide> =
        previous.iter().map(|slide| (slide.key(), slide)).collect();
    let curr_by_key: FxHashMap<SlideKey, &Slide> =
        current.iter().map(|slide| (slide.key(), slide)).collect();

    for slide in previous {
        let key = slide.key();
        if !curr_by_key.contains_key(&key) {
            diff.patches.push(SlidePatch::Remove { key });
        }
    }

    for (position, slide) in current.iter().enumerate() {
        let key = slide.key();
        match prev_by_key.get(&key) {
            None => diff.patches.push(SlidePatch::Insert {
                position,
                slide: slide.clone(),
            }),
            Some(prev) if *prev != slide => diff.patches.push(SlidePatch::Update {
                position,
                key,
                slide: slide.clone(),
            }),
            Some(_) => {}
        }
    }

    diff
}
