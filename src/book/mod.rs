//! Slide sequence assembly
//!
//! A book is a front cover, then per chapter a divider followed by every
//! page of every topic, then a back cover. Numbering comes from store order
//! alone and is recomputed on every assembly.

mod assemble;
mod diff;

pub use assemble::assemble;
pub use diff::{diff_slides, SlideDiff, SlidePatch};

use rustc_hash::FxHasher;
use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};

/// How a content page came to be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Normal,
    /// A single logical line taller than the page budget
    Overflow,
    /// Stand-in for a topic with no text
    Placeholder,
    /// Full text of a topic still waiting for measurement
    Unpaginated,
}

/// One unit the flip-book renderer displays.
///
/// Indices are 1-based, as shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Slide {
    FrontCover,
    #[serde(rename_all = "camelCase")]
    ChapterDivider {
        chapter_index: usize,
        chapter_name: String,
        topic_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    ContentPage {
        chapter_index: usize,
        topic_index: usize,
        topic_name: String,
        page_index: usize,
        page_count: usize,
        text: String,
        kind: PageKind,
    },
    BackCover,
}

impl Slide {
    /// Stable identity used for diffing and by the renderer
    pub fn key(&self) -> SlideKey {
        match self {
            Slide::FrontCover => SlideKey::FrontCover,
            Slide::ChapterDivider { chapter_index, .. } => SlideKey::Chapter(*chapter_index),
            Slide::ContentPage {
                chapter_index,
                topic_index,
                page_index,
                ..
            } => SlideKey::Content {
                chapter: *chapter_index,
                topic: *topic_index,
                page: *page_index,
            },
            Slide::BackCover => SlideKey::BackCover,
        }
    }

    pub fn is_content(&self) -> bool {
        matches!(self, Slide::ContentPage { .. })
    }
}

/// Slide identity, formatted as `front-cover`, `chapter-{n}`,
/// `{chapter}-{topic}-{page}` or `back-cover`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlideKey {
    FrontCover,
    Chapter(usize),
    Content {
        chapter: usize,
        topic: usize,
        page: usize,
    },
    BackCover,
}

impl std::fmt::Display for SlideKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlideKey::FrontCover => write!(f, "front-cover"),
            SlideKey::Chapter(n) => write!(f, "chapter-{}", n),
            SlideKey::Content {
                chapter,
                topic,
                page,
            } => write!(f, "{}-{}-{}", chapter, topic, page),
            SlideKey::BackCover => write!(f, "back-cover"),
        }
    }
}

impl Serialize for SlideKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An immutable slide sequence and what it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Generation of the pass that produced it
    pub generation: u64,
    /// Hash of the slide sequence
    pub fingerprint: u64,
    pub slides: Vec<Slide>,
}

impl Assembly {
    pub fn new(generation: u64, slides: Vec<Slide>) -> Self {
        Self {
            generation,
            fingerprint: fingerprint(&slides),
            slides,
        }
    }

    /// Just the covers, for a book without chapters
    pub fn empty(generation: u64) -> Self {
        Self::new(generation, vec![Slide::FrontCover, Slide::BackCover])
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = SlideKey> + '_ {
        self.slides.iter().map(Slide::key)
    }

    pub fn find(&self, key: SlideKey) -> Option<&Slide> {
        self.slides.iter().find(|slide| slide.key() == key)
    }

    /// Number of content pages
    pub fn page_count(&self) -> usize {
        self.slides.iter().filter(|s| s.is_content()).count()
    }

    /// Whether both hold the same slide sequence. The fingerprint only
    /// short-cuts the comparison.
    pub fn same_slides(&self, other: &Assembly) -> bool {
        self.fingerprint == other.fingerprint && self.slides == other.slides
    }
}

fn fingerprint(slides: &[Slide]) -> u64 {
    let mut hasher = FxHasher::default();
    slides.hash(&mut hasher);
    hasher.finish()
}
