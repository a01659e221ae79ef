//! Content store: chapters of topics of raw markdown text

mod index;
mod lines;

pub use index::NameIndex;
pub use lines::{join_lines, logical_lines, BlockKind, ListMarker, LogicalLine};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Identifies a topic across the crate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicKey {
    pub chapter: String,
    pub topic: String,
}

impl TopicKey {
    pub fn new(chapter: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            topic: topic.into(),
        }
    }
}

impl std::fmt::Display for TopicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chapter, self.topic)
    }
}

/// A chapter: ordered topics and their raw text
#[derive(Debug, Clone, Default)]
pub struct Chapter {
    topics: NameIndex<String>,
}

impl Chapter {
    /// Topics in order as (name, text)
    pub fn topics(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.topics.iter().map(|(name, text)| (name, text.as_str()))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topic_text(&self, topic: &str) -> Option<&str> {
        self.topics.get(topic).map(String::as_str)
    }
}

/// What a single store mutation touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreChange {
    /// Store version after the mutation
    pub version: u64,
    /// Topics created or whose text changed
    pub upserted: SmallVec<[TopicKey; 2]>,
    /// Topics that no longer exist
    pub removed: SmallVec<[TopicKey; 4]>,
    /// Chapter order changed (a chapter appeared or disappeared)
    pub reordered: bool,
}

impl StoreChange {
    /// Check if the mutation had any effect
    pub fn has_changes(&self) -> bool {
        !self.upserted.is_empty() || !self.removed.is_empty() || self.reordered
    }
}

/// Ordered map of chapter name to ordered map of topic name to text.
///
/// Insertion order is the only source of chapter and topic numbering.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    chapters: NameIndex<Chapter>,
    /// Monotonic version counter
    version: u64,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the store version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Append an empty chapter if it does not exist yet
    pub fn add_chapter(&mut self, chapter: &str) -> StoreChange {
        let mut change = StoreChange::default();
        if !self.chapters.contains(chapter) {
            self.chapters.insert(chapter, Chapter::default());
            self.version += 1;
            change.reordered = true;
        }
        change.version = self.version;
        change
    }

    /// Create or replace a topic's text.
    ///
    /// A missing chapter is appended; an existing topic keeps its position.
    pub fn upsert_topic(&mut self, chapter: &str, topic: &str, text: &str) -> StoreChange {
        let mut change = StoreChange::default();
        let new_chapter = !self.chapters.contains(chapter);
        let entry = self.chapters.get_or_insert_with(chapter, Chapter::default);

        let unchanged = entry.topics.get(topic).is_some_and(|old| old == text);
        if !unchanged {
            entry.topics.insert(topic, text.to_string());
            self.version += 1;
            change.upserted.push(TopicKey::new(chapter, topic));
            change.reordered = new_chapter;
        }

        change.version = self.version;
        change
    }

    /// Remove a topic. Returns `None` if it did not exist.
    pub fn delete_topic(&mut self, chapter: &str, topic: &str) -> Option<StoreChange> {
        let entry = self.chapters.get_mut(chapter)?;
        entry.topics.remove(topic)?;
        self.version += 1;

        let mut change = StoreChange {
            version: self.version,
            ..StoreChange::default()
        };
        change.removed.push(TopicKey::new(chapter, topic));
        Some(change)
    }

    /// Remove a chapter and all of its topics. Returns `None` if it did not exist.
    pub fn delete_chapter(&mut self, chapter: &str) -> Option<StoreChange> {
        let removed = self.chapters.remove(chapter)?;
        self.version += 1;

        Some(StoreChange {
            version: self.version,
            upserted: SmallVec::new(),
            removed: removed
                .topics
                .names()
                .map(|topic| TopicKey::new(chapter, topic))
                .collect(),
            reordered: true,
        })
    }

    /// Chapters in order as (name, chapter)
    pub fn chapters(&self) -> impl Iterator<Item = (&str, &Chapter)> + '_ {
        self.chapters.iter()
    }

    pub fn chapter(&self, chapter: &str) -> Option<&Chapter> {
        self.chapters.get(chapter)
    }

    /// Every topic in book order as (key, text)
    pub fn topics(&self) -> impl Iterator<Item = (TopicKey, &str)> + '_ {
        self.chapters.iter().flat_map(|(chapter, entry)| {
            entry
                .topics()
                .map(move |(topic, text)| (TopicKey::new(chapter, topic), text))
        })
    }

    pub fn topic_text(&self, key: &TopicKey) -> Option<&str> {
        self.chapters.get(&key.chapter)?.topic_text(&key.topic)
    }

    pub fn contains(&self, key: &TopicKey) -> bool {
        self.topic_text(key).is_some()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn topic_count(&self) -> usize {
        self.chapters.iter().map(|(_, c)| c.topic_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Hash of names and texts in order, for memoizing downstream results
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for (chapter, entry) in self.chapters.iter() {
            chapter.hash(&mut hasher);
            entry.topic_count().hash(&mut hasher);
            for (topic, text) in entry.topics() {
                topic.hash(&mut hasher);
                text.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Export in the `[{name, topics: [{name, content}]}]` shape
    pub fn to_json(&self) -> crate::Result<String> {
        let chapters: Vec<StoredChapter> = self
            .chapters
            .iter()
            .map(|(name, entry)| StoredChapter {
                name: name.to_string(),
                topics: entry
                    .topics()
                    .map(|(topic, text)| StoredTopic {
                        name: topic.to_string(),
                        content: text.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Ok(serde_json::to_string(&chapters)?)
    }

    /// Import from the shape produced by [`ContentStore::to_json`]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let chapters: Vec<StoredChapter> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for chapter in chapters {
            store.add_chapter(&chapter.name);
            for topic in chapter.topics {
                store.upsert_topic(&chapter.name, &topic.name, &topic.content);
            }
        }
        Ok(store)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredChapter {
    name: String,
    #[serde(default)]
    topics: Vec<StoredTopic>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTopic {
    name: String,
    #[serde(default)]
    content: String,
}

/// Hash text content for change detection
pub fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentStore {
        let mut store = ContentStore::new();
        store.upsert_topic("Mechanics", "Newton", "F = ma");
        store.upsert_topic("Mechanics", "Energy", "E = mc^2");
        store.upsert_topic("Optics", "Lenses", "Thin lens equation");
        store
    }

    #[test]
    fn test_new_store() {
        let store = ContentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_upsert_order_and_version() {
        let store = sample();
        let chapters: Vec<_> = store.chapters().map(|(name, _)| name).collect();
        assert_eq!(chapters, vec!["Mechanics", "Optics"]);
        assert_eq!(store.topic_count(), 3);
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = sample();
        let change = store.upsert_topic("Mechanics", "Newton", "F = dp/dt");
        assert!(change.has_changes());
        assert!(!change.reordered);
        assert_eq!(change.upserted[0], TopicKey::new("Mechanics", "Newton"));

        let topics: Vec<_> = store
            .chapter("Mechanics")
            .map(|c| c.topics().map(|(t, _)| t).collect())
            .unwrap_or_default();
        assert_eq!(topics, vec!["Newton", "Energy"]);
        assert_eq!(
            store.topic_text(&TopicKey::new("Mechanics", "Newton")),
            Some("F = dp/dt")
        );
    }

    #[test]
    fn test_identical_upsert_is_noop() {
        let mut store = sample();
        let before = store.version();
        let change = store.upsert_topic("Optics", "Lenses", "Thin lens equation");
        assert!(!change.has_changes());
        assert_eq!(store.version(), before);
    }

    #[test]
    fn test_delete_topic() {
        let mut store = sample();
        let change = store.delete_topic("Mechanics", "Newton").unwrap();
        assert_eq!(change.removed.len(), 1);
        assert!(!store.contains(&TopicKey::new("Mechanics", "Newton")));
        assert!(store.delete_topic("Mechanics", "Newton").is_none());
        assert!(store.delete_topic("Nope", "Newton").is_none());
    }

    #[test]
    fn test_delete_chapter_lists_topics() {
        let mut store = sample();
        let change = store.delete_chapter("Mechanics").unwrap();
        assert!(change.reordered);
        assert_eq!(
            change.removed.to_vec(),
            vec![
                TopicKey::new("Mechanics", "Newton"),
                TopicKey::new("Mechanics", "Energy")
            ]
        );
        assert_eq!(store.chapter_count(), 1);
        assert!(store.delete_chapter("Mechanics").is_none());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.upsert_topic("Optics", "Lenses", "changed");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_json_round_trip_keeps_empty_chapter() {
        let mut store = sample();
        store.add_chapter("Appendix");
        let json = store.to_json().unwrap();
        let restored = ContentStore::from_json(&json).unwrap();
        assert_eq!(restored.fingerprint(), store.fingerprint());
        assert_eq!(restored.chapter_count(), 3);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(ContentStore::from_json("{").is_err());
    }
}
