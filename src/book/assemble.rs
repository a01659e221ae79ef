use crate::book::{Assembly, PageKind, Slide};
use crate::config::PendingPolicy;
use crate::content::{join_lines, logical_lines, ContentStore, TopicKey};
use crate::paginate::{PaginationResults, TopicPagination};
use crate::{Error, Result};

/// Build the slide sequence from the store and per-topic pagination results.
///
/// Pure: the same store and results always give the same slides. A topic
/// without a result counts as pending. Results for topics the store does not
/// have fail the assembly with `InconsistentStore`.
pub fn assemble(
    store: &ContentStore,
    results: &PaginationResults,
    policy: PendingPolicy,
    generation: u64,
) -> Result<Assembly> {
    if let Some(stale) = results.keys().filter(|key| !store.contains(key)).min() {
        return Err(Error::inconsistent(stale.chapter.clone(), stale.topic.clone()));
    }

    let pending = store
        .topics()
        .filter(|(key, _)| !results.get(key).is_some_and(TopicPagination::is_ready))
        .count();
    if pending > 0 && policy == PendingPolicy::Withhold {
        return Err(Error::NotReady { pending });
    }

    let mut slides = vec![Slide::FrontCover];

    for (chapter_pos, (chapter_name, chapter)) in store.chapters().enumerate() {
        let chapter_index = chapter_pos + 1;
        slides.push(Slide::ChapterDivider {
            chapter_index,
            chapter_name: chapter_name.to_string(),
            topic_count: chapter.topic_count(),
        });

        for (topic_pos, (topic_name, text)) in chapter.topics().enumerate() {
            let topic_index = topic_pos + 1;
            let key = TopicKey::new(chapter_name, topic_name);
            let content_page = |page_index: usize,
                                page_count: usize,
                                text: String,
                                kind: PageKind| Slide::ContentPage {
                chapter_index,
                topic_index,
                topic_name: topic_name.to_string(),
                page_index,
                page_count,
                text,
                kind,
            };

            match results.get(&key).and_then(TopicPagination::pages) {
                Some([]) => {
                    log::debug!(
                        "{}",
                        Error::EmptyContent {
                            chapter: key.chapter.clone(),
                            topic: key.topic.clone(),
                        }
                    );
                    slides.push(content_page(1, 1, String::new(), PageKind::Placeholder));
                }
                Some(pages) => {
                    let count = pages.len();
                    for page in pages {
                        let kind = if page.overflow {
                            PageKind::Overflow
                        } else {
                            PageKind::Normal
                        };
                        slides.push(content_page(page.index + 1, count, page.text(), kind));
                    }
                }
                None => {
                    let full = join_lines(&logical_lines(text));
                    let kind = if full.is_empty() {
                        PageKind::Placeholder
                    } else {
                        PageKind::Unpaginated
                    };
                    slides.push(content_page(1, 1, full, kind));
                }
            }
        }
    }

    slides.push(Slide::BackCover);
    Ok(Assembly::new(generation, slides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::SlideKey;
    use crate::measure::{GridMeasurer, StyleProfile};
    use crate::paginate::{PageBudget, PaginationCache};

    // 5 rows of 10 columns per page
    fn paginated(store: &ContentStore) -> PaginationCache {
        let mut cache = PaginationCache::new();
        cache.set_layout(
            PageBudget::new(120.0, 130.0, 10.0, 20.0),
            &StyleProfile::default(),
        );
        cache
            .refresh(store, &mut GridMeasurer::new(10.0, 20.0))
            .unwrap();
        cache
    }

    fn two_chapters() -> ContentStore {
        let mut store = ContentStore::new();
        store.upsert_topic("A", "Intro", "short");
        store.upsert_topic("B", "Long", "1\n2\n3\n4\n5\n6\n7");
        store
    }

    fn keys(assembly: &Assembly) -> Vec<String> {
        assembly.keys().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_cover_divider_page_order() {
        let store = two_chapters();
        let cache = paginated(&store);
        let assembly = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap();

        assert_eq!(
            keys(&assembly),
            vec![
                "front-cover",
                "chapter-1",
                "1-1-1",
                "chapter-2",
                "2-1-1",
                "2-1-2",
                "back-cover"
            ]
        );
        assert_eq!(
            assembly.slides[1],
            Slide::ChapterDivider {
                chapter_index: 1,
                chapter_name: "A".to_string(),
                topic_count: 1,
            }
        );
        assert!(matches!(
            &assembly.slides[5],
            Slide::ContentPage { page_index: 2, page_count: 2, text, .. } if text == "6\n7"
        ));
    }

    #[test]
    fn test_deleting_chapter_renumbers() {
        let mut store = two_chapters();
        let mut cache = paginated(&store);
        if let Some(change) = store.delete_chapter("A") {
            cache.invalidate(&change);
        }

        let assembly = assemble(&store, cache.results(), PendingPolicy::Withhold, 2).unwrap();
        assert_eq!(
            keys(&assembly),
            vec!["front-cover", "chapter-1", "1-1-1", "1-1-2", "back-cover"]
        );
        assert!(matches!(
            assembly.find(SlideKey::Chapter(1)),
            Some(Slide::ChapterDivider { chapter_name, .. }) if chapter_name == "B"
        ));
    }

    #[test]
    fn test_deleting_topic_renumbers_following_topics() {
        let mut store = ContentStore::new();
        store.upsert_topic("A", "T1", "one");
        store.upsert_topic("A", "T2", "two");
        store.upsert_topic("A", "T3", "three");
        let mut cache = paginated(&store);
        if let Some(change) = store.delete_topic("A", "T2") {
            cache.invalidate(&change);
        }

        let assembly = assemble(&store, cache.results(), PendingPolicy::Withhold, 2).unwrap();
        assert_eq!(
            keys(&assembly),
            vec!["front-cover", "chapter-1", "1-1-1", "1-2-1", "back-cover"]
        );
        assert!(matches!(
            &assembly.slides[1],
            Slide::ChapterDivider { topic_count: 2, .. }
        ));
        assert!(matches!(
            &assembly.slides[3],
            Slide::ContentPage { topic_index: 2, topic_name, text, .. }
                if topic_name == "T3" && text == "three"
        ));
    }

    #[test]
    fn test_idempotent() {
        let store = two_chapters();
        let cache = paginated(&store);
        let a = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap();
        let b = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_store_is_just_covers() {
        let store = ContentStore::new();
        let assembly =
            assemble(&store, &PaginationResults::default(), PendingPolicy::Withhold, 0).unwrap();
        assert_eq!(assembly, Assembly::empty(0));
    }

    #[test]
    fn test_empty_topic_gets_placeholder() {
        let mut store = ContentStore::new();
        store.upsert_topic("A", "Blank", "  \n");
        let cache = paginated(&store);
        let assembly = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap();

        assert_eq!(
            assembly.slides[2],
            Slide::ContentPage {
                chapter_index: 1,
                topic_index: 1,
                topic_name: "Blank".to_string(),
                page_index: 1,
                page_count: 1,
                text: String::new(),
                kind: PageKind::Placeholder,
            }
        );
    }

    #[test]
    fn test_pending_withheld() {
        let store = two_chapters();
        let mut results = paginated(&store).results().clone();
        results.insert(TopicKey::new("B", "Long"), TopicPagination::Pending);

        let err = assemble(&store, &results, PendingPolicy::Withhold, 1).unwrap_err();
        assert!(matches!(err, Error::NotReady { pending: 1 }));
    }

    #[test]
    fn test_pending_unpaginated() {
        let store = two_chapters();
        let mut results = paginated(&store).results().clone();
        results.remove(&TopicKey::new("B", "Long"));

        let assembly = assemble(&store, &results, PendingPolicy::Unpaginated, 1).unwrap();
        assert_eq!(assembly.page_count(), 2);
        assert!(matches!(
            &assembly.slides[4],
            Slide::ContentPage { kind: PageKind::Unpaginated, page_count: 1, text, .. }
                if text == "1\n2\n3\n4\n5\n6\n7"
        ));
    }

    #[test]
    fn test_stale_results_rejected() {
        let mut store = two_chapters();
        let cache = paginated(&store);
        store.delete_topic("A", "Intro");

        let err = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentStore { chapter, topic } if chapter == "A" && topic == "Intro"
        ));
    }

    #[test]
    fn test_overflow_page_kind() {
        let mut store = ContentStore::new();
        store.upsert_topic("A", "Wide", &"x".repeat(80));
        let cache = paginated(&store);
        let assembly = assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap();
        assert!(matches!(
            &assembly.slides[2],
            Slide::ContentPage { kind: PageKind::Overflow, .. }
        ));
    }
}
