//! Full-text search over loaded guide sections.
//!
//! The index is built once per loaded language: one entry per section,
//! holding lowercased, markup-stripped text. Queries are case-insensitive
//! substring matches against title or body, scoped to one language.

use crate::markdown::plain_text;
use crate::section::{GuideDocument, Language, SectionKey};

/// Trailing delay applied to keystrokes before a search runs.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Highlighting caps out at this many navigation entries.
pub const MAX_MATCHES: usize = 5;

#[derive(Debug, Clone)]
struct IndexEntry {
    language: Language,
    key: SectionKey,
    title: String,
    body: String,
}

/// Searchable view of every loaded `{language, section}` pair.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a freshly loaded document, replacing any previous entries for
    /// that language.
    pub fn index_document(&mut self, language: Language, document: &GuideDocument) {
        self.entries.retain(|entry| entry.language != language);
        for key in document.keys() {
            if let Some(section) = document.section(key) {
                self.entries.push(IndexEntry {
                    language,
                    key,
                    title: section.title.to_lowercase(),
                    body: plain_text(&section.content).to_lowercase(),
                });
            }
        }
    }

    /// Sections of `language` matching `query`, in navigation order, capped
    /// at [`MAX_MATCHES`]. A blank query matches nothing, which is how the
    /// caller clears highlighting.
    pub fn query(&self, language: Language, query: &str) -> Vec<SectionKey> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<SectionKey> = self
            .entries
            .iter()
            .filter(|entry| entry.language == language)
            .filter(|entry| entry.title.contains(&needle) || entry.body.contains(&needle))
            .map(|entry| entry.key)
            .collect();

        matches.sort_by_key(|key| SectionKey::ALL.iter().position(|k| k == key));
        matches.truncate(MAX_MATCHES);
        matches
    }

    /// Number of indexed entries across all languages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::embedded_document;

    fn loaded_index() -> SearchIndex {
        let mut index = SearchIndex::new();
        for language in Language::ALL {
            index.index_document(language, &embedded_document(language));
        }
        index
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let index = loaded_index();
        let hits = index.query(Language::En, "pro");
        assert!(hits.contains(&SectionKey::Providers), "hits: {hits:?}");
    }

    #[test]
    fn matches_are_scoped_to_one_language() {
        let index = loaded_index();
        let hits = index.query(Language::Zh, "服务商");
        assert!(hits.contains(&SectionKey::Providers));
        assert!(index.query(Language::En, "服务商").is_empty());
    }

    #[test]
    fn blank_query_clears_highlighting() {
        let index = loaded_index();
        assert!(index.query(Language::En, "").is_empty());
        assert!(index.query(Language::En, "   ").is_empty());
    }

    #[test]
    fn results_are_capped_and_ordered() {
        let index = loaded_index();
        // "the" appears in more than five sections of the embedded guide.
        let hits = index.query(Language::En, "the");
        assert!(hits.len() <= MAX_MATCHES);
        let positions: Vec<_> = hits
            .iter()
            .map(|key| SectionKey::ALL.iter().position(|k| k == key).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn reindexing_replaces_stale_entries() {
        let mut index = SearchIndex::new();
        index.index_document(Language::En, &embedded_document(Language::En));
        let before = index.len();
        index.index_document(Language::En, &embedded_document(Language::En));
        assert_eq!(index.len(), before);
    }

    #[test]
    fn query_ignores_markup_in_source() {
        let index = loaded_index();
        // "support@chatline.example" is bold in the source; the markers must
        // not break substring matching.
        let hits = index.query(Language::En, "support@chatline");
        assert!(hits.contains(&SectionKey::Support));
    }
}
