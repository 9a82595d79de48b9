//! Reference content ranking.

use crate::config::ResolverConfig;
use crate::models::{Citation, ReferenceContent};
use crate::store::{ContentQuery, KnowledgeStore};

use super::{ResolverError, ResolverResult};

/// Ranks reference passages by relevance to free text.
pub struct ContentRanker<'a> {
    store: &'a dyn KnowledgeStore,
    config: &'a ResolverConfig,
}

impl<'a> ContentRanker<'a> {
    pub fn new(store: &'a dyn KnowledgeStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Top passages for `query`, most relevant first, at most `limit` of them.
    ///
    /// `limit` is clamped to the configured maximum. A query consisting only of
    /// stop words matches nothing.
    pub fn rank(&self, query: &str, limit: usize) -> ResolverResult<Vec<ReferenceContent>> {
        if query.trim().is_empty() {
            return Err(ResolverError::InvalidInput("query must not be empty".into()));
        }
        if limit == 0 {
            return Err(ResolverError::InvalidInput("limit must be positive".into()));
        }

        let limit = limit.min(self.config.max_content_limit);
        let content_query = ContentQuery::new(query, limit);
        if content_query.is_empty() {
            tracing::debug!(query, "content query has no searchable terms");
            return Ok(Vec::new());
        }

        let mut scored = self.store.search_content(&content_query)?;
        // Stores already order by score; re-sorting stably keeps ties in store order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);

        tracing::debug!(
            terms = ?content_query.terms,
            count = scored.len(),
            "ranked reference content"
        );

        Ok(scored.into_iter().map(|s| s.content).collect())
    }

    /// Same ranking as [`rank`](Self::rank), shaped as display citations.
    pub fn cite(&self, query: &str, limit: usize) -> ResolverResult<Vec<Citation>> {
        let ranked = self.rank(query, limit)?;
        Ok(ranked
            .iter()
            .zip(1u32..)
            .map(|(content, rank)| {
                content.citation(&self.config.citation_source, self.config.excerpt_chars, rank)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn passage(chapter: &str, body: &str) -> ReferenceContent {
        ReferenceContent::new(chapter.into(), "Overview".into(), body.into())
    }

    fn setup_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_content(passage("Fever", "Fever is a common presenting complaint."));
        store.add_content(passage("Asthma", "Asthma is a chronic airway disease."));
        store.add_content(passage(
            "Fever in infants",
            "Fever in infants under 60 days: fever work-up includes blood and urine cultures.",
        ));
        store.add_content(passage("Otitis", "Otitis media often follows a viral illness with fever."));
        store
    }

    #[test]
    fn test_ranks_by_term_frequency() {
        let store = setup_store();
        let config = ResolverConfig::default();
        let ranker = ContentRanker::new(&store, &config);

        let results = ranker.rank("fever", 10).unwrap();
        let chapters: Vec<&str> = results.iter().map(|c| c.chapter.as_str()).collect();
        // Most occurrences first, remaining ties in store order
        assert_eq!(chapters, vec!["Fever in infants", "Fever", "Otitis"]);
    }

    #[test]
    fn test_limit_is_respected() {
        let store = setup_store();
        let config = ResolverConfig::default();
        let ranker = ContentRanker::new(&store, &config);

        assert_eq!(ranker.rank("fever", 2).unwrap().len(), 2);
        assert_eq!(ranker.rank("fever", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_limit_is_clamped() {
        let mut store = MemoryStore::new();
        for i in 0..5 {
            store.add_content(passage(&format!("Chapter {}", i), "sepsis"));
        }
        let config = ResolverConfig {
            max_content_limit: 3,
            default_content_limit: 3,
            ..ResolverConfig::default()
        };
        let ranker = ContentRanker::new(&store, &config);
        assert_eq!(ranker.rank("sepsis", 100).unwrap().len(), 3);
    }

    #[test]
    fn test_no_match_is_empty() {
        let store = setup_store();
        let config = ResolverConfig::default();
        let ranker = ContentRanker::new(&store, &config);

        assert!(ranker.rank("intussusception", 10).unwrap().is_empty());
        assert!(ranker.rank("what is the", 10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let store = setup_store();
        let config = ResolverConfig::default();
        let ranker = ContentRanker::new(&store, &config);

        assert!(matches!(ranker.rank("   ", 10), Err(ResolverError::InvalidInput(_))));
        assert!(matches!(ranker.rank("fever", 0), Err(ResolverError::InvalidInput(_))));
    }

    #[test]
    fn test_cite_carries_source_and_rank() {
        let store = setup_store();
        let config = ResolverConfig {
            excerpt_chars: 15,
            ..ResolverConfig::default()
        };
        let ranker = ContentRanker::new(&store, &config);

        let citations = ranker.cite("asthma", 5).unwrap();
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].source, "Nelson Textbook of Pediatrics");
        assert_eq!(citations[0].chapter, "Asthma");
        assert_eq!(citations[0].section, "Overview");
        assert_eq!(citations[0].content_snippet, "Asthma is a...");
        assert_eq!(citations[0].rank, 1);
    }
}
