//! Fuzzy drug name suggestions.
//!
//! Dose resolution is exact-match only; this lets a caller recover from a
//! misspelled name by offering the closest catalog entries.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::config::ResolverConfig;
use crate::store::KnowledgeStore;

use super::ResolverResult;

/// A catalog drug close to the requested name.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugSuggestion {
    pub name: String,
    pub generic_name: Option<String>,
    /// Similarity (0.0 - 1.0)
    pub similarity: f64,
}

pub struct DrugSuggester<'a> {
    store: &'a dyn KnowledgeStore,
    config: &'a ResolverConfig,
}

impl<'a> DrugSuggester<'a> {
    pub fn new(store: &'a dyn KnowledgeStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Closest drugs by brand or generic name, best first.
    pub fn suggest(&self, name: &str, limit: usize) -> ResolverResult<Vec<DrugSuggestion>> {
        let query = name.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut suggestions: Vec<DrugSuggestion> = self
            .store
            .list_drugs()?
            .into_iter()
            .map(|drug| {
                let name_score = fuzzy_match(&query, &drug.name.to_lowercase());
                let generic_score = drug
                    .generic_name
                    .as_deref()
                    .map(|g| fuzzy_match(&query, &g.to_lowercase()))
                    .unwrap_or(0.0);
                DrugSuggestion {
                    name: drug.name,
                    generic_name: drug.generic_name,
                    similarity: name_score.max(generic_score),
                }
            })
            .filter(|s| s.similarity >= self.config.min_suggestion_similarity)
            .collect();

        suggestions.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.name.cmp(&b.name))
        });
        suggestions.truncate(limit);
        Ok(suggestions)
    }
}

/// Compute fuzzy string similarity using combined metrics.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edit distance
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}
