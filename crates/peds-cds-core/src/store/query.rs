//! Filter predicates shared by every store implementation.

use crate::models::{AgeGroup, DosageRule, EmergencyProtocol};

/// Words ignored when building a content query.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "is", "it",
    "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "which", "with",
];

/// Rule filter for one drug and patient.
#[derive(Debug, Clone, PartialEq)]
pub struct DosageRuleQuery {
    pub drug_id: String,
    pub age_months: u32,
    pub weight_kg: f64,
    /// Exact indication filter, if any
    pub indication: Option<String>,
}

impl DosageRuleQuery {
    pub fn new(drug_id: &str, age_months: u32, weight_kg: f64) -> Self {
        Self {
            drug_id: drug_id.to_string(),
            age_months,
            weight_kg,
            indication: None,
        }
    }

    pub fn with_indication(mut self, indication: Option<&str>) -> Self {
        self.indication = indication.map(str::to_string);
        self
    }

    pub fn matches(&self, rule: &DosageRule) -> bool {
        rule.drug_id == self.drug_id
            && rule.covers(self.age_months, self.weight_kg)
            && self
                .indication
                .as_ref()
                .map_or(true, |indication| &rule.indication == indication)
    }
}

/// Protocol filter: case-insensitive condition substring plus optional age group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolQuery {
    pub condition: String,
    /// When set, keep protocols tagged with this group or untagged
    pub age_group: Option<AgeGroup>,
}

impl ProtocolQuery {
    pub fn new(condition: &str) -> Self {
        Self {
            condition: condition.to_string(),
            age_group: None,
        }
    }

    pub fn with_age_group(mut self, age_group: Option<AgeGroup>) -> Self {
        self.age_group = age_group;
        self
    }

    /// Same condition filter with the age narrowing removed.
    pub fn without_age_group(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            age_group: None,
        }
    }

    pub fn matches(&self, protocol: &EmergencyProtocol) -> bool {
        let needle = self.condition.to_lowercase();
        protocol.condition.to_lowercase().contains(&needle)
            && self.age_group.map_or(true, |group| protocol.applies_to(group))
    }
}

/// Full-text content query.
///
/// A passage matches only when every term occurs in it as a token prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuery {
    pub terms: Vec<String>,
    pub limit: usize,
}

impl ContentQuery {
    /// Build a query from free text, dropping stop words and duplicate terms.
    pub fn new(text: &str, limit: usize) -> Self {
        let mut terms: Vec<String> = Vec::new();
        for token in tokenize(text) {
            if !STOP_WORDS.contains(&token.as_str()) && !terms.contains(&token) {
                terms.push(token);
            }
        }
        Self { terms, limit }
    }

    /// True when no searchable term remains.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Relevance of `body`, or None if some term is absent.
    ///
    /// Sum of ln(1 + tf) over terms, so more occurrences always score higher.
    pub fn score(&self, body: &str) -> Option<f64> {
        if self.terms.is_empty() {
            return None;
        }
        let tokens = tokenize(body);
        let mut score = 0.0;
        for term in &self.terms {
            let tf = tokens.iter().filter(|t| t.starts_with(term.as_str())).count();
            if tf == 0 {
                return None;
            }
            score += (tf as f64).ln_1p();
        }
        Some(score)
    }

    /// FTS5 MATCH expression with prefix matching on each term.
    pub fn fts_expression(&self) -> String {
        self.terms
            .iter()
            .map(|term| format!("{}*", term))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lowercased alphanumeric runs of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
