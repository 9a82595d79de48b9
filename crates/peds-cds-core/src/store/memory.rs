//! Vector-backed store. Iteration order is insertion order.

use crate::models::{DosageRule, Drug, EmergencyProtocol, ReferenceContent, ScoredContent};

use super::{
    ContentQuery, DosageRuleQuery, KnowledgeStore, ProtocolQuery, StoreError, StoreResult,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    drugs: Vec<Drug>,
    rules: Vec<DosageRule>,
    protocols: Vec<EmergencyProtocol>,
    content: Vec<ReferenceContent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a drug (keyed by id). Names are unique, as in the SQLite store.
    pub fn add_drug(&mut self, drug: Drug) -> StoreResult<()> {
        if self.drugs.iter().any(|d| d.name == drug.name && d.id != drug.id) {
            return Err(StoreError::InvalidValue(format!(
                "drug name already in use: {}",
                drug.name
            )));
        }
        match self.drugs.iter_mut().find(|d| d.id == drug.id) {
            Some(existing) => *existing = drug,
            None => self.drugs.push(drug),
        }
        Ok(())
    }

    pub fn add_dosage_rule(&mut self, rule: DosageRule) {
        self.rules.push(rule);
    }

    pub fn add_protocol(&mut self, protocol: EmergencyProtocol) {
        self.protocols.push(protocol);
    }

    pub fn add_content(&mut self, content: ReferenceContent) {
        self.content.push(content);
    }
}

impl KnowledgeStore for MemoryStore {
    fn find_drug(&self, name: &str) -> StoreResult<Option<Drug>> {
        Ok(self.drugs.iter().find(|d| d.name == name).cloned())
    }

    fn list_drugs(&self) -> StoreResult<Vec<Drug>> {
        Ok(self.drugs.clone())
    }

    fn find_dosage_rules(&self, query: &DosageRuleQuery) -> StoreResult<Vec<DosageRule>> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| query.matches(rule))
            .cloned()
            .collect())
    }

    fn find_protocols(&self, query: &ProtocolQuery) -> StoreResult<Vec<EmergencyProtocol>> {
        Ok(self
            .protocols
            .iter()
            .filter(|protocol| query.matches(protocol))
            .cloned()
            .collect())
    }

    fn search_content(&self, query: &ContentQuery) -> StoreResult<Vec<ScoredContent>> {
        let mut scored: Vec<ScoredContent> = self
            .content
            .iter()
            .filter_map(|content| {
                query.score(&content.body).map(|score| ScoredContent {
                    content: content.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(query.limit);
        Ok(scored)
    }
}
