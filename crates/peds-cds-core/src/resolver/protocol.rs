//! Emergency protocol resolution.

use crate::models::{AgeGroup, EmergencyProtocol};
use crate::store::{KnowledgeStore, ProtocolQuery};

use super::ResolverResult;

/// Resolves a condition and optional age to urgency-ordered protocols.
pub struct ProtocolResolver<'a> {
    store: &'a dyn KnowledgeStore,
}

impl<'a> ProtocolResolver<'a> {
    pub fn new(store: &'a dyn KnowledgeStore) -> Self {
        Self { store }
    }

    /// Find protocols for `condition`, most urgent first.
    ///
    /// With an age, protocols for the derived age group (or untagged ones) are
    /// preferred; if none exist, every protocol for the condition is returned.
    /// An empty result is not an error.
    pub fn resolve(
        &self,
        condition: &str,
        patient_age_months: Option<u32>,
    ) -> ResolverResult<Vec<EmergencyProtocol>> {
        let age_group = patient_age_months.map(AgeGroup::from_age_months);
        let query = ProtocolQuery::new(condition).with_age_group(age_group);

        let mut protocols = self.store.find_protocols(&query)?;
        let mut fallback = false;

        if protocols.is_empty() && query.age_group.is_some() {
            protocols = self.store.find_protocols(&query.without_age_group())?;
            fallback = true;
        }

        sort_by_urgency(&mut protocols);

        tracing::debug!(
            condition,
            age_group = ?age_group,
            fallback,
            count = protocols.len(),
            "resolved emergency protocols"
        );

        Ok(protocols)
    }
}

/// Sort by severity rank, then protocol name. Stable, so equal keys keep store order.
pub fn sort_by_urgency(protocols: &mut [EmergencyProtocol]) {
    protocols.sort_by(|a, b| {
        a.severity_rank()
            .cmp(&b.severity_rank())
            .then_with(|| a.protocol_name.cmp(&b.protocol_name))
    });
}
