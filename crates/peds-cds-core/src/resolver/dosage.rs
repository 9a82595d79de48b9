//! Weight-based dose calculation.
//!
//! Rule selection is deliberately simple: by default the first covering rule in
//! store order wins. [`RuleSelection::NarrowestRange`] picks the most specific
//! age/weight band instead.

use crate::config::{ResolverConfig, RuleSelection};
use crate::models::{DosageResult, DosageRule, Drug};
use crate::store::{DosageRuleQuery, KnowledgeStore};

use super::{ResolverError, ResolverResult};

/// Resolves a drug and patient profile to a dose.
pub struct DosageResolver<'a> {
    store: &'a dyn KnowledgeStore,
    config: &'a ResolverConfig,
}

impl<'a> DosageResolver<'a> {
    pub fn new(store: &'a dyn KnowledgeStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Calculate the dose for a patient.
    ///
    /// Fails with [`ResolverError::DrugNotFound`] for an unknown drug and
    /// [`ResolverError::NoMatchingRule`] when no rule covers the patient.
    pub fn resolve(
        &self,
        drug_name: &str,
        patient_weight_kg: f64,
        patient_age_months: u32,
        indication: Option<&str>,
    ) -> ResolverResult<DosageResult> {
        if !(patient_weight_kg.is_finite() && patient_weight_kg > 0.0) {
            return Err(ResolverError::InvalidInput(format!(
                "patient weight must be positive, got {}",
                patient_weight_kg
            )));
        }

        let drug = self
            .store
            .find_drug(drug_name)?
            .ok_or_else(|| ResolverError::DrugNotFound(drug_name.to_string()))?;

        let query = DosageRuleQuery::new(&drug.id, patient_age_months, patient_weight_kg)
            .with_indication(indication);
        let rules = self.store.find_dosage_rules(&query)?;
        let candidates = rules.len();

        let rule = select_rule(rules, self.config.rule_selection).ok_or_else(|| {
            ResolverError::NoMatchingRule {
                drug: drug_name.to_string(),
                age_months: patient_age_months,
                weight_kg: patient_weight_kg,
            }
        })?;

        tracing::debug!(
            drug = %drug.name,
            candidates,
            rule_id = %rule.id,
            "selected dosage rule"
        );

        Ok(self.build_result(&drug, &rule, patient_weight_kg))
    }

    fn build_result(&self, drug: &Drug, rule: &DosageRule, weight_kg: f64) -> DosageResult {
        let unit = &rule.dose_unit;
        let dose = rule.dose_per_kg.unwrap_or(0.0) * weight_kg;

        let mut warnings = Vec::new();

        if let Some(restrictions) = &drug.age_restrictions {
            warnings.push(format!("Age restrictions: {}", restrictions));
        }

        if let Some(contraindications) = &drug.contraindications {
            warnings.push(format!("Contraindications: {}", contraindications));
        }

        if let Some(max) = rule.max_single_dose {
            if dose > max {
                tracing::warn!(drug = %drug.name, dose, max, "dose exceeds maximum single dose");
                warnings.push(format!(
                    "Calculated dose ({:.2} {}) exceeds maximum single dose ({} {})",
                    dose, unit, max, unit
                ));
            }
        }

        if self.config.daily_dose_warning {
            if let (Some(max_daily), Some(per_day)) = (rule.max_daily_dose, rule.doses_per_day()) {
                let daily = dose * per_day;
                if daily > max_daily {
                    tracing::warn!(drug = %drug.name, daily, max_daily, "dose exceeds maximum daily dose");
                    warnings.push(format!(
                        "Estimated daily dose ({:.2} {}) exceeds maximum daily dose ({} {})",
                        daily, unit, max_daily, unit
                    ));
                }
            }
        }

        if let Some(instructions) = &rule.special_instructions {
            warnings.push(format!("Special instructions: {}", instructions));
        }

        DosageResult {
            drug_name: drug.name.clone(),
            recommended_dose: format!("{:.2} {}", dose, unit),
            dose_per_kg: rule.dose_per_kg.map(|d| format!("{} {}/kg", d, unit)),
            frequency: rule.frequency.clone(),
            route: rule.route.clone(),
            warnings,
            max_dose: rule.max_single_dose.map(|m| format!("{} {}", m, unit)),
            max_daily_dose: rule.max_daily_dose.map(|m| format!("{} {}", m, unit)),
            citations: self.config.dosage_citations.clone(),
        }
    }
}

/// Pick one rule among those covering the patient.
pub fn select_rule(rules: Vec<DosageRule>, selection: RuleSelection) -> Option<DosageRule> {
    match selection {
        RuleSelection::FirstMatch => rules.into_iter().next(),
        // min_by keeps the first of equal elements, so store order breaks ties
        RuleSelection::NarrowestRange => rules.into_iter().min_by(|a, b| {
            a.age_months
                .span()
                .total_cmp(&b.age_months.span())
                .then_with(|| a.weight_kg.span().total_cmp(&b.weight_kg.span()))
        }),
    }
}
