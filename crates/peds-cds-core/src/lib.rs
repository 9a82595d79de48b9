//! Peds-CDS Core Library
//!
//! Pediatric clinical-decision-support core: dose calculation, emergency protocol
//! lookup and reference content ranking over a read-only knowledge store.
//!
//! # Architecture
//!
//! ```text
//!   calculate_dosage        get_emergency_protocols       search_reference_content
//!          │                          │                              │
//!          ▼                          ▼                              ▼
//!   DosageResolver           ProtocolResolver                 ContentRanker
//!   exact drug lookup        age group derivation             term extraction
//!   range filtering          fallback re-query                relevance ordering
//!   rule selection           urgency ordering                 excerpt / citation
//!          │                          │                              │
//!          └──────────────────────────┼──────────────────────────────┘
//!                                     ▼
//!                          KnowledgeStore (read-only)
//!                     ┌───────────────┴───────────────┐
//!                     ▼                               ▼
//!                MemoryStore                 Database (SQLite + FTS5)
//! ```
//!
//! # Core Principle
//!
//! **Resolvers never write.** Every call is a pure function of its input and the
//! store snapshot, so identical inputs give identical, identically ordered output.
//!
//! # Modules
//!
//! - [`config`]: Resolver configuration
//! - [`db`]: SQLite knowledge store with FTS5 search
//! - [`models`]: Domain types (Drug, DosageRule, EmergencyProtocol, ReferenceContent)
//! - [`resolver`]: Dosage, protocol and content resolvers
//! - [`store`]: Store trait, query predicates and in-memory store

pub mod config;
pub mod db;
pub mod models;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigError, ResolverConfig, RuleSelection};
pub use db::Database;
pub use models::{
    AgeGroup, Bounds, Citation, ContentMetadata, DosageResult, DosageRule, Drug,
    EmergencyProtocol, ProtocolMedication, ReferenceContent, Severity,
};
pub use resolver::{
    ContentRanker, DosageResolver, DrugSuggester, ProtocolResolver, ResolverError,
};
pub use store::{KnowledgeStore, MemoryStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PedsCdsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    DrugNotFound(String),

    #[error("{0}")]
    NoMatchingRule(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<StoreError> for PedsCdsError {
    fn from(e: StoreError) -> Self {
        PedsCdsError::DatabaseError(e.to_string())
    }
}

impl From<ResolverError> for PedsCdsError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::Store(inner) => inner.into(),
            ResolverError::InvalidInput(msg) => PedsCdsError::InvalidInput(msg),
            other @ ResolverError::DrugNotFound(_) => PedsCdsError::DrugNotFound(other.to_string()),
            other @ ResolverError::NoMatchingRule { .. } => {
                PedsCdsError::NoMatchingRule(other.to_string())
            }
        }
    }
}

impl From<ConfigError> for PedsCdsError {
    fn from(e: ConfigError) -> Self {
        PedsCdsError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PedsCdsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PedsCdsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PedsCdsCore>, PedsCdsError> {
    let db = Database::open(&path)?;
    Ok(PedsCdsCore::wrap(db, ResolverConfig::default()))
}

/// Open or create a database with a JSON resolver config.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<PedsCdsCore>, PedsCdsError> {
    let config = ResolverConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    Ok(PedsCdsCore::wrap(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PedsCdsCore>, PedsCdsError> {
    let db = Database::open_in_memory()?;
    Ok(PedsCdsCore::wrap(db, ResolverConfig::default()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PedsCdsCore {
    db: Arc<Mutex<Database>>,
    config: ResolverConfig,
}

impl PedsCdsCore {
    fn wrap(db: Database, config: ResolverConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }

    fn content_limit(&self, limit: Option<u32>) -> usize {
        limit.map_or(self.config.default_content_limit, |l| l as usize)
    }
}

#[uniffi::export]
impl PedsCdsCore {
    // =========================================================================
    // Knowledge Base Seeding
    // =========================================================================

    /// Add or update a drug. Returns the stored id.
    pub fn upsert_drug(&self, drug: FfiDrug) -> Result<String, PedsCdsError> {
        let db = self.db.lock()?;
        let drug: Drug = drug.into();
        db.upsert_drug(&drug)?;
        Ok(drug.id)
    }

    /// Add a dosage rule. Returns the stored id.
    pub fn add_dosage_rule(&self, rule: FfiDosageRule) -> Result<String, PedsCdsError> {
        let db = self.db.lock()?;
        let rule: DosageRule = rule.into();
        db.insert_dosage_rule(&rule)?;
        Ok(rule.id)
    }

    /// Add or update an emergency protocol. Returns the stored id.
    pub fn upsert_protocol(&self, protocol: FfiEmergencyProtocol) -> Result<String, PedsCdsError> {
        let db = self.db.lock()?;
        let protocol: EmergencyProtocol = protocol.try_into()?;
        db.upsert_protocol(&protocol)?;
        Ok(protocol.id)
    }

    /// Add or update a reference passage. Returns the stored id.
    pub fn upsert_reference_content(
        &self,
        content: FfiReferenceContent,
    ) -> Result<String, PedsCdsError> {
        let db = self.db.lock()?;
        let content: ReferenceContent = content.try_into()?;
        db.upsert_content(&content)?;
        Ok(content.id)
    }

    // =========================================================================
    // Resolver Operations
    // =========================================================================

    /// Calculate a weight-based dose for a patient.
    pub fn calculate_dosage(
        &self,
        drug_name: String,
        patient_weight_kg: f64,
        patient_age_months: u32,
        indication: Option<String>,
    ) -> Result<FfiDosageResult, PedsCdsError> {
        let db = self.db.lock()?;
        let resolver = DosageResolver::new(&*db, &self.config);
        let result = resolver.resolve(
            &drug_name,
            patient_weight_kg,
            patient_age_months,
            indication.as_deref(),
        )?;
        Ok(result.into())
    }

    /// Emergency protocols for a condition, most urgent first.
    pub fn get_emergency_protocols(
        &self,
        condition: String,
        patient_age_months: Option<u32>,
    ) -> Result<Vec<FfiEmergencyProtocol>, PedsCdsError> {
        let db = self.db.lock()?;
        let resolver = ProtocolResolver::new(&*db);
        let protocols = resolver.resolve(&condition, patient_age_months)?;
        Ok(protocols.into_iter().map(|p| p.into()).collect())
    }

    /// Reference passages ranked by relevance.
    pub fn search_reference_content(
        &self,
        query: String,
        limit: Option<u32>,
    ) -> Result<Vec<FfiReferenceContent>, PedsCdsError> {
        let db = self.db.lock()?;
        let ranker = ContentRanker::new(&*db, &self.config);
        let ranked = ranker.rank(&query, self.content_limit(limit))?;
        Ok(ranked.into_iter().map(|c| c.into()).collect())
    }

    /// Supporting-passage citations for a query.
    pub fn cite_reference_content(
        &self,
        query: String,
        limit: Option<u32>,
    ) -> Result<Vec<FfiCitation>, PedsCdsError> {
        let db = self.db.lock()?;
        let ranker = ContentRanker::new(&*db, &self.config);
        let citations = ranker.cite(&query, self.content_limit(limit))?;
        Ok(citations.into_iter().map(|c| c.into()).collect())
    }

    /// Catalog drugs with names close to `name`.
    pub fn suggest_drugs(
        &self,
        name: String,
        limit: u32,
    ) -> Result<Vec<FfiDrugSuggestion>, PedsCdsError> {
        let db = self.db.lock()?;
        let suggester = DrugSuggester::new(&*db, &self.config);
        let suggestions = suggester.suggest(&name, limit as usize)?;
        Ok(suggestions.into_iter().map(|s| s.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe drug. A missing id is generated on insert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub id: Option<String>,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: String,
    pub age_restrictions: Option<String>,
    pub contraindications: Option<String>,
    pub side_effects: Option<String>,
    pub weight_based_dosing: bool,
    pub dosage_forms: Vec<String>,
}

impl From<FfiDrug> for Drug {
    fn from(item: FfiDrug) -> Self {
        let mut drug = Drug::new(item.name, item.category);
        if let Some(id) = item.id {
            drug.id = id;
        }
        drug.generic_name = item.generic_name;
        drug.age_restrictions = item.age_restrictions;
        drug.contraindications = item.contraindications;
        drug.side_effects = item.side_effects;
        drug.weight_based_dosing = item.weight_based_dosing;
        drug.dosage_forms = item.dosage_forms;
        drug
    }
}

/// FFI-safe dosage rule with flattened ranges.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageRule {
    pub drug_id: String,
    pub indication: String,
    pub min_age_months: Option<u32>,
    pub max_age_months: Option<u32>,
    pub min_weight_kg: Option<f64>,
    pub max_weight_kg: Option<f64>,
    pub dose_per_kg: Option<f64>,
    pub dose_unit: String,
    pub frequency: String,
    pub route: String,
    pub max_single_dose: Option<f64>,
    pub max_daily_dose: Option<f64>,
    pub special_instructions: Option<String>,
}

impl From<FfiDosageRule> for DosageRule {
    fn from(item: FfiDosageRule) -> Self {
        let mut rule = DosageRule::new(
            item.drug_id,
            item.indication,
            item.dose_unit,
            item.frequency,
            item.route,
        );
        rule.age_months = Bounds::new(item.min_age_months, item.max_age_months);
        rule.weight_kg = Bounds::new(item.min_weight_kg, item.max_weight_kg);
        rule.dose_per_kg = item.dose_per_kg;
        rule.max_single_dose = item.max_single_dose;
        rule.max_daily_dose = item.max_daily_dose;
        rule.special_instructions = item.special_instructions;
        rule
    }
}

/// FFI-safe dosage result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageResult {
    pub drug_name: String,
    pub recommended_dose: String,
    pub dose_per_kg: Option<String>,
    pub frequency: String,
    pub route: String,
    pub warnings: Vec<String>,
    pub max_dose: Option<String>,
    pub max_daily_dose: Option<String>,
    pub citations: Vec<String>,
}

impl From<DosageResult> for FfiDosageResult {
    fn from(result: DosageResult) -> Self {
        Self {
            drug_name: result.drug_name,
            recommended_dose: result.recommended_dose,
            dose_per_kg: result.dose_per_kg,
            frequency: result.frequency,
            route: result.route,
            warnings: result.warnings,
            max_dose: result.max_dose,
            max_daily_dose: result.max_daily_dose,
            citations: result.citations,
        }
    }
}

/// FFI-safe protocol medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProtocolMedication {
    pub medication: String,
    pub dose: String,
}

/// FFI-safe emergency protocol. Age group and severity use lowercase tags.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyProtocol {
    pub id: Option<String>,
    pub condition: String,
    pub protocol_name: String,
    pub age_group: Option<String>,
    pub severity: Option<String>,
    pub steps: Vec<String>,
    pub medications: Vec<FfiProtocolMedication>,
    pub equipment: Vec<String>,
    pub contraindications: Option<String>,
    pub references: Vec<String>,
}

impl From<EmergencyProtocol> for FfiEmergencyProtocol {
    fn from(protocol: EmergencyProtocol) -> Self {
        Self {
            id: Some(protocol.id),
            condition: protocol.condition,
            protocol_name: protocol.protocol_name,
            age_group: protocol.age_group.map(|g| g.to_string()),
            severity: protocol.severity.map(|s| s.to_string()),
            steps: protocol.steps,
            medications: protocol
                .medications
                .into_iter()
                .map(|m| FfiProtocolMedication {
                    medication: m.medication,
                    dose: m.dose,
                })
                .collect(),
            equipment: protocol.equipment,
            contraindications: protocol.contraindications,
            references: protocol.references,
        }
    }
}

impl TryFrom<FfiEmergencyProtocol> for EmergencyProtocol {
    type Error = PedsCdsError;

    fn try_from(item: FfiEmergencyProtocol) -> Result<Self, Self::Error> {
        let mut protocol = EmergencyProtocol::new(item.condition, item.protocol_name, item.steps);
        if let Some(id) = item.id {
            protocol.id = id;
        }
        protocol.age_group = item
            .age_group
            .map(|g| g.parse::<AgeGroup>())
            .transpose()
            .map_err(PedsCdsError::InvalidInput)?;
        protocol.severity = item
            .severity
            .map(|s| s.parse::<Severity>())
            .transpose()
            .map_err(PedsCdsError::InvalidInput)?;
        protocol.medications = item
            .medications
            .into_iter()
            .map(|m| ProtocolMedication {
                medication: m.medication,
                dose: m.dose,
            })
            .collect();
        protocol.equipment = item.equipment;
        protocol.contraindications = item.contraindications;
        protocol.references = item.references;
        Ok(protocol)
    }
}

/// FFI-safe passage metadata.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiContentMetadata {
    pub topic: Option<String>,
    pub age_group: Option<String>,
    pub specialty: Option<String>,
    pub keywords: Vec<String>,
}

/// FFI-safe reference passage.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReferenceContent {
    pub id: Option<String>,
    pub chapter: String,
    pub section: String,
    pub page_number: Option<u32>,
    pub body: String,
    pub metadata: Option<FfiContentMetadata>,
}

impl From<ReferenceContent> for FfiReferenceContent {
    fn from(content: ReferenceContent) -> Self {
        Self {
            id: Some(content.id),
            chapter: content.chapter,
            section: content.section,
            page_number: content.page_number,
            body: content.body,
            metadata: content.metadata.map(|m| FfiContentMetadata {
                topic: m.topic,
                age_group: m.age_group.map(|g| g.to_string()),
                specialty: m.specialty,
                keywords: m.keywords,
            }),
        }
    }
}

impl TryFrom<FfiReferenceContent> for ReferenceContent {
    type Error = PedsCdsError;

    fn try_from(item: FfiReferenceContent) -> Result<Self, Self::Error> {
        let mut content = ReferenceContent::new(item.chapter, item.section, item.body);
        if let Some(id) = item.id {
            content.id = id;
        }
        content.page_number = item.page_number;
        content.metadata = item
            .metadata
            .map(|m| -> Result<ContentMetadata, PedsCdsError> {
                Ok(ContentMetadata {
                    topic: m.topic,
                    age_group: m
                        .age_group
                        .map(|g| g.parse::<AgeGroup>())
                        .transpose()
                        .map_err(PedsCdsError::InvalidInput)?,
                    specialty: m.specialty,
                    keywords: m.keywords,
                })
            })
            .transpose()?;
        Ok(content)
    }
}

/// FFI-safe citation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCitation {
    pub source: String,
    pub chapter: String,
    pub section: String,
    pub page: Option<u32>,
    pub content_snippet: String,
    pub rank: u32,
}

impl From<Citation> for FfiCitation {
    fn from(citation: Citation) -> Self {
        Self {
            source: citation.source,
            chapter: citation.chapter,
            section: citation.section,
            page: citation.page,
            content_snippet: citation.content_snippet,
            rank: citation.rank,
        }
    }
}

/// FFI-safe drug suggestion.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugSuggestion {
    pub name: String,
    pub generic_name: Option<String>,
    pub similarity: f64,
}

impl From<resolver::DrugSuggestion> for FfiDrugSuggestion {
    fn from(suggestion: resolver::DrugSuggestion) -> Self {
        Self {
            name: suggestion.name,
            generic_name: suggestion.generic_name,
            similarity: suggestion.similarity,
        }
    }
}
