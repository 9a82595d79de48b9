//! Read-only knowledge store abstraction.
//!
//! Resolvers only see [`KnowledgeStore`]. Two implementations ship with the crate:
//! [`MemoryStore`] (vector-backed, used by unit tests and embedders) and
//! [`crate::db::Database`] (SQLite with FTS5).
//!
//! Both key drugs by id and keep names unique: re-adding an id updates the drug,
//! while a new id under an existing name is an error.

mod memory;
mod query;

pub use memory::*;
pub use query::*;

use thiserror::Error;

use crate::models::{DosageRule, Drug, EmergencyProtocol, ScoredContent};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Query capabilities the resolvers need from persistence.
///
/// Every method returns records in store iteration order unless noted.
pub trait KnowledgeStore {
    /// Exact-match drug lookup by name.
    fn find_drug(&self, name: &str) -> StoreResult<Option<Drug>>;

    /// All catalog drugs.
    fn list_drugs(&self) -> StoreResult<Vec<Drug>>;

    /// Rules matching the query's range and indication predicates.
    fn find_dosage_rules(&self, query: &DosageRuleQuery) -> StoreResult<Vec<DosageRule>>;

    /// Protocols matching the condition substring and age-group predicates.
    fn find_protocols(&self, query: &ProtocolQuery) -> StoreResult<Vec<EmergencyProtocol>>;

    /// Relevance-scored passages, best first, at most `query.limit` of them.
    fn search_content(&self, query: &ContentQuery) -> StoreResult<Vec<ScoredContent>>;
}
