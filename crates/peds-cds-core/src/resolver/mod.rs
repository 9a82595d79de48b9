//! Resolvers over the knowledge store.
//!
//! Three independent, read-only resolvers:
//! - [`DosageResolver`]: drug + patient → dosing rule → computed dose and warnings
//! - [`ProtocolResolver`]: condition + age → urgency-ordered emergency protocols
//! - [`ContentRanker`]: free text → relevance-ordered reference passages
//!
//! plus [`DrugSuggester`] for recovering from misspelled drug names.

mod content;
mod dosage;
mod protocol;
mod suggest;

pub use content::*;
pub use dosage::*;
pub use protocol::*;
pub use suggest::*;

use thiserror::Error;

use crate::store::StoreError;

/// Resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Drug not found: {0}")]
    DrugNotFound(String),

    #[error("No dosage rules found for {drug} for patient age {age_months} months and weight {weight_kg} kg")]
    NoMatchingRule {
        drug: String,
        age_months: u32,
        weight_kg: f64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type ResolverResult<T> = Result<T, ResolverError>;
