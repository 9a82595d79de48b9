//! SQLite implementation of the knowledge store.

mod content;
mod drugs;
mod protocols;
mod schema;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;

use crate::models::{DosageRule, Drug, EmergencyProtocol, ScoredContent};
use crate::store::{
    ContentQuery, DosageRuleQuery, KnowledgeStore, ProtocolQuery, StoreResult,
};

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened knowledge store");
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction, e.g. for bulk seeding.
    pub fn transaction(&mut self) -> StoreResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

impl KnowledgeStore for Database {
    fn find_drug(&self, name: &str) -> StoreResult<Option<Drug>> {
        self.get_drug_by_name(name)
    }

    fn list_drugs(&self) -> StoreResult<Vec<Drug>> {
        self.list_all_drugs()
    }

    fn find_dosage_rules(&self, query: &DosageRuleQuery) -> StoreResult<Vec<DosageRule>> {
        self.query_dosage_rules(query)
    }

    fn find_protocols(&self, query: &ProtocolQuery) -> StoreResult<Vec<EmergencyProtocol>> {
        self.query_protocols(query)
    }

    fn search_content(&self, query: &ContentQuery) -> StoreResult<Vec<ScoredContent>> {
        self.query_content(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"drugs".to_string()));
        assert!(tables.contains(&"dosage_rules".to_string()));
        assert!(tables.contains(&"emergency_protocols".to_string()));
        assert!(tables.contains(&"reference_content".to_string()));
        assert!(tables.contains(&"reference_content_fts".to_string()));
    }

    #[test]
    fn test_open_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.db");

        {
            let db = Database::open(&path).unwrap();
            db.upsert_drug(&Drug::new("Ibuprofen".into(), "nsaid".into()))
                .unwrap();
        }

        let reopened = Database::open(&path).unwrap();
        assert!(reopened.find_drug("Ibuprofen").unwrap().is_some());
    }
}
