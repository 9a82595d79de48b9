//! Reference content operations with FTS5 search.

use rusqlite::{params, Row};

use super::Database;
use crate::models::{ReferenceContent, ScoredContent};
use crate::store::{ContentQuery, StoreError, StoreResult};

impl Database {
    /// Insert or update a passage (keyed by id).
    pub fn upsert_content(&self, content: &ReferenceContent) -> StoreResult<()> {
        let metadata_json = content
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO reference_content (
                id, chapter, section, page_number, body, metadata, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                chapter = excluded.chapter,
                section = excluded.section,
                page_number = excluded.page_number,
                body = excluded.body,
                metadata = excluded.metadata
            "#,
            params![
                content.id,
                content.chapter,
                content.section,
                content.page_number,
                content.body,
                metadata_json,
                content.created_at,
            ],
        )?;
        Ok(())
    }

    /// Search passages using FTS5 (BM25 ranking).
    ///
    /// Scores are negated BM25 values so that larger means more relevant.
    pub fn query_content(&self, query: &ContentQuery) -> StoreResult<Vec<ScoredContent>> {
        if query.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.id, c.chapter, c.section, c.page_number, c.body, c.metadata, c.created_at,
                   bm25(reference_content_fts) as rank
            FROM reference_content c
            JOIN reference_content_fts fts ON c.rowid = fts.rowid
            WHERE reference_content_fts MATCH ?
            ORDER BY rank, c.rowid
            LIMIT ?
            "#,
        )?;

        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![query.fts_expression(), limit], |row| {
            Ok((ContentRow::from_row(row)?, row.get::<_, f64>(7)?))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (content_row, rank) = row?;
            results.push(ScoredContent {
                content: content_row.try_into()?,
                score: -rank,
            });
        }
        Ok(results)
    }

    pub fn delete_content(&self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM reference_content WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct ContentRow {
    id: String,
    chapter: String,
    section: String,
    page_number: Option<u32>,
    body: String,
    metadata: Option<String>,
    created_at: String,
}

impl ContentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            chapter: row.get(1)?,
            section: row.get(2)?,
            page_number: row.get(3)?,
            body: row.get(4)?,
            metadata: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl TryFrom<ContentRow> for ReferenceContent {
    type Error = StoreError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(ReferenceContent {
            id: row.id,
            chapter: row.chapter,
            section: row.section,
            page_number: row.page_number,
            body: row.body,
            metadata: row
                .metadata
                .map(|s| serde_json::from_str(&s))
                .transpose()?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeGroup, ContentMetadata};
    use crate::store::KnowledgeStore;

    fn passage(chapter: &str, body: &str) -> ReferenceContent {
        ReferenceContent::new(chapter.into(), "Section".into(), body.into())
    }

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.upsert_content(&passage(
            "Fever",
            "Fever in infants younger than 60 days requires careful evaluation.",
        ))
        .unwrap();
        db.upsert_content(&passage(
            "Asthma",
            "Acute asthma exacerbations are treated with inhaled bronchodilators.",
        ))
        .unwrap();
        db.upsert_content(&passage(
            "Febrile seizures",
            "Febrile seizures occur with fever; recurrent fever raises recurrence risk of seizures.",
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_search_matches_terms() {
        let db = setup_db();

        let results = db.search_content(&ContentQuery::new("asthma", 10)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content.chapter, "Asthma");
    }

    #[test]
    fn test_search_requires_every_term() {
        let db = setup_db();

        let results = db
            .search_content(&ContentQuery::new("fever seizures", 10))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content.chapter, "Febrile seizures");
    }

    #[test]
    fn test_search_ranks_by_relevance() {
        let db = setup_db();

        let results = db.search_content(&ContentQuery::new("fever", 10)).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_search_keeps_diacritics() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_content(&passage("Fièvre", "La fièvre chez l'enfant"))
            .unwrap();

        assert_eq!(db.search_content(&ContentQuery::new("fièvre", 10)).unwrap().len(), 1);
        assert!(db
            .search_content(&ContentQuery::new("fievre", 10))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_respects_limit() {
        let db = setup_db();
        let results = db.search_content(&ContentQuery::new("fever", 1)).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_prefix_search() {
        let db = setup_db();
        let results = db.search_content(&ContentQuery::new("bronchodil", 10)).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let db = setup_db();
        assert!(db
            .search_content(&ContentQuery::new("intussusception", 10))
            .unwrap()
            .is_empty());
        assert!(db
            .search_content(&ContentQuery::new("the of", 10))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_metadata_persistence() {
        let db = Database::open_in_memory().unwrap();

        let mut content = passage("Otitis", "Acute otitis media is a common infection.");
        content.page_number = Some(3418);
        content.metadata = Some(ContentMetadata {
            topic: Some("otitis media".into()),
            age_group: Some(AgeGroup::Child),
            specialty: Some("otolaryngology".into()),
            keywords: vec!["ear".into(), "infection".into()],
        });
        db.upsert_content(&content).unwrap();

        let results = db.search_content(&ContentQuery::new("otitis", 5)).unwrap();
        assert_eq!(results[0].content, content);
    }

    #[test]
    fn test_update_reindexes_body() {
        let db = Database::open_in_memory().unwrap();
        let mut content = passage("Croup", "Croup causes a barking cough.");
        db.upsert_content(&content).unwrap();

        content.body = "Bronchiolitis causes wheezing.".into();
        db.upsert_content(&content).unwrap();

        assert!(db.search_content(&ContentQuery::new("croup", 5)).unwrap().is_empty());
        assert_eq!(
            db.search_content(&ContentQuery::new("wheezing", 5)).unwrap().len(),
            1
        );
        assert!(db.delete_content(&content.id).unwrap());
    }
}
