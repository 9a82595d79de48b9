//! Drug catalog and dosage rule operations.

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::models::{Bounds, DosageRule, Drug};
use crate::store::{DosageRuleQuery, StoreError, StoreResult};

const DRUG_COLUMNS: &str = "id, name, generic_name, category, age_restrictions, contraindications, \
     side_effects, weight_based_dosing, dosage_forms, created_at";

const RULE_COLUMNS: &str = "id, drug_id, indication, min_age_months, max_age_months, \
     min_weight_kg, max_weight_kg, dose_per_kg, dose_unit, frequency, route, \
     max_single_dose, max_daily_dose, special_instructions, created_at";

impl Database {
    /// Insert or update a drug (keyed by id).
    pub fn upsert_drug(&self, drug: &Drug) -> StoreResult<()> {
        let forms_json = serde_json::to_string(&drug.dosage_forms)?;

        self.conn.execute(
            r#"
            INSERT INTO drugs (
                id, name, generic_name, category, age_restrictions, contraindications,
                side_effects, weight_based_dosing, dosage_forms, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                generic_name = excluded.generic_name,
                category = excluded.category,
                age_restrictions = excluded.age_restrictions,
                contraindications = excluded.contraindications,
                side_effects = excluded.side_effects,
                weight_based_dosing = excluded.weight_based_dosing,
                dosage_forms = excluded.dosage_forms
            "#,
            params![
                drug.id,
                drug.name,
                drug.generic_name,
                drug.category,
                drug.age_restrictions,
                drug.contraindications,
                drug.side_effects,
                drug.weight_based_dosing,
                forms_json,
                drug.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a drug by exact name.
    pub fn get_drug_by_name(&self, name: &str) -> StoreResult<Option<Drug>> {
        let sql = format!("SELECT {} FROM drugs WHERE name = ?", DRUG_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, [name], DrugRow::from_row)
            .optional()?;

        row.map(|r| r.try_into()).transpose()
    }

    /// All drugs in insertion order.
    pub fn list_all_drugs(&self) -> StoreResult<Vec<Drug>> {
        let sql = format!("SELECT {} FROM drugs ORDER BY rowid", DRUG_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], DrugRow::from_row)?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?.try_into()?);
        }
        Ok(drugs)
    }

    /// Delete a drug and, by cascade, its rules.
    pub fn delete_drug(&self, id: &str) -> StoreResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM drugs WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Insert a dosage rule. The owning drug must exist.
    pub fn insert_dosage_rule(&self, rule: &DosageRule) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO dosage_rules (
                id, drug_id, indication, min_age_months, max_age_months,
                min_weight_kg, max_weight_kg, dose_per_kg, dose_unit, frequency, route,
                max_single_dose, max_daily_dose, special_instructions, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                rule.id,
                rule.drug_id,
                rule.indication,
                rule.age_months.min,
                rule.age_months.max,
                rule.weight_kg.min,
                rule.weight_kg.max,
                rule.dose_per_kg,
                rule.dose_unit,
                rule.frequency,
                rule.route,
                rule.max_single_dose,
                rule.max_daily_dose,
                rule.special_instructions,
                rule.created_at,
            ],
        )?;
        Ok(())
    }

    /// Rules matching the query, in insertion order.
    pub fn query_dosage_rules(&self, query: &DosageRuleQuery) -> StoreResult<Vec<DosageRule>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM dosage_rules
            WHERE drug_id = ?1
              AND (min_age_months IS NULL OR min_age_months <= ?2)
              AND (max_age_months IS NULL OR max_age_months >= ?2)
              AND (min_weight_kg IS NULL OR min_weight_kg <= ?3)
              AND (max_weight_kg IS NULL OR max_weight_kg >= ?3)
              AND (?4 IS NULL OR indication = ?4)
            ORDER BY rowid
            "#,
            RULE_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                query.drug_id,
                query.age_months,
                query.weight_kg,
                query.indication
            ],
            rule_from_row,
        )?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?);
        }
        Ok(rules)
    }

    /// All rules for a drug, in insertion order.
    pub fn list_dosage_rules(&self, drug_id: &str) -> StoreResult<Vec<DosageRule>> {
        let sql = format!(
            "SELECT {} FROM dosage_rules WHERE drug_id = ? ORDER BY rowid",
            RULE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([drug_id], rule_from_row)?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?);
        }
        Ok(rules)
    }
}

/// Intermediate row struct for database mapping.
struct DrugRow {
    id: String,
    name: String,
    generic_name: Option<String>,
    category: String,
    age_restrictions: Option<String>,
    contraindications: Option<String>,
    side_effects: Option<String>,
    weight_based_dosing: bool,
    dosage_forms: String,
    created_at: String,
}

impl DrugRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            generic_name: row.get(2)?,
            category: row.get(3)?,
            age_restrictions: row.get(4)?,
            contraindications: row.get(5)?,
            side_effects: row.get(6)?,
            weight_based_dosing: row.get(7)?,
            dosage_forms: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl TryFrom<DrugRow> for Drug {
    type Error = StoreError;

    fn try_from(row: DrugRow) -> Result<Self, Self::Error> {
        Ok(Drug {
            id: row.id,
            name: row.name,
            generic_name: row.generic_name,
            category: row.category,
            age_restrictions: row.age_restrictions,
            contraindications: row.contraindications,
            side_effects: row.side_effects,
            weight_based_dosing: row.weight_based_dosing,
            dosage_forms: serde_json::from_str(&row.dosage_forms)?,
            created_at: row.created_at,
        })
    }
}

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<DosageRule> {
    Ok(DosageRule {
        id: row.get(0)?,
        drug_id: row.get(1)?,
        indication: row.get(2)?,
        age_months: Bounds::new(row.get(3)?, row.get(4)?),
        weight_kg: Bounds::new(row.get(5)?, row.get(6)?),
        dose_per_kg: row.get(7)?,
        dose_unit: row.get(8)?,
        frequency: row.get(9)?,
        route: row.get(10)?,
        max_single_dose: row.get(11)?,
        max_daily_dose: row.get(12)?,
        special_instructions: row.get(13)?,
        created_at: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KnowledgeStore;

    fn setup_db() -> (Database, Drug) {
        let db = Database::open_in_memory().unwrap();
        let mut drug = Drug::new("Amoxicillin".into(), "antibiotic".into());
        drug.generic_name = Some("amoxicillin".into());
        drug.dosage_forms = vec!["oral suspension".into(), "tablets".into()];
        drug.contraindications = Some("Penicillin allergy".into());
        db.upsert_drug(&drug).unwrap();
        (db, drug)
    }

    fn make_rule(drug: &Drug, indication: &str) -> DosageRule {
        DosageRule::new(
            drug.id.clone(),
            indication.into(),
            "mg".into(),
            "BID".into(),
            "PO".into(),
        )
    }

    #[test]
    fn test_upsert_and_get() {
        let (db, drug) = setup_db();

        let retrieved = db.get_drug_by_name("Amoxicillin").unwrap().unwrap();
        assert_eq!(retrieved, drug);
        assert_eq!(retrieved.dosage_forms, vec!["oral suspension", "tablets"]);
    }

    #[test]
    fn test_upsert_updates() {
        let (db, mut drug) = setup_db();

        drug.age_restrictions = Some("Not for neonates".into());
        db.upsert_drug(&drug).unwrap();

        let retrieved = db.get_drug_by_name("Amoxicillin").unwrap().unwrap();
        assert_eq!(retrieved.age_restrictions.as_deref(), Some("Not for neonates"));
        assert_eq!(db.list_all_drugs().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (db, _) = setup_db();
        let duplicate = Drug::new("Amoxicillin".into(), "antibiotic".into());
        assert!(db.upsert_drug(&duplicate).is_err());
    }

    #[test]
    fn test_lookup_is_exact() {
        let (db, _) = setup_db();
        assert!(db.find_drug("amoxicillin").unwrap().is_none());
        assert!(db.find_drug("Amox").unwrap().is_none());
    }

    #[test]
    fn test_rule_range_filter() {
        let (db, drug) = setup_db();

        let mut bounded = make_rule(&drug, "otitis");
        bounded.age_months = Bounds::new(Some(12), Some(144));
        bounded.weight_kg = Bounds::new(Some(10.0), Some(40.0));
        bounded.dose_per_kg = Some(20.0);
        db.insert_dosage_rule(&bounded).unwrap();

        let query = DosageRuleQuery::new(&drug.id, 36, 15.0);
        assert_eq!(db.find_dosage_rules(&query).unwrap(), vec![bounded.clone()]);

        assert!(db
            .find_dosage_rules(&DosageRuleQuery::new(&drug.id, 6, 15.0))
            .unwrap()
            .is_empty());
        assert!(db
            .find_dosage_rules(&DosageRuleQuery::new(&drug.id, 36, 41.0))
            .unwrap()
            .is_empty());

        // Bounds are inclusive
        assert_eq!(
            db.find_dosage_rules(&DosageRuleQuery::new(&drug.id, 144, 40.0))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_null_bounds_are_unbounded() {
        let (db, drug) = setup_db();

        let mut open_low = make_rule(&drug, "otitis");
        open_low.age_months = Bounds::new(None, Some(24));
        db.insert_dosage_rule(&open_low).unwrap();

        let results = db
            .find_dosage_rules(&DosageRuleQuery::new(&drug.id, 0, 0.5))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].age_months, Bounds::new(None, Some(24)));
        assert_eq!(results[0].weight_kg, Bounds::unbounded());
    }

    #[test]
    fn test_indication_filter_and_order() {
        let (db, drug) = setup_db();

        let first = make_rule(&drug, "otitis");
        let second = make_rule(&drug, "pneumonia");
        let third = make_rule(&drug, "otitis");
        db.insert_dosage_rule(&first).unwrap();
        db.insert_dosage_rule(&second).unwrap();
        db.insert_dosage_rule(&third).unwrap();

        let all = db
            .find_dosage_rules(&DosageRuleQuery::new(&drug.id, 36, 15.0))
            .unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);

        let otitis = db
            .find_dosage_rules(
                &DosageRuleQuery::new(&drug.id, 36, 15.0).with_indication(Some("otitis")),
            )
            .unwrap();
        assert_eq!(otitis.len(), 2);
        assert!(otitis.iter().all(|r| r.indication == "otitis"));
    }

    #[test]
    fn test_delete_cascades_rules() {
        let (db, drug) = setup_db();
        db.insert_dosage_rule(&make_rule(&drug, "otitis")).unwrap();

        assert!(db.delete_drug(&drug.id).unwrap());
        assert!(db.list_dosage_rules(&drug.id).unwrap().is_empty());
    }
}
