//! Emergency protocol operations.

use rusqlite::{params, Row};

use super::Database;
use crate::models::{AgeGroup, EmergencyProtocol, Severity};
use crate::store::{ProtocolQuery, StoreError, StoreResult};

impl Database {
    /// Insert or update a protocol (keyed by id).
    pub fn upsert_protocol(&self, protocol: &EmergencyProtocol) -> StoreResult<()> {
        let steps_json = serde_json::to_string(&protocol.steps)?;
        let medications_json = serde_json::to_string(&protocol.medications)?;
        let equipment_json = serde_json::to_string(&protocol.equipment)?;
        let references_json = serde_json::to_string(&protocol.references)?;

        self.conn.execute(
            r#"
            INSERT INTO emergency_protocols (
                id, condition, protocol_name, age_group, severity, steps,
                medications, equipment, contraindications, textbook_references, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                condition = excluded.condition,
                protocol_name = excluded.protocol_name,
                age_group = excluded.age_group,
                severity = excluded.severity,
                steps = excluded.steps,
                medications = excluded.medications,
                equipment = excluded.equipment,
                contraindications = excluded.contraindications,
                textbook_references = excluded.textbook_references
            "#,
            params![
                protocol.id,
                protocol.condition,
                protocol.protocol_name,
                protocol.age_group.map(|g| g.as_str()),
                protocol.severity.map(|s| s.as_str()),
                steps_json,
                medications_json,
                equipment_json,
                protocol.contraindications,
                references_json,
                protocol.created_at,
            ],
        )?;
        Ok(())
    }

    /// Protocols matching the query, ordered by severity rank then name.
    pub fn query_protocols(&self, query: &ProtocolQuery) -> StoreResult<Vec<EmergencyProtocol>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, condition, protocol_name, age_group, severity, steps,
                   medications, equipment, contraindications, textbook_references, created_at
            FROM emergency_protocols
            WHERE (?1 = '' OR instr(lower(condition), lower(?1)) > 0)
              AND (?2 IS NULL OR age_group IS NULL OR age_group = ?2)
            ORDER BY
                CASE severity
                    WHEN 'critical' THEN 1
                    WHEN 'severe' THEN 2
                    WHEN 'moderate' THEN 3
                    WHEN 'mild' THEN 4
                    ELSE 5
                END,
                protocol_name,
                rowid
            "#,
        )?;

        let rows = stmt.query_map(
            params![query.condition, query.age_group.map(|g| g.as_str())],
            ProtocolRow::from_row,
        )?;

        let mut protocols = Vec::new();
        for row in rows {
            let row = row?;
            let id = row.id.clone();
            let protocol = EmergencyProtocol::try_from(row).inspect_err(|e| {
                tracing::warn!(id = %id, error = %e, "undecodable protocol row");
            })?;
            protocols.push(protocol);
        }
        Ok(protocols)
    }

    pub fn delete_protocol(&self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM emergency_protocols WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct ProtocolRow {
    id: String,
    condition: String,
    protocol_name: String,
    age_group: Option<String>,
    severity: Option<String>,
    steps: String,
    medications: String,
    equipment: String,
    contraindications: Option<String>,
    references: String,
    created_at: String,
}

impl ProtocolRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            condition: row.get(1)?,
            protocol_name: row.get(2)?,
            age_group: row.get(3)?,
            severity: row.get(4)?,
            steps: row.get(5)?,
            medications: row.get(6)?,
            equipment: row.get(7)?,
            contraindications: row.get(8)?,
            references: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

impl TryFrom<ProtocolRow> for EmergencyProtocol {
    type Error = StoreError;

    fn try_from(row: ProtocolRow) -> Result<Self, Self::Error> {
        let age_group = row
            .age_group
            .map(|s| s.parse::<AgeGroup>())
            .transpose()
            .map_err(StoreError::InvalidValue)?;
        let severity = row
            .severity
            .map(|s| s.parse::<Severity>())
            .transpose()
            .map_err(StoreError::InvalidValue)?;

        Ok(EmergencyProtocol {
            id: row.id,
            condition: row.condition,
            protocol_name: row.protocol_name,
            age_group,
            severity,
            steps: serde_json::from_str(&row.steps)?,
            medications: serde_json::from_str(&row.medications)?,
            equipment: serde_json::from_str(&row.equipment)?,
            contraindications: row.contraindications,
            references: serde_json::from_str(&row.references)?,
            created_at: row.created_at,
        })
    }
}
