//! SQLite schema definition.

/// Complete database schema for the knowledge store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Drug Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    generic_name TEXT,
    category TEXT NOT NULL,
    age_restrictions TEXT,
    contraindications TEXT,
    side_effects TEXT,
    weight_based_dosing INTEGER NOT NULL DEFAULT 0,
    dosage_forms TEXT NOT NULL DEFAULT '[]',      -- JSON array of strings
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_drugs_category ON drugs(category);

-- ============================================================================
-- Dosage Rules
-- ============================================================================

CREATE TABLE IF NOT EXISTS dosage_rules (
    id TEXT PRIMARY KEY,
    drug_id TEXT NOT NULL REFERENCES drugs(id) ON DELETE CASCADE,
    indication TEXT NOT NULL,
    min_age_months INTEGER,                       -- NULL = unbounded
    max_age_months INTEGER,
    min_weight_kg REAL,
    max_weight_kg REAL,
    dose_per_kg REAL,
    dose_unit TEXT NOT NULL,
    frequency TEXT NOT NULL,
    route TEXT NOT NULL,
    max_single_dose REAL,
    max_daily_dose REAL,
    special_instructions TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_rules_drug ON dosage_rules(drug_id);
CREATE INDEX IF NOT EXISTS idx_rules_indication ON dosage_rules(indication);
CREATE INDEX IF NOT EXISTS idx_rules_age ON dosage_rules(min_age_months, max_age_months);
CREATE INDEX IF NOT EXISTS idx_rules_weight ON dosage_rules(min_weight_kg, max_weight_kg);

-- ============================================================================
-- Emergency Protocols
-- ============================================================================

CREATE TABLE IF NOT EXISTS emergency_protocols (
    id TEXT PRIMARY KEY,
    condition TEXT NOT NULL,
    protocol_name TEXT NOT NULL,
    age_group TEXT CHECK (age_group IS NULL OR age_group IN ('neonate', 'infant', 'child', 'adolescent')),
    severity TEXT CHECK (severity IS NULL OR severity IN ('critical', 'severe', 'moderate', 'mild')),
    steps TEXT NOT NULL DEFAULT '[]',             -- JSON array of strings
    medications TEXT NOT NULL DEFAULT '[]',       -- JSON array of {medication, dose}
    equipment TEXT NOT NULL DEFAULT '[]',         -- JSON array of strings
    contraindications TEXT,
    textbook_references TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_protocols_age_group ON emergency_protocols(age_group);
CREATE INDEX IF NOT EXISTS idx_protocols_severity ON emergency_protocols(severity);

-- ============================================================================
-- Reference Content
-- ============================================================================

CREATE TABLE IF NOT EXISTS reference_content (
    id TEXT PRIMARY KEY,
    chapter TEXT NOT NULL,
    section TEXT NOT NULL,
    page_number INTEGER,
    body TEXT NOT NULL,
    metadata TEXT,                                -- JSON object {topic, age_group, specialty, keywords}
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_content_chapter ON reference_content(chapter);

-- FTS5 virtual table for full-text search
-- Diacritics are kept so matching agrees with ContentQuery::score
CREATE VIRTUAL TABLE IF NOT EXISTS reference_content_fts USING fts5(
    body,
    content='reference_content',
    content_rowid='rowid',
    tokenize='unicode61 remove_diacritics 0'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS reference_content_ai AFTER INSERT ON reference_content BEGIN
    INSERT INTO reference_content_fts(rowid, body) VALUES (new.rowid, new.body);
END;

CREATE TRIGGER IF NOT EXISTS reference_content_ad AFTER DELETE ON reference_content BEGIN
    INSERT INTO reference_content_fts(reference_content_fts, rowid, body)
    VALUES ('delete', old.rowid, old.body);
END;

CREATE TRIGGER IF NOT EXISTS reference_content_au AFTER UPDATE ON reference_content BEGIN
    INSERT INTO reference_content_fts(reference_content_fts, rowid, body)
    VALUES ('delete', old.rowid, old.body);
    INSERT INTO reference_content_fts(rowid, body) VALUES (new.rowid, new.body);
END;
"#;
