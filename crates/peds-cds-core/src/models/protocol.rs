//! Emergency protocol models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pediatric age group, derived from age in months.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Neonate,
    Infant,
    Child,
    Adolescent,
}

impl AgeGroup {
    /// Derive the age group: <1 neonate, 1-11 infant, 12-143 child, 144+ adolescent.
    pub fn from_age_months(age_months: u32) -> Self {
        match age_months {
            0 => AgeGroup::Neonate,
            1..=11 => AgeGroup::Infant,
            12..=143 => AgeGroup::Child,
            _ => AgeGroup::Adolescent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Neonate => "neonate",
            AgeGroup::Infant => "infant",
            AgeGroup::Child => "child",
            AgeGroup::Adolescent => "adolescent",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neonate" => Ok(AgeGroup::Neonate),
            "infant" => Ok(AgeGroup::Infant),
            "child" => Ok(AgeGroup::Child),
            "adolescent" => Ok(AgeGroup::Adolescent),
            other => Err(format!("unknown age group: {}", other)),
        }
    }
}

/// Clinical severity of a protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Severe,
    Moderate,
    Mild,
}

/// Rank given to protocols without a severity tag.
pub const UNSET_SEVERITY_RANK: u8 = 5;

impl Severity {
    /// Ordinal urgency, 1 = most urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::Severe => 2,
            Severity::Moderate => 3,
            Severity::Mild => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Severe => "severe",
            Severity::Moderate => "moderate",
            Severity::Mild => "mild",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "severe" => Ok(Severity::Severe),
            "moderate" => Ok(Severity::Moderate),
            "mild" => Ok(Severity::Mild),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// A medication administered as part of a protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolMedication {
    /// Medication name (e.g., "Epinephrine")
    pub medication: String,
    /// Dose description (e.g., "0.01 mg/kg IM")
    pub dose: String,
}

/// An emergency management protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyProtocol {
    /// Store identifier (UUID)
    pub id: String,
    /// Condition treated (e.g., "Anaphylaxis")
    pub condition: String,
    pub protocol_name: String,
    /// Target age group - None applies to all ages
    pub age_group: Option<AgeGroup>,
    pub severity: Option<Severity>,
    /// Ordered management steps
    pub steps: Vec<String>,
    pub medications: Vec<ProtocolMedication>,
    pub equipment: Vec<String>,
    pub contraindications: Option<String>,
    /// Textbook references (e.g., "Nelson Ch. 169")
    pub references: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl EmergencyProtocol {
    /// Create a new protocol with required fields, applying to all ages.
    pub fn new(condition: String, protocol_name: String, steps: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            condition,
            protocol_name,
            age_group: None,
            severity: None,
            steps,
            medications: Vec::new(),
            equipment: Vec::new(),
            contraindications: None,
            references: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Severity rank, with unset severity sorting last.
    pub fn severity_rank(&self) -> u8 {
        self.severity.map_or(UNSET_SEVERITY_RANK, |s| s.rank())
    }

    /// Check if this protocol applies to an age group (untagged protocols apply to all).
    pub fn applies_to(&self, group: AgeGroup) -> bool {
        self.age_group.map_or(true, |g| g == group)
    }
}
