//! Drug catalog and dosing rule models.

use serde::{Deserialize, Serialize};

/// A pediatric drug catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    /// Store identifier (UUID)
    pub id: String,
    /// Drug name - unique lookup key
    pub name: String,
    /// Generic name (e.g., "amoxicillin")
    pub generic_name: Option<String>,
    /// Therapeutic category (e.g., "antibiotic")
    pub category: String,
    /// Free-text age restrictions
    pub age_restrictions: Option<String>,
    /// Free-text contraindications
    pub contraindications: Option<String>,
    /// Free-text side effects
    pub side_effects: Option<String>,
    /// Whether doses are computed per kg of body weight
    pub weight_based_dosing: bool,
    /// Available forms (e.g., ["oral suspension", "tablets"])
    pub dosage_forms: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Drug {
    /// Create a new drug with required fields.
    pub fn new(name: String, category: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            generic_name: None,
            category,
            age_restrictions: None,
            contraindications: None,
            side_effects: None,
            weight_based_dosing: false,
            dosage_forms: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Inclusive interval where either end may be open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd> Bounds<T> {
    /// Interval open on both ends.
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies within the interval. A missing bound matches everything
    /// on that side.
    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| min <= value) && self.max.map_or(true, |max| value <= max)
    }
}

impl<T: Copy + PartialOrd + Into<f64>> Bounds<T> {
    /// Width of the interval, infinite when either end is open.
    pub fn span(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max.into() - min.into(),
            _ => f64::INFINITY,
        }
    }
}

/// A dosing rule for one drug over an age/weight range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageRule {
    /// Store identifier (UUID)
    pub id: String,
    /// Owning drug id
    pub drug_id: String,
    /// Indication this rule applies to (e.g., "respiratory_infection")
    pub indication: String,
    /// Age range in months
    pub age_months: Bounds<u32>,
    /// Weight range in kg
    pub weight_kg: Bounds<f64>,
    /// Dose per kg of body weight
    pub dose_per_kg: Option<f64>,
    /// Dose unit (e.g., "mg", "mcg", "units")
    pub dose_unit: String,
    /// Frequency (e.g., "BID", "Q8H")
    pub frequency: String,
    /// Route (e.g., "PO", "IV")
    pub route: String,
    pub max_single_dose: Option<f64>,
    pub max_daily_dose: Option<f64>,
    pub special_instructions: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl DosageRule {
    /// Create a new unbounded rule with required fields.
    pub fn new(
        drug_id: String,
        indication: String,
        dose_unit: String,
        frequency: String,
        route: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            drug_id,
            indication,
            age_months: Bounds::unbounded(),
            weight_kg: Bounds::unbounded(),
            dose_per_kg: None,
            dose_unit,
            frequency,
            route,
            max_single_dose: None,
            max_daily_dose: None,
            special_instructions: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check whether this rule covers a patient of the given age and weight.
    pub fn covers(&self, age_months: u32, weight_kg: f64) -> bool {
        self.age_months.contains(age_months) && self.weight_kg.contains(weight_kg)
    }

    /// Number of administrations per day implied by the frequency, if recognized.
    ///
    /// Understands QD/OD/daily, BID, TID, QID and QnH (every n hours).
    pub fn doses_per_day(&self) -> Option<f64> {
        let freq = self.frequency.trim().to_uppercase();
        match freq.as_str() {
            "QD" | "OD" | "DAILY" | "ONCE DAILY" => return Some(1.0),
            "BID" | "Q12H" => return Some(2.0),
            "TID" => return Some(3.0),
            "QID" => return Some(4.0),
            _ => {}
        }
        let hours: f64 = freq.strip_prefix('Q')?.strip_suffix('H')?.parse().ok()?;
        (hours > 0.0 && hours <= 24.0).then(|| 24.0 / hours)
    }
}

/// Outcome of a dosage calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageResult {
    pub drug_name: String,
    /// Calculated dose with unit, two decimals (e.g., "300.00 mg")
    pub recommended_dose: String,
    /// Dose per kg with unit (e.g., "20 mg/kg")
    pub dose_per_kg: Option<String>,
    pub frequency: String,
    pub route: String,
    /// Ordered warnings: age restrictions, contraindications, dose limits, instructions
    pub warnings: Vec<String>,
    /// Maximum single dose with unit
    pub max_dose: Option<String>,
    /// Maximum daily dose with unit
    pub max_daily_dose: Option<String>,
    pub citations: Vec<String>,
}
