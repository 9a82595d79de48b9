//! Shared knowledge-base fixture, loaded identically into both stores.

#![allow(dead_code)]

use peds_cds_core::db::Database;
use peds_cds_core::models::{
    AgeGroup, Bounds, DosageRule, Drug, EmergencyProtocol, ProtocolMedication, ReferenceContent,
    Severity,
};
use peds_cds_core::store::MemoryStore;

pub struct Knowledge {
    pub drugs: Vec<Drug>,
    pub rules: Vec<DosageRule>,
    pub protocols: Vec<EmergencyProtocol>,
    pub content: Vec<ReferenceContent>,
}

fn rule(
    drug: &Drug,
    indication: &str,
    age: (Option<u32>, Option<u32>),
    dose_per_kg: f64,
    frequency: &str,
    max_single: Option<f64>,
    max_daily: Option<f64>,
) -> DosageRule {
    let mut rule = DosageRule::new(
        drug.id.clone(),
        indication.into(),
        "mg".into(),
        frequency.into(),
        "PO".into(),
    );
    rule.age_months = Bounds::new(age.0, age.1);
    rule.dose_per_kg = Some(dose_per_kg);
    rule.max_single_dose = max_single;
    rule.max_daily_dose = max_daily;
    rule
}

fn protocol(
    condition: &str,
    name: &str,
    age_group: Option<AgeGroup>,
    severity: Option<Severity>,
) -> EmergencyProtocol {
    let mut protocol = EmergencyProtocol::new(
        condition.into(),
        name.into(),
        vec!["Assess airway, breathing, circulation".into()],
    );
    protocol.age_group = age_group;
    protocol.severity = severity;
    protocol
}

fn passage(chapter: &str, section: &str, page: u32, body: &str) -> ReferenceContent {
    let mut content = ReferenceContent::new(chapter.into(), section.into(), body.into());
    content.page_number = Some(page);
    content
}

pub fn knowledge() -> Knowledge {
    let mut acetaminophen = Drug::new("Acetaminophen".into(), "analgesic".into());
    acetaminophen.generic_name = Some("paracetamol".into());
    acetaminophen.contraindications = Some("Severe hepatic impairment".into());

    let mut ibuprofen = Drug::new("Ibuprofen".into(), "nsaid".into());
    ibuprofen.age_restrictions = Some("Not recommended under 6 months".into());

    let amoxicillin = Drug::new("Amoxicillin".into(), "antibiotic".into());

    let mut ibuprofen_fever = rule(
        &ibuprofen,
        "fever",
        (Some(6), Some(144)),
        10.0,
        "Q8H",
        Some(400.0),
        Some(1200.0),
    );
    ibuprofen_fever.special_instructions = Some("Give with food".into());

    let rules = vec![
        rule(
            &acetaminophen,
            "fever",
            (Some(3), Some(216)),
            15.0,
            "Q6H",
            Some(1000.0),
            Some(4000.0),
        ),
        ibuprofen_fever,
        rule(&amoxicillin, "otitis media", (Some(3), None), 40.0, "BID", Some(1000.0), None),
        rule(&amoxicillin, "pharyngitis", (Some(3), None), 25.0, "BID", Some(1000.0), None),
    ];

    let mut anaphylaxis = protocol(
        "Anaphylaxis",
        "Anaphylaxis management",
        Some(AgeGroup::Child),
        Some(Severity::Critical),
    );
    anaphylaxis.medications = vec![ProtocolMedication {
        medication: "Epinephrine".into(),
        dose: "0.01 mg/kg IM".into(),
    }];

    let protocols = vec![
        protocol("Seizure", "Seizure first aid", None, None),
        protocol("Febrile seizure", "Febrile seizure", Some(AgeGroup::Child), Some(Severity::Moderate)),
        protocol("Neonatal seizure", "Neonatal seizure", Some(AgeGroup::Neonate), Some(Severity::Severe)),
        protocol("Seizure", "Status epilepticus", None, Some(Severity::Critical)),
        anaphylaxis,
    ];

    let content = vec![
        passage(
            "Fever",
            "Evaluation",
            1012,
            "Fever in infants younger than 3 months requires careful evaluation for serious bacterial infection.",
        ),
        passage(
            "Otitis Media",
            "Treatment",
            3418,
            "Amoxicillin is the first-line treatment for acute otitis media in children.",
        ),
        passage(
            "Anaphylaxis",
            "Treatment",
            1203,
            "Intramuscular epinephrine is the first-line treatment for anaphylaxis.",
        ),
    ];

    Knowledge {
        drugs: vec![acetaminophen, ibuprofen, amoxicillin],
        rules,
        protocols,
        content,
    }
}

pub fn memory_store() -> MemoryStore {
    let knowledge = knowledge();
    let mut store = MemoryStore::new();
    for drug in knowledge.drugs {
        store.add_drug(drug).unwrap();
    }
    for rule in knowledge.rules {
        store.add_dosage_rule(rule);
    }
    for protocol in knowledge.protocols {
        store.add_protocol(protocol);
    }
    for content in knowledge.content {
        store.add_content(content);
    }
    store
}

pub fn database() -> Database {
    let knowledge = knowledge();
    let db = Database::open_in_memory().unwrap();
    for drug in &knowledge.drugs {
        db.upsert_drug(drug).unwrap();
    }
    for rule in &knowledge.rules {
        db.insert_dosage_rule(rule).unwrap();
    }
    for protocol in &knowledge.protocols {
        db.upsert_protocol(protocol).unwrap();
    }
    for content in &knowledge.content {
        db.upsert_content(content).unwrap();
    }
    db
}
