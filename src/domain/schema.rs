//! Feature schema and record construction for CHD risk prediction.
//!
//! The classifier, the attribution explainer, and the background reference
//! sample are all bound to one fixed, ordered set of 15 named fields (the
//! Framingham study attributes). Field names and ordering here are the single
//! source of truth: a record is only meaningful to the model if its shape
//! matches this schema field-for-field.

use serde::{Deserialize, Serialize};

/// Number of fields in the feature schema.
pub const FIELD_COUNT: usize = 15;

/// Canonical field names, in schema order.
///
/// These are the column names the model was trained on and the names the
/// background dataset exposes. Order matters: attribution vectors are
/// reported positionally against this list.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "male",
    "age",
    "education",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "totChol",
    "sysBP",
    "diaBP",
    "BMI",
    "heartRate",
    "glucose",
];

/// Semantic kind of a schema field, with its valid domain.
///
/// Domains are enforced by the presentation layer (bounded inputs); the
/// record builder only enforces shape and binary-category mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// 0/1 flag mapped from a two-way categorical choice.
    Binary,
    /// Small ordered categorical (e.g. education level 1-4).
    Ordinal { min: u8, max: u8 },
    /// Whole-number measurement.
    Integer { min: i64, max: i64 },
    /// Continuous measurement.
    Float { min: f64, max: f64 },
}

/// Static description of one schema field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical column name (matches `FIELD_NAMES`).
    pub name: &'static str,
    /// Human-readable label for the form.
    pub label: &'static str,
    /// Unit or hint text for the form.
    pub hint: &'static str,
    pub kind: FieldKind,
}

/// The full schema table, in schema order.
pub static FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec {
        name: "male",
        label: "Sex",
        hint: "Female / Male",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "age",
        label: "Age",
        hint: "years (30-80)",
        kind: FieldKind::Integer { min: 30, max: 80 },
    },
    FieldSpec {
        name: "education",
        label: "Education Level",
        hint: "1-4",
        kind: FieldKind::Ordinal { min: 1, max: 4 },
    },
    FieldSpec {
        name: "currentSmoker",
        label: "Currently Smokes?",
        hint: "No / Yes",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "cigsPerDay",
        label: "Cigarettes per Day",
        hint: "0-50",
        kind: FieldKind::Integer { min: 0, max: 50 },
    },
    FieldSpec {
        name: "BPMeds",
        label: "On BP Medication?",
        hint: "No / Yes",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "prevalentStroke",
        label: "Had a Stroke Before?",
        hint: "No / Yes",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "prevalentHyp",
        label: "Has Hypertension?",
        hint: "No / Yes",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "diabetes",
        label: "Diabetic?",
        hint: "No / Yes",
        kind: FieldKind::Binary,
    },
    FieldSpec {
        name: "totChol",
        label: "Total Cholesterol",
        hint: "mg/dL (100-400)",
        kind: FieldKind::Integer { min: 100, max: 400 },
    },
    FieldSpec {
        name: "sysBP",
        label: "Systolic BP",
        hint: "mmHg (90-200)",
        kind: FieldKind::Integer { min: 90, max: 200 },
    },
    FieldSpec {
        name: "diaBP",
        label: "Diastolic BP",
        hint: "mmHg (60-140)",
        kind: FieldKind::Integer { min: 60, max: 140 },
    },
    FieldSpec {
        name: "BMI",
        label: "BMI",
        hint: "15.0-50.0",
        kind: FieldKind::Float { min: 15.0, max: 50.0 },
    },
    FieldSpec {
        name: "heartRate",
        label: "Heart Rate",
        hint: "bpm (40-120)",
        kind: FieldKind::Integer { min: 40, max: 120 },
    },
    FieldSpec {
        name: "glucose",
        label: "Glucose",
        hint: "mg/dL (50-300)",
        kind: FieldKind::Integer { min: 50, max: 300 },
    },
];

/// Two-way sex choice with its deterministic 0/1 encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Encoding used by the model: male = 1, female = 0.
    #[must_use]
    pub fn encode(self) -> f64 {
        match self {
            Self::Female => 0.0,
            Self::Male => 1.0,
        }
    }
}

/// Two-way yes/no choice with its deterministic 0/1 encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    No,
    Yes,
}

impl YesNo {
    /// Encoding used by the model: yes = 1, no = 0.
    #[must_use]
    pub fn encode(self) -> f64 {
        match self {
            Self::No => 0.0,
            Self::Yes => 1.0,
        }
    }
}

/// Shape disagreement between supplied fields and the declared schema.
///
/// Raised by [`RecordBuilder::build`]; never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatch {
    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("unexpected field '{0}'")]
    UnexpectedField(String),

    #[error("duplicate field '{0}'")]
    DuplicateField(String),
}

/// One row of the 15 schema attributes for one individual.
///
/// Ephemeral: built per user interaction, discarded after the pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub male: f64,
    pub age: f64,
    pub education: f64,
    #[serde(rename = "currentSmoker")]
    pub current_smoker: f64,
    #[serde(rename = "cigsPerDay")]
    pub cigs_per_day: f64,
    #[serde(rename = "BPMeds")]
    pub bp_meds: f64,
    #[serde(rename = "prevalentStroke")]
    pub prevalent_stroke: f64,
    #[serde(rename = "prevalentHyp")]
    pub prevalent_hyp: f64,
    pub diabetes: f64,
    #[serde(rename = "totChol")]
    pub tot_chol: f64,
    #[serde(rename = "sysBP")]
    pub sys_bp: f64,
    #[serde(rename = "diaBP")]
    pub dia_bp: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "heartRate")]
    pub heart_rate: f64,
    pub glucose: f64,
}

impl FeatureRecord {
    /// Flatten to a value vector in schema order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.male,
            self.age,
            self.education,
            self.current_smoker,
            self.cigs_per_day,
            self.bp_meds,
            self.prevalent_stroke,
            self.prevalent_hyp,
            self.diabetes,
            self.tot_chol,
            self.sys_bp,
            self.dia_bp,
            self.bmi,
            self.heart_rate,
            self.glucose,
        ]
    }

    /// Build from a value vector in schema order.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the vector does not have exactly
    /// [`FIELD_COUNT`] entries.
    pub fn from_vec(v: &[f64]) -> Result<Self, SchemaMismatch> {
        if v.len() < FIELD_COUNT {
            return Err(SchemaMismatch::MissingField(
                FIELD_NAMES[v.len()].to_string(),
            ));
        }
        if v.len() > FIELD_COUNT {
            return Err(SchemaMismatch::UnexpectedField(format!(
                "#{}",
                FIELD_COUNT
            )));
        }

        Ok(Self {
            male: v[0],
            age: v[1],
            education: v[2],
            current_smoker: v[3],
            cigs_per_day: v[4],
            bp_meds: v[5],
            prevalent_stroke: v[6],
            prevalent_hyp: v[7],
            diabetes: v[8],
            tot_chol: v[9],
            sys_bp: v[10],
            dia_bp: v[11],
            bmi: v[12],
            heart_rate: v[13],
            glucose: v[14],
        })
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FIELD_NAMES.into_iter().zip(self.to_vec())
    }
}

/// Builds exactly one [`FeatureRecord`] from raw per-field values.
///
/// The builder enforces shape (all 15 fields present, nothing extra, nothing
/// twice) and deterministic binary-category mapping via [`Sex`] and
/// [`YesNo`]. It does NOT range-check values: bounded inputs are the
/// presentation layer's job.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    entries: Vec<(String, f64)>,
}

impl RecordBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a raw numeric value for a named field.
    #[must_use]
    pub fn set(mut self, name: &str, value: f64) -> Self {
        self.entries.push((name.to_string(), value));
        self
    }

    /// Supply the sex choice (fills the `male` field).
    #[must_use]
    pub fn sex(self, sex: Sex) -> Self {
        self.set("male", sex.encode())
    }

    /// Supply a yes/no choice for a named flag field.
    #[must_use]
    pub fn flag(self, name: &str, choice: YesNo) -> Self {
        self.set(name, choice.encode())
    }

    /// Assemble the record, verifying the field set against the schema.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if any schema field is missing, an unknown
    /// field was supplied, or a field was supplied more than once.
    pub fn build(self) -> Result<FeatureRecord, SchemaMismatch> {
        let mut values = [None; FIELD_COUNT];

        for (name, value) in &self.entries {
            let Some(idx) = FIELD_NAMES.iter().position(|n| n == name) else {
                return Err(SchemaMismatch::UnexpectedField(name.clone()));
            };
            if values[idx].is_some() {
                return Err(SchemaMismatch::DuplicateField(name.clone()));
            }
            values[idx] = Some(*value);
        }

        if let Some(idx) = values.iter().position(Option::is_none) {
            return Err(SchemaMismatch::MissingField(FIELD_NAMES[idx].to_string()));
        }

        let v: Vec<f64> = values.into_iter().map(|x| x.unwrap_or(0.0)).collect();
        FeatureRecord::from_vec(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> RecordBuilder {
        RecordBuilder::new()
            .sex(Sex::Male)
            .set("age", 61.0)
            .set("education", 2.0)
            .flag("currentSmoker", YesNo::Yes)
            .set("cigsPerDay", 20.0)
            .flag("BPMeds", YesNo::No)
            .flag("prevalentStroke", YesNo::No)
            .flag("prevalentHyp", YesNo::Yes)
            .flag("diabetes", YesNo::No)
            .set("totChol", 250.0)
            .set("sysBP", 150.0)
            .set("diaBP", 90.0)
            .set("BMI", 29.5)
            .set("heartRate", 80.0)
            .set("glucose", 95.0)
    }

    #[test]
    fn test_builder_preserves_schema_order() {
        let record = full_builder().build().expect("Should build");
        let names: Vec<&str> = record.pairs().map(|(n, _)| n).collect();
        assert_eq!(names, FIELD_NAMES.to_vec());

        let v = record.to_vec();
        assert_eq!(v.len(), FIELD_COUNT);
        assert!((v[0] - 1.0).abs() < f64::EPSILON); // male
        assert!((v[1] - 61.0).abs() < f64::EPSILON); // age
        assert!((v[14] - 95.0).abs() < f64::EPSILON); // glucose
    }

    #[test]
    fn test_builder_rejects_missing_field() {
        let builder = RecordBuilder::new()
            .sex(Sex::Male)
            .set("age", 61.0)
            .set("education", 2.0)
            .flag("currentSmoker", YesNo::Yes)
            .set("cigsPerDay", 20.0)
            .flag("BPMeds", YesNo::No)
            .flag("prevalentStroke", YesNo::No)
            .flag("prevalentHyp", YesNo::Yes)
            .flag("diabetes", YesNo::No)
            .set("totChol", 250.0)
            .set("sysBP", 150.0)
            .set("diaBP", 90.0)
            .set("BMI", 29.5)
            .set("heartRate", 80.0);
        // glucose omitted

        assert_eq!(
            builder.build(),
            Err(SchemaMismatch::MissingField("glucose".to_string()))
        );
    }

    #[test]
    fn test_builder_rejects_unexpected_field() {
        let builder = full_builder().set("cholesterolRatio", 4.2);
        assert_eq!(
            builder.build(),
            Err(SchemaMismatch::UnexpectedField("cholesterolRatio".to_string()))
        );
    }

    #[test]
    fn test_builder_rejects_duplicate_field() {
        let builder = full_builder().set("age", 62.0);
        assert_eq!(
            builder.build(),
            Err(SchemaMismatch::DuplicateField("age".to_string()))
        );
    }

    #[test]
    fn test_binary_mapping_is_deterministic() {
        assert!((Sex::Male.encode() - 1.0).abs() < f64::EPSILON);
        assert!(Sex::Female.encode().abs() < f64::EPSILON);
        assert!((YesNo::Yes.encode() - 1.0).abs() < f64::EPSILON);
        assert!(YesNo::No.encode().abs() < f64::EPSILON);

        let a = full_builder().build().expect("Should build");
        let b = full_builder().build().expect("Should build");
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_vec_round_trip() {
        let record = full_builder().build().expect("Should build");
        let restored = FeatureRecord::from_vec(&record.to_vec()).expect("Should parse");
        assert_eq!(record, restored);

        assert!(FeatureRecord::from_vec(&[0.0; 14]).is_err());
        assert!(FeatureRecord::from_vec(&[0.0; 16]).is_err());
    }

    #[test]
    fn test_field_table_matches_names() {
        assert_eq!(FIELDS.len(), FIELD_COUNT);
        for (spec, name) in FIELDS.iter().zip(FIELD_NAMES.iter()) {
            assert_eq!(spec.name, *name);
        }
    }
}
