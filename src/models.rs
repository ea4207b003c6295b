use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treats an explicit JSON `null` the same as an absent field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts and IDs sometimes arrive as floats (`2392.0`). Whole floats are
/// accepted; fractional ones are rejected.
fn whole_number<E: serde::de::Error>(value: &Value) -> Result<i64, E> {
    let Value::Number(number) = value else {
        return Err(E::custom(format!("expected a whole number, found {value}")));
    };
    number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
        .ok_or_else(|| E::custom(format!("expected a whole number, found {number}")))
}

/// Whole number with `null`/absent read as zero.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => {
            let whole = whole_number(&value)?;
            T::try_from(whole).map_err(|_| D::Error::custom(format!("{whole} is out of range")))
        }
    }
}

fn lenient_optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => whole_number(&value).map(Some),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(value)) => value,
        Some(other) => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_students: u64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub students_with_tutors: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub average_study_time: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub average_absences: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub average_gpa: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub gender_distribution: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub grade_distribution: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub extracurricular_participation: BTreeMap<String, f64>,
}

/// Schema and preview rows of the student dataset.
///
/// `columns` carries the display order; `sample_data` rows are keyed by
/// column name and may omit or null out any cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_students: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub data_types: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_default")]
    pub sample_data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "null_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_default")]
    pub issue: String,
    #[serde(default, deserialize_with = "null_default")]
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecommendation {
    #[serde(rename = "StudentID", default, deserialize_with = "string_or_number")]
    pub student_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub risk_factors: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, deserialize_with = "null_default")]
    pub next_steps: Vec<String>,
}

/// One of the four fixed clustering buckets, ordered from minimal to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Minimal,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "Risk_Level_0",
            RiskLevel::Low => "Risk_Level_1",
            RiskLevel::Medium => "Risk_Level_2",
            RiskLevel::High => "Risk_Level_3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "Minimal Risk",
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

/// Bucket counts. All four keys always exist; absent ones read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterCounts {
    #[serde(rename = "Risk_Level_0", default, deserialize_with = "lenient_int")]
    pub level_0: u64,
    #[serde(rename = "Risk_Level_1", default, deserialize_with = "lenient_int")]
    pub level_1: u64,
    #[serde(rename = "Risk_Level_2", default, deserialize_with = "lenient_int")]
    pub level_2: u64,
    #[serde(rename = "Risk_Level_3", default, deserialize_with = "lenient_int")]
    pub level_3: u64,
}

impl ClusterCounts {
    pub fn count(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::Minimal => self.level_0,
            RiskLevel::Low => self.level_1,
            RiskLevel::Medium => self.level_2,
            RiskLevel::High => self.level_3,
        }
    }

    pub fn total(&self) -> u64 {
        RiskLevel::ALL.iter().map(|level| self.count(*level)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    #[serde(default, deserialize_with = "null_default")]
    pub clusters: ClusterCounts,
    #[serde(default, deserialize_with = "null_default")]
    pub cluster_data: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    #[serde(rename = "StudentID", default, deserialize_with = "lenient_optional_int")]
    pub student_id: Option<i64>,
    #[serde(rename = "GPA", default, deserialize_with = "null_default")]
    pub gpa: f64,
    #[serde(rename = "StudyTimeWeekly", default, deserialize_with = "null_default")]
    pub study_time_weekly: f64,
    #[serde(rename = "Absences", default, deserialize_with = "lenient_int")]
    pub absences: i64,
    #[serde(rename = "RiskProbability", default, deserialize_with = "null_default")]
    pub risk_probability: f64,
    #[serde(rename = "AtRisk", default, deserialize_with = "null_default")]
    pub at_risk: bool,
}

impl RiskPrediction {
    pub fn risk_label(&self) -> &'static str {
        if self.at_risk {
            "At Risk"
        } else {
            "Not At Risk"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default, deserialize_with = "null_default")]
    pub all_students: Vec<RiskPrediction>,
}
