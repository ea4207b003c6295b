use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::models::RiskPrediction;
use crate::panels::risk::prediction_cells;

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "StudentID")]
    student_id: String,
    #[serde(rename = "GPA")]
    gpa: String,
    #[serde(rename = "StudyTimeWeekly")]
    study_time_weekly: String,
    #[serde(rename = "Absences")]
    absences: String,
    #[serde(rename = "RiskProbability")]
    risk_probability: String,
    #[serde(rename = "RiskLevel")]
    risk_level: String,
}

impl From<&RiskPrediction> for ExportRow {
    fn from(row: &RiskPrediction) -> Self {
        let [student_id, gpa, study_time_weekly, absences, risk_probability, risk_level] =
            prediction_cells(row);
        Self {
            student_id,
            gpa,
            study_time_weekly,
            absences,
            risk_probability,
            risk_level,
        }
    }
}

/// Writes assessment rows as CSV, formatted the way the results table shows them.
pub fn write_predictions<W: std::io::Write>(
    writer: W,
    rows: &[&RiskPrediction],
) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(ExportRow::from(*row))?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}

pub fn export_predictions(path: &Path, rows: &[&RiskPrediction]) -> anyhow::Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_predictions(file, rows)
}
