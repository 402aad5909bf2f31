//! Batch triage of a patient CSV with optional ground-truth metrics.

mod metrics;
mod parser;

pub use metrics::{
    ClassificationMetrics, ConfusionMatrix, LabelledScore, ThresholdPoint, SWEEP_THRESHOLDS,
};

use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::workflows::triage::{Disposition, PatientAttributes, TriageService};

#[derive(Debug)]
pub enum CohortImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, message: String },
}

impl std::fmt::Display for CohortImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CohortImportError::Io(err) => write!(f, "failed to read cohort file: {}", err),
            CohortImportError::Csv(err) => write!(f, "invalid cohort CSV data: {}", err),
            CohortImportError::Row { line, message } => {
                write!(f, "invalid cohort row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for CohortImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CohortImportError::Io(err) => Some(err),
            CohortImportError::Csv(err) => Some(err),
            CohortImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for CohortImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CohortImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Per-patient outcome; failed rows carry `error` instead of a disposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRow {
    pub line: u64,
    pub patient_id: Option<String>,
    pub needs_er: Option<bool>,
    pub disposition: Option<String>,
    pub er_probability: Option<f64>,
    pub safety_override: bool,
    pub top_recommendation: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortReport {
    pub rows: Vec<CohortRow>,
    pub metrics: Option<ClassificationMetrics>,
}

impl CohortReport {
    pub fn failed(&self) -> usize {
        self.rows.iter().filter(|row| row.error.is_some()).count()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CohortImportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

pub struct CohortEvaluator;

impl CohortEvaluator {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        service: &TriageService,
    ) -> Result<CohortReport, CohortImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        service: &TriageService,
    ) -> Result<CohortReport, CohortImportError> {
        let mut rows = Vec::new();
        let mut labelled = Vec::new();

        for record in parser::parse_records(reader)? {
            let mut row = CohortRow {
                line: record.line,
                patient_id: record.patient_id,
                needs_er: record.label,
                disposition: None,
                er_probability: None,
                safety_override: false,
                top_recommendation: None,
                error: None,
            };

            match PatientAttributes::from_raw(record.attributes)
                .and_then(|attributes| service.assess(&attributes))
            {
                Ok(assessment) => {
                    if let Some(actual) = record.label {
                        labelled.push(LabelledScore {
                            probability: assessment.er_probability,
                            referred: assessment.disposition == Disposition::NeedsErEvaluation,
                            actual,
                        });
                    }
                    row.disposition = Some(assessment.disposition.label().to_string());
                    row.er_probability = Some(assessment.er_probability);
                    row.safety_override = assessment.overridden();
                    row.top_recommendation = assessment
                        .recommendations
                        .actions()
                        .first()
                        .map(|action| action.text.clone());
                }
                Err(error) => {
                    warn!(line = row.line, %error, "cohort row could not be assessed");
                    row.error = Some(error.to_string());
                }
            }

            rows.push(row);
        }

        let metrics =
            ClassificationMetrics::compute(&labelled, service.config().decision_threshold);
        info!(
            rows = rows.len(),
            labelled = labelled.len(),
            "cohort evaluation completed"
        );

        Ok(CohortReport { rows, metrics })
    }
}
