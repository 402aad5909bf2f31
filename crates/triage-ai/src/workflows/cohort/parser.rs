use std::collections::BTreeMap;
use std::io::Read;

use crate::workflows::triage::AttributeValue;

use super::CohortImportError;

pub(crate) const LABEL_COLUMN: &str = "needs_er";
const ID_COLUMNS: [&str; 2] = ["patient_id", "id"];

/// One CSV row split into identifier, ground truth and raw attributes.
#[derive(Debug)]
pub(crate) struct CohortRecord {
    pub(crate) line: u64,
    pub(crate) patient_id: Option<String>,
    pub(crate) label: Option<bool>,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CohortRecord>, CohortImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|position| position.line()).unwrap_or(0);
        let mut record = CohortRecord {
            line,
            patient_id: None,
            label: None,
            attributes: BTreeMap::new(),
        };

        for (header, cell) in headers.iter().zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            if ID_COLUMNS.contains(&header.as_str()) {
                record.patient_id = Some(cell.to_string());
            } else if header == LABEL_COLUMN {
                record.label = Some(parse_label(cell).ok_or_else(|| CohortImportError::Row {
                    line,
                    message: format!("{LABEL_COLUMN} must be 0 or 1 (got '{cell}')"),
                })?);
            } else {
                record.attributes.insert(header.clone(), parse_cell(cell));
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn parse_label(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_cell(cell: &str) -> AttributeValue {
    if let Ok(number) = cell.parse::<f64>() {
        return AttributeValue::Number(number);
    }
    match cell.to_ascii_lowercase().as_str() {
        "true" | "yes" => AttributeValue::Flag(true),
        "false" | "no" => AttributeValue::Flag(false),
        _ => AttributeValue::Text(cell.to_string()),
    }
}
