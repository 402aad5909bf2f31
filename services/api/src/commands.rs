use crate::infra::build_service;
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use triage_ai::config::AppConfig;
use triage_ai::error::AppError;
use triage_ai::workflows::cohort::{CohortEvaluator, CohortReport};
use triage_ai::workflows::triage::domain::{
    AGE, ALTERED_MENTAL_STATUS, BLOOD_PRESSURE, BLOOD_SUGAR, CHEST_PAIN, DIABETES, HEART_DISEASE,
    MODE_OF_ARRIVAL, PULSE, RESPIRATORY_RATE, SHORTNESS_OF_BREATH, SPO2, SYNCOPE, TEMPERATURE,
    TROUBLE_SPEAKING, TROUBLE_WALKING, UNILATERAL_WEAKNESS,
};
use triage_ai::workflows::triage::{
    validate_ranges, AttributeValue, PatientAttributes, RuleRegistry, TriageAssessment,
};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file with a flat attribute object; replaces the vitals flags
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Oxygen saturation (%)
    #[arg(long, default_value_t = 98.0)]
    pub(crate) spo2: f64,
    /// Systolic blood pressure (mmHg)
    #[arg(long, default_value_t = 120.0)]
    pub(crate) blood_pressure: f64,
    /// Body temperature (°C)
    #[arg(long, default_value_t = 37.0)]
    pub(crate) temperature: f64,
    /// Pulse (bpm)
    #[arg(long, default_value_t = 75.0)]
    pub(crate) pulse: f64,
    /// Blood glucose (mg/dL)
    #[arg(long, default_value_t = 100.0)]
    pub(crate) blood_sugar: f64,
    /// Respiratory rate (breaths/min)
    #[arg(long, default_value_t = 16.0)]
    pub(crate) respiratory_rate: f64,
    /// Age in years
    #[arg(long, default_value_t = 50.0)]
    pub(crate) age: f64,
    /// walk_in, ambulance or other
    #[arg(long, default_value = "walk_in")]
    pub(crate) mode_of_arrival: String,
    #[arg(long)]
    pub(crate) chest_pain: bool,
    #[arg(long)]
    pub(crate) shortness_of_breath: bool,
    #[arg(long)]
    pub(crate) heart_disease: bool,
    #[arg(long)]
    pub(crate) unilateral_weakness: bool,
    #[arg(long)]
    pub(crate) trouble_speaking: bool,
    #[arg(long)]
    pub(crate) trouble_walking: bool,
    #[arg(long)]
    pub(crate) syncope: bool,
    #[arg(long)]
    pub(crate) diabetes: bool,
    #[arg(long)]
    pub(crate) altered_mental_status: bool,
    /// Print the assessment as JSON instead of a clinician summary
    #[arg(long)]
    pub(crate) json: bool,
}

impl AssessArgs {
    fn raw_attributes(&self) -> BTreeMap<String, AttributeValue> {
        let mut raw = BTreeMap::new();
        for (name, value) in [
            (SPO2, self.spo2),
            (BLOOD_PRESSURE, self.blood_pressure),
            (TEMPERATURE, self.temperature),
            (PULSE, self.pulse),
            (BLOOD_SUGAR, self.blood_sugar),
            (RESPIRATORY_RATE, self.respiratory_rate),
            (AGE, self.age),
        ] {
            raw.insert(name.to_string(), AttributeValue::Number(value));
        }
        for (name, flag) in [
            (CHEST_PAIN, self.chest_pain),
            (SHORTNESS_OF_BREATH, self.shortness_of_breath),
            (HEART_DISEASE, self.heart_disease),
            (UNILATERAL_WEAKNESS, self.unilateral_weakness),
            (TROUBLE_SPEAKING, self.trouble_speaking),
            (TROUBLE_WALKING, self.trouble_walking),
            (SYNCOPE, self.syncope),
            (DIABETES, self.diabetes),
            (ALTERED_MENTAL_STATUS, self.altered_mental_status),
        ] {
            raw.insert(name.to_string(), AttributeValue::Flag(flag));
        }
        raw.insert(
            MODE_OF_ARRIVAL.to_string(),
            AttributeValue::Text(self.mode_of_arrival.clone()),
        );
        raw
    }
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Print the tables as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CohortArgs {
    /// CSV file with one patient per row and an optional needs_er column
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write per-patient results to this CSV file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let raw = match &args.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<BTreeMap<String, AttributeValue>>(&text).map_err(|err| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
            })?
        }
        None => args.raw_attributes(),
    };

    let attributes = PatientAttributes::from_raw(raw)?;
    validate_ranges(&attributes)?;
    let assessment = service.assess(&attributes)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&assessment).map_err(|err| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
        })?;
        println!("{rendered}");
    } else {
        render_assessment(&assessment);
    }
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let registry = RuleRegistry::standard()?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&registry).map_err(|err| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
        })?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Probability rules (multiply by 1 + weight when true)");
    for rule in registry.rules() {
        println!(
            "  {:<22} {:<28} {:<16} +{:.2}  {}",
            rule.id,
            rule.key.to_string(),
            rule.predicate.to_string(),
            rule.weight,
            rule.description
        );
    }

    println!("\nRecommendation rules");
    for rule in registry.recommendations() {
        println!("  {} [{}] weight {:.2}", rule.id, rule.category, rule.weight);
        for action in &rule.actions {
            println!("    - {action}");
        }
    }
    Ok(())
}

pub(crate) fn run_cohort(args: CohortArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let report = CohortEvaluator::from_path(&args.input, &service)?;
    render_cohort(&report);

    if let Some(output) = args.output {
        let file = std::fs::File::create(&output)?;
        report.write_csv(file)?;
        println!("\nRow results written to {}", output.display());
    }
    Ok(())
}

fn render_assessment(assessment: &TriageAssessment) {
    println!("Prediction: {}", assessment.disposition.label());
    println!(
        "Probability of Needing ER: {:.0}%",
        assessment.er_probability * 100.0
    );
    println!(
        "Probability of Safe Discharge: {:.0}%",
        assessment.discharge_probability * 100.0
    );

    if let Some(warning) = &assessment.warning {
        println!("\n{warning}");
    }

    if let Some(score) = &assessment.score {
        println!("\nModel probability: {:.1}%", score.base_probability * 100.0);
        if score.applied_rules.is_empty() {
            println!("No clinical rules adjusted the score");
        } else {
            println!("Rules applied (x{:.2}):", score.multiplier());
            for rule in &score.applied_rules {
                println!("  - {} (+{:.0}%)", rule.description, rule.weight * 100.0);
            }
        }
    }

    println!("\nRecommended Actions:");
    if assessment.recommendations.is_no_action() {
        println!("  No specific actions");
    } else {
        for action in assessment.recommendations.actions() {
            println!("  - {}", action.text);
        }
    }
}

fn render_cohort(report: &CohortReport) {
    println!(
        "Assessed {} patients ({} failed)",
        report.rows.len(),
        report.failed()
    );

    let Some(metrics) = &report.metrics else {
        println!("No needs_er labels present; skipping metrics");
        return;
    };

    println!(
        "\nAt decision threshold {:.2}:",
        metrics.decision_threshold
    );
    println!("  Accuracy: {:.3}", metrics.accuracy);
    println!("  Sensitivity (Recall): {:.3}", metrics.sensitivity);
    println!("  Specificity: {:.3}", metrics.specificity);
    println!("  Precision: {:.3}", metrics.precision);
    println!(
        "  Confusion Matrix: [[{} {}] [{} {}]]",
        metrics.confusion.true_negative,
        metrics.confusion.false_positive,
        metrics.confusion.false_negative,
        metrics.confusion.true_positive
    );
    for point in &metrics.sweep {
        println!(
            "  Threshold {}: Sensitivity = {:.3}, Specificity = {:.3}",
            point.threshold, point.sensitivity, point.specificity
        );
    }
}
