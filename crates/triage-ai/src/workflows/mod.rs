pub mod cohort;
pub mod triage;
