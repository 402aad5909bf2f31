//! Rule-weighted ER risk scoring for clinical triage.
//!
//! A pretrained classifier produces a base probability that a patient needs
//! emergency-room evaluation. A validated rule table boosts that probability
//! and records which rules fired, and a parallel recommendation table yields
//! ordered diagnostic-test suggestions.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
