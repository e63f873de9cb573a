//! Scoring and validity engine for questionnaire-style assessments.
//!
//! The [`scoring`] module turns a response stream into normalized dimension scores, a
//! validity assessment, an archetype profile, and ranked recommendations. The remaining
//! modules carry the configuration, error, and telemetry plumbing shared with the HTTP
//! service in `services/api`.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
