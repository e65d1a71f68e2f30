//! Domain aggregates exposed by the session service layer.

pub mod patient;
pub mod session;
pub mod transcription;
pub mod types;
