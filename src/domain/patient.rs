//! Patient summary embedded in session payloads.

use serde::{Deserialize, Serialize};

use crate::domain::types::PatientId;

/// Patient profile as returned by the backend.
///
/// Only `full_name` takes part in session filtering; every other field is
/// carried through so the patient detail modal can show it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Patient {
    /// Builds a patient carrying only an id and a name.
    #[must_use]
    pub fn new(id: PatientId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: None,
            age: None,
            gender: None,
            contact_info: None,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    /// Case-insensitive substring match on the full name.
    ///
    /// `needle` must already be lower-cased.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.full_name.to_lowercase().contains(needle)
    }
}
