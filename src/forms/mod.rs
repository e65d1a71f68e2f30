//! Form definitions backing session and transcription creation.

use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub mod session;
pub mod transcription;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid patient id")]
    InvalidPatientId,

    #[error("invalid date, expected YYYY-MM-DD")]
    InvalidDate,

    #[error("invalid time, expected HH:MM")]
    InvalidTime,

    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Readable description of a single failed validation rule.
fn describe(field: &str, err: &ValidationError) -> String {
    match err.code.as_ref() {
        "length" => match err.params.get("min").and_then(|min| min.as_u64()) {
            Some(min) if min > 1 => {
                format!("El campo {field} debe tener al menos {min} caracteres")
            }
            _ => format!("El campo {field} es obligatorio"),
        },
        "range" => format!("El campo {field} tiene un valor fuera de rango"),
        "invalid_time" => "La hora de inicio debe ser anterior a la hora de término".to_string(),
        _ => format!("El campo {field} no es válido"),
    }
}

impl FormError {
    /// One-line message suitable for showing next to the form.
    pub fn user_message(&self) -> String {
        match self {
            FormError::Validation(errors) => {
                let mut messages: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter()
                            .map(|err| describe(field, err))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                messages.sort();
                messages.dedup();
                format!("Errores de validación: {}", messages.join(", "))
            }
            FormError::InvalidPatientId => "Selecciona un paciente válido.".to_string(),
            FormError::InvalidDate => "La fecha no es válida.".to_string(),
            FormError::InvalidTime => "La hora no es válida.".to_string(),
            FormError::Constraint(_) => {
                "Datos inválidos. Verifica la información ingresada.".to_string()
            }
        }
    }
}
