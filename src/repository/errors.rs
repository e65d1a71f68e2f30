use serde_json::Value;
use thiserror::Error;

/// Failure talking to the sessions backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No response at all: refused connection, DNS failure, timeout.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// `400 Bad Request`, with the backend message when it sent one.
    #[error("Validation error: {}", .0.as_deref().unwrap_or("bad request"))]
    ValidationError(Option<String>),

    /// `401` or `403`.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Entity not found")]
    NotFound,

    /// Any other non-success status.
    #[error("Backend error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    /// The backend answered but the body could not be read.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Pulls a `message` out of a JSON error body; arrays of messages are joined.
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("message")? {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    Some(message).filter(|m| !m.trim().is_empty())
}

impl RepositoryError {
    /// Maps a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body);
        match status {
            400 => RepositoryError::ValidationError(message),
            401 | 403 => RepositoryError::Unauthorized,
            404 => RepositoryError::NotFound,
            _ => RepositoryError::ServerError { status, message },
        }
    }

    /// HTTP status behind the error, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RepositoryError::ValidationError(_) => Some(400),
            RepositoryError::Unauthorized => Some(401),
            RepositoryError::NotFound => Some(404),
            RepositoryError::ServerError { status, .. } => Some(*status),
            RepositoryError::ConnectionError(_) | RepositoryError::Unexpected(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound)
    }

    /// One-line message suitable for showing to the clinician.
    pub fn user_message(&self) -> String {
        match self {
            RepositoryError::ConnectionError(_) => {
                "No se puede conectar con el servidor. Verifica que el backend esté corriendo."
                    .to_string()
            }
            RepositoryError::ValidationError(Some(message))
            | RepositoryError::ServerError {
                message: Some(message),
                ..
            } => format!("Error: {message}"),
            RepositoryError::ValidationError(None) => {
                "Datos inválidos. Verifica la información ingresada.".to_string()
            }
            RepositoryError::Unauthorized => {
                "Sesión expirada. Inicia sesión nuevamente.".to_string()
            }
            RepositoryError::NotFound => "No se encontró el recurso solicitado.".to_string(),
            RepositoryError::ServerError {
                status,
                message: None,
            } => format!("Error del servidor ({status}). Inténtalo de nuevo."),
            RepositoryError::Unexpected(_) => {
                "Respuesta inesperada del servidor. Inténtalo de nuevo.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return RepositoryError::Unexpected(format!("Failed to decode response: {err}"));
        }
        if let Some(status) = err.status() {
            return RepositoryError::from_status(status.as_u16(), "");
        }
        RepositoryError::ConnectionError(err.to_string())
    }
}
