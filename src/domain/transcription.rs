use serde::{Deserialize, Serialize};

use crate::domain::types::{SessionId, TranscriptionContent, TranscriptionId};

/// Free-text transcription attached to a single session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub id: TranscriptionId,
    pub session_id: SessionId,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Payload for `POST /transcriptions`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTranscription {
    pub session_id: SessionId,
    pub content: TranscriptionContent,
}

impl NewTranscription {
    #[must_use]
    pub fn new(session_id: SessionId, content: TranscriptionContent) -> Self {
        Self {
            session_id,
            content,
        }
    }
}

/// Payload for `PATCH /transcriptions/{id}`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UpdateTranscription {
    pub content: TranscriptionContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcription_uses_wire_field_names() {
        let payload = NewTranscription::new(
            SessionId::new(9).unwrap(),
            TranscriptionContent::new("Paciente refiere mejoría").unwrap(),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sessionId": 9, "content": "Paciente refiere mejoría"})
        );
    }
}
