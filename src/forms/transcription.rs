use serde::Deserialize;
use validator::Validate;

use crate::domain::transcription::{NewTranscription, UpdateTranscription};
use crate::domain::types::{SessionId, TranscriptionContent};
use crate::forms::FormError;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Form data for attaching or editing a session transcription.
pub struct AddTranscriptionForm {
    /// At least 10 characters once trimmed.
    #[validate(length(min = 10))]
    pub content: String,
}

impl AddTranscriptionForm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    fn validated_content(self) -> Result<TranscriptionContent, FormError> {
        let trimmed = Self::new(self.content.trim());
        trimmed.validate()?;
        Ok(TranscriptionContent::new(trimmed.content)?)
    }

    /// Payload attaching this content to `session_id`.
    pub fn into_new_transcription(
        self,
        session_id: SessionId,
    ) -> Result<NewTranscription, FormError> {
        Ok(NewTranscription::new(session_id, self.validated_content()?))
    }

    pub fn into_update(self) -> Result<UpdateTranscription, FormError> {
        Ok(UpdateTranscription {
            content: self.validated_content()?,
        })
    }
}
