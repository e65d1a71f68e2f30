//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::transcription::{NewTranscription, Transcription, UpdateTranscription};
use crate::domain::types::{SessionId, TranscriptionId};
use crate::models::session::{NewSession, Session, UpdateSession};
use crate::repository::errors::RepositoryResult;
use crate::repository::{SessionReader, SessionWriter, TranscriptionReader, TranscriptionWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl SessionReader for Repository {
        async fn list_sessions(&self) -> RepositoryResult<Vec<Session>>;
        async fn get_session(&self, id: SessionId) -> RepositoryResult<Session>;
        async fn list_pending_payments(&self) -> RepositoryResult<Vec<Session>>;
    }

    #[async_trait]
    impl SessionWriter for Repository {
        async fn create_session(&self, new_session: &NewSession) -> RepositoryResult<Session>;
        async fn update_session(
            &self,
            id: SessionId,
            updates: &UpdateSession,
        ) -> RepositoryResult<Session>;
        async fn update_session_status(&self, id: SessionId, paid: bool) -> RepositoryResult<()>;
        async fn delete_session(&self, id: SessionId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl TranscriptionReader for Repository {
        async fn get_transcription(&self, id: TranscriptionId) -> RepositoryResult<Transcription>;
        async fn get_transcription_by_session(
            &self,
            session_id: SessionId,
        ) -> RepositoryResult<Transcription>;
    }

    #[async_trait]
    impl TranscriptionWriter for Repository {
        async fn create_transcription(
            &self,
            transcription: &NewTranscription,
        ) -> RepositoryResult<Transcription>;
        async fn update_transcription(
            &self,
            id: TranscriptionId,
            updates: &UpdateTranscription,
        ) -> RepositoryResult<Transcription>;
        async fn delete_transcription(&self, id: TranscriptionId) -> RepositoryResult<()>;
    }
}
