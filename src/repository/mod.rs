//! Gateways to the sessions backend.
//!
//! Services are generic over these traits so that they can run against the
//! HTTP backend ([`HttpRepository`]) or a mock in tests.

use async_trait::async_trait;

use crate::domain::transcription::{NewTranscription, Transcription, UpdateTranscription};
use crate::domain::types::{SessionId, TranscriptionId};
use crate::models::session::{NewSession, Session, UpdateSession};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::HttpRepository;

#[async_trait]
pub trait SessionReader {
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>>;
    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session>;
    async fn list_pending_payments(&self) -> RepositoryResult<Vec<Session>>;
}

#[async_trait]
pub trait SessionWriter {
    async fn create_session(&self, new_session: &NewSession) -> RepositoryResult<Session>;
    async fn update_session(
        &self,
        id: SessionId,
        updates: &UpdateSession,
    ) -> RepositoryResult<Session>;
    /// Narrow update touching only the paid flag.
    async fn update_session_status(&self, id: SessionId, paid: bool) -> RepositoryResult<()>;
    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait TranscriptionReader {
    async fn get_transcription(&self, id: TranscriptionId) -> RepositoryResult<Transcription>;
    /// Fails with [`errors::RepositoryError::NotFound`] when the session has none.
    async fn get_transcription_by_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Transcription>;
}

#[async_trait]
pub trait TranscriptionWriter {
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
