//! Port for existence checks on users and services owned elsewhere.

use async_trait::async_trait;

use crate::domain::{ServiceId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reference directory adapters.
    pub enum ReferenceDirectoryError {
        /// Directory could not be reached.
        Connection { message: String } =>
            "reference directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "reference directory query failed: {message}",
    }
}

/// Referential checks run before an appointment is persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &UserId) -> Result<bool, ReferenceDirectoryError>;

    async fn service_exists(&self, service_id: &ServiceId)
    -> Result<bool, ReferenceDirectoryError>;
}

/// Fixture directory that knows every id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReferenceDirectory;

#[async_trait]
impl ReferenceDirectory for FixtureReferenceDirectory {
    async fn user_exists(&self, _user_id: &UserId) -> Result<bool, ReferenceDirectoryError> {
        Ok(true)
    }

    async fn service_exists(
        &self,
        _service_id: &ServiceId,
    ) -> Result<bool, ReferenceDirectoryError> {
        Ok(true)
    }
}
