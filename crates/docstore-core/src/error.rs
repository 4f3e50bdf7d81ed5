use std::error::Error as StdError;

use docstore_registry::RegistryError;
use docstore_types::{DocumentId, Location};
use thiserror::Error;

/// Coarse classification every [`ServiceError`] falls into.
///
/// Transport adapters map kinds, not variants, onto their status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request, oversized upload, or duplicate identifier.
    InvalidInput,
    /// No document is registered under the identifier.
    NotFound,
    /// I/O failure, unreachable content, or any other unexpected condition.
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("path with id {0} already exists")]
    AlreadyExists(DocumentId),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The registry points at a location whose content is gone.
    #[error("file with ID {id} can't be reached at its path")]
    Unreachable { id: DocumentId, location: Location },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl ServiceError {
    pub(crate) fn internal(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn internal_message(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::AlreadyExists(_) => ErrorKind::InvalidInput,
            Self::Registry(RegistryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Registry(_) | Self::Unreachable { .. } | Self::Internal { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Message safe to hand to external callers.
    ///
    /// Low-level causes (paths, I/O errors) are left out; they are logged
    /// where the error is raised.
    pub fn public_message(&self) -> String {
        match self {
            Self::Registry(RegistryError::NotFound(_)) => self.to_string(),
            Self::Registry(_) => "document registry unavailable".to_string(),
            Self::Internal { message, .. } => message.clone(),
            Self::InvalidInput(_) | Self::AlreadyExists(_) | Self::Unreachable { .. } => {
                self.to_string()
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
