//! Failure taxonomy shared by every remote-service port.
//!
//! Adapters translate transport failures into [`RemoteServiceError`] so that
//! services can decide on retries without inspecting transport details.

use crate::contract::domain::TrelloId;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Classification of a remote-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteFailureKind {
    /// The request did not reach the service or the connection dropped.
    Network,
    /// The service throttled the caller.
    RateLimited,
    /// The service is temporarily unavailable.
    Unavailable,
    /// The addressed resource does not exist.
    NotFound,
    /// The credentials lack permission for the resource.
    PermissionDenied,
    /// The credentials were rejected.
    Unauthorized,
    /// The service rejected the request as malformed.
    Rejected,
    /// The adapter failed internally.
    Internal,
}

impl RemoteFailureKind {
    /// Returns whether a retry with backoff may succeed.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimited | Self::Unavailable)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Network => "network failure",
            Self::RateLimited => "rate limited",
            Self::Unavailable => "service unavailable",
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::Unauthorized => "unauthorized",
            Self::Rejected => "request rejected",
            Self::Internal => "internal adapter failure",
        }
    }
}

impl fmt::Display for RemoteFailureKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// A failed call to the remote service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed ({kind}): {detail}")]
pub struct RemoteServiceError {
    operation: String,
    kind: RemoteFailureKind,
    detail: String,
    retry_after: Option<Duration>,
}

impl RemoteServiceError {
    /// Creates a remote failure for `operation`.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        kind: RemoteFailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            kind,
            detail: detail.into(),
            retry_after: None,
        }
    }

    /// Creates a not-found failure.
    #[must_use]
    pub fn not_found(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(operation, RemoteFailureKind::NotFound, detail)
    }

    /// Creates an internal adapter failure from any error.
    #[must_use]
    pub fn internal(operation: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(operation, RemoteFailureKind::Internal, err.to_string())
    }

    /// Attaches the delay requested by a throttling response.
    #[must_use]
    pub const fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// Returns the failed operation.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> RemoteFailureKind {
        self.kind
    }

    /// Returns the failure detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the delay requested by the service, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Returns whether a retry with backoff may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Returns whether the addressed resource is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, RemoteFailureKind::NotFound)
    }
}

/// Result type for remote-service port operations.
pub type RemoteResult<T> = Result<T, RemoteServiceError>;

/// Issues a fresh identifier on behalf of an in-memory remote.
pub(crate) fn mint_remote_id(operation: &str) -> RemoteResult<TrelloId> {
    let raw: String = Uuid::new_v4().simple().to_string().chars().take(24).collect();
    TrelloId::new(raw).map_err(|err| RemoteServiceError::internal(operation, &err))
}
