use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::I18n;
use crate::session::SessionError;
use crate::wizard::WizardError;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Unknown state: {state}")]
    UnknownRegion { state: String },

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Chat collaborator errors
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("No collaborator credential is configured")]
    MissingCredential,

    #[error("Connection failed to collaborator at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Invalid response from collaborator")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
    },
}

impl CollaboratorError {
    /// Message shown in the session error banner. Never includes the credential.
    pub fn user_message(&self, i18n: &I18n, locale: &str) -> String {
        match self {
            CollaboratorError::MissingCredential => {
                i18n.get(locale, "error-missing-credential", None)
            }
            other => i18n.format(
                locale,
                "error-collaborator-interrupted",
                &[("message", &other.to_string())],
            ),
        }
    }
}

/// API error response (matches Axum's built-in JsonRejection format)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::SessionNotFound { .. } | ServiceError::UnknownRegion { .. } => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Session(SessionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            ServiceError::Session(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Collaborator(CollaboratorError::MissingCredential) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::Collaborator(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::SessionNotFound { .. } => "session_not_found",
            ServiceError::UnknownRegion { .. } => "unknown_region",
            ServiceError::Session(SessionError::InvalidTransition { .. }) => "invalid_transition",
            ServiceError::Session(SessionError::EmptyQuery) => "empty_query",
            ServiceError::Session(SessionError::MissingContext) => "missing_context",
            ServiceError::Session(SessionError::Wizard(WizardError::PhaseInvalid { .. })) => {
                "wizard_phase_invalid"
            }
            ServiceError::Session(SessionError::Wizard(_)) => "wizard_rejected",
            ServiceError::Collaborator(CollaboratorError::MissingCredential) => {
                "collaborator_missing_credential"
            }
            ServiceError::Collaborator(CollaboratorError::Connection { .. }) => {
                "collaborator_connection"
            }
            ServiceError::Collaborator(CollaboratorError::Generation { .. }) => {
                "collaborator_generation"
            }
            ServiceError::Collaborator(CollaboratorError::InvalidResponse { .. }) => {
                "collaborator_invalid_response"
            }
            ServiceError::Config { .. } => "config_error",
        }
    }

    /// Get a user-friendly translated message
    pub fn user_message(&self, i18n: &I18n, locale: &str) -> String {
        match self {
            ServiceError::SessionNotFound { session_id } => {
                i18n.format(locale, "error-session-not-found", &[("id", session_id)])
            }
            ServiceError::Collaborator(e) => e.user_message(i18n, locale),
            // For other errors, fall back to the technical message
            _ => self.to_string(),
        }
    }

    /// Convert to an error response with i18n support
    pub fn into_response_with_i18n(self, i18n: &I18n, locale: &str) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();
        let message = self.user_message(i18n, locale);

        let details = match &self {
            ServiceError::Session(SessionError::InvalidTransition { action, mode }) => {
                Some(serde_json::json!({ "action": action, "mode": mode }))
            }
            _ => None,
        };

        let response = ErrorResponse {
            message,
            code: Some(code),
            details,
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error wrapper with i18n support for API responses
pub struct I18nError {
    pub error: ServiceError,
    pub i18n: std::sync::Arc<I18n>,
    pub locale: String,
}

impl I18nError {
    pub fn new(error: ServiceError, i18n: std::sync::Arc<I18n>, locale: impl Into<String>) -> Self {
        Self {
            error,
            i18n,
            locale: locale.into(),
        }
    }
}

impl IntoResponse for I18nError {
    fn into_response(self) -> Response {
        self.error.into_response_with_i18n(&self.i18n, &self.locale)
    }
}
