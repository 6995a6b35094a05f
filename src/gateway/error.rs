use serde::{Deserialize, Serialize};

/// Failures of a remote procedure call.
///
/// The first three kinds are produced by the Gateway itself; `Transport`
/// only ever comes from a client that could not complete the round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// JSON body of every failed procedure call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Wire code, tRPC style.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Store(_) => "INTERNAL_SERVER_ERROR",
            Self::Transport(_) => "CLIENT_CLOSED_REQUEST",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Store(m) | Self::Transport(m) => m,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.message().to_string(),
        }
    }

    /// Inverse of [`GatewayError::to_body`]. Unknown codes are treated as store failures.
    pub fn from_body(body: ErrorBody) -> Self {
        match body.code.as_str() {
            "BAD_REQUEST" => Self::Validation(body.message),
            "NOT_FOUND" => Self::NotFound(body.message),
            "CLIENT_CLOSED_REQUEST" => Self::Transport(body.message),
            _ => Self::Store(body.message),
        }
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for GatewayError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_round_trips_every_kind() {
        for err in [
            GatewayError::validation("name must not be blank"),
            GatewayError::not_found("Project 3 not found"),
            GatewayError::store("disk I/O error"),
            GatewayError::transport("connection refused"),
        ] {
            assert_eq!(GatewayError::from_body(err.to_body()), err);
        }
    }

    #[test]
    fn unknown_code_reads_as_store_failure() {
        let err = GatewayError::from_body(ErrorBody {
            code: "TEAPOT".to_string(),
            message: "short and stout".to_string(),
        });
        assert_eq!(err, GatewayError::store("short and stout"));
    }
}
