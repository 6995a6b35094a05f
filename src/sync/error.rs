use crate::gateway::GatewayError;

/// Why a collection operation or one of its mutations failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// The id does not resolve in the view, or the Gateway reported the row gone.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i32 },

    #[error("{kind} {id} already exists")]
    DuplicateKey { kind: &'static str, id: i32 },

    /// Inserts must carry a negative provisional id.
    #[error("{kind} id {id} is not a provisional id")]
    NotProvisional { kind: &'static str, id: i32 },

    /// The insert this mutation depends on never reached the server.
    #[error("{kind} {id} was never created on the server")]
    Unconfirmed { kind: &'static str, id: i32 },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("mutation task ended without reporting a result")]
    Dropped,
}

impl CollectionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
