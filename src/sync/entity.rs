use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::gateway::GatewayResult;

/// A row type a [`super::Collection`] can mirror.
pub trait SyncEntity: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Field-level change set. Sent to the Gateway as the update body and
    /// replayed over fresh snapshots until the update is reflected in one.
    type Patch: Clone + Debug + Send + Sync + 'static;

    /// Entity name used in log lines and errors.
    const KIND: &'static str;

    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn created_at(&self) -> DateTime<Utc>;

    /// Fields that differ between `before` and `after`, or `None` when nothing changed.
    fn diff(before: &Self, after: &Self) -> Option<Self::Patch>;

    fn apply(&mut self, patch: &Self::Patch);
}

/// The Gateway procedures one collection needs.
#[async_trait]
pub trait Remote<E: SyncEntity>: Send + Sync {
    async fn fetch_all(&self) -> GatewayResult<Vec<E>>;
    async fn create(&self, entity: &E) -> GatewayResult<E>;
    async fn update(&self, id: i32, patch: &E::Patch) -> GatewayResult<E>;
    async fn delete(&self, id: i32) -> GatewayResult<E>;
}
