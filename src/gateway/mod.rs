//! Remote Procedure Gateway.
//!
//! Stateless procedures, one per (entity, operation) pair, that validate
//! their input and run it against the [`Store`]. [`http`] exposes them as
//! JSON endpoints; [`crate::client::LocalClient`] calls them in-process.
//!
//! `update` and `delete` report [`GatewayError::NotFound`] when no row
//! matches, which includes rows already removed by a cascading delete.

pub mod error;
pub mod http;
pub mod projects;
pub mod todos;
pub mod validate;

pub use error::{ErrorBody, GatewayError, GatewayResult};

use sea_orm::DbErr;

use crate::storage::Store;

/// Procedure host bound to one store.
#[derive(Clone, Debug)]
pub struct Gateway {
    store: Store,
}

impl Gateway {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// True when an update matched no row (deleted between read and write).
fn is_record_not_updated(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<DbErr>(), Some(DbErr::RecordNotUpdated))
}
