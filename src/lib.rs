//! todosync - a multi-project todo list with optimistic client-side sync
//!
//! Projects hold todos; both live in a SQLite store behind a small set of
//! typed remote procedures. Clients mirror each table in a sync collection
//! that applies edits locally at once, forwards them to the server, and
//! reconciles with periodic refetches.
//!
//! # Modules
//!
//! * [`storage`] and [`repositories`] - the SQLite store and its per-table operations
//! * [`gateway`] - the remote procedures and their HTTP surface
//! * [`client`] - typed Gateway clients, in-process and over HTTP
//! * [`sync`] - the optimistic sync collections
//! * [`ui`] - terminal user interface
//! * [`config`] and [`logger`] - application plumbing

/// Gateway clients used by the sync layer
pub mod client;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Remote procedures over the store
pub mod gateway;

/// Logging setup and the in-memory log buffer
pub mod logger;

/// Wire types shared by the Gateway and its clients
pub mod models;

/// Repository layer for database operations
pub mod repositories;

/// SQLite store
pub mod storage;

/// Optimistic client-side synchronization
pub mod sync;

/// Terminal user interface components and rendering
pub mod ui;

pub use models::{Project, Todo};
