//! Remote Store: the relational tables behind the Gateway.
//!
//! One table per entity (projects, todos) with autoincrement integer keys,
//! a `created_at` stamped at insert, and a cascading foreign key from
//! `todos.project_id` to `projects.id`.

pub mod db;

pub use db::Store;
