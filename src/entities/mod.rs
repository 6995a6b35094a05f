//! SeaORM entity models for the Remote Store tables.

pub mod project;
pub mod todo;

pub use project::Entity as Project;
pub use todo::Entity as Todo;
