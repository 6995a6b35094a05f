//! UI module for todosync
//!
//! A two-pane terminal view over the sync collections: projects on the left,
//! the selected project's todos on the right. Every edit goes straight into
//! the collections, so the screen reflects it before the server answers.

pub mod app;
pub mod components;
pub mod events;
pub mod layout;
pub mod renderer;

pub use app::App;
pub use events::handle_events;
pub use layout::LayoutManager;
pub use renderer::run_app;
