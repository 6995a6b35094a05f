//! Reusable UI components

pub mod dialogs;
pub mod projects_list;
pub mod status_bar;
pub mod todos_list;

pub use dialogs::{InputDialog, LogsDialog};
pub use projects_list::ProjectsList;
pub use status_bar::StatusBar;
pub use todos_list::TodosList;
