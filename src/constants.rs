//! Constants used throughout the application
//!
//! This module centralizes limits, defaults, UI text, and other constant values.

// Field limits enforced by the Gateway
pub const PROJECT_NAME_MAX_LEN: usize = 255;
pub const TODO_TEXT_MAX_LEN: usize = 500;

// Defaults
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todosync.db?mode=rwc";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_PROJECT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_TODO_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Polling faster than this only hammers the server
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

// Config file locations
pub const CONFIG_FILE_NAME: &str = "todosync.toml";
pub const CONFIG_DIR_NAME: &str = "todosync";

// Success Messages
pub const SUCCESS_PROJECT_CREATED: &str = "✅ Project created";
pub const SUCCESS_PROJECT_UPDATED: &str = "✅ Project updated";
pub const SUCCESS_PROJECT_DELETED: &str = "✅ Project deleted";
pub const SUCCESS_TODO_CREATED: &str = "✅ Todo created";
pub const SUCCESS_TODO_UPDATED: &str = "✅ Todo updated";
pub const SUCCESS_TODO_DELETED: &str = "✅ Todo deleted";
pub const SUCCESS_SYNCED: &str = "✅ Synced";

// Error Messages
pub const ERROR_PROJECT_NOT_FOUND: &str = "❌ Project not found";
pub const ERROR_PROJECT_SYNCING: &str = "⏳ Project is still syncing, try again in a moment";
pub const ERROR_NO_PROJECT_SELECTED: &str = "❌ Select a project first";
pub const ERROR_EMPTY_INPUT: &str = "❌ Input cannot be empty";
pub const ERROR_MUTATION_FAILED: &str = "❌ Server rejected change";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const DIALOG_TITLE_DEBUG_LOGS: &str = "🔍 Logs - Press 'Esc', 'G' or 'q' to close";
pub const HELP_NORMAL: &str = "j/k move • Tab pane • a add • e edit • d description • Space toggle • x delete • r refresh • G logs • q quit";
pub const HELP_INPUT: &str = "Enter save • Esc cancel";
pub const EMPTY_PROJECTS: &str = "No projects yet. Press 'a' to add one.";
pub const EMPTY_TODOS: &str = "No todos. Press 'a' to add one.";

// UI Layout Constants
/// Minimum sidebar width in columns
pub const SIDEBAR_MIN_WIDTH: u16 = 15;
/// Maximum sidebar width in columns
pub const SIDEBAR_MAX_WIDTH: u16 = 50;
/// Default sidebar width in columns
pub const SIDEBAR_DEFAULT_WIDTH: u16 = 30;
/// Keep at most this many log lines in memory
pub const LOG_BUFFER_CAPACITY: usize = 500;
