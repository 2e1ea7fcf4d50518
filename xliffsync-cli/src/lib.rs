//! CLI library for testing purposes

pub mod config;
pub mod format;
pub mod refresh;
pub mod status;
pub mod workspace;

pub use config::load_settings;
pub use workspace::{Workspace, sanitize_file_name};
