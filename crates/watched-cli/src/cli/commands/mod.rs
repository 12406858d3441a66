//! CLI command handlers. Each command is in its own file.

mod config;
mod session;
mod url;

pub use config::run_config;
pub use session::run_actions;
pub use url::run_url;
