pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{StdinPrompt, SystemRunner};
// test doubles, public so tests/ can drive a session without git or docker
pub use adapters::{RecordingRunner, ScriptedPrompt};
pub use config::toml_config::ToolConfig;
pub use core::{executor::Executor, session::GitCleanSession};
pub use domain::model::RepoLayout;
pub use utils::error::{CleanError, Result};
