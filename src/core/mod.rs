pub mod bfg;
pub mod checklist;
pub mod dependencies;
pub mod executor;
pub mod filter_repo;
pub mod gitleaks;
pub mod head_cleaner;
pub mod history;
pub mod session;
pub mod workspace;

pub use crate::domain::model::{CommandOutcome, CommandSpec, Finding, RepoLayout};
pub use crate::domain::ports::{CommandRunner, Prompt};
pub use crate::utils::error::Result;
