// Adapters layer: concrete implementations of the domain ports.
// `process` and `terminal` back the binary; `scripted` holds the test doubles
// the integration tests under tests/ drive sessions with.

pub mod process;
pub mod scripted;
pub mod terminal;

pub use process::SystemRunner;
pub use scripted::{RecordingRunner, ScriptedPrompt};
pub use terminal::StdinPrompt;
