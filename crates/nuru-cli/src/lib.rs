//! Library side of the `nuru` command.
//!
//! The binary in `main.rs` only parses arguments and sets up logging;
//! running files, running tests and the interactive session live here.

pub mod error;
pub mod repl;
pub mod runner;

pub use error::CliError;
pub use repl::{LineOutcome, ReplConfig, ReplSession, Session};
pub use runner::{has_valid_extension, read_source, run_source, RunReport};
