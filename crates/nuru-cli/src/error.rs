use nuru_types::SyntaxErrors;
use rustyline::error::ReadlineError;
use std::fmt::Write as _;
use thiserror::Error;

/// Failures of the `nuru` command itself, as opposed to errors raised by
/// the Nuru program being run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("'{0}' sii faili sahihi. Tumia faili la '.nr' au '.sw'")]
    InvalidExtension(String),

    #[error("Nuru imeshindwa kusoma faili: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", render_syntax_errors(.0))]
    Syntax(SyntaxErrors),

    #[error("Readline error: {source}")]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// The same layout the test runner uses for a file that does not parse.
fn render_syntax_errors(errors: &SyntaxErrors) -> String {
    let mut out = String::from("Kuna Makosa Yafuatayo:");
    for err in errors.iter() {
        let _ = write!(out, "\n\t{err}");
    }
    out
}
