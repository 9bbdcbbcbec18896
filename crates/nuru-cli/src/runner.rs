//! Running whole `.nr`/`.sw` files.

use crate::error::CliError;
use nuru_eval::{EvalConfig, Evaluator, Environment, RuntimeError, Value};
use nuru_parser::parse_source;
use nuru_types::SourceFile;
use std::path::Path;
use tracing::debug;

const EXTENSIONS: [&str; 2] = ["nr", "sw"];

pub fn has_valid_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Read a Nuru source file, rejecting anything without a Nuru extension.
pub fn read_source(path: &Path) -> Result<String, CliError> {
    let display = path.display().to_string();
    if !has_valid_extension(path) {
        return Err(CliError::InvalidExtension(display));
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: display,
        source,
    })
}

/// What a program printed and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output: Vec<String>,
    pub error: Option<RuntimeError>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse and evaluate `source` in a fresh environment.
///
/// Syntax errors are returned as [`CliError::Syntax`] and nothing runs.
pub fn run_source(source: &str, file_name: &str, config: EvalConfig) -> Result<RunReport, CliError> {
    let source_file = SourceFile::new(file_name, source);
    let program = parse_source(&source_file)
        .into_program()
        .map_err(CliError::Syntax)?;

    let mut evaluator = Evaluator::new(config);
    let error = match evaluator.eval_program(&program, &Environment::new()) {
        Value::Error(err) => Some(err),
        _ => None,
    };
    debug!(file = file_name, failed = error.is_some(), "program finished");

    Ok(RunReport {
        output: evaluator.take_output(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert!(has_valid_extension(Path::new("hello.nr")));
        assert!(has_valid_extension(Path::new("dir/hello.sw")));
        assert!(!has_valid_extension(Path::new("hello.txt")));
        assert!(!has_valid_extension(Path::new("hello")));
        assert!(!has_valid_extension(Path::new("nr")));
    }
}
