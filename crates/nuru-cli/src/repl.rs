//! Interactive session.
//!
//! [`Session`] holds the evaluator and the environment that persists across
//! lines; [`ReplSession`] wraps it with a rustyline editor and history.

use crate::error::CliError;
use nuru_eval::{Env, EvalConfig, Evaluator, Environment, Value};
use nuru_lexer::{Lexer, TokenKind};
use nuru_parser::parse_source;
use nuru_types::{SourceFile, SyntaxErrors};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::debug;

const EXIT_COMMANDS: [&str; 2] = ["toka()", "exit()"];
const CONTINUATION_PROMPT: &str = "... ";

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Where line history is loaded from and saved to. `None` disables it.
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            history_file: Some(PathBuf::from(".nuru_history")),
        }
    }
}

/// Result of evaluating one chunk of input.
#[derive(Debug, Clone)]
pub enum LineOutcome {
    Empty,
    Exit,
    /// Printed lines, followed by the value if it is worth showing.
    Evaluated {
        output: Vec<String>,
        value: Option<Value>,
    },
    Syntax(SyntaxErrors),
}

/// Evaluator state shared by every line of a session.
pub struct Session {
    evaluator: Evaluator,
    env: Env,
    counter: usize,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            env: Environment::new(),
            counter: 0,
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn eval_line(&mut self, line: &str) -> LineOutcome {
        let input = line.trim();
        if input.is_empty() {
            return LineOutcome::Empty;
        }
        if EXIT_COMMANDS.contains(&input) {
            return LineOutcome::Exit;
        }

        self.counter += 1;
        let source_file = SourceFile::new(format!("<mstari {}>", self.counter), input);
        let program = match parse_source(&source_file).into_program() {
            Ok(program) => program,
            Err(errors) => return LineOutcome::Syntax(errors),
        };

        let value = self.evaluator.eval_program(&program, &self.env);
        let output = self.evaluator.take_output();
        let value = match value {
            Value::Null => None,
            value => Some(value),
        };
        LineOutcome::Evaluated { output, value }
    }
}

/// Whether `input` closes every `{` and `(` it opens.
pub fn is_input_complete(input: &str) -> bool {
    let source_file = SourceFile::new("<repl>", input);
    let mut depth = 0i32;
    for token in Lexer::new(&source_file).lex().tokens {
        match token.kind {
            TokenKind::LBrace | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RParen => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

pub struct ReplSession {
    editor: DefaultEditor,
    session: Session,
    config: ReplConfig,
}

impl ReplSession {
    pub fn new(config: ReplConfig, eval_config: EvalConfig) -> Result<Self, CliError> {
        let mut editor = DefaultEditor::new()?;
        if let Some(history) = &config.history_file {
            // A missing history file is normal for a first session.
            let _ = editor.load_history(history);
        }
        Ok(Self {
            editor,
            session: Session::new(eval_config),
            config,
        })
    }

    pub fn run(&mut self) -> Result<(), CliError> {
        println!("Karibu Nuru v{}", env!("CARGO_PKG_VERSION"));
        println!("Tumia exit() au toka() kuondoka");

        while let Some(input) = self.read_input()? {
            match self.session.eval_line(&input) {
                LineOutcome::Empty => {}
                LineOutcome::Exit => break,
                LineOutcome::Evaluated { output, value } => {
                    for line in output {
                        println!("{line}");
                    }
                    if let Some(value) = value {
                        println!("{value}");
                    }
                }
                LineOutcome::Syntax(errors) => println!("{}", CliError::Syntax(errors)),
            }
        }

        println!("Kwaheri!");
        self.save_history();
        Ok(())
    }

    /// Read until braces and parentheses balance. `None` on end of input.
    fn read_input(&mut self) -> Result<Option<String>, CliError> {
        let mut input = String::new();
        loop {
            let prompt = if input.is_empty() {
                self.config.prompt.as_str()
            } else {
                CONTINUATION_PROMPT
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !input.is_empty() {
                        input.push('\n');
                    }
                    input.push_str(&line);
                    if is_input_complete(&input) {
                        if !input.trim().is_empty() {
                            self.editor.add_history_entry(input.as_str())?;
                        }
                        return Ok(Some(input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn save_history(&mut self) {
        if let Some(history) = &self.config.history_file {
            if let Err(err) = self.editor.save_history(history) {
                debug!(error = %err, "could not save history");
            }
        }
    }
}
