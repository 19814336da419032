//! Render error model.
//!
//! | Variant | Raised by | Effect on `execute` |
//! |---|---|---|
//! | `UnimplementedDirective` | base dialect | fatal, returned to the caller |
//! | `Directive` | custom dialects | fatal, returned to the caller |
//! | `Evaluation` | script evaluator | recovered, sent to the error hook |
//! | `Timeout` | engine, when `script_timeout_ms` is set | recovered, sent to the error hook |
//! | `Sink` | output sink | recovered, sent to the error hook |
//!
//! The lexer has no error type: it never fails.

use crate::token::Token;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The active dialect has no handler for this directive kind.
    #[error("{directive} directive at line {line} is not implemented by this dialect")]
    UnimplementedDirective { directive: Token, line: usize },

    /// A dialect handler rejected its directive.
    #[error("{directive} directive at line {line}: {message}")]
    Directive {
        directive: Token,
        line: usize,
        message: String,
    },

    /// A SCRIPT directive failed to evaluate.
    #[error("script in template '{template}' at line {line} failed: {source}")]
    Evaluation {
        template: String,
        line: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A SCRIPT directive did not settle in time.
    #[error("script at line {line} did not settle within {after_ms} ms")]
    Timeout { line: usize, after_ms: u64 },

    /// Writing the compiled output to the sink failed.
    #[error("output sink failed: {0}")]
    Sink(#[from] std::io::Error),
}

impl TemplateError {
    /// Faults that abort the current pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TemplateError::UnimplementedDirective { .. } | TemplateError::Directive { .. }
        )
    }

    /// Source line the fault points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            TemplateError::UnimplementedDirective { line, .. }
            | TemplateError::Directive { line, .. }
            | TemplateError::Evaluation { line, .. }
            | TemplateError::Timeout { line, .. } => Some(*line),
            TemplateError::Sink(_) => None,
        }
    }
}
