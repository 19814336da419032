//! play-template: template lexer and execution engine
//!
//! Templates mix literal text with delimited directives:
//!
//! | Directive | Syntax |
//! |---|---|
//! | script | `%{ ... }%` or `{% ... %}` |
//! | expression | `${ ... }` |
//! | tag | `#{ ... }` ... `#{/ ... }`, or `#{ ... /}` |
//! | message | `&{ ... }` |
//! | action | `@{ ... }`, absolute `@@{ ... }` |
//! | comment | `*{ ... }*` |
//!
//! Key pieces:
//! - [`Lexer`] - pull-based scanner producing `(Token, Span)` pairs
//! - [`PageCompiler`] - drives the lexer, runs scripts in document order,
//!   buffers output and records the output-to-source line table
//! - [`ScriptEvaluator`] - the pluggable capability that runs script bodies
//! - [`Dialect`] - handlers for expression, message, action and tag directives
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use play_template::{BaseTemplate, ExecuteRequest, PageCompiler, ScriptContext, ScriptEvaluator};
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl ScriptEvaluator for Shout {
//!     async fn evaluate(
//!         &self,
//!         code: &str,
//!         ctx: &mut ScriptContext<'_>,
//!     ) -> anyhow::Result<serde_json::Value> {
//!         ctx.append(&code.to_uppercase());
//!         Ok(serde_json::Value::Null)
//!     }
//! }
//!
//! # async fn run() -> Result<(), play_template::TemplateError> {
//! let compiler = PageCompiler::new(Arc::new(Shout));
//! let mut template = BaseTemplate::new("Hello %{ world }%!");
//! let page = compiler.execute(ExecuteRequest::new(&mut template)).await?;
//! assert_eq!(page, "Hello WORLD!");
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod dialect;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod response;
pub mod template;
pub mod token;

pub use compiler::{ErrorHook, ExecuteRequest, PageCompiler, RenderState};
pub use config::{CompilerConfig, ExitPolicy};
pub use dialect::{BaseDialect, Dialect, Directive};
pub use error::TemplateError;
pub use evaluator::{InputStream, OutputSink, RenderIo, ScriptContext, ScriptEvaluator, Scope};
pub use lexer::{Lexer, Span};
pub use response::StringResponse;
pub use template::{BaseTemplate, TemplateSnapshot};
pub use token::Token;
