//! Script Evaluator capability
//!
//! The engine does not interpret any scripting language. Each SCRIPT
//! directive is handed to a [`ScriptEvaluator`], which gets the directive's
//! code and a [`ScriptContext`] that can append to the page, read the scope
//! bindings and reach the request/response streams.
//!
//! Implementations might wrap an embedded interpreter, a restricted
//! expression grammar, or a stub in tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::compiler::RenderState;

/// Named variable bindings visible to directive evaluation. Read-only
/// from the engine's side.
pub type Scope = BTreeMap<String, serde_json::Value>;

/// Request body handed to a render pass.
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Destination for the compiled output.
pub type OutputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Optional I/O handles of one render pass.
#[derive(Default)]
pub struct RenderIo {
    pub input: Option<InputStream>,
    pub output: Option<OutputSink>,
}

/// Evaluates the body of one SCRIPT directive.
///
/// The returned future must not resolve before every piece of work the
/// script started has finished: the engine awaits it before scanning on,
/// which is what keeps directive output in document order.
///
/// A rejected evaluation is reported through the error hook and the render
/// continues with the next token.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        code: &str,
        ctx: &mut ScriptContext<'_>,
    ) -> anyhow::Result<serde_json::Value>;
}

/// What a script can see and do while it runs.
pub struct ScriptContext<'a> {
    state: &'a mut RenderState,
    io: &'a mut RenderIo,
    template: &'a str,
    line: usize,
}

impl<'a> ScriptContext<'a> {
    pub fn new(
        state: &'a mut RenderState,
        io: &'a mut RenderIo,
        template: &'a str,
        line: usize,
    ) -> Self {
        Self {
            state,
            io,
            template,
            line,
        }
    }

    /// Append text exactly as literal template text would be: onto the
    /// page, or into the innermost tag body while one is being captured.
    pub fn append(&mut self, text: &str) {
        self.state.plain(text);
    }

    /// Append text followed by a line break.
    pub fn append_line(&mut self, text: &str) {
        self.state.plain_line(text);
    }

    pub fn scope(&self) -> &Scope {
        self.state.scope()
    }

    pub fn input(&mut self) -> Option<&mut InputStream> {
        self.io.input.as_mut()
    }

    pub fn output(&mut self) -> Option<&mut OutputSink> {
        self.io.output.as_mut()
    }

    /// Ask the engine to stop producing output. See
    /// [`RenderState::request_exit`].
    pub fn request_exit(&mut self) {
        self.state.request_exit();
    }

    pub fn template_name(&self) -> &str {
        self.template
    }

    /// Source line on which the script starts.
    pub fn line(&self) -> usize {
        self.line
    }
}
