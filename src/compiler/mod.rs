//! Execution Engine
//!
//! `PageCompiler::execute` drives the lexer over a template, dispatches
//! every token and writes the result back onto the template record.
//!
//! ```text
//! Scanning ──token──▶ Dispatching ──▶ Scanning
//!     │                    │ (fatal dialect fault)
//!     │ EOF                ▼
//!     ▼                 Halted
//!   Done: dialect end → flush to sink → store on template
//! ```
//!
//! Directives run strictly in document order. The only suspension point is
//! a SCRIPT evaluation, which is awaited in full before the next token is
//! scanned. A failed evaluation is reported to the error hook and the render
//! carries on; a directive the dialect does not implement aborts it.

mod state;

pub use state::RenderState;

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{CompilerConfig, ExitPolicy};
use crate::dialect::{BaseDialect, Dialect, Directive};
use crate::error::TemplateError;
use crate::evaluator::{InputStream, OutputSink, RenderIo, ScriptContext, ScriptEvaluator, Scope};
use crate::lexer::Lexer;
use crate::template::BaseTemplate;
use crate::token::Token;

/// Receives recovered faults (failed scripts, sink errors) during a pass.
pub type ErrorHook<'a> = Box<dyn FnMut(&TemplateError) + Send + 'a>;

// ---------------------------------------------------------------------------
// ExecuteRequest
// ---------------------------------------------------------------------------

/// Inputs of one render pass.
pub struct ExecuteRequest<'a> {
    template: &'a mut BaseTemplate,
    input: Option<InputStream>,
    output: Option<OutputSink>,
    on_error: Option<ErrorHook<'a>>,
}

impl<'a> ExecuteRequest<'a> {
    pub fn new(template: &'a mut BaseTemplate) -> Self {
        Self {
            template,
            input: None,
            output: None,
            on_error: None,
        }
    }

    /// Request body made available to scripts.
    pub fn with_input(mut self, input: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Sink that receives the compiled output at `EOF` and is then shut down.
    pub fn with_output(mut self, output: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Called once per recovered fault.
    pub fn on_error(mut self, hook: impl FnMut(&TemplateError) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

// ---------------------------------------------------------------------------
// PageCompiler
// ---------------------------------------------------------------------------

/// Renders templates. Holds no per-pass state, so one compiler can serve
/// any number of passes, concurrently if the templates differ.
pub struct PageCompiler {
    evaluator: Arc<dyn ScriptEvaluator>,
    dialect: Arc<dyn Dialect>,
    scope: Arc<Scope>,
    config: CompilerConfig,
}

impl PageCompiler {
    pub fn new(evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        Self {
            evaluator,
            dialect: Arc::new(BaseDialect),
            scope: Arc::new(Scope::new()),
            config: CompilerConfig::default(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Arc::new(scope);
        self
    }

    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Render `request.template`.
    ///
    /// Returns the compiled output, which is also stored on the template.
    /// Only a fatal dialect fault makes this fail; the partial output up to
    /// that point is still stored on the template.
    #[instrument(skip_all, fields(template = %request.template.name))]
    pub async fn execute(&self, request: ExecuteRequest<'_>) -> Result<String, TemplateError> {
        let ExecuteRequest {
            template,
            input,
            output,
            on_error,
        } = request;
        let BaseTemplate {
            name,
            source,
            compiled_output,
            line_map,
            ..
        } = template;

        let mut pass = Pass {
            lexer: Lexer::new(source),
            state: RenderState::new(self.scope.clone(), self.config.line_marker.as_str()),
            io: RenderIo { input, output },
            template: name,
            on_error,
        };

        let outcome = self.run(&mut pass).await;
        if outcome.is_ok() {
            pass.flush().await;
        }

        let Pass { state, .. } = pass;
        let (output, lines) = state.into_parts();
        *compiled_output = output.clone();
        *line_map = lines;

        match outcome {
            Ok(()) => {
                info!(
                    bytes = output.len(),
                    mapped_lines = line_map.len(),
                    "Template rendered"
                );
                Ok(output)
            }
            Err(err) => {
                error!(error = %err, "Template render aborted");
                Err(err)
            }
        }
    }

    async fn run(&self, pass: &mut Pass<'_>) -> Result<(), TemplateError> {
        self.dialect.head(&mut pass.state).await?;

        loop {
            if self.config.exit_policy == ExitPolicy::AbortScan && pass.state.is_exiting() {
                debug!("Exit requested, scanning stopped");
                break;
            }

            let token = pass.lexer.next_token();
            debug!(
                %token,
                line = pass.lexer.current_line(),
                len = pass.lexer.current_span().len(),
                "Dispatch"
            );

            match token {
                Token::Eof => break,
                Token::Plain => self.plain(pass),
                Token::Script => self.script(pass).await,
                Token::Comment => pass.state.request_line_break_skip(),
                _ => {
                    let directive = Directive::from_lexer(token, &pass.lexer);
                    self.directive(&directive, &mut pass.state).await?;
                }
            }
        }

        self.dialect.end(&mut pass.state).await
    }

    fn plain(&self, pass: &mut Pass<'_>) {
        let mut text = pass.lexer.current_text();
        if pass.state.take_skip_line_break() && self.config.swallow_comment_line_break {
            text = strip_leading_line_break(text);
        }
        pass.state.plain(text);
    }

    async fn script(&self, pass: &mut Pass<'_>) {
        let template = pass.template;
        let line = pass.lexer.current_line();
        let code = script_body(pass.lexer.current_text(), self.config.strip_script_tags);

        let mut ctx = ScriptContext::new(&mut pass.state, &mut pass.io, template, line);
        let evaluation = self.evaluator.evaluate(code, &mut ctx);
        let failed = |source| TemplateError::Evaluation {
            template: template.to_string(),
            line,
            source,
        };

        let result = match self.config.script_timeout() {
            Some(limit) => match tokio::time::timeout(limit, evaluation).await {
                Ok(result) => result.map_err(failed),
                Err(_) => Err(TemplateError::Timeout {
                    line,
                    after_ms: limit.as_millis() as u64,
                }),
            },
            None => evaluation.await.map_err(failed),
        };

        match result {
            Ok(value) => debug!(line, ?value, "Script settled"),
            Err(err) => pass.report(err),
        }
    }

    async fn directive(
        &self,
        directive: &Directive<'_>,
        state: &mut RenderState,
    ) -> Result<(), TemplateError> {
        match directive.token {
            Token::Expr => self.dialect.expr(directive, state).await,
            Token::Message => self.dialect.message(directive, state).await,
            Token::Action => self.dialect.action(directive, state, false).await,
            Token::AbsAction => self.dialect.action(directive, state, true).await,
            Token::StartTag => self.dialect.start_tag(directive, state).await,
            Token::EndTag => self.dialect.end_tag(directive, state).await,
            Token::Eof | Token::Plain | Token::Script | Token::Comment => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// State owned by one `execute` call.
struct Pass<'a> {
    lexer: Lexer<'a>,
    state: RenderState,
    io: RenderIo,
    template: &'a str,
    on_error: Option<ErrorHook<'a>>,
}

impl Pass<'_> {
    fn report(&mut self, err: TemplateError) {
        match self.on_error.as_mut() {
            Some(hook) => {
                warn!(error = %err, "Recovered render fault");
                hook(&err);
            }
            None => error!(error = %err, "Render fault (no error hook)"),
        }
    }

    /// Write the page to the sink, if any, and end it.
    async fn flush(&mut self) {
        let Some(sink) = self.io.output.as_mut() else {
            return;
        };
        let page = self.state.output().as_bytes();
        let written = match sink.write_all(page).await {
            Ok(()) => sink.shutdown().await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            self.report(TemplateError::Sink(err));
        }
    }
}

/// Body of a SCRIPT directive as handed to the evaluator.
fn script_body(text: &str, strip_tags: bool) -> &str {
    if !strip_tags {
        return text;
    }
    let mut code = text.trim();
    if let Some(rest) = code.strip_prefix("<script>") {
        code = rest;
    }
    if let Some(rest) = code.strip_suffix("</script>") {
        code = rest;
    }
    code
}

fn strip_leading_line_break(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}
