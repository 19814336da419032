//! Directive dialects
//!
//! EXPR, MESSAGE, ACTION, ABS_ACTION, START_TAG and END_TAG have no meaning
//! in the base engine. A [`Dialect`] gives them one; every handler it does
//! not override fails with [`TemplateError::UnimplementedDirective`], which
//! aborts the render.

use async_trait::async_trait;

use crate::compiler::RenderState;
use crate::error::TemplateError;
use crate::lexer::Lexer;
use crate::token::Token;

/// One directive as handed to a dialect handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'s> {
    pub token: Token,
    /// Body between the delimiters, untrimmed.
    pub text: &'s str,
    /// 1-based source line on which the body starts.
    pub line: usize,
    /// Character right after the body (first char of the closing delimiter).
    pub next_char: Option<char>,
}

impl<'s> Directive<'s> {
    /// Describe the span the lexer just returned.
    pub fn from_lexer(token: Token, lexer: &Lexer<'s>) -> Self {
        Self {
            token,
            text: lexer.current_text(),
            line: lexer.current_line(),
            next_char: lexer.peek_next_char(),
        }
    }

    pub fn unimplemented(&self) -> TemplateError {
        TemplateError::UnimplementedDirective {
            directive: self.token,
            line: self.line,
        }
    }

    /// Fatal fault raised by a dialect for this directive.
    pub fn fail(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Directive {
            directive: self.token,
            line: self.line,
            message: message.into(),
        }
    }
}

/// Handlers for the directive kinds the engine does not interpret itself.
///
/// Handlers write through the [`RenderState`]: `print` for output,
/// `open_tag`/`close_tag` to capture a tag body, `mark_line` to tie output
/// back to `directive.line`.
#[async_trait]
pub trait Dialect: Send + Sync {
    /// Called once before the first token.
    async fn head(&self, _state: &mut RenderState) -> Result<(), TemplateError> {
        Ok(())
    }

    /// Called once after `EOF`, before the output is flushed.
    async fn end(&self, _state: &mut RenderState) -> Result<(), TemplateError> {
        Ok(())
    }

    /// `${ ... }`
    async fn expr(
        &self,
        directive: &Directive<'_>,
        _state: &mut RenderState,
    ) -> Result<(), TemplateError> {
        Err(directive.unimplemented())
    }

    /// `&{ ... }`
    async fn message(
        &self,
        directive: &Directive<'_>,
        _state: &mut RenderState,
    ) -> Result<(), TemplateError> {
        Err(directive.unimplemented())
    }

    /// `@{ ... }`, or `@@{ ... }` when `absolute` is set.
    async fn action(
        &self,
        directive: &Directive<'_>,
        _state: &mut RenderState,
        _absolute: bool,
    ) -> Result<(), TemplateError> {
        Err(directive.unimplemented())
    }

    /// `#{ ... }`
    async fn start_tag(
        &self,
        directive: &Directive<'_>,
        _state: &mut RenderState,
    ) -> Result<(), TemplateError> {
        Err(directive.unimplemented())
    }

    /// `#{/ ... }` or the `/}` shortcut.
    async fn end_tag(
        &self,
        directive: &Directive<'_>,
        _state: &mut RenderState,
    ) -> Result<(), TemplateError> {
        Err(directive.unimplemented())
    }
}

/// Dialect with no directive support beyond SCRIPT and COMMENT.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseDialect;

impl Dialect for BaseDialect {}
