//! Token Model
//!
//! The closed set of directive kinds the lexer can classify template text
//! into, plus the end-of-input marker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a span of template source.
///
/// The comment on each variant shows the delimiters that open (and close)
/// the directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Token {
    /// End of input.
    Eof,
    /// Literal text outside any directive.
    Plain,
    /// `%{ ... }%` or `{% ... %}`
    Script,
    /// `${ ... }`
    Expr,
    /// `#{ ... }`
    StartTag,
    /// `#{/ ... }`, or the `/}` shortcut inside a start tag
    EndTag,
    /// `&{ ... }`
    Message,
    /// `@{ ... }`
    Action,
    /// `@@{ ... }`
    AbsAction,
    /// `*{ ... }*`
    Comment,
}

impl Token {
    /// Stable upper-case name, as used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Token::Eof => "EOF",
            Token::Plain => "PLAIN",
            Token::Script => "SCRIPT",
            Token::Expr => "EXPR",
            Token::StartTag => "START_TAG",
            Token::EndTag => "END_TAG",
            Token::Message => "MESSAGE",
            Token::Action => "ACTION",
            Token::AbsAction => "ABS_ACTION",
            Token::Comment => "COMMENT",
        }
    }

    /// Directives whose body may contain balanced `{` / `}` pairs.
    pub fn is_nesting_aware(self) -> bool {
        matches!(self, Token::Expr | Token::StartTag)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
