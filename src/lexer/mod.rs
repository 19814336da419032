//! Template Lexer
//!
//! Pull-based scanner that splits template source into classified spans.
//!
//! The lexer reports a span at the moment its *closing* delimiter is seen:
//! `next_token()` returns the mode that was active before the transition,
//! and `current_text()` returns the text accumulated in that mode. For
//! `"a%{b}%c"` the sequence is `PLAIN "a"`, `SCRIPT "b"`, `PLAIN "c"`, `EOF`.
//!
//! Two spans are tracked: the one currently accumulating (`begin..end`) and
//! the one most recently completed (`last`). The completed span always ends
//! at or before the start of the accumulating one.
//!
//! The lexer has no failure mode. An unterminated directive runs to the end
//! of input and is reported under its open mode, followed by `EOF`.

mod state;

pub use state::{step, LexState, Step};

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::token::Token;

/// Half-open byte range into the template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Scanner over a borrowed template source.
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    state: LexState,
    /// Start of the span currently accumulating.
    begin: usize,
    /// Scan cursor; the accumulating span is `begin..end`.
    end: usize,
    /// Most recently completed span.
    last: Span,
    /// 1-based line on which `last` starts.
    last_line: usize,
    /// Set once the iterator has yielded `EOF`.
    exhausted: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            state: LexState::INITIAL,
            begin: 0,
            end: 0,
            last: Span::default(),
            last_line: 1,
            exhausted: false,
        }
    }

    /// Rewind to the start of the source.
    pub fn reset(&mut self) {
        *self = Self::new(self.source);
    }

    /// Scan until the next delimiter (or end of input) and return the kind
    /// of the span that was just completed.
    ///
    /// Once input is exhausted every call returns [`Token::Eof`] with an
    /// empty span.
    pub fn next_token(&mut self) -> Token {
        let bytes = self.source.as_bytes();
        loop {
            let Some(&c) = bytes.get(self.end) else {
                return self.found(LexState::enter(Token::Eof), self.end, 0);
            };
            let c1 = bytes.get(self.end + 1).copied();
            let c2 = bytes.get(self.end + 2).copied();

            match step(self.state, c, c1, c2) {
                Step::Continue(next) => {
                    self.state = next;
                    self.end += 1;
                }
                Step::Transition { next, skip } => return self.found(next, self.end, skip),
            }
        }
    }

    /// Complete the span ending at `at`, skip `skip` delimiter bytes and
    /// switch to `next`. Returns the mode the completed span was scanned in.
    fn found(&mut self, next: LexState, at: usize, skip: usize) -> Token {
        let completed = Span::new(self.begin, at);
        self.last_line += count_newlines(&self.source[self.last.start..completed.start]);
        self.last = completed;

        self.begin = at + skip;
        self.end = self.begin;

        let mode = self.state.mode;
        self.state = next;
        mode
    }

    /// Text of the span returned by the most recent `next_token()`.
    pub fn current_text(&self) -> &'s str {
        &self.source[self.last.range()]
    }

    pub fn current_span(&self) -> Span {
        self.last
    }

    /// 1-based line number on which the current span starts.
    pub fn current_line(&self) -> usize {
        self.last_line
    }

    /// The character right after the current span, if any.
    ///
    /// For a directive this is the first character of its closing delimiter.
    pub fn peek_next_char(&self) -> Option<char> {
        self.source[self.last.end..].chars().next()
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = (Token, Span);

    /// Yields every completed span, `EOF` included, then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token == Token::Eof {
            self.exhausted = true;
        }
        Some((token, self.last))
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
