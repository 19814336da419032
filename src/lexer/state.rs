//! Lexer transition table.
//!
//! The whole state machine lives in [`step`]: given the current
//! `{mode, depth}` pair and a three-byte lookahead window, it either keeps
//! accumulating or reports a delimiter. Every delimiter byte is ASCII, so
//! scanning bytes never splits a UTF-8 sequence at a reported boundary.

use crate::token::Token;

/// Lexical mode plus the brace-nesting depth used inside `EXPR` and
/// `START_TAG` bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexState {
    pub mode: Token,
    pub depth: u32,
}

impl LexState {
    pub const INITIAL: LexState = LexState {
        mode: Token::Plain,
        depth: 0,
    };

    /// Fresh state for `mode` with the nesting counter cleared.
    pub const fn enter(mode: Token) -> Self {
        Self { mode, depth: 0 }
    }
}

impl Default for LexState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Outcome of feeding one byte to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The byte belongs to the current span.
    Continue(LexState),
    /// A delimiter of `skip` bytes starts at the current byte; the lexer
    /// completes the current span and switches to `next`.
    Transition { next: LexState, skip: usize },
}

fn open(mode: Token, skip: usize) -> Step {
    Step::Transition {
        next: LexState::enter(mode),
        skip,
    }
}

fn close(skip: usize) -> Step {
    open(Token::Plain, skip)
}

/// Advance the state machine by one byte.
///
/// `c1` and `c2` are the next two bytes of input, if any.
pub fn step(state: LexState, c: u8, c1: Option<u8>, c2: Option<u8>) -> Step {
    match state.mode {
        Token::Plain => match (c, c1, c2) {
            (b'%', Some(b'{'), _) | (b'{', Some(b'%'), _) => open(Token::Script, 2),
            (b'$', Some(b'{'), _) => open(Token::Expr, 2),
            (b'#', Some(b'{'), Some(b'/')) => open(Token::EndTag, 3),
            (b'#', Some(b'{'), _) => open(Token::StartTag, 2),
            (b'&', Some(b'{'), _) => open(Token::Message, 2),
            (b'@', Some(b'@'), Some(b'{')) => open(Token::AbsAction, 3),
            (b'@', Some(b'{'), _) => open(Token::Action, 2),
            (b'*', Some(b'{'), _) => open(Token::Comment, 2),
            _ => Step::Continue(state),
        },

        Token::Script => match (c, c1) {
            (b'}', Some(b'%')) | (b'%', Some(b'}')) => close(2),
            _ => Step::Continue(state),
        },

        Token::Comment => match (c, c1) {
            (b'}', Some(b'*')) => close(2),
            _ => Step::Continue(state),
        },

        Token::Eof => Step::Continue(state),

        mode if mode.is_nesting_aware() => {
            if c == b'}' && state.depth == 0 {
                return close(1);
            }
            // Self-closing `/}`: skip the slash, the END_TAG body is empty
            // and its `}` closes it on the next byte.
            if mode == Token::StartTag && c == b'/' && c1 == Some(b'}') {
                return open(Token::EndTag, 1);
            }
            Step::Continue(nest(state, c))
        }

        // END_TAG, MESSAGE, ACTION, ABS_ACTION: the first `}` closes.
        _ => {
            if c == b'}' {
                close(1)
            } else {
                Step::Continue(state)
            }
        }
    }
}

fn nest(state: LexState, c: u8) -> LexState {
    match c {
        b'{' => LexState {
            depth: state.depth + 1,
            ..state
        },
        b'}' => LexState {
            depth: state.depth.saturating_sub(1),
            ..state
        },
        _ => state,
    }
}
