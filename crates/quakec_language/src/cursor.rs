//! The seam between the parser and the lexer.
//!
//! The parser drives lexing through the [`TokenSource`] trait: it looks at
//! the current token, asks for the next one, and steers one piece of lexer
//! state, the `no_ops` flag. QuakeC lexing is context-sensitive in exactly
//! one place: a character sequence like `=` or `,` is an operator inside an
//! expression and plain punctuation everywhere else, and only the parser
//! knows which context it is in. The parser clears the flag immediately
//! after consuming an operand and sets it again after every operator and at
//! every expression boundary.
//!
//! [`TokenBuffer`] adapts an already-classified `Vec<Token>` to the trait for
//! callers that lex up front (and for tests).

use quakec_base::Interner;

use crate::token::{Token, TokenKind};

/// A stream of classified tokens.
///
/// A freshly constructed source is positioned on the first token. `advance`
/// takes the interner because a lazy lexer interns identifier and string
/// payloads as it classifies them; the parser owns the interner and threads
/// it through.
pub trait TokenSource {
    /// The current token. Stable until the next [`advance`](Self::advance).
    fn peek(&self) -> &Token;

    /// Moves to the next token. Returns `false` once the current token is
    /// end-of-input or a lexing error; `peek` then reports [`TokenKind::Eof`].
    fn advance(&mut self, interner: &mut Interner) -> bool;

    /// Sets the operator-suppression flag.
    ///
    /// While the flag is `true` the lexer must not produce
    /// [`TokenKind::Operator`] tokens; operator characters surface as
    /// punctuation instead.
    fn set_no_ops(&mut self, no_ops: bool);
}

/// A [`TokenSource`] over a pre-classified token vector.
///
/// The stream is fixed at construction, so the `no_ops` flag is recorded but
/// cannot change classification; the producer of the vector is responsible
/// for having classified operator characters for the position they appear in.
pub struct TokenBuffer {
    tokens: Vec<Token>,
    cursor: usize,
    eof: Token,
    no_ops: bool,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = Token::eof(tokens.last().map(|t| t.pos).unwrap_or_default());
        TokenBuffer {
            tokens,
            cursor: 0,
            eof,
            no_ops: true,
        }
    }

    /// The most recent `no_ops` setting the parser requested.
    ///
    /// The buffer cannot re-classify its tokens, but exposing the flag lets
    /// a caller that produced the stream verify the classification it chose
    /// matches the context the parser is in.
    pub fn no_ops(&self) -> bool {
        self.no_ops
    }
}

impl TokenSource for TokenBuffer {
    fn peek(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    fn advance(&mut self, _interner: &mut Interner) -> bool {
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        self.peek().kind != TokenKind::Eof
    }

    fn set_no_ops(&mut self, no_ops: bool) {
        self.no_ops = no_ops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakec_base::SourcePos;

    fn punct(c: char, line: u32) -> Token {
        Token::new(TokenKind::Punct(c), SourcePos::new(quakec_base::Symbol::EMPTY, line))
    }

    #[test]
    fn starts_on_first_token() {
        let mut interner = Interner::new();
        let mut buf = TokenBuffer::new(vec![punct(';', 1), punct('{', 2)]);
        assert!(buf.peek().is_punct(';'));
        assert!(buf.advance(&mut interner));
        assert!(buf.peek().is_punct('{'));
    }

    #[test]
    fn advance_reports_end_of_input() {
        let mut interner = Interner::new();
        let mut buf = TokenBuffer::new(vec![punct(';', 1)]);
        assert!(!buf.advance(&mut interner));
        assert_eq!(buf.peek().kind, TokenKind::Eof);
        assert!(!buf.advance(&mut interner));
    }

    #[test]
    fn eof_keeps_last_position() {
        let mut interner = Interner::new();
        let mut buf = TokenBuffer::new(vec![punct(';', 9)]);
        buf.advance(&mut interner);
        assert_eq!(buf.peek().pos.line, 9);
    }

    #[test]
    fn empty_buffer_is_immediately_eof() {
        let buf = TokenBuffer::new(Vec::new());
        assert_eq!(buf.peek().kind, TokenKind::Eof);
    }

    #[test]
    fn the_no_ops_flag_is_recorded() {
        let mut buf = TokenBuffer::new(Vec::new());
        assert!(buf.no_ops());
        buf.set_no_ops(false);
        assert!(!buf.no_ops());
    }
}
