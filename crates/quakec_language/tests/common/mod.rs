#![allow(dead_code)]

//! Shared harness for the integration suites.
//!
//! [`SourceLexer`] is a small QuakeC lexer driving the parser through the
//! [`TokenSource`] seam. It is deliberately lazy: each `advance` classifies
//! one token, honoring the parser-controlled `no_ops` flag, because operator
//! characters are operators only inside expressions. The helpers below wire
//! lexer, interner, arenas, and parser together and keep the arena lifetimes
//! contained.

use quakec_base::{Interner, SourcePos, Symbol};
use quakec_language::cursor::TokenSource;
use quakec_language::{
    Arena, AstContext, ParseError, Parser, Program, Token, TokenKind, TypeKind, Vec3,
};

pub struct SourceLexer<'s> {
    src: &'s [u8],
    pos: usize,
    line: u32,
    file: Symbol,
    current: Token,
    no_ops: bool,
}

impl<'s> SourceLexer<'s> {
    pub fn new(source: &'s str, file: &str, interner: &mut Interner) -> Self {
        let file = interner.intern(file);
        let mut lexer = SourceLexer {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            file,
            current: Token::eof(SourcePos::new(file, 1)),
            no_ops: true,
        };
        lexer.current = lexer.lex(interner);
        lexer
    }

    fn here(&self) -> SourcePos {
        SourcePos::new(self.file, self.line)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.src.get(self.pos) {
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(c) if c.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.src.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(&c) = self.src.get(self.pos) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn lex(&mut self, interner: &mut Interner) -> Token {
        self.skip_trivia();
        let pos = self.here();
        let Some(&c) = self.src.get(self.pos) else {
            return Token::eof(pos);
        };
        if c.is_ascii_digit() {
            return self.lex_number(pos);
        }
        if c == b'"' {
            return self.lex_string(pos, interner);
        }
        if c == b'\'' {
            return self.lex_vector(pos);
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            return self.lex_word(pos, interner);
        }
        self.pos += 1;
        let ch = c as char;
        if !self.no_ops && matches!(ch, '+' | '-' | '*' | '/' | '=' | ',') {
            let mut buf = [0u8; 4];
            let spelling: &str = ch.encode_utf8(&mut buf);
            return Token::new(TokenKind::Operator(interner.intern(spelling)), pos);
        }
        Token::new(TokenKind::Punct(ch), pos)
    }

    fn lex_number(&mut self, pos: SourcePos) -> Token {
        let start = self.pos;
        let mut is_float = false;
        while let Some(&c) = self.src.get(self.pos) {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == b'.'
                && !is_float
                && self.src.get(self.pos + 1).is_some_and(|d| d.is_ascii_digit())
            {
                is_float = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        if is_float {
            Token::new(TokenKind::FloatConst(text.parse().unwrap()), pos)
        } else {
            Token::new(TokenKind::IntConst(text.parse().unwrap()), pos)
        }
    }

    fn lex_string(&mut self, pos: SourcePos, interner: &mut Interner) -> Token {
        self.pos += 1;
        let start = self.pos;
        while let Some(&c) = self.src.get(self.pos) {
            if c == b'"' {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        self.pos += 1;
        Token::new(TokenKind::StringConst(interner.intern(text)), pos)
    }

    fn lex_vector(&mut self, pos: SourcePos) -> Token {
        self.pos += 1;
        let start = self.pos;
        while let Some(&c) = self.src.get(self.pos) {
            if c == b'\'' {
                break;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        self.pos += 1;
        let mut parts = text.split_whitespace().map(|p| p.parse::<f32>().unwrap());
        let v = Vec3::new(
            parts.next().unwrap(),
            parts.next().unwrap(),
            parts.next().unwrap(),
        );
        Token::new(TokenKind::VectorConst(v), pos)
    }

    fn lex_word(&mut self, pos: SourcePos, interner: &mut Interner) -> Token {
        let start = self.pos;
        while let Some(&c) = self.src.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let kind = match text {
            "void" => TokenKind::Typename(TypeKind::Void),
            "float" => TokenKind::Typename(TypeKind::Float),
            "string" => TokenKind::Typename(TypeKind::String),
            "vector" => TokenKind::Typename(TypeKind::Vector),
            "entity" => TokenKind::Typename(TypeKind::Entity),
            "return" => TokenKind::Keyword(interner.intern(text)),
            _ => TokenKind::Ident(interner.intern(text)),
        };
        Token::new(kind, pos)
    }
}

impl TokenSource for SourceLexer<'_> {
    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self, interner: &mut Interner) -> bool {
        self.current = self.lex(interner);
        self.current.kind != TokenKind::Eof
    }

    fn set_no_ops(&mut self, no_ops: bool) {
        self.no_ops = no_ops;
    }
}

/// Parses `source` and hands the program plus interner to `check`.
///
/// Panics on parse errors; use [`parse_error`] for the failure paths.
pub fn with_program<R>(source: &str, check: impl FnOnce(&Program<'_>, &Interner) -> R) -> R {
    let mut interner = Interner::new();
    let values = Arena::new();
    let exprs = Arena::new();
    let blocks = Arena::new();
    let value_refs = Arena::new();
    let expr_refs = Arena::new();
    let ctx = AstContext::new(&values, &exprs, &blocks, &value_refs, &expr_refs);
    let lexer = SourceLexer::new(source, "test.qc", &mut interner);
    let program = Parser::new(lexer, &mut interner, ctx)
        .parse()
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
    check(&program, &interner)
}

/// Parses `source` expecting failure; returns the error.
pub fn parse_error(source: &str) -> ParseError {
    let mut interner = Interner::new();
    let values = Arena::new();
    let exprs = Arena::new();
    let blocks = Arena::new();
    let value_refs = Arena::new();
    let expr_refs = Arena::new();
    let ctx = AstContext::new(&values, &exprs, &blocks, &value_refs, &expr_refs);
    let lexer = SourceLexer::new(source, "test.qc", &mut interner);
    match Parser::new(lexer, &mut interner, ctx).parse() {
        Ok(_) => panic!("expected a parse error for: {source}"),
        Err(err) => err,
    }
}

/// Looks up a name that must already be interned.
pub fn sym(interner: &Interner, name: &str) -> Symbol {
    interner
        .lookup(name)
        .unwrap_or_else(|| panic!("'{name}' was never interned"))
}
