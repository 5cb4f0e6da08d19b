//! Script lexer
//!
//! Produces an indentation-aware token stream. Errors that only mean "the
//! statement is not finished yet" are reported as [`LexError::UnexpectedEof`]
//! so the engine can ask for a continuation line instead of failing.

use std::fmt;

/// Operators and punctuation, longest first
const OPERATORS: &[&str] = &[
    "**=", "//=", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "//", "**", "+", "-", "*",
    "/", "%", "<", ">", "=", ".", ",", ":", ";", "(", ")", "[", "]",
];

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    Op(&'static str),
    Newline,
    Indent,
    Dedent,
    Eof,
}

/// A token with the line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Lexer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected EOF while parsing")]
    UnexpectedEof,
    #[error("EOL while scanning string literal (line {line})")]
    UnterminatedString { line: usize },
    #[error("invalid character '{ch}' (line {line})")]
    UnexpectedChar { ch: char, line: usize },
    #[error("invalid number literal '{text}' (line {line})")]
    InvalidNumber { text: String, line: usize },
    #[error("unindent does not match any outer indentation level (line {line})")]
    BadDedent { line: usize },
    #[error("unmatched '{ch}' (line {line})")]
    Unmatched { ch: char, line: usize },
}

impl LexError {
    /// Whether more input could turn this into valid source
    pub fn needs_more_input(&self) -> bool {
        matches!(self, LexError::UnexpectedEof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TokenKind::Name(name) => write!(f, "{}", name),
            TokenKind::Int(i) => write!(f, "{}", i),
            TokenKind::Float(v) => write!(f, "{}", v),
            TokenKind::Str(s) => write!(f, "{:?}", s),
            TokenKind::Op(op) => write!(f, "{}", op),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Indent => write!(f, "indent"),
            TokenKind::Dedent => write!(f, "dedent"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    at_line_start: bool,
    brackets: Vec<(char, usize)>,
    indents: Vec<usize>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            at_line_start: true,
            brackets: Vec::new(),
            indents: vec![0],
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(
        &self,
        n: usize,
    ) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn push(
        &mut self,
        kind: TokenKind,
    ) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    fn last_is_newline(&self) -> bool {
        matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(TokenKind::Newline) | Some(TokenKind::Dedent) | Some(TokenKind::Indent)
        )
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if self.at_line_start && self.brackets.is_empty() {
                if !self.indentation()? {
                    continue;
                }
            }

            let Some(ch) = self.peek() else {
                break;
            };

            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => self.skip_comment(),
                '\\' => {
                    self.bump();
                    match self.peek() {
                        Some('\n') => {
                            self.bump();
                        }
                        Some('\r') if self.peek_nth(1) == Some('\n') => {
                            self.bump();
                            self.bump();
                        }
                        None => return Err(LexError::UnexpectedEof),
                        Some(_) => {
                            return Err(LexError::UnexpectedChar {
                                ch: '\\',
                                line: self.line,
                            })
                        }
                    }
                }
                '\n' => {
                    if self.brackets.is_empty() {
                        if !self.last_is_newline() {
                            self.push(TokenKind::Newline);
                        }
                        self.at_line_start = true;
                    }
                    self.bump();
                }
                '0'..='9' => self.number()?,
                '.' if matches!(self.peek_nth(1), Some('0'..='9')) => self.number()?,
                '\'' | '"' => self.string(ch)?,
                c if c == '_' || unicode_ident::is_xid_start(c) => self.name(),
                '(' | '[' => {
                    self.brackets.push((ch, self.line));
                    self.operator()?;
                }
                ')' | ']' => {
                    let expected = if ch == ')' { '(' } else { '[' };
                    match self.brackets.pop() {
                        Some((open, _)) if open == expected => self.operator()?,
                        _ => {
                            return Err(LexError::Unmatched {
                                ch,
                                line: self.line,
                            })
                        }
                    }
                }
                _ => self.operator()?,
            }
        }

        if !self.brackets.is_empty() {
            return Err(LexError::UnexpectedEof);
        }
        if !self.last_is_newline() {
            self.push(TokenKind::Newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent);
        }
        self.push(TokenKind::Eof);
        Ok(self.tokens)
    }

    /// Measure the indentation of a new line. Returns `false` when the line
    /// was blank (or a comment) and has been consumed.
    fn indentation(&mut self) -> Result<bool, LexError> {
        let mut column = 0;
        while let Some(ch) = self.peek() {
            match ch {
                ' ' => column += 1,
                '\t' => column = (column / 8 + 1) * 8,
                '\x0c' => column = 0,
                _ => break,
            }
            self.bump();
        }

        match self.peek() {
            None => {
                self.at_line_start = false;
                return Ok(true);
            }
            Some('#') => {
                self.skip_comment();
                if self.peek().is_some() {
                    self.bump();
                }
                return Ok(false);
            }
            Some('\n') | Some('\r') => {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
                return Ok(false);
            }
            Some(_) => {}
        }

        self.at_line_start = false;
        let top = *self.indents.last().unwrap_or(&0);
        if column > top {
            self.indents.push(column);
            self.push(TokenKind::Indent);
        } else if column < top {
            while column < *self.indents.last().unwrap_or(&0) {
                self.indents.pop();
                self.push(TokenKind::Dedent);
            }
            if column != *self.indents.last().unwrap_or(&0) {
                return Err(LexError::BadDedent { line: self.line });
            }
        }
        Ok(true)
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn name(&mut self) {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '_' || unicode_ident::is_xid_continue(ch) {
                self.bump();
            } else {
                break;
            }
        }
        let text = self.source[start..self.pos].to_string();
        self.push(TokenKind::Name(text));
    }

    fn number(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' | '_' => {
                    self.bump();
                }
                '.' if !is_float => {
                    is_float = true;
                    self.bump();
                }
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = &self.source[start..self.pos];
        let cleaned = text.replace('_', "");
        let invalid = || LexError::InvalidNumber {
            text: text.to_string(),
            line: self.line,
        };
        let kind = if is_float {
            TokenKind::Float(cleaned.parse().map_err(|_| invalid())?)
        } else {
            TokenKind::Int(cleaned.parse().map_err(|_| invalid())?)
        };
        self.push(kind);
        Ok(())
    }

    fn string(
        &mut self,
        quote: char,
    ) -> Result<(), LexError> {
        let line = self.line;
        let triple = self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote);
        let delimiter_len = if triple { 3 } else { 1 };
        for _ in 0..delimiter_len {
            self.bump();
        }

        let mut text = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(if triple {
                    LexError::UnexpectedEof
                } else {
                    LexError::UnterminatedString { line }
                });
            };
            match ch {
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(LexError::UnexpectedEof);
                    };
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '0' => text.push('\0'),
                        '\\' | '\'' | '"' => text.push(escaped),
                        '\n' => {}
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                '\n' if !triple => return Err(LexError::UnterminatedString { line }),
                c if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        break;
                    }
                    text.push(c);
                }
                c => text.push(c),
            }
        }
        self.tokens.push(Token {
            kind: TokenKind::Str(text),
            line,
        });
        Ok(())
    }

    fn operator(&mut self) -> Result<(), LexError> {
        let rest = &self.source[self.pos..];
        match OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            Some(op) => {
                self.pos += op.len();
                self.push(TokenKind::Op(op));
                Ok(())
            }
            None => Err(LexError::UnexpectedChar {
                ch: rest.chars().next().unwrap_or('\0'),
                line: self.line,
            }),
        }
    }
}
