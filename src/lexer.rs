use std::fmt;

use crate::ast::tokens::{Token, TokenKind};

/// A location in TICKscript source.
///
/// `line` and `column` are 1-based; `column` counts bytes from the start of
/// the line. Nodes built without a parser carry the all-zero default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Computes the line and column of `offset` within `source`.
    pub fn locate(source: &str, offset: usize) -> Position {
        let bytes = source.as_bytes();
        let before = &bytes[..offset.min(bytes.len())];
        let line = 1 + before.iter().filter(|b| **b == b'\n').count();
        let column = match before.iter().rposition(|b| *b == b'\n') {
            Some(newline) => offset - newline,
            None => offset + 1,
        };
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} char {}", self.line, self.column)
    }
}

/// Scanner states. Each step emits at most one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Token,
    UnaryOperator,
    BinaryOperator,
    IdentOrKeyword,
    NumberOrDurationOrDot,
    Reference,
    String,
    Regex,
    Comment,
}

const DURATION_UNITS: &str = "uµsmhdw";

/// Pull-based TICKscript tokenizer.
///
/// Tokens are produced lazily. The stream ends after the first `Eof` or
/// `Error` token; the lexer never resynchronises after an error.
pub struct Lexer<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
    width: usize,
    state: Option<State>,
    emitted: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            start: 0,
            pos: 0,
            width: 0,
            state: Some(State::Token),
            emitted: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Returns the next token, or `None` once the stream has ended.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.emitted.take() {
                return Some(token);
            }
            let state = self.state.take()?;
            self.state = self.step(state);
        }
    }

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Token => self.lex_token(),
            State::UnaryOperator => self.lex_unary_operator(),
            State::BinaryOperator => self.try_lex_binary_operator(),
            State::IdentOrKeyword => self.lex_ident_or_keyword(),
            State::NumberOrDurationOrDot => self.lex_number_or_duration_or_dot(),
            State::Reference => self.lex_reference(),
            State::String => self.lex_single_or_triple_string(),
            State::Regex => self.lex_regex(),
            State::Comment => self.lex_comment(),
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.input[self.pos..].chars().next() {
            Some(c) => {
                self.width = c.len_utf8();
                self.pos += self.width;
                Some(c)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    fn backup(&mut self) {
        self.pos -= self.width;
    }

    fn peek(&mut self) -> Option<char> {
        let c = self.next_char();
        self.backup();
        c
    }

    fn current(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn ignore_space(&mut self) {
        while self.next_char().is_some_and(char::is_whitespace) {
            self.ignore();
        }
        self.backup();
    }

    fn emit(&mut self, kind: TokenKind) {
        self.emitted = Some(Token::new(kind, self.start, self.current()));
        self.start = self.pos;
    }

    fn error(&mut self, message: String) -> Option<State> {
        self.emitted = Some(Token::new(TokenKind::Error, self.start, message));
        None
    }

    fn lex_token(&mut self) -> Option<State> {
        loop {
            let Some(c) = self.next_char() else {
                self.emit(TokenKind::Eof);
                return None;
            };
            match c {
                '-' | '!' => {
                    self.backup();
                    return Some(State::UnaryOperator);
                }
                c if c.is_ascii_digit() || c == '.' => {
                    self.backup();
                    return Some(State::NumberOrDurationOrDot);
                }
                c if c.is_alphabetic() => return Some(State::IdentOrKeyword),
                '"' => return Some(State::Reference),
                '\'' => {
                    self.backup();
                    return Some(State::String);
                }
                c if c.is_whitespace() => self.ignore(),
                '(' => return self.emit_then(TokenKind::LParen, State::Token),
                ')' => return self.emit_then(TokenKind::RParen, State::BinaryOperator),
                '[' => return self.emit_then(TokenKind::LBracket, State::Token),
                ']' => return self.emit_then(TokenKind::RBracket, State::Token),
                '|' => return self.emit_then(TokenKind::Pipe, State::Token),
                '@' => return self.emit_then(TokenKind::At, State::Token),
                ',' => return self.emit_then(TokenKind::Comma, State::Token),
                '*' => return self.emit_then(TokenKind::Star, State::Token),
                '/' => {
                    let comment = self.peek() == Some('/');
                    self.backup();
                    return Some(if comment { State::Comment } else { State::Regex });
                }
                other => return self.error(format!("unknown state, last char: {:?}", other)),
            }
        }
    }

    fn emit_then(&mut self, kind: TokenKind, next: State) -> Option<State> {
        self.emit(kind);
        Some(next)
    }

    fn lex_unary_operator(&mut self) -> Option<State> {
        match self.next_char() {
            Some('-') => self.emit_then(TokenKind::Minus, State::Token),
            Some('!') => self.emit_then(TokenKind::Not, State::Token),
            other => self.error(format!("unexpected unary operator char {:?}", other)),
        }
    }

    /// Probes for an operator after a primary. Falls back to the token
    /// state when none follows.
    fn try_lex_binary_operator(&mut self) -> Option<State> {
        self.ignore_space();
        match self.next_char() {
            Some('+' | '-' | '*' | '%') => self.emit_operator(),
            Some('/') => {
                if self.peek() == Some('/') {
                    self.backup();
                    return Some(State::Comment);
                }
                self.emit_operator()
            }
            Some('!') => {
                if matches!(self.peek(), Some('=' | '~')) {
                    self.next_char();
                }
                let regex_follows = self.current() == "!~";
                self.emit_operator();
                if regex_follows {
                    return Some(self.regex_or_token());
                }
                Some(State::Token)
            }
            Some('>' | '<') => {
                if self.peek() == Some('=') {
                    self.next_char();
                }
                self.emit_operator()
            }
            Some('=') => {
                match self.peek() {
                    Some('~') => {
                        self.next_char();
                        self.emit(TokenKind::RegexEqual);
                    }
                    Some('=') => {
                        self.next_char();
                        self.emit(TokenKind::Equal);
                        return Some(State::Token);
                    }
                    _ => self.emit(TokenKind::Asgn),
                }
                Some(self.regex_or_token())
            }
            _ => {
                self.backup();
                Some(State::Token)
            }
        }
    }

    fn emit_operator(&mut self) -> Option<State> {
        match TokenKind::operator(self.current()) {
            Some(kind) => self.emit_then(kind, State::Token),
            None => self.error(format!("unknown operator {:?}", self.current())),
        }
    }

    fn regex_or_token(&mut self) -> State {
        self.ignore_space();
        if self.peek() == Some('/') {
            State::Regex
        } else {
            State::Token
        }
    }

    fn lex_ident_or_keyword(&mut self) -> Option<State> {
        while self
            .next_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {}
        self.backup();
        match TokenKind::keyword(self.current()) {
            Some(TokenKind::Lambda) => {
                if self.next_char() == Some(':') {
                    self.emit(TokenKind::Lambda);
                } else {
                    self.backup();
                    self.emit(TokenKind::Ident);
                }
            }
            Some(kind) => self.emit(kind),
            None => self.emit(TokenKind::Ident),
        }
        Some(State::BinaryOperator)
    }

    fn lex_number_or_duration_or_dot(&mut self) -> Option<State> {
        let mut found_decimal = false;
        let mut first = true;
        loop {
            match self.next_char() {
                Some('.') => {
                    if first && !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return self.emit_then(TokenKind::Dot, State::Token);
                    }
                    if found_decimal {
                        return self.error("multiple decimals in number".to_string());
                    }
                    found_decimal = true;
                }
                Some(c) if c.is_ascii_digit() => {}
                Some(c) if !found_decimal && DURATION_UNITS.contains(c) => {
                    if c == 'm' && self.peek() == Some('s') {
                        self.next_char();
                    }
                    return self.emit_then(TokenKind::Duration, State::BinaryOperator);
                }
                _ => {
                    self.backup();
                    return self.emit_then(TokenKind::Number, State::BinaryOperator);
                }
            }
            first = false;
        }
    }

    fn lex_reference(&mut self) -> Option<State> {
        loop {
            match self.next_char() {
                Some('\\') => {
                    if self.peek() == Some('"') {
                        self.next_char();
                    }
                }
                Some('"') => return self.emit_then(TokenKind::Reference, State::BinaryOperator),
                Some(_) => {}
                None => return self.error("unterminated field reference".to_string()),
            }
        }
    }

    /// Scans `''`, `'...'` and `'''...'''`. `count` tracks how many closing
    /// quotes are still required.
    fn lex_single_or_triple_string(&mut self) -> Option<State> {
        if self.next_char() != Some('\'') {
            return self.error("unterminated string".to_string());
        }
        let mut count = 1;
        if self.peek() == Some('\'') {
            self.next_char();
            if self.peek() != Some('\'') {
                return self.emit_then(TokenKind::String, State::BinaryOperator);
            }
            self.next_char();
            count = 3;
        }
        let total = count;
        loop {
            match self.next_char() {
                Some('\\') if count == 1 => {
                    if self.peek() == Some('\'') {
                        self.next_char();
                    }
                }
                Some('\'') => {
                    count -= 1;
                    if count == 0 {
                        return self.emit_then(TokenKind::String, State::BinaryOperator);
                    }
                }
                Some(_) => count = total,
                None => return self.error("unterminated string".to_string()),
            }
        }
    }

    fn lex_regex(&mut self) -> Option<State> {
        match self.next_char() {
            Some('/') => {}
            Some(c) => return self.error(format!("unexpected {:?} expected \"/\"", c)),
            None => return self.error("unterminated regex".to_string()),
        }
        loop {
            match self.next_char() {
                Some('\\') => {
                    if self.peek() == Some('/') {
                        self.next_char();
                    }
                }
                Some('/') => return self.emit_then(TokenKind::Regex, State::Token),
                Some(_) => {}
                None => return self.error("unterminated regex".to_string()),
            }
        }
    }

    /// Scans `//` comments. Lines that continue with `/` after leading
    /// spaces join the same token; a blank line ends it.
    fn lex_comment(&mut self) -> Option<State> {
        if self.next_char() != Some('/') || self.next_char() != Some('/') {
            return self.error("invalid character '/'".to_string());
        }
        loop {
            match self.next_char() {
                Some('\n') => {
                    let mut n = self.next_char();
                    while n.is_some_and(|c| c != '\n' && c.is_whitespace()) {
                        n = self.next_char();
                    }
                    if n == Some('/') {
                        continue;
                    }
                    self.backup();
                    return self.emit_then(TokenKind::Comment, State::Token);
                }
                Some(_) => {}
                None => return self.emit_then(TokenKind::Comment, State::Token),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Tokenizes `input` completely. The last token is `Eof` or `Error`.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

#[test]
fn test_keywords() {
    let kinds: Vec<TokenKind> = tokenize("var TRUE FALSE AND OR lambda: lambda")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::True,
            TokenKind::False,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Lambda,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_position_locate() {
    let src = "a\n\n\nvar b = ";
    assert_eq!(
        Position::locate(src, 12),
        Position {
            offset: 12,
            line: 4,
            column: 9
        }
    );
    assert_eq!(Position::locate(src, 0).column, 1);
}
