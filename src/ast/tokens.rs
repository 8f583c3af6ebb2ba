use std::fmt;

use crate::ast::BinOp;

/// Keyword spellings recognised by the lexer.
pub const KW_AND: &str = "AND";
pub const KW_OR: &str = "OR";
pub const KW_TRUE: &str = "TRUE";
pub const KW_FALSE: &str = "FALSE";
pub const KW_VAR: &str = "var";
pub const KW_LAMBDA: &str = "lambda";

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Lexical error; the token text carries the message
    Error,
    /// End of input
    Eof,

    // Keywords
    /// `var`
    Var,
    /// `lambda:`
    Lambda,
    /// `TRUE`
    True,
    /// `FALSE`
    False,

    // Punctuation
    /// Assignment `=`
    Asgn,
    /// Property access `.`
    Dot,
    /// Chain `|`
    Pipe,
    /// Dynamic call `@`
    At,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// Standalone `*` (as in `groupBy(*)`)
    Star,
    /// Logical negation `!`
    Not,

    // Literals and names
    /// Identifier such as `stream` or `window`
    ///
    /// # Examples
    /// ```text
    /// stream
    /// myVar01
    /// ```
    Ident,
    /// Double-quoted field reference
    ///
    /// # Examples
    /// ```text
    /// "value"
    /// "host name"
    /// ```
    Reference,
    /// Integer or floating point number
    Number,
    /// Single- or triple-quoted string
    ///
    /// # Examples
    /// ```text
    /// 'cpu'
    /// '''it's'''
    /// ```
    String,
    /// Duration literal
    ///
    /// # Examples
    /// ```text
    /// 10s
    /// 1ms
    /// 5m
    /// ```
    Duration,
    /// Slash-delimited regular expression
    Regex,
    /// One or more adjacent `//` comment lines
    Comment,

    // Math operators
    Plus,
    Minus,
    Mult,
    Div,
    Mod,

    // Logical operators
    And,
    Or,

    // Comparison operators
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    RegexEqual,
    RegexNotEqual,
}

impl TokenKind {
    /// Looks up a keyword token by its spelling.
    ///
    /// `lambda` is returned here as well; the lexer only accepts it as a
    /// keyword when a `:` follows.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            KW_AND => Some(TokenKind::And),
            KW_OR => Some(TokenKind::Or),
            KW_TRUE => Some(TokenKind::True),
            KW_FALSE => Some(TokenKind::False),
            KW_VAR => Some(TokenKind::Var),
            KW_LAMBDA => Some(TokenKind::Lambda),
            _ => None,
        }
    }

    /// Looks up an operator token by its symbol.
    pub fn operator(symbol: &str) -> Option<TokenKind> {
        let kind = match symbol {
            "!" => TokenKind::Not,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Mult,
            "/" => TokenKind::Div,
            "%" => TokenKind::Mod,
            "==" => TokenKind::Equal,
            "!=" => TokenKind::NotEqual,
            "<" => TokenKind::Less,
            ">" => TokenKind::Greater,
            "<=" => TokenKind::LessEqual,
            ">=" => TokenKind::GreaterEqual,
            "=~" => TokenKind::RegexEqual,
            "!~" => TokenKind::RegexNotEqual,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            _ => return None,
        };
        Some(kind)
    }

    /// True for operators usable in mathematical or boolean expressions.
    pub fn is_expr_operator(self) -> bool {
        self.is_math_operator() || self.is_logical_operator() || self.is_comparison_operator()
    }

    pub fn is_math_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Mult | TokenKind::Div | TokenKind::Mod
        )
    }

    pub fn is_logical_operator(self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or)
    }

    pub fn is_comparison_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::RegexEqual
                | TokenKind::RegexNotEqual
        )
    }

    /// The binary operator this token denotes, if any.
    pub fn bin_op(self) -> Option<BinOp> {
        let op = match self {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Subtract,
            TokenKind::Mult => BinOp::Multiply,
            TokenKind::Div => BinOp::Divide,
            TokenKind::Mod => BinOp::Modulo,
            TokenKind::And => BinOp::And,
            TokenKind::Or => BinOp::Or,
            TokenKind::Equal => BinOp::Equal,
            TokenKind::NotEqual => BinOp::NotEqual,
            TokenKind::Less => BinOp::LessThan,
            TokenKind::Greater => BinOp::GreaterThan,
            TokenKind::LessEqual => BinOp::LessEqual,
            TokenKind::GreaterEqual => BinOp::GreaterEqual,
            TokenKind::RegexEqual => BinOp::RegexEqual,
            TokenKind::RegexNotEqual => BinOp::RegexNotEqual,
            _ => return None,
        };
        Some(op)
    }

    /// Printable form, as used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Error => "ERR",
            TokenKind::Eof => "EOF",
            TokenKind::Var => "var",
            TokenKind::Lambda => "lambda",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Asgn => "=",
            TokenKind::Dot => ".",
            TokenKind::Pipe => "|",
            TokenKind::At => "@",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Star => "*",
            TokenKind::Not => "!",
            TokenKind::Ident => "identifier",
            TokenKind::Reference => "reference",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Duration => "duration",
            TokenKind::Regex => "regex",
            TokenKind::Comment => "//",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Mult => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::RegexEqual => "=~",
            TokenKind::RegexNotEqual => "!~",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token scanned from TICKscript source.
///
/// `offset` is the byte offset of the first character of `text` in the
/// source. For [`TokenKind::Error`] tokens `text` holds the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, text: impl Into<String>) -> Self {
        Token {
            kind,
            offset,
            text: text.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} pos: {} val: {}}}", self.kind, self.offset, self.text)
    }
}

#[test]
fn test_every_kind_has_a_printable_form() {
    let kinds = [
        TokenKind::Error,
        TokenKind::Eof,
        TokenKind::Var,
        TokenKind::Lambda,
        TokenKind::Ident,
        TokenKind::Comment,
        TokenKind::RegexNotEqual,
    ];
    for kind in kinds {
        assert!(kind.as_str().parse::<i64>().is_err(), "{:?}", kind);
    }
}

#[test]
fn test_operator_lookup_round_trips() {
    for symbol in ["+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "=~", "!~", "AND", "OR"] {
        let kind = TokenKind::operator(symbol).unwrap();
        assert!(kind.is_expr_operator());
        assert_eq!(kind.as_str(), symbol);
    }
    assert!(!TokenKind::Not.is_expr_operator());
}
