// tests/lexer_tests.rs

use tickscript::ast::{Token, TokenKind};
use tickscript::lexer::{tokenize, Lexer};

fn tok(kind: TokenKind, offset: usize, text: &str) -> Token {
    Token::new(kind, offset, text)
}

fn assert_tokens(input: &str, expected: &[Token]) {
    let tokens = tokenize(input);
    assert_eq!(tokens, expected, "tokens of {:?}", input);
}

fn assert_binary(op: &str, kind: TokenKind) {
    let rhs = 3 + op.len();
    assert_tokens(
        &format!("a {} b", op),
        &[
            tok(TokenKind::Ident, 0, "a"),
            tok(kind, 2, op),
            tok(TokenKind::Ident, rhs, "b"),
            tok(TokenKind::Eof, rhs + 1, ""),
        ],
    );
}

// ============================================================================
// Symbols and operators
// ============================================================================

#[test]
fn test_not() {
    assert_tokens("!", &[tok(TokenKind::Not, 0, "!"), tok(TokenKind::Eof, 1, "")]);
}

#[test]
fn test_binary_operators() {
    assert_binary("+", TokenKind::Plus);
    assert_binary("-", TokenKind::Minus);
    assert_binary("*", TokenKind::Mult);
    assert_binary("/", TokenKind::Div);
    assert_binary("%", TokenKind::Mod);
    assert_binary("=", TokenKind::Asgn);
    assert_binary("==", TokenKind::Equal);
    assert_binary("!=", TokenKind::NotEqual);
    assert_binary(">", TokenKind::Greater);
    assert_binary(">=", TokenKind::GreaterEqual);
    assert_binary("<", TokenKind::Less);
    assert_binary("<=", TokenKind::LessEqual);
    assert_binary("=~", TokenKind::RegexEqual);
    assert_binary("!~", TokenKind::RegexNotEqual);
}

#[test]
fn test_punctuation() {
    let cases = [
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        (".", TokenKind::Dot),
        ("|", TokenKind::Pipe),
        ("@", TokenKind::At),
        (",", TokenKind::Comma),
        ("*", TokenKind::Star),
    ];
    for (input, kind) in cases {
        assert_tokens(input, &[tok(kind, 0, input), tok(TokenKind::Eof, 1, "")]);
    }
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_keywords() {
    let cases = [
        ("AND", TokenKind::And),
        ("OR", TokenKind::Or),
        ("TRUE", TokenKind::True),
        ("FALSE", TokenKind::False),
        ("var", TokenKind::Var),
        ("lambda:", TokenKind::Lambda),
    ];
    for (input, kind) in cases {
        assert_tokens(
            input,
            &[tok(kind, 0, input), tok(TokenKind::Eof, input.len(), "")],
        );
    }
}

#[test]
fn test_lambda_without_colon_is_identifier() {
    assert_tokens(
        "lambda ",
        &[tok(TokenKind::Ident, 0, "lambda"), tok(TokenKind::Eof, 7, "")],
    );
}

#[test]
fn test_identifiers() {
    assert_tokens(
        "variable",
        &[tok(TokenKind::Ident, 0, "variable"), tok(TokenKind::Eof, 8, "")],
    );
    assert_tokens(
        "myVar01",
        &[tok(TokenKind::Ident, 0, "myVar01"), tok(TokenKind::Eof, 7, "")],
    );
    assert_tokens(
        "snake_case",
        &[tok(TokenKind::Ident, 0, "snake_case"), tok(TokenKind::Eof, 10, "")],
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    for input in ["42", "42.21", ".421", "0.421", "0644"] {
        assert_tokens(
            input,
            &[tok(TokenKind::Number, 0, input), tok(TokenKind::Eof, input.len(), "")],
        );
    }
}

#[test]
fn test_durations() {
    for input in ["42s", "1u", "1µ", "1ms", "5m", "1h", "1d", "1w"] {
        assert_tokens(
            input,
            &[tok(TokenKind::Duration, 0, input), tok(TokenKind::Eof, input.len(), "")],
        );
    }
}

#[test]
fn test_references() {
    assert_tokens(
        r#""""#,
        &[tok(TokenKind::Reference, 0, r#""""#), tok(TokenKind::Eof, 2, "")],
    );
    assert_tokens(
        r#""ref with spaces""#,
        &[
            tok(TokenKind::Reference, 0, r#""ref with spaces""#),
            tok(TokenKind::Eof, 17, ""),
        ],
    );
    assert_tokens(
        r#""ref\"""#,
        &[tok(TokenKind::Reference, 0, r#""ref\"""#), tok(TokenKind::Eof, 7, "")],
    );
}

#[test]
fn test_strings() {
    for input in [
        "''",
        "''''''",
        "'str'",
        r"'str\''",
        "'''s'tr'''",
        r"'''s\'tr'''",
        "'''str'''",
    ] {
        assert_tokens(
            input,
            &[tok(TokenKind::String, 0, input), tok(TokenKind::Eof, input.len(), "")],
        );
    }
}

#[test]
fn test_regexes() {
    for input in ["/.*/", "/^abc$/", r"/^((.*)[a-z]+\S{0,2})|cat\/\/$/"] {
        assert_tokens(
            input,
            &[tok(TokenKind::Regex, 0, input), tok(TokenKind::Eof, input.len(), "")],
        );
    }
}

#[test]
fn test_regex_after_match_operator() {
    assert_tokens(
        r#""host" =~ /^a/"#,
        &[
            tok(TokenKind::Reference, 0, r#""host""#),
            tok(TokenKind::RegexEqual, 7, "=~"),
            tok(TokenKind::Regex, 10, "/^a/"),
            tok(TokenKind::Eof, 14, ""),
        ],
    );
}

// ============================================================================
// Whitespace and combinations
// ============================================================================

#[test]
fn test_whitespace_only() {
    assert_tokens(" ", &[tok(TokenKind::Eof, 1, "")]);
    assert_tokens(" \t\n", &[tok(TokenKind::Eof, 3, "")]);
}

#[test]
fn test_declaration() {
    assert_tokens(
        "var x = avg()",
        &[
            tok(TokenKind::Var, 0, "var"),
            tok(TokenKind::Ident, 4, "x"),
            tok(TokenKind::Asgn, 6, "="),
            tok(TokenKind::Ident, 8, "avg"),
            tok(TokenKind::LParen, 11, "("),
            tok(TokenKind::RParen, 12, ")"),
            tok(TokenKind::Eof, 13, ""),
        ],
    );
}

#[test]
fn test_chained_pipeline() {
    assert_tokens(
        "var x = avg()|parallel(4)x.groupby('cpu')|window().period(10s)",
        &[
            tok(TokenKind::Var, 0, "var"),
            tok(TokenKind::Ident, 4, "x"),
            tok(TokenKind::Asgn, 6, "="),
            tok(TokenKind::Ident, 8, "avg"),
            tok(TokenKind::LParen, 11, "("),
            tok(TokenKind::RParen, 12, ")"),
            tok(TokenKind::Pipe, 13, "|"),
            tok(TokenKind::Ident, 14, "parallel"),
            tok(TokenKind::LParen, 22, "("),
            tok(TokenKind::Number, 23, "4"),
            tok(TokenKind::RParen, 24, ")"),
            tok(TokenKind::Ident, 25, "x"),
            tok(TokenKind::Dot, 26, "."),
            tok(TokenKind::Ident, 27, "groupby"),
            tok(TokenKind::LParen, 34, "("),
            tok(TokenKind::String, 35, "'cpu'"),
            tok(TokenKind::RParen, 40, ")"),
            tok(TokenKind::Pipe, 41, "|"),
            tok(TokenKind::Ident, 42, "window"),
            tok(TokenKind::LParen, 48, "("),
            tok(TokenKind::RParen, 49, ")"),
            tok(TokenKind::Dot, 50, "."),
            tok(TokenKind::Ident, 51, "period"),
            tok(TokenKind::LParen, 57, "("),
            tok(TokenKind::Duration, 58, "10s"),
            tok(TokenKind::RParen, 61, ")"),
            tok(TokenKind::Eof, 62, ""),
        ],
    );
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_comment_between_statements() {
    assert_tokens(
        "var x = avg()\n// Comment all of this is ignored\nx.groupby('cpu')",
        &[
            tok(TokenKind::Var, 0, "var"),
            tok(TokenKind::Ident, 4, "x"),
            tok(TokenKind::Asgn, 6, "="),
            tok(TokenKind::Ident, 8, "avg"),
            tok(TokenKind::LParen, 11, "("),
            tok(TokenKind::RParen, 12, ")"),
            tok(TokenKind::Comment, 14, "// Comment all of this is ignored\n"),
            tok(TokenKind::Ident, 48, "x"),
            tok(TokenKind::Dot, 49, "."),
            tok(TokenKind::Ident, 50, "groupby"),
            tok(TokenKind::LParen, 57, "("),
            tok(TokenKind::String, 58, "'cpu'"),
            tok(TokenKind::RParen, 63, ")"),
            tok(TokenKind::Eof, 64, ""),
        ],
    );
}

#[test]
fn test_comment_at_end_of_input() {
    assert_tokens(
        "var x = avg()\n// Comment all of this is ignored",
        &[
            tok(TokenKind::Var, 0, "var"),
            tok(TokenKind::Ident, 4, "x"),
            tok(TokenKind::Asgn, 6, "="),
            tok(TokenKind::Ident, 8, "avg"),
            tok(TokenKind::LParen, 11, "("),
            tok(TokenKind::RParen, 12, ")"),
            tok(TokenKind::Comment, 14, "// Comment all of this is ignored"),
            tok(TokenKind::Eof, 47, ""),
        ],
    );
}

#[test]
fn test_adjacent_comment_lines_merge() {
    let tokens = tokenize("// one\n  // two\nx");
    assert_eq!(tokens[0], tok(TokenKind::Comment, 0, "// one\n  // two\n"));
    assert_eq!(tokens[1], tok(TokenKind::Ident, 16, "x"));
}

// ============================================================================
// Errors
// ============================================================================

fn last(input: &str) -> Token {
    let mut tokens = tokenize(input);
    tokens.pop().unwrap()
}

#[test]
fn test_unterminated_string() {
    assert_eq!(last("'abc"), tok(TokenKind::Error, 0, "unterminated string"));
}

#[test]
fn test_unterminated_reference() {
    assert_eq!(
        last(r#"x "abc"#),
        tok(TokenKind::Error, 2, "unterminated field reference")
    );
}

#[test]
fn test_multiple_decimals() {
    assert_eq!(
        last("1.2.3"),
        tok(TokenKind::Error, 0, "multiple decimals in number")
    );
}

#[test]
fn test_unknown_character() {
    let err = last("#");
    assert_eq!(err.kind, TokenKind::Error);
    assert!(err.text.contains('#'), "{}", err.text);
}

#[test]
fn test_stream_ends_after_error() {
    let mut lexer = Lexer::new("'abc");
    assert_eq!(lexer.next_token().map(|t| t.kind), Some(TokenKind::Error));
    assert_eq!(lexer.next_token(), None);
    assert_eq!(lexer.next_token(), None);
}
