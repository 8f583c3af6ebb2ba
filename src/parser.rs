use thiserror::Error;

use crate::ast::{
    BinOp, BinaryNode, BoolNode, ChainNode, ChainOp, CommentNode, DeclarationNode, DurationNode,
    FuncKind, FunctionNode, IdentifierNode, LambdaNode, ListNode, Node, NodeError, NumberNode,
    ProgramNode, ReferenceNode, RegexNode, StarNode, StringNode, Token, TokenKind,
    TypeDeclarationNode, UnaryNode, UnaryOp,
};
use crate::lexer::{Lexer, Position};

/// Bytes of context shown on each side of an error position.
const SNIPPET_RADIUS: usize = 10;

/// A fatal parse error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar did not allow the token found here.
    #[error(
        "parser: unexpected {found} line {} char {} in \"{snippet}\". expected: {}",
        .position.line,
        .position.column,
        quoted_kinds(.expected)
    )]
    Unexpected {
        /// Printable token kind, or the lexer's message for error tokens
        found: String,
        expected: Vec<TokenKind>,
        position: Position,
        snippet: String,
    },

    /// A literal token could not be converted to a value.
    #[error("parser: {source}")]
    InvalidLiteral {
        source: NodeError,
        position: Position,
        snippet: String,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Unexpected { position, .. } | ParseError::InvalidLiteral { position, .. } => {
                *position
            }
        }
    }

    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn column(&self) -> usize {
        self.position().column
    }

    /// The single source line fragment around the error.
    pub fn snippet(&self) -> &str {
        match self {
            ParseError::Unexpected { snippet, .. } | ParseError::InvalidLiteral { snippet, .. } => {
                snippet
            }
        }
    }

    /// Token kinds that would have been accepted, if any.
    pub fn expected(&self) -> &[TokenKind] {
        match self {
            ParseError::Unexpected { expected, .. } => expected,
            ParseError::InvalidLiteral { .. } => &[],
        }
    }
}

fn quoted_kinds(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|kind| format!("{:?}", kind.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a complete TICKscript program.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    Parser::new(text).parse_program()
}

/// Parses the body of a lambda, i.e. the text after `lambda:`.
pub fn parse_lambda(text: &str) -> Result<LambdaNode, ParseError> {
    Parser::new(text).parse_lambda()
}

/// Recursive descent parser with two tokens of lookahead.
///
/// Comment tokens never reach the grammar: they are folded into a
/// [`CommentNode`] stored next to the token that follows them, and the
/// grammar attaches it to a node with `consume_comment`.
pub struct Parser<'a> {
    text: &'a str,
    lexer: Lexer<'a>,
    tokens: [Token; 2],
    comments: [Option<CommentNode>; 2],
    peek_count: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Parser {
            text,
            lexer: Lexer::new(text),
            tokens: [
                Token::new(TokenKind::Eof, 0, ""),
                Token::new(TokenKind::Eof, 0, ""),
            ],
            comments: [None, None],
            peek_count: 0,
        }
    }

    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let program = self.program()?;
        self.expect(TokenKind::Eof)?;
        Ok(program)
    }

    pub fn parse_lambda(&mut self) -> Result<LambdaNode, ParseError> {
        let expression = self.primary_expr()?;
        let lambda = LambdaNode {
            position: self.position(0),
            expression: Box::new(expression),
            comment: None,
        };
        self.expect(TokenKind::Eof)?;
        Ok(lambda)
    }

    // Token buffer

    fn lex(&mut self) -> Token {
        self.lexer
            .next_token()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.text.len(), ""))
    }

    /// Reads the next grammar token, folding any comments before it.
    fn next_token(&mut self) -> (Token, Option<CommentNode>) {
        let mut token = self.lex();
        let mut start = None;
        let mut texts = Vec::new();
        while token.kind == TokenKind::Comment {
            start.get_or_insert(token.offset);
            texts.push(token.text);
            token = self.lex();
        }
        let comment = start.map(|offset| CommentNode::from_tokens(self.position(offset), &texts));
        (token, comment)
    }

    fn next(&mut self) -> Token {
        if self.peek_count > 0 {
            self.peek_count -= 1;
        } else {
            let (token, comment) = self.next_token();
            self.tokens[0] = token;
            self.comments[0] = comment;
        }
        self.tokens[self.peek_count].clone()
    }

    fn backup(&mut self) {
        self.peek_count += 1;
    }

    fn peek(&mut self) -> &Token {
        if self.peek_count == 0 {
            self.peek_count = 1;
            self.tokens.swap(0, 1);
            self.comments.swap(0, 1);
            let (token, comment) = self.next_token();
            self.tokens[0] = token;
            self.comments[0] = comment;
        }
        &self.tokens[self.peek_count - 1]
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    fn peek_operator(&mut self) -> Option<BinOp> {
        self.peek_kind().bin_op()
    }

    /// Takes the comment that preceded the most recently consumed token.
    fn consume_comment(&mut self) -> Option<CommentNode> {
        self.comments.get_mut(self.peek_count).and_then(Option::take)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let token = self.next();
        if token.kind != expected {
            return Err(self.unexpected(&token, &[expected]));
        }
        Ok(token)
    }

    // Diagnostics

    fn position(&self, offset: usize) -> Position {
        Position::locate(self.text, offset)
    }

    fn has_new_line(&self, start: usize, end: usize) -> bool {
        self.text
            .as_bytes()
            .get(start..end)
            .is_some_and(|span| span.contains(&b'\n'))
    }

    /// Up to ten bytes either side of `offset`, clipped to its line.
    fn snippet(&self, offset: usize) -> String {
        let bytes = self.text.as_bytes();
        let offset = offset.min(bytes.len());
        let mut start = offset.saturating_sub(SNIPPET_RADIUS);
        if let Some(i) = bytes[start..offset].iter().rposition(|b| *b == b'\n') {
            start += i + 1;
        }
        let mut stop = (offset + SNIPPET_RADIUS).min(bytes.len());
        if let Some(i) = bytes[offset..stop].iter().position(|b| *b == b'\n') {
            stop = offset + i;
        }
        String::from_utf8_lossy(&bytes[start..stop]).into_owned()
    }

    fn unexpected(&self, token: &Token, expected: &[TokenKind]) -> ParseError {
        let found = match token.kind {
            TokenKind::Error => token.text.clone(),
            kind => kind.to_string(),
        };
        ParseError::Unexpected {
            found,
            expected: expected.to_vec(),
            position: self.position(token.offset),
            snippet: self.snippet(token.offset),
        }
    }

    fn invalid_literal(&self, token: &Token, source: NodeError) -> ParseError {
        ParseError::InvalidLiteral {
            source,
            position: self.position(token.offset),
            snippet: self.snippet(token.offset),
        }
    }

    // Grammar

    fn program(&mut self) -> Result<Node, ParseError> {
        let mut program = ProgramNode {
            position: self.position(0),
            statements: Vec::new(),
        };
        loop {
            if self.peek_kind() == TokenKind::Eof {
                // Comments after the last statement.
                for slot in [1, 0] {
                    if let Some(comment) = self.comments[slot].take() {
                        program.push(Node::Comment(comment));
                    }
                }
                return Ok(Node::Program(program));
            }
            let statement = self.statement()?;
            program.push(statement);
        }
    }

    fn statement(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Var => self.declaration(),
            _ => self.expression(),
        }
    }

    fn declaration(&mut self) -> Result<Node, ParseError> {
        let var = self.expect(TokenKind::Var)?;
        let comment = self.consume_comment();
        let name = self.identifier()?;
        let position = self.position(var.offset);
        if self.peek_kind() == TokenKind::Asgn {
            self.expect(TokenKind::Asgn)?;
            let value = self.expression()?;
            Ok(Node::Declaration(DeclarationNode {
                position,
                name,
                value: Box::new(value),
                comment,
            }))
        } else {
            let type_name = self.identifier()?;
            Ok(Node::TypeDeclaration(TypeDeclarationNode {
                position,
                name,
                type_name,
                comment,
            }))
        }
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident => {
                self.next();
                match self.peek_kind() {
                    TokenKind::LParen => {
                        self.backup();
                        let term = self.function(FuncKind::Global)?;
                        match self.peek_kind() {
                            TokenKind::Dot
                            | TokenKind::Pipe
                            | TokenKind::At
                            | TokenKind::Var
                            | TokenKind::Ident => self.chain(term),
                            _ => self.precedence(term, 0),
                        }
                    }
                    TokenKind::Dot
                    | TokenKind::At
                    | TokenKind::Pipe
                    | TokenKind::Var
                    | TokenKind::Ident => {
                        self.backup();
                        let term = Node::Identifier(self.identifier()?);
                        self.chain(term)
                    }
                    _ => {
                        self.backup();
                        self.primary_expr()
                    }
                }
            }
            TokenKind::Lambda => self.lambda().map(Node::Lambda),
            TokenKind::LBracket => self.string_list(),
            _ => self.primary_expr(),
        }
    }

    /// Chains are left-associative: each step wraps everything before it.
    fn chain(&mut self, mut lhs: Node) -> Result<Node, ParseError> {
        loop {
            let op = match self.peek_kind() {
                TokenKind::Dot => ChainOp::Dot,
                TokenKind::Pipe => ChainOp::Pipe,
                TokenKind::At => ChainOp::At,
                _ => return Ok(lhs),
            };
            let token = self.next();
            let comment = self.consume_comment();
            let rhs = self.func_or_ident(FuncKind::for_chain(op))?;
            lhs = Node::Chain(ChainNode {
                position: self.position(token.offset),
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                comment,
            });
        }
    }

    fn func_or_ident(&mut self, kind: FuncKind) -> Result<Node, ParseError> {
        self.next();
        let call = kind == FuncKind::Chain || self.peek_kind() == TokenKind::LParen;
        self.backup();
        if call {
            self.function(kind)
        } else {
            self.identifier().map(Node::Identifier)
        }
    }

    fn identifier(&mut self) -> Result<IdentifierNode, ParseError> {
        let ident = self.expect(TokenKind::Ident)?;
        Ok(IdentifierNode {
            position: self.position(ident.offset),
            name: ident.text,
            comment: self.consume_comment(),
        })
    }

    fn function(&mut self, kind: FuncKind) -> Result<Node, ParseError> {
        let ident = self.expect(TokenKind::Ident)?;
        let comment = self.consume_comment();
        self.expect(TokenKind::LParen)?;
        let args = self.parameters()?;
        self.expect(TokenKind::RParen)?;
        Ok(self.call(ident, kind, args, comment))
    }

    fn call(
        &self,
        ident: Token,
        kind: FuncKind,
        args: Vec<Node>,
        comment: Option<CommentNode>,
    ) -> Node {
        let multiline = args
            .last()
            .is_some_and(|last| self.has_new_line(ident.offset, last.position().offset));
        Node::Function(FunctionNode {
            position: self.position(ident.offset),
            kind,
            name: ident.text,
            args,
            multiline,
            comment,
        })
    }

    /// Comma separated arguments; a trailing comma is allowed.
    fn parameters(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        loop {
            if self.peek_kind() == TokenKind::RParen {
                return Ok(args);
            }
            args.push(self.expression()?);
            if self.next().kind != TokenKind::Comma {
                self.backup();
                return Ok(args);
            }
        }
    }

    fn string_list(&mut self) -> Result<Node, ParseError> {
        let open = self.expect(TokenKind::LBracket)?;
        let comment = self.consume_comment();
        let mut items = Vec::new();
        loop {
            if self.peek_kind() == TokenKind::RBracket {
                break;
            }
            items.push(self.string_item()?);
            if self.next().kind != TokenKind::Comma {
                self.backup();
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Node::List(ListNode {
            position: self.position(open.offset),
            items,
            comment,
        }))
    }

    fn string_item(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident => self.identifier().map(Node::Identifier),
            TokenKind::String => self.string(),
            TokenKind::Star => self.star(),
            _ => {
                let token = self.peek().clone();
                Err(self.unexpected(
                    &token,
                    &[TokenKind::Ident, TokenKind::String, TokenKind::Star],
                ))
            }
        }
    }

    fn lambda(&mut self) -> Result<LambdaNode, ParseError> {
        let token = self.next();
        let comment = self.consume_comment();
        let expression = self.primary_expr()?;
        Ok(LambdaNode {
            position: self.position(token.offset),
            expression: Box::new(expression),
            comment,
        })
    }

    fn primary_expr(&mut self) -> Result<Node, ParseError> {
        let lhs = self.primary()?;
        self.precedence(lhs, 0)
    }

    /// Precedence climbing. Operators of equal precedence associate to the
    /// left; a tighter operator after the right operand claims it first.
    fn precedence(&mut self, mut lhs: Node, min_precedence: u8) -> Result<Node, ParseError> {
        while let Some(op) = self
            .peek_operator()
            .filter(|op| op.precedence() >= min_precedence)
        {
            let token = self.next();
            let comment = self.consume_comment();
            let mut rhs = self.primary()?;
            while let Some(look) = self
                .peek_operator()
                .filter(|look| look.precedence() > op.precedence())
            {
                rhs = self.precedence(rhs, look.precedence())?;
            }
            let multiline = self.has_new_line(lhs.position().offset, rhs.position().offset);
            lhs = Node::Binary(BinaryNode {
                position: self.position(token.offset),
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                parenthesized: false,
                multiline,
                comment,
            });
        }
        Ok(lhs)
    }

    /// A call inside an expression, e.g. `sigma("value")` in a lambda.
    fn lfunction(&mut self) -> Result<Node, ParseError> {
        let ident = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        loop {
            if self.peek_kind() == TokenKind::RParen {
                break;
            }
            let mut arg = self.primary()?;
            if self.peek_operator().is_some() {
                arg = self.precedence(arg, 0)?;
            }
            args.push(arg);
            if self.next().kind != TokenKind::Comma {
                self.backup();
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(self.call(ident, FuncKind::Global, args, None))
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LParen => {
                self.next();
                let comment = self.consume_comment();
                let mut node = self.primary_expr()?;
                if let Node::Binary(binary) = &mut node {
                    binary.parenthesized = true;
                }
                node.set_comment(comment);
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            TokenKind::Number => {
                let token = self.expect(TokenKind::Number)?;
                let comment = self.consume_comment();
                let value = NumberNode::parse_literal(&token.text)
                    .map_err(|err| self.invalid_literal(&token, err))?;
                Ok(Node::Number(NumberNode {
                    position: self.position(token.offset),
                    value,
                    comment,
                }))
            }
            TokenKind::String => self.string(),
            TokenKind::True | TokenKind::False => {
                let token = self.next();
                Ok(Node::Bool(BoolNode {
                    position: self.position(token.offset),
                    value: token.kind == TokenKind::True,
                    comment: self.consume_comment(),
                }))
            }
            TokenKind::Duration => {
                let token = self.expect(TokenKind::Duration)?;
                let comment = self.consume_comment();
                let mut node = DurationNode::from_literal(self.position(token.offset), &token.text)
                    .map_err(|err| self.invalid_literal(&token, err))?;
                node.comment = comment;
                Ok(Node::Duration(node))
            }
            TokenKind::Regex => {
                let token = self.expect(TokenKind::Regex)?;
                let comment = self.consume_comment();
                let mut node = RegexNode::from_token(self.position(token.offset), &token.text)
                    .map_err(|err| self.invalid_literal(&token, err))?;
                node.comment = comment;
                Ok(Node::Regex(node))
            }
            TokenKind::Star => self.star(),
            TokenKind::Reference => {
                let token = self.expect(TokenKind::Reference)?;
                let mut node = ReferenceNode::from_token(self.position(token.offset), &token.text);
                node.comment = self.consume_comment();
                Ok(Node::Reference(node))
            }
            TokenKind::Ident => {
                self.next();
                let call = self.peek_kind() == TokenKind::LParen;
                self.backup();
                if call {
                    self.lfunction()
                } else {
                    self.identifier().map(Node::Identifier)
                }
            }
            TokenKind::Minus | TokenKind::Not => {
                self.next();
                let op = if token.kind == TokenKind::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Not
                };
                let operand = self.primary()?;
                Ok(Node::Unary(UnaryNode {
                    position: self.position(token.offset),
                    op,
                    operand: Box::new(operand),
                    comment: self.consume_comment(),
                }))
            }
            _ => Err(self.unexpected(
                &token,
                &[
                    TokenKind::Number,
                    TokenKind::String,
                    TokenKind::Duration,
                    TokenKind::Ident,
                    TokenKind::True,
                    TokenKind::False,
                    TokenKind::Equal,
                    TokenKind::LParen,
                    TokenKind::Minus,
                    TokenKind::Not,
                ],
            )),
        }
    }

    fn string(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::String)?;
        let mut node = StringNode::from_token(self.position(token.offset), &token.text);
        node.comment = self.consume_comment();
        Ok(Node::String(node))
    }

    fn star(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::Star)?;
        Ok(Node::Star(StarNode {
            position: self.position(token.offset),
            comment: self.consume_comment(),
        }))
    }
}

#[test]
fn test_parse_error_at_eof() {
    let err = parse("a\n\n\nvar b = ").unwrap_err();
    assert_eq!(err.line(), 4);
    assert_eq!(err.column(), 9);
    assert_eq!(err.snippet(), "var b = ");
}

#[test]
fn test_lambda_entry_point() {
    let lambda = parse_lambda("\"value\" > 10").unwrap();
    assert_eq!(lambda.position.offset, 0);
    assert!(matches!(*lambda.expression, Node::Binary(_)));
}
