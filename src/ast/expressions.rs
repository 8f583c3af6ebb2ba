use std::time::Duration;

use regex::Regex;

use crate::ast::{
    BinOp, ChainNode, ChainOp, CommentNode, DeclarationNode, FuncKind, FunctionNode, NodeError,
    ProgramNode, TypeDeclarationNode, UnaryOp,
};
use crate::duration::parse_duration;
use crate::lexer::Position;

/// A node of the TICKscript syntax tree.
///
/// Equality is structural: positions, attached comments and layout hints
/// (`parenthesized`, `multiline`, quoting style, number base, duration
/// spelling) never take part in a comparison.
#[derive(Debug, Clone)]
pub enum Node {
    // Literals
    /// Integer or float literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0644
    /// 1.5
    /// ```
    Number(NumberNode),

    /// Duration literal such as `10s`
    Duration(DurationNode),

    /// `TRUE` or `FALSE`
    Bool(BoolNode),

    /// Single- or triple-quoted string literal
    String(StringNode),

    /// Compiled `/.../` regex literal
    Regex(RegexNode),

    /// Double-quoted field reference
    ///
    /// # Example
    /// ```text
    /// "cpu_usage"
    /// ```
    Reference(ReferenceNode),

    /// Standalone `*`
    Star(StarNode),

    /// Bracketed list of identifiers, strings or stars
    ///
    /// # Example
    /// ```text
    /// ['host', 'cpu', *]
    /// ```
    List(ListNode),

    // Expressions
    /// Prefix `-` or `!`
    Unary(UnaryNode),

    /// Infix operation (arithmetic, comparison, logical, regex match)
    Binary(BinaryNode),

    // Structure
    /// Bare name
    Identifier(IdentifierNode),

    /// `left . right`, `left | right` or `left @ right`
    ///
    /// # Example
    /// ```text
    /// stream
    ///     |from()
    ///         .measurement('cpu')
    /// ```
    Chain(ChainNode),

    /// Function call
    Function(FunctionNode),

    /// `lambda: <expression>`
    Lambda(LambdaNode),

    /// `var name = value`
    Declaration(DeclarationNode),

    /// `var name type`
    TypeDeclaration(TypeDeclarationNode),

    /// A whole script
    Program(ProgramNode),

    /// A block of `//` comment lines
    Comment(CommentNode),
}

/// Numeric value of a [`NumberNode`].
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Integer with the base it was written in (8 or 10)
    Int { value: i64, base: u32 },
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct NumberNode {
    pub position: Position,
    pub value: Number,
    pub comment: Option<CommentNode>,
}

impl NumberNode {
    /// Converts number token text. A leading `0` selects octal; a `.` makes
    /// the literal a float.
    pub fn parse_literal(text: &str) -> Result<Number, NodeError> {
        let illegal = || NodeError::InvalidNumber(text.to_string());
        if text.is_empty() {
            return Err(illegal());
        }
        if text.contains('.') {
            let value: f64 = text.parse().map_err(|_| illegal())?;
            return Ok(Number::Float(value));
        }
        let base = if text.starts_with('0') && text.len() > 1 {
            8
        } else {
            10
        };
        let value = i64::from_str_radix(text, base).map_err(|_| illegal())?;
        Ok(Number::Int { value, base })
    }

    pub fn is_int(&self) -> bool {
        matches!(self.value, Number::Int { .. })
    }

    pub fn is_float(&self) -> bool {
        matches!(self.value, Number::Float(_))
    }
}

impl PartialEq for NumberNode {
    fn eq(&self, other: &Self) -> bool {
        match (self.value, other.value) {
            (Number::Int { value: a, .. }, Number::Int { value: b, .. }) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DurationNode {
    pub position: Position,
    pub duration: Duration,
    /// Source spelling; empty for nodes built from a [`Duration`].
    pub literal: String,
    pub comment: Option<CommentNode>,
}

impl DurationNode {
    pub fn from_literal(position: Position, literal: &str) -> Result<Self, NodeError> {
        Ok(DurationNode {
            position,
            duration: parse_duration(literal)?,
            literal: literal.to_string(),
            comment: None,
        })
    }
}

impl PartialEq for DurationNode {
    fn eq(&self, other: &Self) -> bool {
        self.duration == other.duration
    }
}

#[derive(Debug, Clone)]
pub struct BoolNode {
    pub position: Position,
    pub value: bool,
    pub comment: Option<CommentNode>,
}

impl PartialEq for BoolNode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// String literal. `literal` is unescaped for single-quoted strings and
/// verbatim for triple-quoted ones.
#[derive(Debug, Clone)]
pub struct StringNode {
    pub position: Position,
    pub literal: String,
    pub triple_quoted: bool,
    pub comment: Option<CommentNode>,
}

impl StringNode {
    /// Builds a string node from token text, quotes included.
    pub fn from_token(position: Position, text: &str) -> Self {
        let triple_quoted = text.len() >= 6 && text.starts_with("'''");
        let literal = if triple_quoted {
            text[3..text.len() - 3].to_string()
        } else {
            strip_quotes(text).replace("\\'", "'")
        };
        StringNode {
            position,
            literal,
            triple_quoted,
            comment: None,
        }
    }
}

impl PartialEq for StringNode {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

/// Regex literal. `literal` keeps the `\/` escapes of the source; the
/// compiled pattern has them removed.
#[derive(Debug, Clone)]
pub struct RegexNode {
    pub position: Position,
    pub regex: Regex,
    pub literal: String,
    pub comment: Option<CommentNode>,
}

impl RegexNode {
    /// Builds a regex node from the text between the slashes.
    pub fn from_literal(position: Position, literal: &str) -> Result<Self, NodeError> {
        let pattern = literal.replace("\\/", "/");
        let regex = Regex::new(&pattern).map_err(|err| NodeError::InvalidRegex {
            pattern,
            message: err.to_string(),
        })?;
        Ok(RegexNode {
            position,
            regex,
            literal: literal.to_string(),
            comment: None,
        })
    }

    /// Builds a regex node from token text, slashes included.
    pub fn from_token(position: Position, text: &str) -> Result<Self, NodeError> {
        Self::from_literal(position, strip_quotes(text))
    }
}

impl PartialEq for RegexNode {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceNode {
    pub position: Position,
    pub name: String,
    pub comment: Option<CommentNode>,
}

impl ReferenceNode {
    /// Builds a reference node from token text, quotes included.
    pub fn from_token(position: Position, text: &str) -> Self {
        ReferenceNode {
            position,
            name: strip_quotes(text).replace("\\\"", "\""),
            comment: None,
        }
    }
}

impl PartialEq for ReferenceNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone)]
pub struct StarNode {
    pub position: Position,
    pub comment: Option<CommentNode>,
}

impl PartialEq for StarNode {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct ListNode {
    pub position: Position,
    pub items: Vec<Node>,
    pub comment: Option<CommentNode>,
}

impl PartialEq for ListNode {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

#[derive(Debug, Clone)]
pub struct UnaryNode {
    pub position: Position,
    pub op: UnaryOp,
    pub operand: Box<Node>,
    pub comment: Option<CommentNode>,
}

impl PartialEq for UnaryNode {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.operand == other.operand
    }
}

#[derive(Debug, Clone)]
pub struct BinaryNode {
    pub position: Position,
    pub op: BinOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
    /// Written inside `( )`
    pub parenthesized: bool,
    /// The right operand starts on a new line
    pub multiline: bool,
    pub comment: Option<CommentNode>,
}

impl PartialEq for BinaryNode {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.left == other.left && self.right == other.right
    }
}

#[derive(Debug, Clone)]
pub struct IdentifierNode {
    pub position: Position,
    pub name: String,
    pub comment: Option<CommentNode>,
}

impl IdentifierNode {
    pub fn new(name: impl Into<String>) -> Self {
        IdentifierNode {
            position: Position::default(),
            name: name.into(),
            comment: None,
        }
    }
}

impl PartialEq for IdentifierNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone)]
pub struct LambdaNode {
    pub position: Position,
    pub expression: Box<Node>,
    pub comment: Option<CommentNode>,
}

impl PartialEq for LambdaNode {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::Duration(a), Node::Duration(b)) => a == b,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Regex(a), Node::Regex(b)) => a == b,
            (Node::Reference(a), Node::Reference(b)) => a == b,
            (Node::Star(a), Node::Star(b)) => a == b,
            (Node::List(a), Node::List(b)) => a == b,
            (Node::Unary(a), Node::Unary(b)) => a == b,
            (Node::Binary(a), Node::Binary(b)) => a == b,
            (Node::Identifier(a), Node::Identifier(b)) => a == b,
            (Node::Chain(a), Node::Chain(b)) => a == b,
            (Node::Function(a), Node::Function(b)) => a == b,
            (Node::Lambda(a), Node::Lambda(b)) => a == b,
            (Node::Declaration(a), Node::Declaration(b)) => a == b,
            (Node::TypeDeclaration(a), Node::TypeDeclaration(b)) => a == b,
            (Node::Program(a), Node::Program(b)) => a == b,
            (Node::Comment(a), Node::Comment(b)) => a == b,
            _ => false,
        }
    }
}

impl Node {
    /// Name of the node kind, as used by the JSON `typeOf` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Number(_) => "number",
            Node::Duration(_) => "duration",
            Node::Bool(_) => "bool",
            Node::String(_) => "string",
            Node::Regex(_) => "regex",
            Node::Reference(_) => "reference",
            Node::Star(_) => "star",
            Node::List(_) => "list",
            Node::Unary(_) => "unary",
            Node::Binary(_) => "binary",
            Node::Identifier(_) => "identifier",
            Node::Chain(_) => "chain",
            Node::Function(_) => "func",
            Node::Lambda(_) => "lambda",
            Node::Declaration(_) => "declaration",
            Node::TypeDeclaration(_) => "typeDeclaration",
            Node::Program(_) => "program",
            Node::Comment(_) => "comment",
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Node::Number(n) => n.position,
            Node::Duration(n) => n.position,
            Node::Bool(n) => n.position,
            Node::String(n) => n.position,
            Node::Regex(n) => n.position,
            Node::Reference(n) => n.position,
            Node::Star(n) => n.position,
            Node::List(n) => n.position,
            Node::Unary(n) => n.position,
            Node::Binary(n) => n.position,
            Node::Identifier(n) => n.position,
            Node::Chain(n) => n.position,
            Node::Function(n) => n.position,
            Node::Lambda(n) => n.position,
            Node::Declaration(n) => n.position,
            Node::TypeDeclaration(n) => n.position,
            Node::Program(n) => n.position,
            Node::Comment(n) => n.position,
        }
    }

    /// The comment attached in front of this node. Programs and comments
    /// never carry one.
    pub fn comment(&self) -> Option<&CommentNode> {
        match self {
            Node::Number(n) => n.comment.as_ref(),
            Node::Duration(n) => n.comment.as_ref(),
            Node::Bool(n) => n.comment.as_ref(),
            Node::String(n) => n.comment.as_ref(),
            Node::Regex(n) => n.comment.as_ref(),
            Node::Reference(n) => n.comment.as_ref(),
            Node::Star(n) => n.comment.as_ref(),
            Node::List(n) => n.comment.as_ref(),
            Node::Unary(n) => n.comment.as_ref(),
            Node::Binary(n) => n.comment.as_ref(),
            Node::Identifier(n) => n.comment.as_ref(),
            Node::Chain(n) => n.comment.as_ref(),
            Node::Function(n) => n.comment.as_ref(),
            Node::Lambda(n) => n.comment.as_ref(),
            Node::Declaration(n) => n.comment.as_ref(),
            Node::TypeDeclaration(n) => n.comment.as_ref(),
            Node::Program(_) | Node::Comment(_) => None,
        }
    }

    /// Replaces the attached comment. Ignored for programs and comments.
    pub fn set_comment(&mut self, comment: Option<CommentNode>) {
        let slot = match self {
            Node::Number(n) => &mut n.comment,
            Node::Duration(n) => &mut n.comment,
            Node::Bool(n) => &mut n.comment,
            Node::String(n) => &mut n.comment,
            Node::Regex(n) => &mut n.comment,
            Node::Reference(n) => &mut n.comment,
            Node::Star(n) => &mut n.comment,
            Node::List(n) => &mut n.comment,
            Node::Unary(n) => &mut n.comment,
            Node::Binary(n) => &mut n.comment,
            Node::Identifier(n) => &mut n.comment,
            Node::Chain(n) => &mut n.comment,
            Node::Function(n) => &mut n.comment,
            Node::Lambda(n) => &mut n.comment,
            Node::Declaration(n) => &mut n.comment,
            Node::TypeDeclaration(n) => &mut n.comment,
            Node::Program(_) | Node::Comment(_) => return,
        };
        *slot = comment;
    }

    /// Builder form of [`Node::set_comment`].
    pub fn with_comment(mut self, comment: CommentNode) -> Node {
        self.set_comment(Some(comment));
        self
    }

    // Constructors. Nodes built here sit at `Position::default()`.

    pub fn int(value: i64) -> Node {
        Node::Number(NumberNode {
            position: Position::default(),
            value: Number::Int { value, base: 10 },
            comment: None,
        })
    }

    pub fn float(value: f64) -> Node {
        Node::Number(NumberNode {
            position: Position::default(),
            value: Number::Float(value),
            comment: None,
        })
    }

    pub fn duration(duration: Duration) -> Node {
        Node::Duration(DurationNode {
            position: Position::default(),
            duration,
            literal: String::new(),
            comment: None,
        })
    }

    pub fn bool(value: bool) -> Node {
        Node::Bool(BoolNode {
            position: Position::default(),
            value,
            comment: None,
        })
    }

    /// Single-quoted string holding `literal` verbatim.
    pub fn string(literal: impl Into<String>) -> Node {
        Node::String(StringNode {
            position: Position::default(),
            literal: literal.into(),
            triple_quoted: false,
            comment: None,
        })
    }

    /// Compiles `pattern`; any `/` in it is escaped when formatted.
    pub fn regex(pattern: &str) -> Result<Node, NodeError> {
        let literal = pattern.replace('/', "\\/");
        RegexNode::from_literal(Position::default(), &literal).map(Node::Regex)
    }

    pub fn reference(name: impl Into<String>) -> Node {
        Node::Reference(ReferenceNode {
            position: Position::default(),
            name: name.into(),
            comment: None,
        })
    }

    pub fn star() -> Node {
        Node::Star(StarNode {
            position: Position::default(),
            comment: None,
        })
    }

    pub fn list(items: Vec<Node>) -> Node {
        Node::List(ListNode {
            position: Position::default(),
            items,
            comment: None,
        })
    }

    pub fn identifier(name: impl Into<String>) -> Node {
        Node::Identifier(IdentifierNode::new(name))
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Node {
        Node::Unary(UnaryNode {
            position: Position::default(),
            op,
            operand: Box::new(operand),
            comment: None,
        })
    }

    pub fn binary(op: BinOp, left: Node, right: Node) -> Node {
        Node::Binary(BinaryNode {
            position: Position::default(),
            op,
            left: Box::new(left),
            right: Box::new(right),
            parenthesized: false,
            multiline: false,
            comment: None,
        })
    }

    /// Links `right` onto `left`. `right` must be a function or an
    /// identifier; chains only nest on the left.
    pub fn chain(op: ChainOp, left: Node, right: Node) -> Result<Node, NodeError> {
        match right {
            Node::Function(_) | Node::Identifier(_) => Ok(Node::Chain(ChainNode {
                position: Position::default(),
                op,
                left: Box::new(left),
                right: Box::new(right),
                comment: None,
            })),
            other => Err(NodeError::InvalidChainStep(other.type_name())),
        }
    }

    pub fn function(kind: FuncKind, name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::Function(FunctionNode {
            position: Position::default(),
            kind,
            name: name.into(),
            args,
            multiline: false,
            comment: None,
        })
    }

    pub fn lambda(expression: Node) -> Node {
        Node::Lambda(LambdaNode {
            position: Position::default(),
            expression: Box::new(expression),
            comment: None,
        })
    }

    pub fn declaration(name: impl Into<String>, value: Node) -> Node {
        Node::Declaration(DeclarationNode {
            position: Position::default(),
            name: IdentifierNode::new(name),
            value: Box::new(value),
            comment: None,
        })
    }

    pub fn type_declaration(name: impl Into<String>, type_name: impl Into<String>) -> Node {
        Node::TypeDeclaration(TypeDeclarationNode {
            position: Position::default(),
            name: IdentifierNode::new(name),
            type_name: IdentifierNode::new(type_name),
            comment: None,
        })
    }

    pub fn program(statements: Vec<Node>) -> Node {
        Node::Program(ProgramNode {
            position: Position::default(),
            statements,
        })
    }
}

#[test]
fn test_number_literals() {
    assert!(matches!(
        NumberNode::parse_literal("42"),
        Ok(Number::Int { value: 42, base: 10 })
    ));
    assert!(matches!(
        NumberNode::parse_literal("0644"),
        Ok(Number::Int { value: 420, base: 8 })
    ));
    assert!(matches!(NumberNode::parse_literal("0"), Ok(Number::Int { value: 0, base: 10 })));
    assert!(matches!(NumberNode::parse_literal("1.5"), Ok(Number::Float(f)) if f == 1.5));
    assert_eq!(
        NumberNode::parse_literal("09").unwrap_err().to_string(),
        "illegal number syntax: \"09\""
    );
}

#[test]
fn test_equality_ignores_layout() {
    let octal = Node::Number(NumberNode {
        position: Position::locate("x 010", 2),
        value: Number::Int { value: 8, base: 8 },
        comment: None,
    });
    assert_eq!(octal, Node::int(8));
    assert_ne!(Node::int(1), Node::float(1.0));

    let quoted = Node::String(StringNode::from_token(Position::default(), "'''it's'''"));
    assert_eq!(quoted, Node::string("it's"));
    let escaped = Node::String(StringNode::from_token(Position::default(), r"'it\'s'"));
    assert_eq!(escaped, Node::string("it's"));
}

#[test]
fn test_chain_rejects_non_step() {
    let err = Node::chain(ChainOp::Pipe, Node::identifier("stream"), Node::int(1)).unwrap_err();
    assert_eq!(err, NodeError::InvalidChainStep("number"));
}
