//! JSON encoding of TICKscript syntax trees.
//!
//! Every node becomes an object whose `typeOf` field names its kind:
//!
//! | `typeOf`          | fields                                         |
//! |-------------------|------------------------------------------------|
//! | `number`          | `isint`, `isfloat`, `int64`, `float64`, `base` |
//! | `duration`        | `duration` (e.g. `"10s"`)                      |
//! | `bool`            | `bool`                                         |
//! | `unary`           | `operator`, `node`                             |
//! | `binary`          | `operator`, `left`, `right`                    |
//! | `declaration`     | `left`, `right`                                |
//! | `typeDeclaration` | `node`, `type`                                 |
//! | `chain`           | `operator`, `left`, `right`                    |
//! | `identifier`      | `ident`                                        |
//! | `reference`       | `reference`                                    |
//! | `string`          | `literal`                                      |
//! | `list`            | `nodes`                                        |
//! | `regex`           | `regex`                                        |
//! | `star`            |                                                |
//! | `func`            | `func`, `functionType`, `args`                 |
//! | `lambda`          | `expression`                                   |
//! | `program`         | `nodes`                                        |
//! | `comment`         | `comments`                                     |
//!
//! Positions, attached comments and layout hints are not encoded, so a
//! decoded tree is structurally equal to the encoded one but formats with
//! default layout.
//!
//! # Examples
//!
//! ```
//! use tickscript::ast::Node;
//! use tickscript::json::{from_json, to_json};
//!
//! let node = Node::reference("value");
//! let text = to_json(&node).unwrap();
//! assert_eq!(text, r#"{"reference":"value","typeOf":"reference"}"#);
//! assert_eq!(from_json(&text).unwrap(), node);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::ast::{
    BinOp, ChainOp, CommentNode, FuncKind, IdentifierNode, LambdaNode, Node, NodeError, Number,
    NumberNode, UnaryOp, UnknownOperator,
};
use crate::duration::{format_duration, parse_duration};
use crate::lexer::Position;

/// Name of the discriminator field.
pub const TYPE_OF: &str = "typeOf";

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("missing typeOf field")]
    MissingTypeOf,

    #[error("error unmarshaling node type {expected}; received {received}")]
    TypeMismatch { expected: String, received: String },

    #[error("unknown node type {0:?}")]
    UnknownType(String),

    #[error("expected node type but is {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Operator(#[from] UnknownOperator),

    #[error("integer base cannot be zero")]
    ZeroBase,

    /// Only octal and decimal integers can be written as literals.
    #[error("invalid integer base {0}")]
    InvalidBase(i64),

    #[error("number node is neither an integer nor a float")]
    NotANumber,

    #[error("{field} must be an identifier, got {found}")]
    NotAnIdentifier {
        field: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Wire form of a node.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "typeOf", rename_all = "camelCase")]
enum JsonNode {
    Number {
        isint: bool,
        isfloat: bool,
        #[serde(default)]
        int64: i64,
        #[serde(default)]
        float64: f64,
        #[serde(default)]
        base: i64,
    },
    Duration {
        duration: String,
    },
    Bool {
        bool: bool,
    },
    Unary {
        operator: String,
        node: Box<JsonNode>,
    },
    Binary {
        operator: String,
        left: Box<JsonNode>,
        right: Box<JsonNode>,
    },
    Declaration {
        left: Box<JsonNode>,
        right: Box<JsonNode>,
    },
    TypeDeclaration {
        node: Box<JsonNode>,
        #[serde(rename = "type")]
        type_name: Box<JsonNode>,
    },
    Chain {
        operator: String,
        left: Box<JsonNode>,
        right: Box<JsonNode>,
    },
    Identifier {
        ident: String,
    },
    Reference {
        reference: String,
    },
    String {
        literal: String,
    },
    List {
        nodes: Vec<JsonNode>,
    },
    Regex {
        regex: String,
    },
    Star {},
    Func {
        func: String,
        #[serde(rename = "functionType")]
        function_type: String,
        args: Vec<JsonNode>,
    },
    Lambda {
        expression: Box<JsonNode>,
    },
    Program {
        nodes: Vec<JsonNode>,
    },
    Comment {
        comments: Vec<String>,
    },
}

const NODE_TYPES: &[&str] = &[
    "number",
    "duration",
    "bool",
    "unary",
    "binary",
    "declaration",
    "typeDeclaration",
    "chain",
    "identifier",
    "reference",
    "string",
    "list",
    "regex",
    "star",
    "func",
    "lambda",
    "program",
    "comment",
];

fn boxed(node: &Node) -> Box<JsonNode> {
    Box::new(JsonNode::from(node))
}

fn identifier(ident: &IdentifierNode) -> Box<JsonNode> {
    Box::new(JsonNode::Identifier {
        ident: ident.name.clone(),
    })
}

impl From<&Node> for JsonNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Number(n) => match n.value {
                Number::Int { value, base } => JsonNode::Number {
                    isint: true,
                    isfloat: false,
                    int64: value,
                    float64: 0.0,
                    base: i64::from(base),
                },
                Number::Float(value) => JsonNode::Number {
                    isint: false,
                    isfloat: true,
                    int64: 0,
                    float64: value,
                    base: 0,
                },
            },
            Node::Duration(n) => JsonNode::Duration {
                duration: format_duration(n.duration),
            },
            Node::Bool(n) => JsonNode::Bool { bool: n.value },
            Node::Unary(n) => JsonNode::Unary {
                operator: n.op.as_str().to_string(),
                node: boxed(&n.operand),
            },
            Node::Binary(n) => JsonNode::Binary {
                operator: n.op.as_str().to_string(),
                left: boxed(&n.left),
                right: boxed(&n.right),
            },
            Node::Declaration(n) => JsonNode::Declaration {
                left: identifier(&n.name),
                right: boxed(&n.value),
            },
            Node::TypeDeclaration(n) => JsonNode::TypeDeclaration {
                node: identifier(&n.name),
                type_name: identifier(&n.type_name),
            },
            Node::Chain(n) => JsonNode::Chain {
                operator: n.op.as_str().to_string(),
                left: boxed(&n.left),
                right: boxed(&n.right),
            },
            Node::Identifier(n) => JsonNode::Identifier {
                ident: n.name.clone(),
            },
            Node::Reference(n) => JsonNode::Reference {
                reference: n.name.clone(),
            },
            Node::String(n) => JsonNode::String {
                literal: n.literal.clone(),
            },
            Node::List(n) => JsonNode::List {
                nodes: n.items.iter().map(JsonNode::from).collect(),
            },
            Node::Regex(n) => JsonNode::Regex {
                regex: n.regex.as_str().to_string(),
            },
            Node::Star(_) => JsonNode::Star {},
            Node::Function(n) => JsonNode::Func {
                func: n.name.clone(),
                function_type: n.kind.as_str().to_string(),
                args: n.args.iter().map(JsonNode::from).collect(),
            },
            Node::Lambda(n) => JsonNode::Lambda {
                expression: boxed(&n.expression),
            },
            Node::Program(n) => JsonNode::Program {
                nodes: n.statements.iter().map(JsonNode::from).collect(),
            },
            Node::Comment(n) => JsonNode::Comment {
                comments: n.lines.clone(),
            },
        }
    }
}

fn decode(node: JsonNode) -> Result<Node, JsonError> {
    Node::try_from(node)
}

fn decode_all(nodes: Vec<JsonNode>) -> Result<Vec<Node>, JsonError> {
    nodes.into_iter().map(decode).collect()
}

fn decode_identifier(node: JsonNode, field: &'static str) -> Result<IdentifierNode, JsonError> {
    match decode(node)? {
        Node::Identifier(ident) => Ok(ident),
        other => Err(JsonError::NotAnIdentifier {
            field,
            found: other.type_name(),
        }),
    }
}

impl TryFrom<JsonNode> for Node {
    type Error = JsonError;

    fn try_from(node: JsonNode) -> Result<Self, Self::Error> {
        let node = match node {
            JsonNode::Number {
                isint,
                isfloat,
                int64,
                float64,
                base,
            } => {
                if isint {
                    if base == 0 {
                        return Err(JsonError::ZeroBase);
                    }
                    let base = match base {
                        8 => 8,
                        10 => 10,
                        other => return Err(JsonError::InvalidBase(other)),
                    };
                    Node::Number(NumberNode {
                        position: Position::default(),
                        value: Number::Int { value: int64, base },
                        comment: None,
                    })
                } else if isfloat {
                    Node::float(float64)
                } else {
                    return Err(JsonError::NotANumber);
                }
            }
            JsonNode::Duration { duration } => Node::duration(
                parse_duration(&duration).map_err(|err| JsonError::Node(err.into()))?,
            ),
            JsonNode::Bool { bool } => Node::bool(bool),
            JsonNode::Unary { operator, node } => {
                Node::unary(operator.parse::<UnaryOp>()?, decode(*node)?)
            }
            JsonNode::Binary {
                operator,
                left,
                right,
            } => Node::binary(operator.parse::<BinOp>()?, decode(*left)?, decode(*right)?),
            JsonNode::Declaration { left, right } => {
                let name = decode_identifier(*left, "declaration left")?;
                Node::declaration(name.name, decode(*right)?)
            }
            JsonNode::TypeDeclaration { node, type_name } => {
                let name = decode_identifier(*node, "typeDeclaration node")?;
                let type_name = decode_identifier(*type_name, "typeDeclaration type")?;
                Node::type_declaration(name.name, type_name.name)
            }
            JsonNode::Chain {
                operator,
                left,
                right,
            } => Node::chain(operator.parse::<ChainOp>()?, decode(*left)?, decode(*right)?)?,
            JsonNode::Identifier { ident } => Node::identifier(ident),
            JsonNode::Reference { reference } => Node::reference(reference),
            JsonNode::String { literal } => Node::string(literal),
            JsonNode::List { nodes } => Node::list(decode_all(nodes)?),
            JsonNode::Regex { regex } => Node::regex(&regex)?,
            JsonNode::Star {} => Node::star(),
            JsonNode::Func {
                func,
                function_type,
                args,
            } => Node::function(function_type.parse::<FuncKind>()?, func, decode_all(args)?),
            JsonNode::Lambda { expression } => Node::lambda(decode(*expression)?),
            JsonNode::Program { nodes } => Node::program(decode_all(nodes)?),
            JsonNode::Comment { comments } => Node::Comment(CommentNode::new(comments)),
        };
        Ok(node)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let node = JsonNode::deserialize(deserializer)?;
        Node::try_from(node).map_err(serde::de::Error::custom)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads the `typeOf` discriminator of an encoded node.
pub fn type_of(value: &Value) -> Result<&str, JsonError> {
    let object = value
        .as_object()
        .ok_or_else(|| JsonError::NotAnObject(value_kind(value)))?;
    match object.get(TYPE_OF) {
        Some(Value::String(name)) => Ok(name),
        Some(other) => Err(JsonError::TypeMismatch {
            expected: "string typeOf".to_string(),
            received: other.to_string(),
        }),
        None => Err(JsonError::MissingTypeOf),
    }
}

/// Encodes `node` as a JSON value.
pub fn marshal(node: &Node) -> Result<Value, JsonError> {
    Ok(serde_json::to_value(JsonNode::from(node))?)
}

/// Encodes `node` as compact JSON text with sorted keys.
pub fn to_json(node: &Node) -> Result<String, JsonError> {
    Ok(marshal(node)?.to_string())
}

/// Encodes `node` as indented JSON text with sorted keys.
pub fn to_json_pretty(node: &Node) -> Result<String, JsonError> {
    Ok(serde_json::to_string_pretty(&marshal(node)?)?)
}

/// Decodes any node.
pub fn unmarshal(value: Value) -> Result<Node, JsonError> {
    let kind = type_of(&value)?;
    if !NODE_TYPES.contains(&kind) {
        return Err(JsonError::UnknownType(kind.to_string()));
    }
    decode(serde_json::from_value(value)?)
}

/// Decodes a node that must be of kind `expected` (a `typeOf` name).
pub fn unmarshal_as(expected: &str, value: Value) -> Result<Node, JsonError> {
    let kind = type_of(&value)?;
    if kind != expected {
        return Err(JsonError::TypeMismatch {
            expected: expected.to_string(),
            received: kind.to_string(),
        });
    }
    unmarshal(value)
}

/// Decodes a lambda node.
pub fn unmarshal_lambda(value: Value) -> Result<LambdaNode, JsonError> {
    match unmarshal_as("lambda", value)? {
        Node::Lambda(lambda) => Ok(lambda),
        other => Err(JsonError::TypeMismatch {
            expected: "lambda".to_string(),
            received: other.type_name().to_string(),
        }),
    }
}

/// Decodes a node from JSON text.
pub fn from_json(text: &str) -> Result<Node, JsonError> {
    unmarshal(serde_json::from_str(text)?)
}

#[test]
fn test_duration_uses_canonical_spelling() {
    use crate::ast::DurationNode;

    let node = Node::Duration(DurationNode::from_literal(Position::default(), "60s").unwrap());
    assert_eq!(to_json(&node).unwrap(), r#"{"duration":"1m","typeOf":"duration"}"#);
}

#[test]
fn test_binary_operator_spelling() {
    use crate::ast::BinaryNode;

    let node = Node::Binary(BinaryNode {
        position: Position::default(),
        op: BinOp::RegexNotEqual,
        left: Box::new(Node::reference("host")),
        right: Box::new(Node::regex("^a/b$").unwrap()),
        parenthesized: true,
        multiline: false,
        comment: None,
    });
    let value = marshal(&node).unwrap();
    assert_eq!(value["operator"], "!~");
    assert_eq!(value["right"]["regex"], "^a/b$");
    assert_eq!(unmarshal(value).unwrap(), node);
}
