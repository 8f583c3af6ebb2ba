use std::fmt;
use std::str::FromStr;

use crate::ast::{ChainOp, CommentNode, Node, UnknownOperator};
use crate::lexer::Position;

/// How a function is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    /// Called on its own, e.g. `sigma("value")`
    Global,
    /// Called after `|`, creating a new pipeline node
    Chain,
    /// Called after `.`, setting a property
    Property,
    /// Called after `@`, a user defined function
    Dynamic,
}

impl FuncKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FuncKind::Global => "global",
            FuncKind::Chain => "chain",
            FuncKind::Property => "property",
            FuncKind::Dynamic => "dynamic",
        }
    }

    /// The kind of call a chain operator introduces.
    pub fn for_chain(op: ChainOp) -> FuncKind {
        match op {
            ChainOp::Dot => FuncKind::Property,
            ChainOp::Pipe => FuncKind::Chain,
            ChainOp::At => FuncKind::Dynamic,
        }
    }
}

impl FromStr for FuncKind {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(FuncKind::Global),
            "chain" => Ok(FuncKind::Chain),
            "property" => Ok(FuncKind::Property),
            "dynamic" => Ok(FuncKind::Dynamic),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for FuncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function call.
///
/// # Examples
/// ```text
/// window()
///     .period(10s)
///     .every(10s)
/// ```
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub position: Position,
    pub kind: FuncKind,
    pub name: String,
    pub args: Vec<Node>,
    /// Arguments were written one per line
    pub multiline: bool,
    pub comment: Option<CommentNode>,
}

impl PartialEq for FunctionNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.args == other.args
    }
}

/// One step of a chain. `right` is always a [`Node::Function`] or a
/// [`Node::Identifier`]; nesting happens through `left`.
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub position: Position,
    pub op: ChainOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub comment: Option<CommentNode>,
}

impl PartialEq for ChainNode {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.left == other.left && self.right == other.right
    }
}
