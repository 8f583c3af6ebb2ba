use crate::ast::{CommentNode, IdentifierNode, Node};
use crate::lexer::Position;

/// Variable declaration.
///
/// # Example
/// ```text
/// var period = 10s
/// ```
#[derive(Debug, Clone)]
pub struct DeclarationNode {
    pub position: Position,
    pub name: IdentifierNode,
    pub value: Box<Node>,
    pub comment: Option<CommentNode>,
}

impl PartialEq for DeclarationNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

/// Typed variable declaration without a value, used by template tasks.
///
/// # Example
/// ```text
/// var measurement string
/// ```
#[derive(Debug, Clone)]
pub struct TypeDeclarationNode {
    pub position: Position,
    pub name: IdentifierNode,
    pub type_name: IdentifierNode,
    pub comment: Option<CommentNode>,
}

impl PartialEq for TypeDeclarationNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name
    }
}
