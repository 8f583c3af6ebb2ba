use crate::ast::Node;
use crate::lexer::Position;

/// A complete script: statements in source order, with trailing comments
/// kept as [`Node::Comment`] entries.
#[derive(Debug, Clone, Default)]
pub struct ProgramNode {
    pub position: Position,
    pub statements: Vec<Node>,
}

impl ProgramNode {
    pub fn push(&mut self, node: Node) {
        self.statements.push(node);
    }
}

impl PartialEq for ProgramNode {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}

/// Entry of [`CommentNode::lines`] marking a boundary between two comment
/// blocks.
pub const COMMENT_BREAK: &str = "\n";

/// Comment lines with the `//` marker and one leading space removed.
#[derive(Debug, Clone, Default)]
pub struct CommentNode {
    pub position: Position,
    pub lines: Vec<String>,
}

impl CommentNode {
    pub fn new(lines: Vec<String>) -> Self {
        CommentNode {
            position: Position::default(),
            lines,
        }
    }

    /// Builds a comment from raw comment token texts. Consecutive tokens
    /// are separated by a [`COMMENT_BREAK`] entry.
    pub fn from_tokens<S: AsRef<str>>(position: Position, tokens: &[S]) -> Self {
        let mut lines = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            if i != 0 {
                lines.push(COMMENT_BREAK.to_string());
            }
            for line in token.as_ref().split('\n') {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let line = line.strip_prefix("//").unwrap_or(line);
                let line = line.strip_prefix(' ').unwrap_or(line);
                lines.push(line.to_string());
            }
        }
        CommentNode { position, lines }
    }
}

/// Comments never affect structural equality.
impl PartialEq for CommentNode {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[test]
fn test_comment_from_tokens() {
    let comment = CommentNode::from_tokens(
        Position::default(),
        &["// first\n   //second\n", "//  indented\n"],
    );
    assert_eq!(comment.lines, vec!["first", "second", "\n", " indented"]);
}
