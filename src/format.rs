//! Canonical source rendering for TICKscript syntax trees.
//!
//! Every node renders itself given the current indentation prefix and
//! whether output is already positioned at the start of a line. The layout
//! conventions are:
//!
//! - comments come first, one `// ` line each, at the node's indentation
//! - chain steps go on their own line, one [`INDENT_STEP`] deeper than the
//!   chain (two for `.` property steps)
//! - multi-line argument lists put each argument on its own line and the
//!   closing paren back at the call's indentation
//! - program statements are separated by a blank line
//!
//! # Examples
//!
//! ```
//! use tickscript::format::format_script;
//!
//! let src = "var x = stream|from().measurement('cpu')";
//! assert_eq!(
//!     format_script(src).unwrap(),
//!     "var x = stream\n    |from()\n        .measurement('cpu')\n"
//! );
//! ```

use std::fmt;

use crate::ast::tokens::{KW_FALSE, KW_TRUE, KW_VAR};
use crate::ast::{
    BinaryNode, ChainNode, ChainOp, CommentNode, FunctionNode, IdentifierNode, Node, Number,
    COMMENT_BREAK,
};
use crate::duration::format_duration;
use crate::parser::{parse, ParseError};

/// One level of indentation.
pub const INDENT_STEP: &str = "    ";

/// Renders `node` starting at the beginning of a line with no indentation.
pub fn format(node: &Node) -> String {
    let mut buf = String::new();
    node.format_into(&mut buf, "", true);
    buf
}

/// Parses `source` and renders it canonically.
pub fn format_script(source: &str) -> Result<String, ParseError> {
    Ok(format(&parse(source)?))
}

fn write_indent(buf: &mut String, indent: &str, on_new_line: bool) {
    if on_new_line {
        buf.push_str(indent);
    }
}

impl Node {
    /// Appends the source text of this node to `buf`.
    ///
    /// `indent` is the prefix of the current line; `on_new_line` tells
    /// whether `buf` currently ends at the start of a line, in which case
    /// the node writes `indent` first.
    pub fn format_into(&self, buf: &mut String, indent: &str, on_new_line: bool) {
        self.format_node(buf, indent, on_new_line, false);
    }

    /// `force_parens` wraps a binary node in parentheses even when it was
    /// not written with them, so precedence survives for built trees.
    fn format_node(&self, buf: &mut String, indent: &str, on_new_line: bool, force_parens: bool) {
        let mut on_new_line = on_new_line;
        if !matches!(self, Node::Chain(_)) {
            if let Some(comment) = self.comment() {
                comment.format_into(buf, indent, on_new_line);
                on_new_line = true;
            }
        }

        match self {
            Node::Number(n) => {
                write_indent(buf, indent, on_new_line);
                match n.value {
                    Number::Int { value, base: 8 } => {
                        if value < 0 {
                            buf.push('-');
                        }
                        buf.push('0');
                        buf.push_str(&format!("{:o}", value.unsigned_abs()));
                    }
                    Number::Int { value, .. } => buf.push_str(&value.to_string()),
                    Number::Float(value) => {
                        let text = value.to_string();
                        buf.push_str(&text);
                        if !text.contains('.') {
                            buf.push_str(".0");
                        }
                    }
                }
            }
            Node::Duration(n) => {
                write_indent(buf, indent, on_new_line);
                if n.literal.is_empty() {
                    buf.push_str(&format_duration(n.duration));
                } else {
                    buf.push_str(&n.literal);
                }
            }
            Node::Bool(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push_str(if n.value { KW_TRUE } else { KW_FALSE });
            }
            Node::String(n) => {
                write_indent(buf, indent, on_new_line);
                if n.triple_quoted {
                    buf.push_str("'''");
                    buf.push_str(&n.literal);
                    buf.push_str("'''");
                } else {
                    buf.push('\'');
                    push_escaped(buf, &n.literal, '\'');
                    buf.push('\'');
                }
            }
            Node::Regex(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push('/');
                buf.push_str(&n.literal);
                buf.push('/');
            }
            Node::Reference(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push('"');
                push_escaped(buf, &n.name, '"');
                buf.push('"');
            }
            Node::Star(_) => {
                write_indent(buf, indent, on_new_line);
                buf.push('*');
            }
            Node::Identifier(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push_str(&n.name);
            }
            Node::List(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push('[');
                for (i, item) in n.items.iter().enumerate() {
                    if i != 0 {
                        buf.push_str(", ");
                    }
                    item.format_into(buf, indent, false);
                }
                buf.push(']');
            }
            Node::Unary(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push_str(n.op.as_str());
                let parens = matches!(*n.operand, Node::Binary(_));
                n.operand.format_node(buf, indent, false, parens);
            }
            Node::Binary(n) => {
                format_binary(n, buf, indent, on_new_line, force_parens || n.parenthesized)
            }
            Node::Chain(n) => format_chain(n, buf, indent, on_new_line),
            Node::Function(n) => format_function(n, buf, indent, on_new_line),
            Node::Lambda(n) => {
                write_indent(buf, indent, on_new_line);
                buf.push_str("lambda: ");
                n.expression.format_into(buf, indent, false);
            }
            Node::Declaration(n) => {
                buf.push_str(KW_VAR);
                buf.push(' ');
                format_identifier(&n.name, buf, indent, false);
                buf.push_str(" = ");
                n.value.format_into(buf, indent, false);
            }
            Node::TypeDeclaration(n) => {
                buf.push_str(KW_VAR);
                buf.push(' ');
                format_identifier(&n.name, buf, indent, false);
                buf.push(' ');
                format_identifier(&n.type_name, buf, indent, false);
            }
            Node::Program(n) => {
                for (i, statement) in n.statements.iter().enumerate() {
                    if i != 0 {
                        buf.push('\n');
                    }
                    statement.format_into(buf, indent, true);
                    buf.push('\n');
                }
            }
            Node::Comment(n) => n.format_into(buf, indent, on_new_line),
        }
    }
}

/// Declaration names and types keep the comments written before them.
fn format_identifier(ident: &IdentifierNode, buf: &mut String, indent: &str, on_new_line: bool) {
    let mut on_new_line = on_new_line;
    if let Some(comment) = &ident.comment {
        comment.format_into(buf, indent, on_new_line);
        on_new_line = true;
    }
    write_indent(buf, indent, on_new_line);
    buf.push_str(&ident.name);
}

fn push_escaped(buf: &mut String, text: &str, quote: char) {
    for c in text.chars() {
        if c == quote {
            buf.push('\\');
        }
        buf.push(c);
    }
}

fn format_binary(n: &BinaryNode, buf: &mut String, indent: &str, on_new_line: bool, parens: bool) {
    write_indent(buf, indent, on_new_line);
    let inner;
    let indent = if parens {
        buf.push('(');
        inner = format!("{}{}", indent, INDENT_STEP);
        inner.as_str()
    } else {
        indent
    };
    let precedence = n.op.precedence();
    n.left
        .format_node(buf, indent, false, binds_looser(&n.left, precedence, false));
    buf.push(' ');
    buf.push_str(n.op.as_str());
    buf.push(if n.multiline { '\n' } else { ' ' });
    n.right
        .format_node(buf, indent, n.multiline, binds_looser(&n.right, precedence, true));
    if parens {
        buf.push(')');
    }
}

/// Whether `operand` needs parentheses under an operator of `precedence`.
/// Operators associate to the left, so an equal right operand does too.
fn binds_looser(operand: &Node, precedence: u8, right: bool) -> bool {
    match operand {
        Node::Binary(b) if right => b.op.precedence() <= precedence,
        Node::Binary(b) => b.op.precedence() < precedence,
        _ => false,
    }
}

/// The step goes on its own line; the chain's comment sits directly above
/// the step.
fn format_chain(n: &ChainNode, buf: &mut String, indent: &str, on_new_line: bool) {
    n.left.format_into(buf, indent, on_new_line);
    buf.push('\n');
    let mut step_indent = format!("{}{}", indent, INDENT_STEP);
    if n.op == ChainOp::Dot {
        step_indent.push_str(INDENT_STEP);
    }
    if let Some(comment) = &n.comment {
        comment.format_into(buf, &step_indent, true);
    }
    buf.push_str(&step_indent);
    buf.push_str(n.op.as_str());
    n.right.format_into(buf, &step_indent, false);
}

fn format_function(n: &FunctionNode, buf: &mut String, indent: &str, on_new_line: bool) {
    write_indent(buf, indent, on_new_line);
    buf.push_str(&n.name);
    buf.push('(');
    let arg_indent = format!("{}{}", indent, INDENT_STEP);
    for (i, arg) in n.args.iter().enumerate() {
        if i != 0 {
            buf.push(',');
            if !n.multiline {
                buf.push(' ');
            }
        }
        if n.multiline {
            buf.push('\n');
        }
        arg.format_into(buf, &arg_indent, n.multiline);
    }
    if n.multiline && !n.args.is_empty() {
        buf.push('\n');
        buf.push_str(indent);
    }
    buf.push(')');
}

impl CommentNode {
    /// Writes the comment lines, each ending with a newline. Starts a new
    /// line first when `on_new_line` is false.
    pub fn format_into(&self, buf: &mut String, indent: &str, on_new_line: bool) {
        if !on_new_line {
            buf.push('\n');
        }
        for line in &self.lines {
            if line == COMMENT_BREAK {
                buf.push('\n');
                continue;
            }
            buf.push_str(indent);
            buf.push_str("//");
            if !line.is_empty() {
                buf.push(' ');
                buf.push_str(line);
            }
            buf.push('\n');
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}

#[test]
fn test_number_rendering() {
    assert_eq!(format(&Node::float(2.0)), "2.0");
    assert_eq!(format(&Node::float(0.25)), "0.25");
    assert_eq!(format(&Node::int(-3)), "-3");
}

#[test]
fn test_chain_comment_sits_above_step() {
    let mut chain = Node::chain(
        ChainOp::Pipe,
        Node::identifier("stream"),
        Node::function(crate::ast::FuncKind::Chain, "from", vec![]),
    )
    .unwrap();
    chain.set_comment(Some(CommentNode::new(vec!["source".into()])));
    assert_eq!(format(&chain), "stream\n    // source\n    |from()");
}
