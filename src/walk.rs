//! Generic traversal of TICKscript syntax trees.
//!
//! [`walk`] visits nodes in pre-order and lets the visitor replace each
//! node before its children are visited. [`inspect`] is the read-only
//! counterpart. Child order:
//!
//! | node              | children                 |
//! |-------------------|--------------------------|
//! | `Program`         | statements               |
//! | `Declaration`     | name, value              |
//! | `TypeDeclaration` | name, type               |
//! | `Chain`           | left, right              |
//! | `Function`        | arguments                |
//! | `Lambda`          | expression               |
//! | `Binary`          | left, right              |
//! | `Unary`           | operand                  |
//! | `List`            | items                    |
//!
//! All other nodes are leaves.

use thiserror::Error;

use crate::ast::{IdentifierNode, Node};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    /// A declaration name was replaced by something other than an identifier.
    #[error("{context} must remain an identifier, got {found}")]
    NotAnIdentifier {
        context: &'static str,
        found: &'static str,
    },
}

/// Walks `root` in pre-order, replacing each node with what `visit`
/// returns and then descending into the replacement.
///
/// The first error returned by `visit` aborts the walk.
///
/// # Examples
///
/// ```
/// use tickscript::ast::Node;
/// use tickscript::walk::{walk, WalkError};
///
/// let root = Node::lambda(Node::identifier("THRESHOLD"));
/// let out = walk(root, &mut |node: Node| -> Result<Node, WalkError> {
///     Ok(match node {
///         Node::Identifier(ref i) if i.name == "THRESHOLD" => Node::int(90),
///         other => other,
///     })
/// })
/// .unwrap();
/// assert_eq!(out, Node::lambda(Node::int(90)));
/// ```
pub fn walk<E, F>(root: Node, visit: &mut F) -> Result<Node, E>
where
    E: From<WalkError>,
    F: FnMut(Node) -> Result<Node, E>,
{
    let mut node = visit(root)?;
    match &mut node {
        Node::Program(n) => walk_all(&mut n.statements, visit)?,
        Node::Declaration(n) => {
            n.name = walk_identifier(&n.name, "declaration name", visit)?;
            walk_boxed(&mut n.value, visit)?;
        }
        Node::TypeDeclaration(n) => {
            n.name = walk_identifier(&n.name, "declaration name", visit)?;
            n.type_name = walk_identifier(&n.type_name, "declaration type", visit)?;
        }
        Node::Chain(n) => {
            walk_boxed(&mut n.left, visit)?;
            walk_boxed(&mut n.right, visit)?;
        }
        Node::Function(n) => walk_all(&mut n.args, visit)?,
        Node::Lambda(n) => walk_boxed(&mut n.expression, visit)?,
        Node::Binary(n) => {
            walk_boxed(&mut n.left, visit)?;
            walk_boxed(&mut n.right, visit)?;
        }
        Node::Unary(n) => walk_boxed(&mut n.operand, visit)?,
        Node::List(n) => walk_all(&mut n.items, visit)?,
        Node::Number(_)
        | Node::Duration(_)
        | Node::Bool(_)
        | Node::String(_)
        | Node::Regex(_)
        | Node::Reference(_)
        | Node::Star(_)
        | Node::Identifier(_)
        | Node::Comment(_) => {}
    }
    Ok(node)
}

fn walk_boxed<E, F>(slot: &mut Box<Node>, visit: &mut F) -> Result<(), E>
where
    E: From<WalkError>,
    F: FnMut(Node) -> Result<Node, E>,
{
    let child = std::mem::replace(slot.as_mut(), Node::star());
    **slot = walk(child, visit)?;
    Ok(())
}

fn walk_all<E, F>(nodes: &mut Vec<Node>, visit: &mut F) -> Result<(), E>
where
    E: From<WalkError>,
    F: FnMut(Node) -> Result<Node, E>,
{
    let children = std::mem::take(nodes);
    for child in children {
        nodes.push(walk(child, visit)?);
    }
    Ok(())
}

fn walk_identifier<E, F>(
    ident: &IdentifierNode,
    context: &'static str,
    visit: &mut F,
) -> Result<IdentifierNode, E>
where
    E: From<WalkError>,
    F: FnMut(Node) -> Result<Node, E>,
{
    match walk(Node::Identifier(ident.clone()), visit)? {
        Node::Identifier(ident) => Ok(ident),
        other => Err(WalkError::NotAnIdentifier {
            context,
            found: other.type_name(),
        }
        .into()),
    }
}

/// Visits every node of `root` in the same order as [`walk`] without
/// modifying it.
pub fn inspect<F: FnMut(&Node)>(root: &Node, visit: &mut F) {
    visit(root);
    match root {
        Node::Program(n) => {
            for statement in &n.statements {
                inspect(statement, visit);
            }
        }
        Node::Declaration(n) => {
            inspect_identifier(&n.name, visit);
            inspect(&n.value, visit);
        }
        Node::TypeDeclaration(n) => {
            inspect_identifier(&n.name, visit);
            inspect_identifier(&n.type_name, visit);
        }
        Node::Chain(n) => {
            inspect(&n.left, visit);
            inspect(&n.right, visit);
        }
        Node::Function(n) => {
            for arg in &n.args {
                inspect(arg, visit);
            }
        }
        Node::Lambda(n) => inspect(&n.expression, visit),
        Node::Binary(n) => {
            inspect(&n.left, visit);
            inspect(&n.right, visit);
        }
        Node::Unary(n) => inspect(&n.operand, visit),
        Node::List(n) => {
            for item in &n.items {
                inspect(item, visit);
            }
        }
        _ => {}
    }
}

fn inspect_identifier<F: FnMut(&Node)>(ident: &IdentifierNode, visit: &mut F) {
    inspect(&Node::Identifier(ident.clone()), visit);
}

/// Names of all field references under `nodes`, each listed once in the
/// order first seen.
pub fn find_references(nodes: &[Node]) -> Vec<String> {
    collect_names(nodes, |node| match node {
        Node::Reference(r) => Some(&r.name),
        _ => None,
    })
}

/// Names of all called functions under `nodes`, each listed once in the
/// order first seen.
pub fn find_function_calls(nodes: &[Node]) -> Vec<String> {
    collect_names(nodes, |node| match node {
        Node::Function(f) => Some(&f.name),
        _ => None,
    })
}

fn collect_names<F>(nodes: &[Node], name_of: F) -> Vec<String>
where
    F: Fn(&Node) -> Option<&String>,
{
    let mut names: Vec<String> = Vec::new();
    for node in nodes {
        inspect(node, &mut |n: &Node| {
            if let Some(name) = name_of(n) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        });
    }
    names
}

#[test]
fn test_declaration_name_must_stay_identifier() {
    let root = Node::declaration("x", Node::int(1));
    let err = walk(root, &mut |node: Node| -> Result<Node, WalkError> {
        Ok(match node {
            Node::Identifier(_) => Node::int(2),
            other => other,
        })
    })
    .unwrap_err();
    assert_eq!(
        err,
        WalkError::NotAnIdentifier {
            context: "declaration name",
            found: "number"
        }
    );
}
