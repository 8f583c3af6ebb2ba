// tests/walk_tests.rs

use std::collections::HashMap;

use thiserror::Error;
use tickscript::ast::{BinOp, Node};
use tickscript::format::format;
use tickscript::parser::parse;
use tickscript::walk::{find_function_calls, find_references, inspect, walk, WalkError};

#[derive(Debug, Error)]
enum TestError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("stopped at {0}")]
    Stopped(&'static str),
}

fn visit_order(root: &Node) -> Vec<&'static str> {
    let mut order = Vec::new();
    inspect(root, &mut |node: &Node| order.push(node.type_name()));
    order
}

fn lambda_with_vars() -> Node {
    Node::lambda(Node::binary(
        BinOp::And,
        Node::binary(
            BinOp::LessThan,
            Node::reference("value"),
            Node::identifier("VAR_A"),
        ),
        Node::binary(
            BinOp::GreaterThan,
            Node::reference("value"),
            Node::identifier("VAR_B"),
        ),
    ))
}

// ============================================================================
// Visit order
// ============================================================================

#[test]
fn test_walk_order() {
    let root = parse(r#"var x = lambda: "value" < 10"#).unwrap();
    let mut order = Vec::new();
    walk(root, &mut |node: Node| -> Result<Node, WalkError> {
        order.push(node.type_name());
        Ok(node)
    })
    .unwrap();
    assert_eq!(
        order,
        vec![
            "program",
            "declaration",
            "identifier",
            "lambda",
            "binary",
            "reference",
            "number"
        ]
    );
}

#[test]
fn test_inspect_matches_walk_order() {
    let root = parse("var x = stream|window().period(10s)\nvar t int").unwrap();
    assert_eq!(
        visit_order(&root),
        vec![
            "program",
            "declaration",
            "identifier",
            "chain",
            "chain",
            "identifier",
            "func",
            "func",
            "duration",
            "typeDeclaration",
            "identifier",
            "identifier",
        ]
    );
}

#[test]
fn test_lists_and_unary_are_descended() {
    let root = parse("f(['a', *], -x)").unwrap();
    assert_eq!(
        visit_order(&root),
        vec![
            "program",
            "func",
            "list",
            "string",
            "star",
            "unary",
            "identifier"
        ]
    );
}

// ============================================================================
// Mutation
// ============================================================================

#[test]
fn test_walk_replaces_identifiers() {
    let numbers: HashMap<&str, i64> = [("VAR_A", 42), ("VAR_B", 3)].into_iter().collect();
    let replaced = walk(lambda_with_vars(), &mut |node: Node| -> Result<Node, WalkError> {
        Ok(match node {
            Node::Identifier(ref ident) => Node::int(numbers[ident.name.as_str()]),
            other => other,
        })
    })
    .unwrap();

    assert_eq!(
        visit_order(&replaced),
        vec![
            "lambda",
            "binary",
            "binary",
            "reference",
            "number",
            "binary",
            "reference",
            "number"
        ]
    );
    assert_eq!(format(&replaced), r#"lambda: "value" < 42 AND "value" > 3"#);
}

#[test]
fn test_replacement_children_are_visited() {
    let mut seen = Vec::new();
    let out = walk(Node::identifier("wrap"), &mut |node: Node| -> Result<Node, WalkError> {
        seen.push(node.type_name());
        Ok(match node {
            Node::Identifier(ref i) if i.name == "wrap" => {
                Node::unary(tickscript::UnaryOp::Not, Node::bool(true))
            }
            other => other,
        })
    })
    .unwrap();
    assert_eq!(seen, vec!["identifier", "bool"]);
    assert_eq!(format(&out), "!TRUE");
}

#[test]
fn test_walk_stops_at_first_error() {
    let mut visited = 0;
    let result = walk(lambda_with_vars(), &mut |node: Node| -> Result<Node, TestError> {
        visited += 1;
        if matches!(node, Node::Reference(_)) {
            return Err(TestError::Stopped("reference"));
        }
        Ok(node)
    });
    assert!(matches!(result, Err(TestError::Stopped("reference"))));
    assert_eq!(visited, 4);
}

#[test]
fn test_declaration_name_must_remain_identifier() {
    let root = parse("var x = 1").unwrap();
    let result = walk(root, &mut |node: Node| -> Result<Node, TestError> {
        Ok(match node {
            Node::Identifier(_) => Node::string("nope"),
            other => other,
        })
    });
    match result {
        Err(TestError::Walk(e)) => assert_eq!(
            e.to_string(),
            "declaration name must remain an identifier, got string"
        ),
        other => panic!("expected walk error, got {:?}", other),
    }
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_find_references() {
    let root = parse(
        r#"stream
    |where(lambda: "host" == 'a' AND "value" > 10)
    |eval(lambda: "value" * 2, lambda: "cpu")"#,
    )
    .unwrap();
    assert_eq!(find_references(&[root]), vec!["host", "value", "cpu"]);
}

#[test]
fn test_find_function_calls() {
    let root = parse(
        r#"stream
    |from()
        .measurement('cpu')
    |eval(lambda: sigma("value"), lambda: abs(sigma("x")))"#,
    )
    .unwrap();
    assert_eq!(
        find_function_calls(&[root]),
        vec!["from", "measurement", "eval", "sigma", "abs"]
    );
}

#[test]
fn test_find_across_nodes() {
    let a = Node::lambda(Node::reference("a"));
    let b = Node::lambda(Node::binary(BinOp::Add, Node::reference("b"), Node::reference("a")));
    assert_eq!(find_references(&[a, b]), vec!["a", "b"]);
    assert!(find_function_calls(&[Node::int(1)]).is_empty());
}
