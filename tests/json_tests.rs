// tests/json_tests.rs

use serde_json::json;
use tickscript::ast::{BinOp, ChainOp, FuncKind, Node, NodeError};
use tickscript::format::format;
use tickscript::json::{
    from_json, marshal, to_json, to_json_pretty, type_of, unmarshal, unmarshal_as,
    unmarshal_lambda, JsonError,
};
use tickscript::parser::parse;

const SCRIPT: &str = r#"// Alert on high cpu
var period = 10s
var threshold float

var data = stream
    |from()
        .measurement('cpu')
        .where(lambda: "host" =~ /^server\/[0-9]+$/ AND "cpu" != 'cpu-total')
    |window()
        .period(period)
        .every(1m)
    @movingAverage()
        .field('value')
        .size(0644)

data
    |groupBy(*)
    |alert()
        .crit(lambda: "value" > threshold OR !("idle" >= -2.5))
        .details('''{{ .Name }} is 'hot' ''')
    |eval(lambda: sigma("value") % 2)
        .keep(['a', b, *])

// done
"#;

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_binary_encoding() {
    let node = Node::binary(BinOp::Add, Node::reference("a"), Node::int(1));
    assert_eq!(
        to_json(&node).unwrap(),
        concat!(
            r#"{"left":{"reference":"a","typeOf":"reference"},"operator":"+","#,
            r#""right":{"base":10,"float64":0.0,"int64":1,"isfloat":false,"isint":true,"typeOf":"number"},"#,
            r#""typeOf":"binary"}"#
        )
    );
}

#[test]
fn test_function_and_chain_encoding() {
    let node = Node::chain(
        ChainOp::Pipe,
        Node::identifier("stream"),
        Node::function(FuncKind::Chain, "from", vec![]),
    )
    .unwrap();
    assert_eq!(
        marshal(&node).unwrap(),
        json!({
            "typeOf": "chain",
            "operator": "|",
            "left": {"typeOf": "identifier", "ident": "stream"},
            "right": {"typeOf": "func", "func": "from", "functionType": "chain", "args": []}
        })
    );
}

#[test]
fn test_declaration_encoding() {
    let value = marshal(&parse("var x int\nvar y = TRUE").unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "typeOf": "program",
            "nodes": [
                {
                    "typeOf": "typeDeclaration",
                    "node": {"typeOf": "identifier", "ident": "x"},
                    "type": {"typeOf": "identifier", "ident": "int"}
                },
                {
                    "typeOf": "declaration",
                    "left": {"typeOf": "identifier", "ident": "y"},
                    "right": {"typeOf": "bool", "bool": true}
                }
            ]
        })
    );
}

#[test]
fn test_leaf_encodings() {
    let list = Node::list(vec![Node::string("a"), Node::star()]);
    assert_eq!(
        marshal(&list).unwrap(),
        json!({
            "typeOf": "list",
            "nodes": [{"typeOf": "string", "literal": "a"}, {"typeOf": "star"}]
        })
    );
    assert_eq!(
        marshal(&Node::float(1.5)).unwrap(),
        json!({"typeOf": "number", "isint": false, "isfloat": true, "int64": 0, "float64": 1.5, "base": 0})
    );
    assert_eq!(
        marshal(&Node::regex("^a/b").unwrap()).unwrap(),
        json!({"typeOf": "regex", "regex": "^a/b"})
    );
}

#[test]
fn test_serde_impls_agree() {
    let node = parse(SCRIPT).unwrap();
    assert_eq!(serde_json::to_value(&node).unwrap(), marshal(&node).unwrap());
    let decoded: Node = serde_json::from_str(&to_json(&node).unwrap()).unwrap();
    assert_eq!(decoded, node);
}

#[test]
fn test_pretty_output_parses_back() {
    let node = parse(SCRIPT).unwrap();
    let pretty = to_json_pretty(&node).unwrap();
    assert!(pretty.contains("\n  \"nodes\": ["), "{}", pretty);
    assert_eq!(from_json(&pretty).unwrap(), node);
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_script_round_trip() {
    let node = parse(SCRIPT).unwrap();
    let decoded = unmarshal(marshal(&node).unwrap()).unwrap();
    assert_eq!(decoded, node);
    // Layout and comments attached to nodes are not encoded, but the
    // formatted decoded tree still parses to the same structure.
    assert_eq!(parse(&format(&decoded)).unwrap(), node);
}

#[test]
fn test_octal_base_survives() {
    let node = parse("var mode = 0644").unwrap();
    let decoded = from_json(&to_json(&node).unwrap()).unwrap();
    assert_eq!(format(&decoded), "var mode = 0644\n");
}

#[test]
fn test_negative_octal_keeps_its_value() {
    let value = json!({"typeOf": "number", "isint": true, "isfloat": false, "int64": -8, "base": 8});
    let formatted = format(&unmarshal(value).unwrap());
    assert_eq!(formatted, "-010");
    let program = format!("var x = {}", formatted);
    assert_eq!(format(&parse(&program).unwrap()), "var x = -010\n");
}

#[test]
fn test_duration_decodes_to_canonical_spelling() {
    let node = parse("var x = 60s").unwrap();
    let decoded = from_json(&to_json(&node).unwrap()).unwrap();
    assert_eq!(decoded, node);
    assert_eq!(format(&decoded), "var x = 1m\n");
}

#[test]
fn test_lambda_round_trip() {
    let lambda = match parse(r#"lambda: "a" * 2 == 4"#).unwrap() {
        Node::Program(mut p) => p.statements.remove(0),
        other => panic!("expected program, got {:?}", other),
    };
    let decoded = unmarshal_lambda(marshal(&lambda).unwrap()).unwrap();
    assert_eq!(Node::Lambda(decoded), lambda);
}

// ============================================================================
// Decoding errors
// ============================================================================

#[test]
fn test_type_of() {
    assert_eq!(type_of(&json!({"typeOf": "star"})).unwrap(), "star");
    assert!(matches!(type_of(&json!({})), Err(JsonError::MissingTypeOf)));
    assert!(matches!(
        type_of(&json!([1])),
        Err(JsonError::NotAnObject("array"))
    ));
}

#[test]
fn test_missing_type_of() {
    let err = from_json(r#"{"reference":"a"}"#).unwrap_err();
    assert_eq!(err.to_string(), "missing typeOf field");
}

#[test]
fn test_unknown_type() {
    let err = from_json(r#"{"typeOf":"bogus"}"#).unwrap_err();
    assert_eq!(err.to_string(), r#"unknown node type "bogus""#);
}

#[test]
fn test_typed_unmarshal_checks_discriminator() {
    let err = unmarshal_lambda(json!({"typeOf": "reference", "reference": "a"})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error unmarshaling node type lambda; received reference"
    );
    let err = unmarshal_as("func", json!({"typeOf": "star"})).unwrap_err();
    assert!(matches!(err, JsonError::TypeMismatch { .. }));
    assert_eq!(
        unmarshal_as("star", json!({"typeOf": "star"})).unwrap(),
        Node::star()
    );
}

#[test]
fn test_invalid_numbers() {
    let zero_base = json!({"typeOf": "number", "isint": true, "isfloat": false, "int64": 1, "base": 0});
    assert!(matches!(unmarshal(zero_base), Err(JsonError::ZeroBase)));

    let missing_base = json!({"typeOf": "number", "isint": true, "isfloat": false, "int64": 1});
    assert!(matches!(unmarshal(missing_base), Err(JsonError::ZeroBase)));

    let neither = json!({"typeOf": "number", "isint": false, "isfloat": false});
    assert!(matches!(unmarshal(neither), Err(JsonError::NotANumber)));

    let hex = json!({"typeOf": "number", "isint": true, "isfloat": false, "int64": 255, "base": 16});
    assert!(matches!(unmarshal(hex), Err(JsonError::InvalidBase(16))));

    let negative = json!({"typeOf": "number", "isint": true, "isfloat": false, "int64": 1, "base": -8});
    assert!(matches!(unmarshal(negative), Err(JsonError::InvalidBase(-8))));
}

#[test]
fn test_invalid_operator() {
    let value = json!({
        "typeOf": "binary",
        "operator": "^",
        "left": {"typeOf": "reference", "reference": "a"},
        "right": {"typeOf": "reference", "reference": "b"}
    });
    let err = unmarshal(value).unwrap_err();
    assert_eq!(err.to_string(), r#"unknown operator "^""#);

    let value = json!({"typeOf": "func", "func": "f", "functionType": "method", "args": []});
    assert!(matches!(unmarshal(value), Err(JsonError::Operator(_))));
}

#[test]
fn test_invalid_literals() {
    let regex = json!({"typeOf": "regex", "regex": "("});
    assert!(matches!(
        unmarshal(regex),
        Err(JsonError::Node(NodeError::InvalidRegex { .. }))
    ));

    let duration = json!({"typeOf": "duration", "duration": "10"});
    assert!(matches!(
        unmarshal(duration),
        Err(JsonError::Node(NodeError::InvalidDuration(_)))
    ));
}

#[test]
fn test_structural_errors() {
    let declaration = json!({
        "typeOf": "declaration",
        "left": {"typeOf": "string", "literal": "x"},
        "right": {"typeOf": "bool", "bool": true}
    });
    assert!(matches!(
        unmarshal(declaration),
        Err(JsonError::NotAnIdentifier { found: "string", .. })
    ));

    let chain = json!({
        "typeOf": "chain",
        "operator": ".",
        "left": {"typeOf": "identifier", "ident": "a"},
        "right": {"typeOf": "bool", "bool": true}
    });
    assert!(matches!(
        unmarshal(chain),
        Err(JsonError::Node(NodeError::InvalidChainStep("bool")))
    ));
}

#[test]
fn test_nested_failure_fails_whole_decode() {
    let value = json!({
        "typeOf": "program",
        "nodes": [
            {"typeOf": "star"},
            {"typeOf": "list", "nodes": [{"typeOf": "regex", "regex": "[a-"}]}
        ]
    });
    assert!(unmarshal(value).is_err());
}

#[test]
fn test_malformed_fields() {
    let value = json!({"typeOf": "bool", "bool": "yes"});
    assert!(matches!(unmarshal(value), Err(JsonError::Json(_))));
    assert!(matches!(from_json("{"), Err(JsonError::Json(_))));
}
