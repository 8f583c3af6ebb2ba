pub mod ast;
pub mod duration;
pub mod format;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod walk;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, ChainOp, CommentNode, FuncKind, Node, NodeError, Token, TokenKind, UnaryOp};
pub use duration::{format_duration, parse_duration, DurationError};
pub use format::{format, format_script};
pub use json::{from_json, marshal, to_json, to_json_pretty, unmarshal, JsonError};
pub use lexer::{tokenize, Lexer, Position};
pub use parser::{parse, parse_lambda, Parser, ParseError};
pub use walk::{find_function_calls, find_references, inspect, walk, WalkError};
