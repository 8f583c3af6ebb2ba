//! # TICKscript - Abstract Syntax Tree
//!
//! This module defines the syntax tree for TICKscript, the language used to
//! describe data-processing pipelines as chains of nodes.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Binary, unary and chain operators with precedence
//! - **[expressions]** - The [`Node`] sum type, literals and expressions
//! - **[functions]** - Function calls and chain steps
//! - **[statements]** - Variable and type declarations
//! - **[program]** - Whole scripts and comment blocks
//!
//! ## Quick Start
//!
//! ```text
//! var data = stream
//!     |from()
//!         .measurement('cpu')
//!     |window()
//!         .period(10s)
//!         .every(10s)
//! ```
//!
//! This script declares `data` as a stream pipeline reading the `cpu`
//! measurement and windowing it.
//!
//! ## Core Concepts
//!
//! ### Chains
//!
//! Pipelines are built by chaining onto a value with three operators:
//!
//! - **Pipe** `|` - Adds a new pipeline node (`|window()`)
//! - **Dot** `.` - Sets a property on the current node (`.period(10s)`)
//! - **At** `@` - Invokes a user defined function (`@myUDF()`)
//!
//! Chains nest on the left: `a|b().c()` is `Chain(Chain(a, |, b()), ., c())`.
//!
//! ### Lambdas
//!
//! `lambda:` introduces an expression evaluated later per data point.
//! Field values are referenced with double quotes:
//!
//! ```text
//! |where(lambda: "host" == 'serverA' AND "value" > 90)
//! ```
//!
//! ### Literals
//!
//! Numbers (`42`, `0644` octal, `1.5`), durations (`10s`, `1ms`), booleans
//! (`TRUE`, `FALSE`), strings (`'single'`, `'''triple'''`), regexes
//! (`/^cpu.*/`), references (`"field"`) and string lists (`['a', *]`).
//!
//! ## Equality
//!
//! `PartialEq` on [`Node`] is structural. Positions, comments and layout
//! hints never participate, so a parsed tree equals the tree parsed from its
//! formatted output.
pub mod tokens;
pub mod operators;
pub mod expressions;
pub mod functions;
pub mod statements;
pub mod program;

use thiserror::Error;

use crate::duration::DurationError;

pub use tokens::{Token, TokenKind};
pub use operators::{BinOp, ChainOp, UnaryOp, UnknownOperator};
pub use expressions::{
    BinaryNode, BoolNode, DurationNode, IdentifierNode, LambdaNode, ListNode, Node, Number,
    NumberNode, ReferenceNode, RegexNode, StarNode, StringNode, UnaryNode,
};
pub use functions::{ChainNode, FuncKind, FunctionNode};
pub use statements::{DeclarationNode, TypeDeclarationNode};
pub use program::{CommentNode, ProgramNode, COMMENT_BREAK};

/// Errors raised while building nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("illegal number syntax: {0:?}")]
    InvalidNumber(String),

    #[error("invalid regex {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error("chain step must be a function or identifier, got {0}")]
    InvalidChainStep(&'static str),
}
