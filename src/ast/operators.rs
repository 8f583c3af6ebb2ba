use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Returned when an operator spelling is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator {0:?}")]
pub struct UnknownOperator(pub String);

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Regex match (`=~`)
    RegexEqual,
    /// Regex non-match (`!~`)
    RegexNotEqual,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,

    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
}

impl BinOp {
    /// Binding strength used by precedence climbing; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 0,
            BinOp::And => 1,
            BinOp::Equal | BinOp::NotEqual | BinOp::RegexEqual | BinOp::RegexNotEqual => 2,
            BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => 3,
            BinOp::Add | BinOp::Subtract => 4,
            BinOp::Multiply | BinOp::Divide | BinOp::Modulo => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::RegexEqual => "=~",
            BinOp::RegexNotEqual => "!~",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        }
    }
}

impl FromStr for BinOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "==" => BinOp::Equal,
            "!=" => BinOp::NotEqual,
            "<" => BinOp::LessThan,
            ">" => BinOp::GreaterThan,
            "<=" => BinOp::LessEqual,
            ">=" => BinOp::GreaterEqual,
            "=~" => BinOp::RegexEqual,
            "!~" => BinOp::RegexNotEqual,
            "+" => BinOp::Add,
            "-" => BinOp::Subtract,
            "*" => BinOp::Multiply,
            "/" => BinOp::Divide,
            "%" => BinOp::Modulo,
            "AND" => BinOp::And,
            "OR" => BinOp::Or,
            _ => return Err(UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation (`-`)
    Negate,
    /// Logical negation (`!`)
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl FromStr for UnaryOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(UnaryOp::Negate),
            "!" => Ok(UnaryOp::Not),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators linking the steps of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainOp {
    /// Property access or property method (`.`)
    Dot,
    /// New pipeline step (`|`)
    Pipe,
    /// Dynamic (user defined) function (`@`)
    At,
}

impl ChainOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainOp::Dot => ".",
            ChainOp::Pipe => "|",
            ChainOp::At => "@",
        }
    }
}

impl FromStr for ChainOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "." => Ok(ChainOp::Dot),
            "|" => Ok(ChainOp::Pipe),
            "@" => Ok(ChainOp::At),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for ChainOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[test]
fn test_precedence_table() {
    assert!(BinOp::Multiply.precedence() > BinOp::Add.precedence());
    assert!(BinOp::Add.precedence() > BinOp::LessThan.precedence());
    assert!(BinOp::LessThan.precedence() > BinOp::RegexEqual.precedence());
    assert!(BinOp::Equal.precedence() > BinOp::And.precedence());
    assert!(BinOp::And.precedence() > BinOp::Or.precedence());
    assert_eq!(BinOp::Modulo.precedence(), BinOp::Divide.precedence());
}

#[test]
fn test_unknown_operator() {
    assert_eq!("=".parse::<BinOp>(), Err(UnknownOperator("=".into())));
    assert!("+".parse::<UnaryOp>().is_err());
    assert_eq!("@".parse::<ChainOp>(), Ok(ChainOp::At));
}
