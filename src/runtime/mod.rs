pub mod env;
mod interpreter;
pub mod obj;

pub use interpreter::{Interpreter, Unwind};

use crate::lexer::token::Location;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Error when evaluating expressions. Aborts the current run; the
/// location feeds the `[line N]` trailer of the diagnostic.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    OperandMustBeNumber { pos: Location },
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers { pos: Location },
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings { pos: Location },
    #[error("Undefined variable '{name}'.")]
    Undefined { name: String, pos: Location },
    #[error("Can only call functions and classes.")]
    NotCallable { pos: Location },
    #[error("Expected {expected} arguments but got {got}.")]
    WrongArity {
        expected: usize,
        got: usize,
        pos: Location,
    },
    #[error("Only instances have properties.")]
    NotAnInstanceProperty { pos: Location },
    #[error("Only instances have fields.")]
    NotAnInstanceField { pos: Location },
    #[error("Undefined property '{name}'.")]
    UndefinedProperty { name: String, pos: Location },
    #[error("Superclass must be a class.")]
    SuperclassNotClass { pos: Location },
}

impl RuntimeError {
    pub fn pos(&self) -> Location {
        use RuntimeError::*;
        match self {
            OperandMustBeNumber { pos } => *pos,
            OperandsMustBeNumbers { pos } => *pos,
            OperandsMustBeNumbersOrStrings { pos } => *pos,
            Undefined { pos, .. } => *pos,
            NotCallable { pos } => *pos,
            WrongArity { pos, .. } => *pos,
            NotAnInstanceProperty { pos } => *pos,
            NotAnInstanceField { pos } => *pos,
            UndefinedProperty { pos, .. } => *pos,
            SuperclassNotClass { pos } => *pos,
        }
    }
}
