//! Compile-time and evaluation-time errors

use mdx_calc_ast::Syntax;
use mdx_calc_types::{TupleListError, Type};
use thiserror::Error;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while resolving and compiling a call tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// No overload accepts the offered argument types
    #[error("No function matches signature '{name}' ({syntax}) with arguments ({args})")]
    UnresolvedFunction {
        name: String,
        syntax: Syntax,
        args: String,
    },

    /// Every overload requires more arguments than were supplied
    #[error("Function '{name}' requires at least {required} argument(s), found {found}")]
    MissingArgument {
        name: String,
        required: usize,
        found: usize,
    },

    /// A sub-expression cannot be converted to the type a function asks for
    #[error("Cannot convert {from} to {to} in '{context}'")]
    IncompatibleType { from: Type, to: Type, context: String },

    /// An argument is well-typed but not acceptable, e.g. an unknown keyword
    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument { function: String, message: String },
}

impl CompileError {
    /// Create an unresolved function error
    pub fn unresolved_function(name: impl Into<String>, syntax: Syntax, args: &[Type]) -> Self {
        Self::UnresolvedFunction {
            name: name.into(),
            syntax,
            args: args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create a missing argument error
    pub fn missing_argument(name: impl Into<String>, required: usize, found: usize) -> Self {
        Self::MissingArgument {
            name: name.into(),
            required,
            found,
        }
    }

    /// Create an incompatible type error
    pub fn incompatible_type(from: Type, to: Type, context: impl Into<String>) -> Self {
        Self::IncompatibleType {
            from,
            to,
            context: context.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while evaluating a calculation tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A value of the wrong runtime category reached a node
    #[error("Type mismatch in {function}: expected {expected}, found {found}")]
    TypeMismatch {
        function: String,
        expected: String,
        found: String,
    },

    /// Property is neither intrinsic nor declared on the member's level
    #[error("Property '{property}' is not valid for member '{member}'")]
    InvalidProperty { property: String, member: String },

    /// Null or empty input to a conversion function
    #[error("Empty expression passed to {function}")]
    EmptyExpression { function: String },

    /// Compound name that does not follow the bracketed segment syntax
    #[error("Malformed member name in {function}: {message}")]
    MalformedName { function: String, message: String },

    /// No member with the given name
    #[error("Member not found: {name}")]
    MemberNotFound { name: String },

    /// Invalid operand error
    #[error("Invalid operand for {operator}: {message}")]
    InvalidOperand { operator: String, message: String },

    /// Native evaluator failure
    #[error("Native evaluation failed for {function}: {message}")]
    Native { function: String, message: String },

    /// A materialized list exceeds the configured limit
    #[error("Result limit exceeded in {function}: {size} tuples, limit is {limit}")]
    ResultLimitExceeded {
        function: String,
        size: usize,
        limit: usize,
    },

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create a type mismatch error
    pub fn type_mismatch(
        function: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            function: function.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid property error
    pub fn invalid_property(property: impl Into<String>, member: impl Into<String>) -> Self {
        Self::InvalidProperty {
            property: property.into(),
            member: member.into(),
        }
    }

    /// Create an empty expression error
    pub fn empty_expression(function: impl Into<String>) -> Self {
        Self::EmptyExpression {
            function: function.into(),
        }
    }

    /// Create a malformed name error
    pub fn malformed_name(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedName {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a member not found error
    pub fn member_not_found(name: impl Into<String>) -> Self {
        Self::MemberNotFound { name: name.into() }
    }

    /// Create an invalid operand error
    pub fn invalid_operand(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create a native evaluation error
    pub fn native(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Native {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a result limit error
    pub fn result_limit_exceeded(function: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::ResultLimitExceeded {
            function: function.into(),
            size,
            limit,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<TupleListError> for EvalError {
    fn from(error: TupleListError) -> Self {
        match error {
            TupleListError::ArityMismatch { expected, found } => Self::type_mismatch(
                "TupleList",
                format!("tuple of arity {}", expected),
                format!("tuple of arity {}", found),
            ),
            TupleListError::Immutable => Self::internal(error.to_string()),
        }
    }
}
