//! Expression nodes
//!
//! An `Exp` is either a leaf (literal or metadata reference) or a call. Calls
//! carry the type stamped on them by validation; until then their
//! `return_type` is `Type::Unknown`.

use crate::{Literal, Syntax};
use mdx_calc_types::{DimensionRef, HierarchyRef, LevelRef, MemberRef, Type};
use std::fmt;

/// An MDX expression
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    /// Literal value
    Literal(Literal),
    /// Member reference, e.g. `[Store].[USA]`
    Member(MemberRef),
    /// Level reference, e.g. `[Store].[Country]`
    Level(LevelRef),
    /// Hierarchy reference, e.g. `[Store]`
    Hierarchy(HierarchyRef),
    /// Dimension reference
    Dimension(DimensionRef),
    /// Function, operator or property call
    Call(Box<ResolvedFunCall>),
}

impl Exp {
    /// Get the natural type of this expression
    ///
    /// For calls this is the type stamped by validation.
    pub fn get_type(&self) -> Type {
        match self {
            Self::Literal(literal) => literal.get_type(),
            Self::Member(_) => Type::Member,
            Self::Level(_) => Type::Level,
            Self::Hierarchy(_) => Type::Hierarchy,
            Self::Dimension(_) => Type::Dimension,
            Self::Call(call) => call.return_type,
        }
    }

    // === Leaf constructors ===

    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    pub fn double(value: f64) -> Self {
        Self::Literal(Literal::Double(value))
    }

    pub fn integer(value: i32) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Flag keyword; stored upper-cased
    pub fn symbol(value: impl AsRef<str>) -> Self {
        Self::Literal(Literal::Symbol(value.as_ref().to_ascii_uppercase()))
    }

    pub fn member(member: MemberRef) -> Self {
        Self::Member(member)
    }

    pub fn level(level: LevelRef) -> Self {
        Self::Level(level)
    }

    pub fn hierarchy(hierarchy: HierarchyRef) -> Self {
        Self::Hierarchy(hierarchy)
    }

    pub fn dimension(dimension: DimensionRef) -> Self {
        Self::Dimension(dimension)
    }

    // === Call constructors ===

    /// `Name(args)`
    pub fn function(name: impl Into<String>, args: Vec<Exp>) -> Self {
        Self::call(name, Syntax::Function, args)
    }

    /// `target.Name`
    pub fn property(name: impl Into<String>, target: Exp) -> Self {
        Self::call(name, Syntax::Property, vec![target])
    }

    /// `target.Name(args)`
    pub fn method(name: impl Into<String>, target: Exp, args: Vec<Exp>) -> Self {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(target);
        all.extend(args);
        Self::call(name, Syntax::Method, all)
    }

    /// `left op right`
    pub fn infix(op: impl Into<String>, left: Exp, right: Exp) -> Self {
        Self::call(op, Syntax::Infix, vec![left, right])
    }

    /// `op operand`
    pub fn prefix(op: impl Into<String>, operand: Exp) -> Self {
        Self::call(op, Syntax::Prefix, vec![operand])
    }

    /// `{args}`
    pub fn braces(args: Vec<Exp>) -> Self {
        Self::call("{}", Syntax::Braces, args)
    }

    /// `(args)`
    pub fn parentheses(args: Vec<Exp>) -> Self {
        Self::call("()", Syntax::Parentheses, args)
    }

    fn call(name: impl Into<String>, syntax: Syntax, args: Vec<Exp>) -> Self {
        Self::Call(Box::new(ResolvedFunCall::new(name, syntax, args)))
    }

    /// Get the call if this is one
    pub fn as_call(&self) -> Option<&ResolvedFunCall> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{}", literal),
            Self::Member(m) => write!(f, "{}", m),
            Self::Level(l) => write!(f, "{}", l),
            Self::Hierarchy(h) => write!(f, "{}", h),
            Self::Dimension(d) => write!(f, "{}", d),
            Self::Call(call) => write!(f, "{}", call),
        }
    }
}

impl From<Literal> for Exp {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<MemberRef> for Exp {
    fn from(member: MemberRef) -> Self {
        Self::Member(member)
    }
}

/// A call whose operator has been identified by name and syntax
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunCall {
    /// Operator name as written (`Children`, `*`, `{}`)
    pub name: String,
    /// Invocation form
    pub syntax: Syntax,
    /// Arguments; for property and method syntax the target comes first
    pub args: Vec<Exp>,
    /// Type inferred by validation
    pub return_type: Type,
}

impl ResolvedFunCall {
    /// Create an unvalidated call
    pub fn new(name: impl Into<String>, syntax: Syntax, args: Vec<Exp>) -> Self {
        Self {
            name: name.into(),
            syntax,
            args,
            return_type: Type::Unknown,
        }
    }

    /// Set the inferred return type
    pub fn with_return_type(mut self, return_type: Type) -> Self {
        self.return_type = return_type;
        self
    }

    /// Argument at a position
    pub fn arg(&self, index: usize) -> Option<&Exp> {
        self.args.get(index)
    }

    /// Natural types of all arguments
    pub fn arg_types(&self) -> Vec<Type> {
        self.args.iter().map(Exp::get_type).collect()
    }
}

impl fmt::Display for ResolvedFunCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        f.write_str(&self.syntax.render(&self.name, &args))
    }
}
