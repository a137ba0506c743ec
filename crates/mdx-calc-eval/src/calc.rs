//! Calculation nodes
//!
//! A compiled expression is a tree of [`Calc`] nodes, one variant per result
//! category. Each node owns its children and a stateless evaluation closure
//! that receives those children and the evaluator; trees can therefore be
//! shared between evaluators.

use crate::coercion::{
    value_to_boolean, value_to_date_time, value_to_double, value_to_integer, value_to_level,
    value_to_list, value_to_member, value_to_string, value_to_tuple,
};
use crate::error::{EvalError, EvalResult};
use crate::evaluator::Evaluator;
use chrono::NaiveDateTime;
use log::debug;
use mdx_calc_types::nullable;
use mdx_calc_types::{
    DimensionRef, HierarchyRef, LevelRef, MemberRef, Tuple, TupleIterable, TupleList, Type, Value,
};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

/// Type alias for node evaluation closures
pub type CalcFn<T> = Arc<dyn Fn(&[Calc], &mut Evaluator) -> EvalResult<T> + Send + Sync>;

/// A node producing values of type `T`
pub struct TypedCalc<T> {
    name: String,
    result_type: Type,
    children: Vec<Calc>,
    eval: CalcFn<T>,
}

impl<T> TypedCalc<T> {
    /// Create a node
    pub fn new(
        name: impl Into<String>,
        result_type: Type,
        children: Vec<Calc>,
        eval: impl Fn(&[Calc], &mut Evaluator) -> EvalResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            result_type,
            children,
            eval: Arc::new(eval),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type; fixed at construction
    pub fn result_type(&self) -> Type {
        self.result_type
    }

    pub fn children(&self) -> &[Calc] {
        &self.children
    }

    /// Evaluate this node
    pub fn evaluate(&self, evaluator: &mut Evaluator) -> EvalResult<T> {
        (self.eval)(&self.children, evaluator)
    }
}

impl<T> Clone for TypedCalc<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            result_type: self.result_type,
            children: self.children.clone(),
            eval: Arc::clone(&self.eval),
        }
    }
}

/// How a list node hands out its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStyle {
    /// Lazy traversal
    Iterable,
    /// Immutable list, possibly a view over another list
    List,
    /// Freshly allocated list the caller may append to
    MutableList,
}

impl fmt::Display for ResultStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Iterable => "Iterable",
            Self::List => "List",
            Self::MutableList => "MutableList",
        };
        f.write_str(name)
    }
}

/// A node producing a tuple list
///
/// Besides its evaluation closure, a list node records the style of the list
/// it produces and whether a native evaluator may compute it instead.
#[derive(Clone)]
pub struct ListCalc {
    inner: TypedCalc<TupleList>,
    style: ResultStyle,
    native: bool,
}

impl ListCalc {
    /// Create a list node producing tuples of `arity`
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        style: ResultStyle,
        children: Vec<Calc>,
        eval: impl Fn(&[Calc], &mut Evaluator) -> EvalResult<TupleList> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: TypedCalc::new(name, Type::Set(arity), children, eval),
            style,
            native: false,
        }
    }

    /// Append children evaluated by the closure after the existing ones
    pub fn with_children(mut self, children: Vec<Calc>) -> Self {
        self.inner.children.extend(children);
        self
    }

    /// Allow a native evaluator to compute this node
    pub fn native_eligible(mut self) -> Self {
        self.native = true;
        self
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn result_type(&self) -> Type {
        self.inner.result_type()
    }

    pub fn arity(&self) -> usize {
        self.inner.result_type().arity().unwrap_or(0)
    }

    pub fn style(&self) -> ResultStyle {
        self.style
    }

    pub fn is_native_eligible(&self) -> bool {
        self.native
    }

    pub fn children(&self) -> &[Calc] {
        self.inner.children()
    }

    /// Evaluate, consulting the native evaluator first when allowed
    pub fn evaluate(&self, evaluator: &mut Evaluator) -> EvalResult<TupleList> {
        if self.native && evaluator.native_enabled() {
            if let Some(list) = self.evaluate_native(evaluator)? {
                return Ok(list);
            }
        }

        let list = self.inner.evaluate(evaluator)?;
        evaluator.check_result_limit(self.name(), list.len())?;
        Ok(list)
    }

    fn evaluate_native(&self, evaluator: &mut Evaluator) -> EvalResult<Option<TupleList>> {
        let Some(native) = evaluator.native_evaluator() else {
            return Ok(None);
        };

        let start = Instant::now();
        let result = native.evaluate_set(self, evaluator);
        evaluator.timing_mut().record("native", start.elapsed());

        match result {
            Ok(Some(list)) => {
                if list.arity() != self.arity() {
                    return Err(EvalError::type_mismatch(
                        self.name(),
                        self.result_type().to_string(),
                        Type::Set(list.arity()).to_string(),
                    ));
                }
                debug!("native evaluation of {} produced {} tuples", self.name(), list.len());
                evaluator.check_result_limit(self.name(), list.len())?;
                Ok(Some(list))
            }
            Ok(None) => {
                debug!("native evaluation declined for {}", self.name());
                Ok(None)
            }
            Err(e) => Err(EvalError::native(self.name(), e.to_string())),
        }
    }
}

/// A calculation node
#[derive(Clone)]
pub enum Calc {
    Double(TypedCalc<f64>),
    Integer(TypedCalc<i32>),
    Boolean(TypedCalc<Option<bool>>),
    String(TypedCalc<Option<String>>),
    DateTime(TypedCalc<Option<NaiveDateTime>>),
    /// `None` is the null member (e.g. the parent of a root member)
    Member(TypedCalc<Option<MemberRef>>),
    Level(TypedCalc<LevelRef>),
    Hierarchy(TypedCalc<HierarchyRef>),
    Dimension(TypedCalc<DimensionRef>),
    /// `None` is the null tuple
    Tuple(TypedCalc<Option<Tuple>>),
    List(ListCalc),
    Iterable(TypedCalc<TupleIterable>),
    /// Value whose category is only known at runtime
    Value(TypedCalc<Value>),
}

macro_rules! dispatch {
    ($calc:expr, $node:ident => $body:expr) => {
        match $calc {
            Calc::Double($node) => $body,
            Calc::Integer($node) => $body,
            Calc::Boolean($node) => $body,
            Calc::String($node) => $body,
            Calc::DateTime($node) => $body,
            Calc::Member($node) => $body,
            Calc::Level($node) => $body,
            Calc::Hierarchy($node) => $body,
            Calc::Dimension($node) => $body,
            Calc::Tuple($node) => $body,
            Calc::List(list) => {
                let $node = &list.inner;
                $body
            }
            Calc::Iterable($node) => $body,
            Calc::Value($node) => $body,
        }
    };
}

impl Calc {
    pub fn name(&self) -> &str {
        dispatch!(self, node => node.name())
    }

    /// Declared type of this node
    pub fn get_type(&self) -> Type {
        dispatch!(self, node => node.result_type())
    }

    pub fn children(&self) -> &[Calc] {
        dispatch!(self, node => node.children())
    }

    /// Get as a list node
    pub fn as_list(&self) -> Option<&ListCalc> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Result style, for set-valued nodes
    pub fn result_style(&self) -> Option<ResultStyle> {
        match self {
            Self::List(list) => Some(list.style()),
            Self::Iterable(_) => Some(ResultStyle::Iterable),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &str) -> EvalError {
        EvalError::type_mismatch(self.name(), expected, self.get_type().to_string())
    }

    /// Evaluate to a boundary value
    pub fn evaluate(&self, evaluator: &mut Evaluator) -> EvalResult<Value> {
        Ok(match self {
            Self::Double(c) => Value::from_double(c.evaluate(evaluator)?),
            Self::Integer(c) => Value::from_integer(c.evaluate(evaluator)?),
            Self::Boolean(c) => Value::from_boolean(c.evaluate(evaluator)?),
            Self::String(c) => Value::from_option(c.evaluate(evaluator)?, Value::String),
            Self::DateTime(c) => Value::from_option(c.evaluate(evaluator)?, Value::DateTime),
            Self::Member(c) => Value::from_option(c.evaluate(evaluator)?, Value::Member),
            Self::Level(c) => Value::Level(c.evaluate(evaluator)?),
            Self::Hierarchy(c) => Value::Hierarchy(c.evaluate(evaluator)?),
            Self::Dimension(c) => Value::Dimension(c.evaluate(evaluator)?),
            Self::Tuple(c) => Value::from_option(c.evaluate(evaluator)?, Value::Tuple),
            Self::List(c) => Value::List(c.evaluate(evaluator)?),
            Self::Iterable(c) => Value::List(c.evaluate(evaluator)?.materialize()?),
            Self::Value(c) => c.evaluate(evaluator)?,
        })
    }

    /// Evaluate as a double; null is [`nullable::DOUBLE_NULL`]
    pub fn evaluate_double(&self, evaluator: &mut Evaluator) -> EvalResult<f64> {
        match self {
            Self::Double(c) => c.evaluate(evaluator),
            Self::Integer(c) => Ok(nullable::integer_to_double(c.evaluate(evaluator)?)),
            Self::Value(c) => value_to_double(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Double")),
        }
    }

    /// Evaluate as an integer; null is [`nullable::INTEGER_NULL`]
    pub fn evaluate_integer(&self, evaluator: &mut Evaluator) -> EvalResult<i32> {
        match self {
            Self::Integer(c) => c.evaluate(evaluator),
            Self::Double(c) => Ok(nullable::double_to_integer(c.evaluate(evaluator)?)),
            Self::Value(c) => value_to_integer(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Integer")),
        }
    }

    /// Evaluate as a three-valued boolean
    pub fn evaluate_boolean(&self, evaluator: &mut Evaluator) -> EvalResult<Option<bool>> {
        match self {
            Self::Boolean(c) => c.evaluate(evaluator),
            Self::Value(c) => value_to_boolean(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Boolean")),
        }
    }

    pub fn evaluate_string(&self, evaluator: &mut Evaluator) -> EvalResult<Option<String>> {
        match self {
            Self::String(c) => c.evaluate(evaluator),
            Self::Value(c) => value_to_string(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("String")),
        }
    }

    pub fn evaluate_date_time(
        &self,
        evaluator: &mut Evaluator,
    ) -> EvalResult<Option<NaiveDateTime>> {
        match self {
            Self::DateTime(c) => c.evaluate(evaluator),
            Self::Value(c) => value_to_date_time(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("DateTime")),
        }
    }

    pub fn evaluate_member(&self, evaluator: &mut Evaluator) -> EvalResult<Option<MemberRef>> {
        match self {
            Self::Member(c) => c.evaluate(evaluator),
            Self::Value(c) => value_to_member(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Member")),
        }
    }

    pub fn evaluate_level(&self, evaluator: &mut Evaluator) -> EvalResult<LevelRef> {
        match self {
            Self::Level(c) => c.evaluate(evaluator),
            Self::Value(c) => value_to_level(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Level")),
        }
    }

    pub fn evaluate_hierarchy(&self, evaluator: &mut Evaluator) -> EvalResult<HierarchyRef> {
        match self {
            Self::Hierarchy(c) => c.evaluate(evaluator),
            _ => Err(self.mismatch("Hierarchy")),
        }
    }

    pub fn evaluate_dimension(&self, evaluator: &mut Evaluator) -> EvalResult<DimensionRef> {
        match self {
            Self::Dimension(c) => c.evaluate(evaluator),
            _ => Err(self.mismatch("Dimension")),
        }
    }

    pub fn evaluate_tuple(&self, evaluator: &mut Evaluator) -> EvalResult<Option<Tuple>> {
        match self {
            Self::Tuple(c) => c.evaluate(evaluator),
            Self::Member(c) => Ok(c.evaluate(evaluator)?.map(Tuple::from_member)),
            Self::Value(c) => value_to_tuple(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Tuple")),
        }
    }

    /// Evaluate as a random-access list
    pub fn evaluate_list(&self, evaluator: &mut Evaluator) -> EvalResult<TupleList> {
        match self {
            Self::List(c) => c.evaluate(evaluator),
            Self::Iterable(c) => Ok(c.evaluate(evaluator)?.materialize()?),
            Self::Value(c) => value_to_list(&c.evaluate(evaluator)?, c.name()),
            _ => Err(self.mismatch("Set")),
        }
    }

    /// Evaluate as a one-pass sequence
    pub fn evaluate_iterable(&self, evaluator: &mut Evaluator) -> EvalResult<TupleIterable> {
        match self {
            Self::Iterable(c) => c.evaluate(evaluator),
            Self::List(c) => Ok(c.evaluate(evaluator)?.iterable()),
            _ => Err(self.mismatch("Set")),
        }
    }

    /// Render the plan as an indented tree, one `Name(Type)` line per node
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = match self {
            Self::List(list) => writeln!(
                out,
                "{}{}({}, {}{})",
                indent,
                list.name(),
                list.result_type(),
                list.style(),
                if list.is_native_eligible() { ", native" } else { "" }
            ),
            _ => writeln!(out, "{}{}({})", indent, self.name(), self.get_type()),
        };
        for child in self.children() {
            child.explain_into(out, depth + 1);
        }
    }
}

impl fmt::Debug for Calc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calc")
            .field("name", &self.name())
            .field("type", &self.get_type())
            .field("children", &self.children())
            .finish()
    }
}

impl From<ListCalc> for Calc {
    fn from(list: ListCalc) -> Self {
        Self::List(list)
    }
}
