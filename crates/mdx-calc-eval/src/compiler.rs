//! Expression compiler
//!
//! [`ExpCompiler`] lowers an expression into a [`Calc`] tree. Function
//! definitions call back into the typed helpers (`compile_double`,
//! `compile_list`, ...) to compile their arguments; each helper compiles the
//! argument in its natural type and inserts a coercion node when a different
//! type is required.

use crate::calc::{Calc, TypedCalc};
use crate::coercion;
use crate::error::{CompileError, CompileResult};
use crate::registry::FunctionTable;
use crate::validate::Validator;
use log::debug;
use mdx_calc_ast::{Exp, Literal, ResolvedFunCall};
use mdx_calc_types::{Type, Value};
use std::sync::Arc;

/// Compiles expressions against a function table
#[derive(Debug, Clone)]
pub struct ExpCompiler {
    table: Arc<FunctionTable>,
    validator: Validator,
}

impl ExpCompiler {
    pub fn new(table: Arc<FunctionTable>) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&table)),
            table,
        }
    }

    /// Compiler over the built-in functions
    pub fn standard() -> Self {
        Self::new(FunctionTable::standard())
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    /// Compile an expression in its natural type
    pub fn compile(&self, exp: &Exp) -> CompileResult<Calc> {
        match exp {
            Exp::Literal(literal) => Ok(compile_literal(literal)),
            Exp::Member(member) => {
                let member = member.clone();
                Ok(Calc::Member(TypedCalc::new("Literal", Type::Member, vec![], move |_, _| {
                    Ok(Some(member.clone()))
                })))
            }
            Exp::Level(level) => {
                let level = level.clone();
                Ok(Calc::Level(TypedCalc::new("Literal", Type::Level, vec![], move |_, _| {
                    Ok(level.clone())
                })))
            }
            Exp::Hierarchy(hierarchy) => {
                let hierarchy = hierarchy.clone();
                Ok(Calc::Hierarchy(TypedCalc::new(
                    "Literal",
                    Type::Hierarchy,
                    vec![],
                    move |_, _| Ok(hierarchy.clone()),
                )))
            }
            Exp::Dimension(dimension) => {
                let dimension = dimension.clone();
                Ok(Calc::Dimension(TypedCalc::new(
                    "Literal",
                    Type::Dimension,
                    vec![],
                    move |_, _| Ok(dimension.clone()),
                )))
            }
            Exp::Call(call) => self.compile_call(call),
        }
    }

    /// Resolve a call and compile it with the selected definition
    pub fn compile_call(&self, call: &ResolvedFunCall) -> CompileResult<Calc> {
        let arg_types = call
            .args
            .iter()
            .map(|arg| self.type_of(arg))
            .collect::<CompileResult<Vec<_>>>()?;
        let def = self.table.resolve(&call.name, call.syntax, &arg_types)?;
        debug!("compiling {}", def.metadata.signature());
        def.compile(call, self)
    }

    /// Natural type of an expression
    pub fn type_of(&self, exp: &Exp) -> CompileResult<Type> {
        self.validator.infer(exp)
    }

    /// Arity of the tuples a set-like expression produces
    pub fn arity_of(&self, exp: &Exp) -> CompileResult<usize> {
        let ty = self.type_of(exp)?;
        ty.arity()
            .ok_or_else(|| CompileError::incompatible_type(ty, Type::Set(1), exp.to_string()))
    }

    // === Typed helpers ===

    /// Compile to any scalar; members and tuples yield their cell value
    pub fn compile_scalar(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_scalar(self.compile(exp)?)
    }

    pub fn compile_integer(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_integer(self.compile(exp)?)
    }

    pub fn compile_double(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_double(self.compile(exp)?)
    }

    pub fn compile_boolean(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_boolean(self.compile(exp)?)
    }

    pub fn compile_string(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_string(self.compile(exp)?)
    }

    pub fn compile_date_time(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_date_time(self.compile(exp)?)
    }

    pub fn compile_member(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_member(self.compile(exp)?)
    }

    pub fn compile_level(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_level(self.compile(exp)?)
    }

    pub fn compile_hierarchy(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_hierarchy(self.compile(exp)?)
    }

    pub fn compile_dimension(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_dimension(self.compile(exp)?)
    }

    pub fn compile_tuple(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_tuple(self.compile(exp)?)
    }

    /// Compile to a list node; with `mutable`, the list is safe to append to
    pub fn compile_list(&self, exp: &Exp, mutable: bool) -> CompileResult<Calc> {
        coercion::to_list(self.compile(exp)?, mutable)
    }

    pub fn compile_iterable(&self, exp: &Exp) -> CompileResult<Calc> {
        coercion::to_iterable(self.compile(exp)?)
    }

    /// Compile to the given type
    pub fn compile_as(&self, exp: &Exp, ty: Type) -> CompileResult<Calc> {
        coercion::convert(self.compile(exp)?, ty)
    }

    /// Read a flag keyword argument at compile time
    ///
    /// Returns `None` when the argument is absent; fails if it is not one of
    /// `keywords`.
    pub fn symbol_arg(
        &self,
        call: &ResolvedFunCall,
        index: usize,
        keywords: &'static [&'static str],
    ) -> CompileResult<Option<&'static str>> {
        let Some(arg) = call.arg(index) else {
            return Ok(None);
        };
        let invalid = || {
            CompileError::invalid_argument(
                &call.name,
                format!("expected one of {}, found '{}'", keywords.join("|"), arg),
            )
        };
        match arg {
            Exp::Literal(Literal::Symbol(symbol)) => keywords
                .iter()
                .copied()
                .find(|k| k.eq_ignore_ascii_case(symbol))
                .map(Some)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// Argument at `index`, which the resolved signature guarantees
pub fn required_arg(call: &ResolvedFunCall, index: usize) -> CompileResult<&Exp> {
    call.arg(index)
        .ok_or_else(|| CompileError::missing_argument(&call.name, index + 1, call.args.len()))
}

fn compile_literal(literal: &Literal) -> Calc {
    match literal {
        Literal::Null => Calc::Value(TypedCalc::new("Literal", Type::Unknown, vec![], |_, _| {
            Ok(Value::Null)
        })),
        Literal::Double(d) => {
            let d = *d;
            Calc::Double(TypedCalc::new("Literal", Type::Double, vec![], move |_, _| Ok(d)))
        }
        Literal::Integer(i) => {
            let i = *i;
            Calc::Integer(TypedCalc::new("Literal", Type::Integer, vec![], move |_, _| Ok(i)))
        }
        Literal::String(s) => {
            let s = s.clone();
            Calc::String(TypedCalc::new("Literal", Type::String, vec![], move |_, _| {
                Ok(Some(s.clone()))
            }))
        }
        Literal::Symbol(s) => {
            let s = s.clone();
            Calc::Value(TypedCalc::new("Literal", Type::Symbol, vec![], move |_, _| {
                Ok(Value::Symbol(s.clone()))
            }))
        }
    }
}
