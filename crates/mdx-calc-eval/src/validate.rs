//! Type inference over call trees
//!
//! Validation walks an expression bottom-up, resolves every call against the
//! function table and stamps the call with the type its definition computes
//! from the argument types.

use crate::error::CompileResult;
use crate::registry::FunctionTable;
use log::debug;
use mdx_calc_ast::{Exp, ResolvedFunCall};
use mdx_calc_types::Type;
use std::sync::Arc;

/// Resolves calls and stamps their return types
#[derive(Debug, Clone)]
pub struct Validator {
    table: Arc<FunctionTable>,
}

impl Validator {
    pub fn new(table: Arc<FunctionTable>) -> Self {
        Self { table }
    }

    /// Validator over the built-in functions
    pub fn standard() -> Self {
        Self::new(FunctionTable::standard())
    }

    /// Return `exp` with every call stamped with its inferred type
    pub fn validate(&self, exp: Exp) -> CompileResult<Exp> {
        match exp {
            Exp::Call(call) => Ok(Exp::Call(Box::new(self.validate_call(*call)?))),
            other => Ok(other),
        }
    }

    fn validate_call(&self, call: ResolvedFunCall) -> CompileResult<ResolvedFunCall> {
        let ResolvedFunCall {
            name, syntax, args, ..
        } = call;
        let args = args
            .into_iter()
            .map(|arg| self.validate(arg))
            .collect::<CompileResult<Vec<_>>>()?;
        let arg_types: Vec<Type> = args.iter().map(Exp::get_type).collect();
        let def = self.table.resolve(&name, syntax, &arg_types)?;
        let return_type = def.result_type(&arg_types);
        debug!("validated {} as {}", name, return_type);
        Ok(ResolvedFunCall::new(name, syntax, args).with_return_type(return_type))
    }

    /// Infer the type of `exp` without rewriting it
    ///
    /// Calls already stamped with a known type are trusted.
    pub fn infer(&self, exp: &Exp) -> CompileResult<Type> {
        match exp {
            Exp::Call(call) if call.return_type.is_unknown() => {
                let arg_types = call
                    .args
                    .iter()
                    .map(|arg| self.infer(arg))
                    .collect::<CompileResult<Vec<_>>>()?;
                let def = self.table.resolve(&call.name, call.syntax, &arg_types)?;
                Ok(def.result_type(&arg_types))
            }
            other => Ok(other.get_type()),
        }
    }
}
