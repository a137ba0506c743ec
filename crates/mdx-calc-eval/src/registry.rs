//! Function table for the MDX compiler
//!
//! This module maps (syntax, name) pairs to ordered overload lists. The
//! standard table is assembled once, on first use, and never changes
//! afterwards.

use crate::calc::Calc;
use crate::compiler::ExpCompiler;
use crate::error::{CompileError, CompileResult};
use crate::functions;
use indexmap::IndexMap;
use log::debug;
use mdx_calc_ast::{ResolvedFunCall, Syntax};
use mdx_calc_types::{ParamType, Type, TypeCoercer};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// Type alias for compile implementations
pub type CompileFn =
    Arc<dyn Fn(&ResolvedFunCall, &ExpCompiler) -> CompileResult<Calc> + Send + Sync>;

/// Type alias for result-type rules
pub type ResultTypeFn = Arc<dyn Fn(&[Type]) -> Type + Send + Sync>;

/// Function parameter definition
#[derive(Debug, Clone)]
pub struct FunctionParameter {
    /// Parameter name, for signatures in diagnostics
    pub name: Option<String>,
    /// Accepted argument category
    pub param_type: ParamType,
    /// Whether the argument may be omitted
    pub optional: bool,
    /// Whether the parameter absorbs all remaining arguments
    pub repeating: bool,
}

impl FunctionParameter {
    /// Create a required parameter
    pub fn required(param_type: ParamType) -> Self {
        Self {
            name: None,
            param_type,
            optional: false,
            repeating: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(param_type: ParamType) -> Self {
        Self {
            optional: true,
            ..Self::required(param_type)
        }
    }

    /// Create a repeating parameter
    pub fn repeating(param_type: ParamType) -> Self {
        Self {
            repeating: true,
            ..Self::required(param_type)
        }
    }

    /// Set the parameter name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.param_type)?,
            None => write!(f, "{}", self.param_type)?,
        }
        if self.repeating {
            write!(f, "...")?;
        }
        Ok(())
    }
}

/// Function metadata: identity, signature and description
#[derive(Debug, Clone)]
pub struct FunctionMetaData {
    /// Display name
    pub name: String,
    /// Invocation form
    pub syntax: Syntax,
    /// Human-readable description
    pub description: String,
    /// Declared return type
    pub return_type: Type,
    /// Ordered parameters
    pub parameters: Vec<FunctionParameter>,
}

impl FunctionMetaData {
    /// Create metadata with no parameters
    pub fn new(name: impl Into<String>, syntax: Syntax, return_type: Type) -> Self {
        Self {
            name: name.into(),
            syntax,
            description: String::new(),
            return_type,
            parameters: Vec::new(),
        }
    }

    /// `Name(args)`
    pub fn function(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, Syntax::Function, return_type)
    }

    /// `arg.Name`
    pub fn property(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, Syntax::Property, return_type)
    }

    /// `arg.Name(args)`
    pub fn method(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, Syntax::Method, return_type)
    }

    /// `a op b`
    pub fn infix(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, Syntax::Infix, return_type)
    }

    /// `op a`
    pub fn prefix(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, Syntax::Prefix, return_type)
    }

    /// Append a required parameter
    pub fn param(mut self, param_type: ParamType) -> Self {
        self.parameters.push(FunctionParameter::required(param_type));
        self
    }

    /// Append a required named parameter
    pub fn named(mut self, name: &str, param_type: ParamType) -> Self {
        self.parameters
            .push(FunctionParameter::required(param_type).named(name));
        self
    }

    /// Append an optional parameter
    pub fn optional(mut self, param_type: ParamType) -> Self {
        self.parameters.push(FunctionParameter::optional(param_type));
        self
    }

    /// Append an optional flag keyword parameter
    pub fn flags(self, keywords: &'static [&'static str]) -> Self {
        self.optional(ParamType::Symbol(keywords))
    }

    /// Append a repeating parameter; it must be the last one
    pub fn repeating(mut self, param_type: ParamType, optional: bool) -> Self {
        let mut param = FunctionParameter::repeating(param_type);
        param.optional = optional;
        self.parameters.push(param);
        self
    }

    /// Set the description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Number of arguments that must be supplied
    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| !p.optional).count()
    }

    fn is_variadic(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.repeating)
    }

    /// Check if a call with `count` arguments fits the declared arity
    pub fn accepts_count(&self, count: usize) -> bool {
        count >= self.required_count() && (self.is_variadic() || count <= self.parameters.len())
    }

    /// Parameter that the argument at `index` binds to
    pub fn parameter_for(&self, index: usize) -> Option<&FunctionParameter> {
        match self.parameters.get(index) {
            Some(param) => Some(param),
            None if self.is_variadic() => self.parameters.last(),
            None => None,
        }
    }

    /// Check if this signature accepts the given argument types
    pub fn matches(&self, arg_types: &[Type]) -> bool {
        if !self.accepts_count(arg_types.len()) {
            return false;
        }
        let coercer = TypeCoercer::new();
        arg_types.iter().enumerate().all(|(i, actual)| {
            self.parameter_for(i)
                .is_some_and(|p| coercer.accepts(&p.param_type, *actual))
        })
    }

    /// Render the signature, e.g. `Subset(Set, Numeric, [Numeric])`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                if p.optional {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        self.syntax.render(&self.name, &params)
    }
}

/// A compilable overload
#[derive(Clone)]
pub struct FunctionDefinition {
    /// Signature and description
    pub metadata: FunctionMetaData,
    compile: CompileFn,
    result_type: Option<ResultTypeFn>,
}

impl FunctionDefinition {
    /// Create a definition from metadata and a compile implementation
    pub fn new(
        metadata: FunctionMetaData,
        compile: impl Fn(&ResolvedFunCall, &ExpCompiler) -> CompileResult<Calc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            metadata,
            compile: Arc::new(compile),
            result_type: None,
        }
    }

    /// Set a rule computing the return type from the argument types
    pub fn with_result_type(
        mut self,
        rule: impl Fn(&[Type]) -> Type + Send + Sync + 'static,
    ) -> Self {
        self.result_type = Some(Arc::new(rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn syntax(&self) -> Syntax {
        self.metadata.syntax
    }

    /// Check if this definition accepts the given argument types
    pub fn matches(&self, arg_types: &[Type]) -> bool {
        self.metadata.matches(arg_types)
    }

    /// Return type for a call with the given argument types
    pub fn result_type(&self, arg_types: &[Type]) -> Type {
        match &self.result_type {
            Some(rule) => rule(arg_types),
            None => self.metadata.return_type,
        }
    }

    /// Compile a call into a calculation node
    pub fn compile(&self, call: &ResolvedFunCall, compiler: &ExpCompiler) -> CompileResult<Calc> {
        (self.compile)(call, compiler)
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("signature", &self.metadata.signature())
            .field("return_type", &self.metadata.return_type)
            .finish_non_exhaustive()
    }
}

/// Ordered overloads for one (syntax, name)
#[derive(Debug, Clone)]
pub struct FunctionResolver {
    name: String,
    syntax: Syntax,
    overloads: Vec<FunctionDefinition>,
}

impl FunctionResolver {
    fn new(name: String, syntax: Syntax) -> Self {
        Self {
            name,
            syntax,
            overloads: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overloads in registration order
    pub fn overloads(&self) -> &[FunctionDefinition] {
        &self.overloads
    }

    /// Select the first overload accepting the argument types
    pub fn resolve(&self, arg_types: &[Type]) -> CompileResult<&FunctionDefinition> {
        if let Some(def) = self.overloads.iter().find(|def| def.matches(arg_types)) {
            return Ok(def);
        }

        let fewest_required = self
            .overloads
            .iter()
            .map(|def| def.metadata.required_count())
            .min()
            .unwrap_or(0);
        if arg_types.len() < fewest_required {
            return Err(CompileError::missing_argument(
                &self.name,
                fewest_required,
                arg_types.len(),
            ));
        }
        Err(CompileError::unresolved_function(
            &self.name,
            self.syntax,
            arg_types,
        ))
    }
}

/// Immutable map from (syntax, upper-cased name) to overloads
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    resolvers: IndexMap<(Syntax, String), FunctionResolver>,
}

static STANDARD_TABLE: Lazy<Arc<FunctionTable>> = Lazy::new(|| {
    let mut builder = FunctionTable::builder();
    functions::register_standard(&mut builder);
    let table = builder.build();
    debug!("built standard function table with {} definitions", table.len());
    Arc::new(table)
});

impl FunctionTable {
    /// Start assembling a table
    pub fn builder() -> FunctionTableBuilder {
        FunctionTableBuilder::default()
    }

    /// The table of built-in functions
    pub fn standard() -> Arc<FunctionTable> {
        Arc::clone(&STANDARD_TABLE)
    }

    /// Overloads for a name and syntax; names are case-insensitive
    pub fn resolver(&self, name: &str, syntax: Syntax) -> Option<&FunctionResolver> {
        self.resolvers.get(&(syntax, name.to_ascii_uppercase()))
    }

    /// Resolve a call to the first overload accepting its argument types
    pub fn resolve(
        &self,
        name: &str,
        syntax: Syntax,
        arg_types: &[Type],
    ) -> CompileResult<&FunctionDefinition> {
        let resolver = self
            .resolver(name, syntax)
            .ok_or_else(|| CompileError::unresolved_function(name, syntax, arg_types))?;
        let def = resolver.resolve(arg_types)?;
        debug!("resolved {} to {}", name, def.metadata.signature());
        Ok(def)
    }

    /// Total number of definitions
    pub fn len(&self) -> usize {
        self.resolvers.values().map(|r| r.overloads.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// All definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.resolvers.values().flat_map(|r| r.overloads.iter())
    }
}

/// Builder for [`FunctionTable`]
#[derive(Default)]
pub struct FunctionTableBuilder {
    resolvers: IndexMap<(Syntax, String), FunctionResolver>,
}

impl FunctionTableBuilder {
    /// Register an overload after those already registered for its name
    pub fn define(&mut self, definition: FunctionDefinition) -> &mut Self {
        let key = (definition.syntax(), definition.name().to_ascii_uppercase());
        let name = definition.name().to_string();
        let syntax = definition.syntax();
        self.resolvers
            .entry(key)
            .or_insert_with(|| FunctionResolver::new(name, syntax))
            .overloads
            .push(definition);
        self
    }

    pub fn build(self) -> FunctionTable {
        FunctionTable {
            resolvers: self.resolvers,
        }
    }
}
