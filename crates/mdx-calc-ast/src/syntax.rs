//! Call syntax forms

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a function is invoked in MDX text
///
/// Function lookup is keyed by syntax as well as by name: `[Store].Children`
/// (property) and `Children([Store])` (function) are distinct operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    /// `Name(args)`
    Function,
    /// `arg.Name`
    Property,
    /// `arg.Name(args)`
    Method,
    /// `a op b`
    Infix,
    /// `op a`
    Prefix,
    /// `{a, b, ...}`
    Braces,
    /// `(a, b, ...)`
    Parentheses,
}

impl Syntax {
    /// Render a call in this syntax
    pub fn render(&self, name: &str, args: &[String]) -> String {
        match self {
            Self::Function => format!("{}({})", name, args.join(", ")),
            Self::Property => match args.first() {
                Some(target) => format!("{}.{}", target, name),
                None => name.to_string(),
            },
            Self::Method => match args.split_first() {
                Some((target, rest)) => format!("{}.{}({})", target, name, rest.join(", ")),
                None => format!("{}()", name),
            },
            Self::Infix => match args {
                [left, right] => format!("({} {} {})", left, name, right),
                _ => format!("{}({})", name, args.join(", ")),
            },
            Self::Prefix => match args {
                [operand] => format!("{} {}", name, operand),
                _ => format!("{}({})", name, args.join(", ")),
            },
            Self::Braces => format!("{{{}}}", args.join(", ")),
            Self::Parentheses => format!("({})", args.join(", ")),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Function => "function",
            Self::Property => "property",
            Self::Method => "method",
            Self::Infix => "infix",
            Self::Prefix => "prefix",
            Self::Braces => "braces",
            Self::Parentheses => "parentheses",
        };
        f.write_str(name)
    }
}
