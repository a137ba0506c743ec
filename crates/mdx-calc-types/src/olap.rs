//! OLAP metadata interfaces
//!
//! Members, levels, hierarchies and dimensions are supplied by the catalog and
//! are read-only here. They are passed around as cheap reference handles
//! (`MemberRef`, ...) that compare by identity: the same object, or an object
//! with the same unique name.

use crate::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// A member of a hierarchy
pub trait Member: Send + Sync {
    /// Unique name, e.g. `[Store].[USA].[CA]`
    fn unique_name(&self) -> &str;

    /// Simple name, e.g. `CA`
    fn name(&self) -> &str;

    /// Display caption
    fn caption(&self) -> &str {
        self.name()
    }

    /// Level this member belongs to
    fn level(&self) -> LevelRef;

    /// Parent member, `None` for root members
    fn parent(&self) -> Option<MemberRef>;

    /// Child members in natural order
    fn children(&self) -> Vec<MemberRef>;

    /// Whether this is the All member of its hierarchy
    fn is_all(&self) -> bool {
        false
    }

    /// Depth of this member's level (0 for root level)
    fn depth(&self) -> usize {
        self.level().depth()
    }

    /// Hierarchy this member belongs to
    fn hierarchy(&self) -> HierarchyRef {
        self.level().hierarchy()
    }

    /// Dimension this member belongs to
    fn dimension(&self) -> DimensionRef {
        self.hierarchy().dimension()
    }

    /// Value of a declared (non-intrinsic) property
    fn property_value(&self, name: &str, case_sensitive: bool) -> Option<Value>;
}

/// A level of a hierarchy
pub trait Level: Send + Sync {
    fn unique_name(&self) -> &str;

    fn name(&self) -> &str;

    fn caption(&self) -> &str {
        self.name()
    }

    /// Depth of the level (0 for the root level)
    fn depth(&self) -> usize;

    fn hierarchy(&self) -> HierarchyRef;

    fn dimension(&self) -> DimensionRef {
        self.hierarchy().dimension()
    }

    /// Members of this level in natural order
    fn members(&self) -> Vec<MemberRef>;

    /// Names of the properties declared on this level
    fn property_names(&self) -> Vec<String>;
}

/// A hierarchy of a dimension
pub trait Hierarchy: Send + Sync {
    fn unique_name(&self) -> &str;

    fn name(&self) -> &str;

    fn caption(&self) -> &str {
        self.name()
    }

    fn dimension(&self) -> DimensionRef;

    /// Levels, root level first
    fn levels(&self) -> Vec<LevelRef>;

    /// Members of the root level
    fn root_members(&self) -> Vec<MemberRef>;

    /// Member used when the context does not name one
    fn default_member(&self) -> Option<MemberRef>;

    /// The All member, if the hierarchy has one
    fn all_member(&self) -> Option<MemberRef> {
        self.root_members().into_iter().find(|m| m.is_all())
    }
}

/// A dimension
pub trait Dimension: Send + Sync {
    fn unique_name(&self) -> &str;

    fn name(&self) -> &str;

    fn caption(&self) -> &str {
        self.name()
    }

    fn hierarchies(&self) -> Vec<HierarchyRef>;

    /// Whether this is the measures dimension
    fn is_measures(&self) -> bool {
        false
    }
}

macro_rules! metadata_ref {
    ($(#[$doc:meta])* $name:ident, $entity:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn $entity>);

        impl $name {
            /// Wrap a metadata object
            pub fn new(inner: impl $entity + 'static) -> Self {
                Self(Arc::new(inner))
            }

            /// Wrap an already shared metadata object
            pub fn from_arc(inner: Arc<dyn $entity>) -> Self {
                Self(inner)
            }
        }

        impl Deref for $name {
            type Target = dyn $entity;

            fn deref(&self) -> &Self::Target {
                &*self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
                    || self.0.unique_name() == other.0.unique_name()
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.unique_name().hash(state);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($entity), self.0.unique_name())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.unique_name())
            }
        }
    };
}

metadata_ref!(
    /// Shared handle to a member
    MemberRef,
    Member
);
metadata_ref!(
    /// Shared handle to a level
    LevelRef,
    Level
);
metadata_ref!(
    /// Shared handle to a hierarchy
    HierarchyRef,
    Hierarchy
);
metadata_ref!(
    /// Shared handle to a dimension
    DimensionRef,
    Dimension
);

/// Intrinsic member properties, available on every level
pub const INTRINSIC_PROPERTIES: &[&str] = &[
    "NAME",
    "CAPTION",
    "UNIQUE_NAME",
    "LEVEL_NUMBER",
    "LEVEL_UNIQUE_NAME",
    "PARENT_UNIQUE_NAME",
    "HIERARCHY_UNIQUE_NAME",
    "DIMENSION_UNIQUE_NAME",
];

/// Compare two names under the given case sensitivity
pub fn names_match(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

impl MemberRef {
    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> Vec<MemberRef> {
        let mut result = Vec::new();
        let mut current = self.parent();
        while let Some(member) = current {
            current = member.parent();
            result.push(member);
        }
        result
    }

    /// Path from the root down to and including this member
    pub fn path(&self) -> Vec<MemberRef> {
        let mut path = self.ancestors();
        path.reverse();
        path.push(self.clone());
        path
    }

    /// Check if this member is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &MemberRef) -> bool {
        other.ancestors().iter().any(|a| a == self)
    }

    /// Look up an intrinsic property
    pub fn intrinsic_property(&self, name: &str, case_sensitive: bool) -> Option<Value> {
        let key = INTRINSIC_PROPERTIES
            .iter()
            .find(|p| names_match(p, name, case_sensitive))?;

        let value = match *key {
            "NAME" => Value::String(self.name().to_string()),
            "CAPTION" => Value::String(self.caption().to_string()),
            "UNIQUE_NAME" => Value::String(self.unique_name().to_string()),
            "LEVEL_NUMBER" => Value::Integer(self.depth() as i32),
            "LEVEL_UNIQUE_NAME" => Value::String(self.level().unique_name().to_string()),
            "PARENT_UNIQUE_NAME" => match self.parent() {
                Some(parent) => Value::String(parent.unique_name().to_string()),
                None => Value::Null,
            },
            "HIERARCHY_UNIQUE_NAME" => Value::String(self.hierarchy().unique_name().to_string()),
            "DIMENSION_UNIQUE_NAME" => Value::String(self.dimension().unique_name().to_string()),
            _ => return None,
        };
        Some(value)
    }
}

impl LevelRef {
    /// Check if `name` is an intrinsic or declared property of this level
    pub fn is_valid_property(&self, name: &str, case_sensitive: bool) -> bool {
        INTRINSIC_PROPERTIES
            .iter()
            .any(|p| names_match(p, name, case_sensitive))
            || self
                .property_names()
                .iter()
                .any(|p| names_match(p, name, case_sensitive))
    }
}

/// Errors parsing a compound member name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is empty or blank
    #[error("empty member name")]
    Empty,

    /// Name does not follow the bracketed segment syntax
    #[error("malformed member name '{name}': {reason}")]
    Malformed { name: String, reason: String },
}

/// Split a compound name such as `[Store].[USA].[CA]` into its segments
///
/// Segments are either bracketed (with `]]` escaping a closing bracket) or
/// plain identifiers.
pub fn split_unique_name(name: &str) -> Result<Vec<String>, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }

    let malformed = |reason: &str| NameError::Malformed {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut chars = trimmed.chars().peekable();

    loop {
        let mut segment = String::new();
        match chars.peek() {
            Some('[') => {
                chars.next();
                loop {
                    match chars.next() {
                        Some(']') => {
                            if chars.peek() == Some(&']') {
                                chars.next();
                                segment.push(']');
                            } else {
                                break;
                            }
                        }
                        Some(c) => segment.push(c),
                        None => return Err(malformed("unterminated '['")),
                    }
                }
            }
            Some(_) => {
                while let Some(&c) = chars.peek() {
                    if c == '.' {
                        break;
                    }
                    if !(c.is_alphanumeric() || c == '_' || c == ' ') {
                        return Err(malformed("unexpected character outside brackets"));
                    }
                    segment.push(c);
                    chars.next();
                }
                segment = segment.trim().to_string();
            }
            None => return Err(malformed("trailing '.'")),
        }

        if segment.is_empty() {
            return Err(malformed("empty segment"));
        }
        segments.push(segment);

        match chars.next() {
            None => break,
            Some('.') => continue,
            Some(_) => return Err(malformed("expected '.' between segments")),
        }
    }

    Ok(segments)
}
