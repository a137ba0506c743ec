//! Tuples and tuple collections
//!
//! - `Tuple`: fixed-arity member sequence
//! - `TupleList`: random-access list over shared storage; subranges are views
//! - `TupleIterable`: lazy, single-use traversal

use crate::MemberRef;
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Tuple list errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TupleListError {
    /// Mutation attempted on a list that was not constructed mutable
    #[error("tuple list is immutable")]
    Immutable,

    /// Tuple arity does not match list arity
    #[error("tuple arity mismatch: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },
}

/// A fixed-length ordered sequence of members
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Tuple(SmallVec<[MemberRef; 4]>);

impl Tuple {
    /// Create a tuple from members
    pub fn new(members: impl IntoIterator<Item = MemberRef>) -> Self {
        Self(members.into_iter().collect())
    }

    /// Create a 1-tuple
    pub fn from_member(member: MemberRef) -> Self {
        let mut members = SmallVec::new();
        members.push(member);
        Self(members)
    }

    /// Number of members
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Members in order
    pub fn members(&self) -> &[MemberRef] {
        &self.0
    }

    /// Member at a position
    pub fn get(&self, position: usize) -> Option<&MemberRef> {
        self.0.get(position)
    }

    /// Iterate over members
    pub fn iter(&self) -> std::slice::Iter<'_, MemberRef> {
        self.0.iter()
    }

    /// Keep only the given positions, in the given order
    pub fn project(&self, positions: &[usize]) -> Tuple {
        Self(positions.iter().filter_map(|&p| self.0.get(p).cloned()).collect())
    }

    /// Concatenate two tuples
    pub fn concat(&self, other: &Tuple) -> Tuple {
        Self(self.0.iter().chain(other.0.iter()).cloned().collect())
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, member) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", member)?;
        }
        write!(f, ")")
    }
}

/// An ordered list of tuples of equal arity
///
/// Storage is shared, so cloning and taking subranges never copies tuples.
/// Only lists constructed with [`TupleList::mutable`] (or copied with
/// [`TupleList::to_mutable`]) accept `push`.
#[derive(Clone)]
pub struct TupleList {
    arity: usize,
    storage: Arc<Vec<Tuple>>,
    start: usize,
    end: usize,
    mutable: bool,
    ordered: bool,
}

impl TupleList {
    /// Create an empty, immutable list
    pub fn empty(arity: usize) -> Self {
        Self::from_vec_unchecked(arity, Vec::new(), false)
    }

    /// Create an empty, mutable list
    pub fn mutable(arity: usize) -> Self {
        Self::from_vec_unchecked(arity, Vec::new(), true)
    }

    /// Create an immutable list, checking every tuple's arity
    pub fn new(arity: usize, tuples: Vec<Tuple>) -> Result<Self, TupleListError> {
        if let Some(bad) = tuples.iter().find(|t| t.arity() != arity) {
            return Err(TupleListError::ArityMismatch {
                expected: arity,
                found: bad.arity(),
            });
        }
        Ok(Self::from_vec_unchecked(arity, tuples, false))
    }

    /// Create an immutable list of 1-tuples
    pub fn from_members(members: impl IntoIterator<Item = MemberRef>) -> Self {
        let tuples = members.into_iter().map(Tuple::from_member).collect();
        Self::from_vec_unchecked(1, tuples, false)
    }

    fn from_vec_unchecked(arity: usize, tuples: Vec<Tuple>, mutable: bool) -> Self {
        let end = tuples.len();
        Self {
            arity,
            storage: Arc::new(tuples),
            start: 0,
            end,
            mutable,
            ordered: true,
        }
    }

    /// Number of members in each tuple
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `push` is allowed
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Whether downstream consumers may rely on the element order
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Tuples as a slice
    pub fn as_slice(&self) -> &[Tuple] {
        &self.storage[self.start..self.end]
    }

    /// Tuple at an index
    pub fn get(&self, index: usize) -> Option<&Tuple> {
        self.as_slice().get(index)
    }

    /// Iterate over tuples
    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.as_slice().iter()
    }

    /// Copy tuples into a vector
    pub fn to_vec(&self) -> Vec<Tuple> {
        self.as_slice().to_vec()
    }

    /// View of `[start, end)`, clamped to the list bounds; never copies
    pub fn subrange(&self, start: usize, end: usize) -> TupleList {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        Self {
            arity: self.arity,
            storage: Arc::clone(&self.storage),
            start: self.start + start,
            end: self.start + end,
            mutable: false,
            ordered: self.ordered,
        }
    }

    /// Copy into a fresh mutable list
    pub fn to_mutable(&self) -> TupleList {
        let mut list = Self::from_vec_unchecked(self.arity, self.to_vec(), true);
        list.ordered = self.ordered;
        list
    }

    /// Append a tuple to a mutable list
    pub fn push(&mut self, tuple: Tuple) -> Result<(), TupleListError> {
        if !self.mutable {
            return Err(TupleListError::Immutable);
        }
        if tuple.arity() != self.arity {
            return Err(TupleListError::ArityMismatch {
                expected: self.arity,
                found: tuple.arity(),
            });
        }
        // Mutable lists are never views, so the window always spans the storage
        Arc::make_mut(&mut self.storage).push(tuple);
        self.end += 1;
        Ok(())
    }

    /// Append all tuples of another list
    pub fn extend_from(&mut self, other: &TupleList) -> Result<(), TupleListError> {
        for tuple in other.iter() {
            self.push(tuple.clone())?;
        }
        Ok(())
    }

    /// Same elements with the ordering marker cleared
    pub fn unordered(mut self) -> TupleList {
        self.ordered = false;
        self
    }

    /// Same elements with the ordering marker set
    pub fn ordered(mut self) -> TupleList {
        self.ordered = true;
        self
    }

    /// Remove duplicates, keeping first occurrences in order
    pub fn distinct(&self) -> TupleList {
        let seen: IndexSet<Tuple> = self.iter().cloned().collect();
        Self::from_vec_unchecked(self.arity, seen.into_iter().collect(), true)
    }

    /// Project every tuple onto `positions` and remove duplicates,
    /// keeping first-seen order
    pub fn project(&self, positions: &[usize]) -> TupleList {
        let seen: IndexSet<Tuple> = self.iter().map(|t| t.project(positions)).collect();
        Self::from_vec_unchecked(positions.len(), seen.into_iter().collect(), true)
    }

    /// Lazy traversal over the shared storage
    pub fn iterable(&self) -> TupleIterable {
        let storage = Arc::clone(&self.storage);
        TupleIterable::new(
            self.arity,
            (self.start..self.end).map(move |i| storage[i].clone()),
        )
    }

    /// Build a mutable list from already-validated tuples
    pub fn from_tuples(arity: usize, tuples: Vec<Tuple>) -> Result<Self, TupleListError> {
        let mut list = Self::new(arity, tuples)?;
        list.mutable = true;
        Ok(list)
    }
}

impl PartialEq for TupleList {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for TupleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for TupleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, tuple) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tuple)?;
        }
        write!(f, "}}")
    }
}

impl<'a> IntoIterator for &'a TupleList {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A lazy, single-use sequence of tuples
pub struct TupleIterable {
    arity: usize,
    iter: Box<dyn Iterator<Item = Tuple> + Send>,
}

impl TupleIterable {
    pub fn new(arity: usize, iter: impl Iterator<Item = Tuple> + Send + 'static) -> Self {
        Self {
            arity,
            iter: Box::new(iter),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Drain into a mutable list
    pub fn materialize(self) -> Result<TupleList, TupleListError> {
        let arity = self.arity;
        let mut list = TupleList::mutable(arity);
        for tuple in self {
            list.push(tuple)?;
        }
        Ok(list)
    }
}

impl Iterator for TupleIterable {
    type Item = Tuple;

    fn next(&mut self) -> Option<Tuple> {
        self.iter.next()
    }
}

impl fmt::Debug for TupleIterable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleIterable")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
