//! Tuple list sorting
//!
//! - [`hierarchize`]: ancestor/descendant traversal order
//! - [`order`]: comparator-based ordering by a key expression, either
//!   preserving the hierarchy or breaking it
//!
//! All sorts are stable: tuples that compare equal keep their input order.

use crate::error::EvalResult;
use mdx_calc_types::{MemberRef, Tuple, TupleList, Value, compare_values};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordering flag of `Order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortFlag {
    Asc,
    Desc,
    BAsc,
    BDesc,
}

impl SortFlag {
    /// Keywords accepted by `Order`
    pub const KEYWORDS: &'static [&'static str] = &["ASC", "DESC", "BASC", "BDESC"];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "BASC" => Some(Self::BAsc),
            "BDESC" => Some(Self::BDesc),
            _ => None,
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc | Self::BDesc)
    }

    /// Whether the sort ignores the hierarchy
    pub fn breaks_hierarchy(&self) -> bool {
        matches!(self, Self::BAsc | Self::BDesc)
    }
}

/// Sort key of one member: the ranks of the members on its path
type PathKey = Vec<usize>;

fn compare_paths(left: &[usize], right: &[usize], post: bool) -> Ordering {
    for (l, r) in left.iter().zip(right) {
        match l.cmp(r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    // One path is a prefix of the other: the ancestor
    let by_depth = left.len().cmp(&right.len());
    if post { by_depth.reverse() } else { by_depth }
}

/// Reorder a list into hierarchical order
///
/// Each member is keyed by the path of sibling ranks from its root down to
/// itself; a member's rank is the position at which it, or one of its
/// descendants, first appears in the input. Tuples compare position by
/// position. In pre order ancestors precede descendants, in post order they
/// follow them.
pub fn hierarchize(list: &TupleList, post: bool) -> EvalResult<TupleList> {
    let mut ranks: HashMap<MemberRef, usize> = HashMap::new();
    let mut keyed: Vec<(Vec<PathKey>, Tuple)> = Vec::with_capacity(list.len());

    for tuple in list.iter() {
        let key = tuple
            .iter()
            .map(|member| {
                member
                    .path()
                    .into_iter()
                    .map(|m| {
                        let next = ranks.len();
                        *ranks.entry(m).or_insert(next)
                    })
                    .collect()
            })
            .collect();
        keyed.push((key, tuple.clone()));
    }

    keyed.sort_by(|(left, _), (right, _)| {
        left.iter()
            .zip(right)
            .map(|(l, r)| compare_paths(l, r, post))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let sorted = keyed.into_iter().map(|(_, tuple)| tuple).collect();
    Ok(TupleList::from_tuples(list.arity(), sorted)?)
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending { ordering.reverse() } else { ordering }
}

/// Order a list by a key computed per tuple
///
/// With a hierarchy-breaking flag, or for tuples of more than one member, the
/// sort is flat. Otherwise members are sorted among their siblings and every
/// member stays below its ancestors; ancestors missing from the list are keyed
/// too, so `key` is called with 1-tuples of ancestors as well. Siblings with
/// equal keys keep the order in which they first appear.
pub fn order(
    list: &TupleList,
    flag: SortFlag,
    mut key: impl FnMut(&Tuple) -> EvalResult<Value>,
) -> EvalResult<TupleList> {
    let descending = flag.is_descending();
    let mut sorted: Vec<Tuple> = list.to_vec();

    if flag.breaks_hierarchy() || list.arity() != 1 {
        let mut keyed = Vec::with_capacity(sorted.len());
        for tuple in sorted {
            let value = key(&tuple)?;
            keyed.push((value, tuple));
        }
        keyed.sort_by(|(l, _), (r, _)| directed(compare_values(l, r), descending));
        sorted = keyed.into_iter().map(|(_, tuple)| tuple).collect();
    } else {
        // Member -> (key, rank of first appearance)
        let mut keys: HashMap<MemberRef, (Value, usize)> = HashMap::new();
        let mut paths = Vec::with_capacity(sorted.len());
        for tuple in sorted {
            let path = match tuple.get(0) {
                Some(member) => member.path(),
                None => Vec::new(),
            };
            for member in &path {
                if !keys.contains_key(member) {
                    let value = key(&Tuple::from_member(member.clone()))?;
                    let rank = keys.len();
                    keys.insert(member.clone(), (value, rank));
                }
            }
            paths.push((path, tuple));
        }

        paths.sort_by(|(left, _), (right, _)| {
            for (l, r) in left.iter().zip(right) {
                if l == r {
                    continue;
                }
                return match (keys.get(l), keys.get(r)) {
                    (Some((lv, lr)), Some((rv, rr))) => {
                        directed(compare_values(lv, rv), descending).then(lr.cmp(rr))
                    }
                    _ => Ordering::Equal,
                };
            }
            left.len().cmp(&right.len())
        });
        sorted = paths.into_iter().map(|(_, tuple)| tuple).collect();
    }

    Ok(TupleList::from_tuples(list.arity(), sorted)?)
}
