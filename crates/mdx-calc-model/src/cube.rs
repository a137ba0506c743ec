//! Cube trait for MDX evaluation

use mdx_calc_types::olap::names_match;
use mdx_calc_types::{DimensionRef, HierarchyRef, MemberRef, Value};

/// Source of metadata and cell values for evaluation
pub trait Cube: Send + Sync {
    /// Cube name
    fn name(&self) -> &str;

    /// Dimensions in declaration order
    fn dimensions(&self) -> Vec<DimensionRef>;

    /// All hierarchies of all dimensions
    fn hierarchies(&self) -> Vec<HierarchyRef> {
        self.dimensions()
            .iter()
            .flat_map(|d| d.hierarchies())
            .collect()
    }

    /// Find a hierarchy by name or unique name
    fn lookup_hierarchy(&self, name: &str, case_sensitive: bool) -> Option<HierarchyRef> {
        self.hierarchies().into_iter().find(|h| {
            names_match(h.name(), name, case_sensitive)
                || names_match(h.unique_name(), name, case_sensitive)
        })
    }

    /// Find a member from the segments of its compound name
    ///
    /// The first segment names the hierarchy (or its dimension).
    fn lookup_member(&self, segments: &[String], case_sensitive: bool) -> Option<MemberRef>;

    /// Value of the cell at the given coordinates, one member per hierarchy
    ///
    /// Returns `Value::Null` for an empty cell.
    fn cell_value(&self, coordinates: &[MemberRef]) -> Value;
}
