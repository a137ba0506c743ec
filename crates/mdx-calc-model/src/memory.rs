//! In-memory cube
//!
//! All metadata lives in one shared arena; member, level, hierarchy and
//! dimension handles are an `Arc` to the arena plus an index. Cells are keyed by
//! the sorted unique names of their non-All coordinates.

use crate::Cube;
use indexmap::IndexMap;
use mdx_calc_types::olap::names_match;
use mdx_calc_types::{
    Dimension, DimensionRef, Hierarchy, HierarchyRef, Level, LevelRef, Member, MemberRef, Value,
    split_unique_name,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Handle to a hierarchy under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HierarchyId(usize);

/// Handle to a level under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelId(usize);

/// Handle to a member under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId(usize);

struct DimensionData {
    name: String,
    unique_name: String,
    hierarchies: Vec<usize>,
    is_measures: bool,
}

struct HierarchyData {
    name: String,
    unique_name: String,
    dimension: usize,
    levels: Vec<usize>,
    all_member: Option<usize>,
}

struct LevelData {
    name: String,
    unique_name: String,
    hierarchy: usize,
    depth: usize,
    property_names: Vec<String>,
    members: Vec<usize>,
}

struct MemberData {
    name: String,
    caption: Option<String>,
    unique_name: String,
    level: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    is_all: bool,
    properties: IndexMap<String, Value>,
}

#[derive(Default)]
struct CubeData {
    name: String,
    dimensions: Vec<DimensionData>,
    hierarchies: Vec<HierarchyData>,
    levels: Vec<LevelData>,
    members: Vec<MemberData>,
    cells: HashMap<Vec<String>, Value>,
}

fn quote(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Builder for [`MemoryCube`]
pub struct MemoryCubeBuilder {
    data: CubeData,
}

impl MemoryCubeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            data: CubeData {
                name: name.into(),
                ..CubeData::default()
            },
        }
    }

    fn add_dimension(&mut self, name: &str, is_measures: bool) -> HierarchyId {
        let dimension = self.data.dimensions.len();
        let hierarchy = self.data.hierarchies.len();
        self.data.dimensions.push(DimensionData {
            name: name.to_string(),
            unique_name: quote(name),
            hierarchies: vec![hierarchy],
            is_measures,
        });
        self.data.hierarchies.push(HierarchyData {
            name: name.to_string(),
            unique_name: quote(name),
            dimension,
            levels: Vec::new(),
            all_member: None,
        });
        HierarchyId(hierarchy)
    }

    /// Add a dimension with a single hierarchy of the same name and no All member
    pub fn dimension(&mut self, name: &str) -> HierarchyId {
        self.add_dimension(name, false)
    }

    /// Add a dimension whose hierarchy has an `(All)` level holding one All member
    ///
    /// Root members of the levels added later become children of the All member.
    pub fn dimension_with_all(&mut self, name: &str, all_member: &str) -> HierarchyId {
        let hierarchy = self.add_dimension(name, false);
        let level = self.level(hierarchy, "(All)");
        let member = self.push_member(level, None, all_member, true);
        self.data.hierarchies[hierarchy.0].all_member = Some(member.0);
        hierarchy
    }

    /// Add the measures dimension
    pub fn measures(&mut self) -> LevelId {
        let hierarchy = self.add_dimension("Measures", true);
        self.level(hierarchy, "MeasuresLevel")
    }

    /// Add a level below the existing levels of a hierarchy
    pub fn level(&mut self, hierarchy: HierarchyId, name: &str) -> LevelId {
        let id = self.data.levels.len();
        let data = &mut self.data.hierarchies[hierarchy.0];
        let depth = data.levels.len();
        data.levels.push(id);
        let unique_name = format!("{}.{}", data.unique_name, quote(name));
        self.data.levels.push(LevelData {
            name: name.to_string(),
            unique_name,
            hierarchy: hierarchy.0,
            depth,
            property_names: Vec::new(),
            members: Vec::new(),
        });
        LevelId(id)
    }

    /// Declare a property on a level
    pub fn level_property(&mut self, level: LevelId, name: &str) -> &mut Self {
        self.data.levels[level.0].property_names.push(name.to_string());
        self
    }

    /// Add a member to a level
    ///
    /// Without an explicit parent, a member of the first level below `(All)`
    /// is attached to the All member.
    pub fn member(&mut self, level: LevelId, parent: Option<MemberId>, name: &str) -> MemberId {
        let parent = parent.or_else(|| {
            let level_data = &self.data.levels[level.0];
            let hierarchy = &self.data.hierarchies[level_data.hierarchy];
            match hierarchy.all_member {
                Some(all) if level_data.depth == 1 => Some(MemberId(all)),
                _ => None,
            }
        });
        self.push_member(level, parent, name, false)
    }

    fn push_member(
        &mut self,
        level: LevelId,
        parent: Option<MemberId>,
        name: &str,
        is_all: bool,
    ) -> MemberId {
        let id = self.data.members.len();
        let prefix = match parent {
            Some(p) => self.data.members[p.0].unique_name.clone(),
            None => {
                let hierarchy = self.data.levels[level.0].hierarchy;
                self.data.hierarchies[hierarchy].unique_name.clone()
            }
        };
        if let Some(p) = parent {
            self.data.members[p.0].children.push(id);
        }
        self.data.levels[level.0].members.push(id);
        self.data.members.push(MemberData {
            name: name.to_string(),
            caption: None,
            unique_name: format!("{}.{}", prefix, quote(name)),
            level: level.0,
            parent: parent.map(|p| p.0),
            children: Vec::new(),
            is_all,
            properties: IndexMap::new(),
        });
        MemberId(id)
    }

    /// Set a member's caption
    pub fn caption(&mut self, member: MemberId, caption: &str) -> &mut Self {
        self.data.members[member.0].caption = Some(caption.to_string());
        self
    }

    /// Set a member property value
    pub fn property(&mut self, member: MemberId, name: &str, value: Value) -> &mut Self {
        self.data.members[member.0]
            .properties
            .insert(name.to_string(), value);
        self
    }

    /// Store a numeric cell; All members in `coordinates` are ignored
    pub fn cell(&mut self, coordinates: &[MemberId], value: f64) -> &mut Self {
        self.cell_value(coordinates, Value::from_double(value))
    }

    /// Store a cell of any value
    pub fn cell_value(&mut self, coordinates: &[MemberId], value: Value) -> &mut Self {
        let mut key: Vec<String> = coordinates
            .iter()
            .map(|m| &self.data.members[m.0])
            .filter(|m| !m.is_all)
            .map(|m| m.unique_name.clone())
            .collect();
        key.sort();
        self.data.cells.insert(key, value);
        self
    }

    pub fn build(self) -> MemoryCube {
        MemoryCube {
            data: Arc::new(self.data),
        }
    }
}

/// A cube held entirely in memory
#[derive(Clone)]
pub struct MemoryCube {
    data: Arc<CubeData>,
}

impl MemoryCube {
    /// Start building a cube
    pub fn builder(name: impl Into<String>) -> MemoryCubeBuilder {
        MemoryCubeBuilder::new(name)
    }

    /// Handle for a member created by the builder
    pub fn member_ref(&self, id: MemberId) -> MemberRef {
        member_ref(&self.data, id.0)
    }

    /// Handle for a level created by the builder
    pub fn level_ref(&self, id: LevelId) -> LevelRef {
        level_ref(&self.data, id.0)
    }

    /// Handle for a hierarchy created by the builder
    pub fn hierarchy_ref(&self, id: HierarchyId) -> HierarchyRef {
        hierarchy_ref(&self.data, id.0)
    }

    /// Find a member by its compound name, case-sensitively
    pub fn member(&self, unique_name: &str) -> Option<MemberRef> {
        let segments = split_unique_name(unique_name).ok()?;
        self.lookup_member(&segments, true)
    }
}

fn member_ref(data: &Arc<CubeData>, id: usize) -> MemberRef {
    MemberRef::new(MemoryMember {
        data: Arc::clone(data),
        id,
    })
}

fn level_ref(data: &Arc<CubeData>, id: usize) -> LevelRef {
    LevelRef::new(MemoryLevel {
        data: Arc::clone(data),
        id,
    })
}

fn hierarchy_ref(data: &Arc<CubeData>, id: usize) -> HierarchyRef {
    HierarchyRef::new(MemoryHierarchy {
        data: Arc::clone(data),
        id,
    })
}

fn dimension_ref(data: &Arc<CubeData>, id: usize) -> DimensionRef {
    DimensionRef::new(MemoryDimension {
        data: Arc::clone(data),
        id,
    })
}

impl Cube for MemoryCube {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn dimensions(&self) -> Vec<DimensionRef> {
        (0..self.data.dimensions.len())
            .map(|id| dimension_ref(&self.data, id))
            .collect()
    }

    fn lookup_member(&self, segments: &[String], case_sensitive: bool) -> Option<MemberRef> {
        let (first, rest) = segments.split_first()?;
        let hierarchy = self
            .data
            .hierarchies
            .iter()
            .position(|h| names_match(&h.name, first, case_sensitive))?;

        let data = &self.data;
        let find = |candidates: &[usize], name: &str| {
            candidates
                .iter()
                .copied()
                .find(|&m| names_match(&data.members[m].name, name, case_sensitive))
        };

        let hierarchy_data = &data.hierarchies[hierarchy];
        let roots: Vec<usize> = hierarchy_data
            .levels
            .first()
            .map(|&l| data.levels[l].members.clone())
            .unwrap_or_default();

        let mut current: Option<usize> = None;
        for (i, segment) in rest.iter().enumerate() {
            let next = match current {
                Some(m) => find(&data.members[m].children, segment),
                None => find(&roots, segment).or_else(|| {
                    // `[Store].[USA]` skips the All member
                    let all = hierarchy_data.all_member?;
                    if i == 0 {
                        find(&data.members[all].children, segment)
                    } else {
                        None
                    }
                }),
            };
            current = Some(next?);
        }

        current.map(|id| member_ref(&self.data, id))
    }

    fn cell_value(&self, coordinates: &[MemberRef]) -> Value {
        let mut key: Vec<String> = coordinates
            .iter()
            .filter(|m| !m.is_all())
            .map(|m| m.unique_name().to_string())
            .collect();
        key.sort();
        self.data.cells.get(&key).cloned().unwrap_or(Value::Null)
    }
}

// ============================================================================
// Metadata handles
// ============================================================================

struct MemoryMember {
    data: Arc<CubeData>,
    id: usize,
}

impl MemoryMember {
    fn get(&self) -> &MemberData {
        &self.data.members[self.id]
    }
}

impl Member for MemoryMember {
    fn unique_name(&self) -> &str {
        &self.get().unique_name
    }

    fn name(&self) -> &str {
        &self.get().name
    }

    fn caption(&self) -> &str {
        let member = self.get();
        member.caption.as_deref().unwrap_or(&member.name)
    }

    fn level(&self) -> LevelRef {
        level_ref(&self.data, self.get().level)
    }

    fn parent(&self) -> Option<MemberRef> {
        self.get().parent.map(|p| member_ref(&self.data, p))
    }

    fn children(&self) -> Vec<MemberRef> {
        self.get()
            .children
            .iter()
            .map(|&c| member_ref(&self.data, c))
            .collect()
    }

    fn is_all(&self) -> bool {
        self.get().is_all
    }

    fn depth(&self) -> usize {
        self.data.levels[self.get().level].depth
    }

    fn property_value(&self, name: &str, case_sensitive: bool) -> Option<Value> {
        self.get()
            .properties
            .iter()
            .find(|(key, _)| names_match(key, name, case_sensitive))
            .map(|(_, value)| value.clone())
    }
}

struct MemoryLevel {
    data: Arc<CubeData>,
    id: usize,
}

impl Level for MemoryLevel {
    fn unique_name(&self) -> &str {
        &self.data.levels[self.id].unique_name
    }

    fn name(&self) -> &str {
        &self.data.levels[self.id].name
    }

    fn depth(&self) -> usize {
        self.data.levels[self.id].depth
    }

    fn hierarchy(&self) -> HierarchyRef {
        hierarchy_ref(&self.data, self.data.levels[self.id].hierarchy)
    }

    fn members(&self) -> Vec<MemberRef> {
        self.data.levels[self.id]
            .members
            .iter()
            .map(|&m| member_ref(&self.data, m))
            .collect()
    }

    fn property_names(&self) -> Vec<String> {
        self.data.levels[self.id].property_names.clone()
    }
}

struct MemoryHierarchy {
    data: Arc<CubeData>,
    id: usize,
}

impl Hierarchy for MemoryHierarchy {
    fn unique_name(&self) -> &str {
        &self.data.hierarchies[self.id].unique_name
    }

    fn name(&self) -> &str {
        &self.data.hierarchies[self.id].name
    }

    fn dimension(&self) -> DimensionRef {
        dimension_ref(&self.data, self.data.hierarchies[self.id].dimension)
    }

    fn levels(&self) -> Vec<LevelRef> {
        self.data.hierarchies[self.id]
            .levels
            .iter()
            .map(|&l| level_ref(&self.data, l))
            .collect()
    }

    fn root_members(&self) -> Vec<MemberRef> {
        self.data.hierarchies[self.id]
            .levels
            .first()
            .map(|&l| {
                self.data.levels[l]
                    .members
                    .iter()
                    .map(|&m| member_ref(&self.data, m))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn default_member(&self) -> Option<MemberRef> {
        let hierarchy = &self.data.hierarchies[self.id];
        hierarchy
            .all_member
            .or_else(|| {
                let first_level = *hierarchy.levels.first()?;
                self.data.levels[first_level].members.first().copied()
            })
            .map(|m| member_ref(&self.data, m))
    }

    fn all_member(&self) -> Option<MemberRef> {
        self.data.hierarchies[self.id]
            .all_member
            .map(|m| member_ref(&self.data, m))
    }
}

struct MemoryDimension {
    data: Arc<CubeData>,
    id: usize,
}

impl Dimension for MemoryDimension {
    fn unique_name(&self) -> &str {
        &self.data.dimensions[self.id].unique_name
    }

    fn name(&self) -> &str {
        &self.data.dimensions[self.id].name
    }

    fn hierarchies(&self) -> Vec<HierarchyRef> {
        self.data.dimensions[self.id]
            .hierarchies
            .iter()
            .map(|&h| hierarchy_ref(&self.data, h))
            .collect()
    }

    fn is_measures(&self) -> bool {
        self.data.dimensions[self.id].is_measures
    }
}
