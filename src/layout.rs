//! This module contains the definitions for the layout representation types
//! produced by the reconstruction.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{ast::TypeReference, utility::U256Wrapper};

/// A state variable, or a synthetic part of one, as placed at a specific
/// storage location.
///
/// Struct members and fixed-array elements get one of these per primitive
/// cell, with the `full_path` recording how the cell was reached from the
/// declared variable.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageVariable {
    /// The name of the declared state variable this cell belongs to.
    pub name: String,

    /// The full path of the part of the variable at this specific cell.
    ///
    /// For primitives it is equal to `name`; struct members append `.member`
    /// and array elements append `[index]`.
    pub full_path: String,

    #[serde(rename = "type")]
    /// The type of the value stored in this cell.
    pub typ: TypeReference,

    /// The width of the cell in bits.
    ///
    /// Start markers for aggregates carry a width of zero; the cells that the
    /// aggregate occupies carry their own widths.
    pub bits: usize,
}

impl StorageVariable {
    /// Constructs a new storage variable for the cell of width `bits` holding
    /// the part of `name` reached through `full_path`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        full_path: impl Into<String>,
        typ: TypeReference,
        bits: usize,
    ) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            typ,
            bits,
        }
    }
}

/// The complete storage layout reconstructed for one contract or struct.
///
/// A layout is built once per query and returned as an immutable value. All
/// of the maps are ordered so that iteration and serialisation are
/// deterministic.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayout {
    /// The exact variable at each occupied slot and bit offset.
    ///
    /// Structs and fixed-size arrays are resolved into their primitive cells
    /// here; the slots at which they begin are recorded in
    /// [`Self::struct_starts`] and [`Self::dynamic_array_starts`].
    slots: BTreeMap<U256Wrapper, BTreeMap<usize, StorageVariable>>,

    /// The slot at which each array begins.
    ///
    /// For a dynamic array or a string/bytes value this is the slot holding
    /// the length or header word; for a fixed-size array it is the slot of
    /// the first element.
    dynamic_array_starts: BTreeMap<U256Wrapper, StorageVariable>,

    /// The slot at which each inlined struct begins.
    struct_starts: BTreeMap<U256Wrapper, StorageVariable>,

    /// The independently computed layout of every struct type reachable from
    /// the variables, keyed by canonical name.
    ///
    /// Layouts of structs nested within other structs are hoisted into this
    /// map, so the per-struct entries carry no nested layouts of their own.
    named_struct_layouts: BTreeMap<String, StorageLayout>,
}

impl StorageLayout {
    /// Creates a layout with nothing placed in it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `variable` at the bit `offset` within the slot at `index`.
    pub fn record(
        &mut self,
        index: impl Into<U256Wrapper>,
        offset: usize,
        variable: StorageVariable,
    ) {
        self.slots
            .entry(index.into())
            .or_default()
            .insert(offset, variable);
    }

    /// Marks the slot at `index` as the start of the array described by
    /// `variable`.
    pub fn mark_array_start(&mut self, index: impl Into<U256Wrapper>, variable: StorageVariable) {
        self.dynamic_array_starts.insert(index.into(), variable);
    }

    /// Marks the slot at `index` as the start of the inlined struct described
    /// by `variable`.
    pub fn mark_struct_start(&mut self, index: impl Into<U256Wrapper>, variable: StorageVariable) {
        self.struct_starts.insert(index.into(), variable);
    }

    /// Stores `layout` as the independently computed layout of the struct
    /// with the canonical `name`.
    pub fn add_struct_layout(&mut self, name: impl Into<String>, layout: StorageLayout) {
        self.named_struct_layouts.insert(name.into(), layout);
    }

    /// Checks whether a layout for the struct with the canonical `name` has
    /// already been computed.
    #[must_use]
    pub fn has_struct_layout(&self, name: &str) -> bool {
        self.named_struct_layouts.contains_key(name)
    }

    /// Moves every named struct layout out of this layout, leaving none
    /// behind.
    ///
    /// This is used while building to hoist the layouts of nested structs
    /// into the outermost layout under construction.
    pub fn take_named_struct_layouts(&mut self) -> BTreeMap<String, StorageLayout> {
        std::mem::take(&mut self.named_struct_layouts)
    }

    /// Gets the occupied cells of the layout, keyed by slot index and then by
    /// bit offset within the slot.
    #[must_use]
    pub fn slots(&self) -> &BTreeMap<U256Wrapper, BTreeMap<usize, StorageVariable>> {
        &self.slots
    }

    /// Gets the array start markers, keyed by slot index.
    #[must_use]
    pub fn dynamic_array_starts(&self) -> &BTreeMap<U256Wrapper, StorageVariable> {
        &self.dynamic_array_starts
    }

    /// Gets the struct start markers, keyed by slot index.
    #[must_use]
    pub fn struct_starts(&self) -> &BTreeMap<U256Wrapper, StorageVariable> {
        &self.struct_starts
    }

    /// Gets the memoized per-struct layouts, keyed by canonical struct name.
    #[must_use]
    pub fn named_struct_layouts(&self) -> &BTreeMap<String, StorageLayout> {
        &self.named_struct_layouts
    }
}

/// Additional utility functions to enable cleaner testing with the storage
/// layout.
impl StorageLayout {
    /// Gets the variable recorded at slot `index` and bit `offset`, if any.
    #[must_use]
    pub fn variable_at(
        &self,
        index: impl Into<U256Wrapper>,
        offset: usize,
    ) -> Option<&StorageVariable> {
        self.slots.get(&index.into()).and_then(|cells| cells.get(&offset))
    }

    /// Checks if the cell at slot `index` and bit `offset` holds the part of
    /// a variable reached through `full_path`.
    #[must_use]
    pub fn has_variable_at(
        &self,
        index: impl Into<U256Wrapper>,
        offset: usize,
        full_path: &str,
    ) -> bool {
        self.variable_at(index, offset)
            .is_some_and(|variable| variable.full_path == full_path)
    }

    /// Gets the number of distinct occupied slots in the layout.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Checks if the layout has no cells in it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Renders the layout with one line per occupied cell, followed by one line
/// per aggregate start marker.
///
/// The rendering is meant for human inspection in debugger output, not for
/// machine consumption; use the serde representation for the latter.
impl Display for StorageLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cells = self.slots.iter().flat_map(|(index, cells)| {
            cells.iter().map(move |(offset, variable)| {
                format!(
                    "slot {index:?} +{offset}: {} ({} bits)",
                    variable.full_path, variable.bits
                )
            })
        });
        let arrays = self
            .dynamic_array_starts
            .iter()
            .map(|(index, variable)| format!("array at slot {index:?}: {}", variable.full_path));
        let structs = self
            .struct_starts
            .iter()
            .map(|(index, variable)| format!("struct at slot {index:?}: {}", variable.full_path));

        write!(f, "{}", cells.chain(arrays).chain(structs).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::{StorageLayout, StorageVariable};
    use crate::ast::TypeReference;

    fn cell(path: &str, bits: usize) -> StorageVariable {
        StorageVariable::new(path, path, TypeReference::elementary("t_uint128"), bits)
    }

    #[test]
    fn records_and_finds_cells() {
        let mut layout = StorageLayout::new();
        layout.record(0, 0, cell("a", 128));
        layout.record(0, 128, cell("b", 128));
        layout.record(3, 0, cell("c", 256));

        assert_eq!(layout.slot_count(), 2);
        assert!(layout.has_variable_at(0, 128, "b"));
        assert!(!layout.has_variable_at(0, 64, "b"));
        assert!(layout.variable_at(1, 0).is_none());
    }

    #[test]
    fn renders_cells_and_markers() {
        let mut layout = StorageLayout::new();
        layout.record(0, 0, cell("a", 128));
        layout.mark_struct_start(1, cell("s", 0));

        let rendered = layout.to_string();
        assert!(rendered.contains("slot 0 +0: a (128 bits)"));
        assert!(rendered.contains("struct at slot 1: s"));
    }
}
