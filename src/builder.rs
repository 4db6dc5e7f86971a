//! This module contains the layout builder: the type-directed packing
//! simulator that assigns every state variable of a contract to its storage
//! slot and bit offset.
//!
//! The builder walks the ordered variable list twice. A first pass discovers
//! every struct type reachable from the variables and memoizes each struct's
//! own layout, computed independently of where the struct is embedded. A
//! second pass threads a slot/offset cursor through the variables, applying
//! one placement rule per type category. The same rules apply uniformly
//! whether a value is a top-level variable, a fixed-array element, or a
//! struct member, which is what makes nested packing come out right.

use crate::{
    ast::{
        Declaration,
        DeclarationCatalog,
        DeclarationId,
        StructDefinition,
        TypeReference,
        VariableDeclaration,
    },
    constant::{
        ADDRESS_WIDTH_BITS,
        BYTES_HEADER,
        BYTES_STORAGE_POINTER,
        STRING_HEADER,
        STRING_STORAGE_POINTER,
        UINT256,
        WORD_SIZE_BITS,
    },
    error::{Error, Locatable, Located, Result},
    layout::{StorageLayout, StorageVariable},
    size,
};

/// Builds the complete storage layout for the ordered state `variables` of a
/// contract, resolving user-defined types through `catalog`.
///
/// The variables must be supplied in the order in which the compiler lays
/// them out, with inherited variables already linearized.
///
/// # Errors
///
/// Fails atomically, with the error carrying the path of the offending
/// variable, if any type has no packing rule, any fixed-array length literal
/// is malformed, or any referenced declaration is missing from the catalog.
pub fn build_layout(
    catalog: &DeclarationCatalog,
    variables: &[VariableDeclaration],
) -> Result<StorageLayout> {
    LayoutBuilder::new(catalog).build(variables)
}

/// The position at which the next value will be placed: a slot index and a
/// bit offset within that slot.
///
/// The offset is always in `[0, 256)`; placements that consume a slot exactly
/// move the cursor to the start of the next slot rather than leaving it
/// hanging at the slot's end.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Cursor {
    slot:   usize,
    offset: usize,
}

impl Cursor {
    /// Moves to the start of the next slot if any bits of the current slot
    /// have been consumed.
    fn align_to_boundary(&mut self) {
        if self.offset > 0 {
            self.advance_slot();
        }
    }

    /// Moves to the start of the next slot unconditionally.
    fn advance_slot(&mut self) {
        self.slot += 1;
        self.offset = 0;
    }
}

/// A variable queued for placement, carrying the full path accumulated
/// through struct and array recursion.
#[derive(Clone, Debug, Eq, PartialEq)]
struct PendingVariable {
    name:      String,
    full_path: String,
    typ:       TypeReference,
}

impl PendingVariable {
    /// Creates the pending form of a declared top-level variable.
    fn from_declaration(declaration: &VariableDeclaration) -> Self {
        Self {
            name:      declaration.name.clone(),
            full_path: declaration.name.clone(),
            typ:       declaration.typ.clone(),
        }
    }

    /// Converts the pending variable into a placed cell of width `bits`.
    fn placed(&self, bits: usize) -> StorageVariable {
        StorageVariable::new(
            self.name.clone(),
            self.full_path.clone(),
            self.typ.clone(),
            bits,
        )
    }
}

/// The `LayoutBuilder` wires the declaration catalog, the struct registrar,
/// and the slot allocator together into the public entry point for layout
/// reconstruction.
///
/// A builder borrows its catalog and can be reused for any number of
/// computations over that catalog; each call to [`Self::build`] produces an
/// independent layout with its own struct memoization, so unrelated
/// contracts with colliding struct names can never interfere.
#[derive(Clone, Copy, Debug)]
pub struct LayoutBuilder<'c> {
    catalog: &'c DeclarationCatalog,
}

impl<'c> LayoutBuilder<'c> {
    /// Constructs a new layout builder that resolves user-defined type
    /// references through `catalog`.
    #[must_use]
    pub fn new(catalog: &'c DeclarationCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the layout for the ordered state `variables`.
    ///
    /// # Errors
    ///
    /// See [`build_layout`].
    pub fn build(&self, variables: &[VariableDeclaration]) -> Result<StorageLayout> {
        let pending = variables
            .iter()
            .map(PendingVariable::from_declaration)
            .collect();
        self.build_from(pending)
    }

    /// Builds a layout from an already-pathed variable list.
    ///
    /// This is the shared entry for the top-level contract variables and,
    /// recursively, for a struct's own member list.
    fn build_from(&self, variables: Vec<PendingVariable>) -> Result<StorageLayout> {
        let mut layout = StorageLayout::new();

        for variable in &variables {
            self.register_meta(&mut layout, &variable.typ, &variable.full_path)?;
        }

        let mut cursor = Cursor::default();
        for variable in variables {
            self.assign_slot(&mut layout, variable, &mut cursor)?;
        }

        Ok(layout)
    }

    /// Recursively discovers every struct type reachable from `typ` and
    /// memoizes each struct's own layout under its canonical name.
    ///
    /// Registration is idempotent: a struct whose canonical name is already
    /// present is not recomputed, so each struct's layout is computed exactly
    /// once per build regardless of how many places embed it. Enum and
    /// contract references need no registration.
    fn register_meta(
        &self,
        layout: &mut StorageLayout,
        typ: &TypeReference,
        path: &str,
    ) -> Result<()> {
        match typ {
            TypeReference::Elementary { .. } | TypeReference::Function => Ok(()),
            TypeReference::UserDefined { declaration } => {
                let Declaration::Struct(definition) = self.resolve(*declaration, path)? else {
                    return Ok(());
                };
                if layout.has_struct_layout(&definition.canonical_name) {
                    return Ok(());
                }

                let members = definition
                    .members
                    .iter()
                    .map(|member| PendingVariable {
                        name:      member.name.clone(),
                        full_path: member.name.clone(),
                        typ:       member.typ.clone(),
                    })
                    .collect();
                let mut inner = self.build_from(members).map_err(|error| Located {
                    path:    format!("{}.{}", definition.canonical_name, error.path),
                    payload: error.payload,
                })?;

                // Hoist the layouts of structs nested within this one, so the
                // memo table of the outermost layout is flat.
                for (name, nested) in inner.take_named_struct_layouts() {
                    if !layout.has_struct_layout(&name) {
                        layout.add_struct_layout(name, nested);
                    }
                }
                layout.add_struct_layout(definition.canonical_name.clone(), inner);

                Ok(())
            }
            TypeReference::Mapping { key, value } => {
                self.register_meta(layout, key, path)?;
                self.register_meta(layout, value, path)
            }
            TypeReference::Array { element, .. } => self.register_meta(layout, element, path),
        }
    }

    /// Places `variable` into `layout`, advancing `cursor` past it.
    ///
    /// This dispatches on the type category of the variable and recurses for
    /// the members of structs and the elements of fixed-size arrays.
    fn assign_slot(
        &self,
        layout: &mut StorageLayout,
        variable: PendingVariable,
        cursor: &mut Cursor,
    ) -> Result<()> {
        match variable.typ.clone() {
            TypeReference::Mapping { .. } => {
                // A mapping owns a full slot; only its hash matters at
                // runtime, so nothing else may share the slot.
                cursor.align_to_boundary();
                layout.record(cursor.slot, 0, variable.placed(WORD_SIZE_BITS));
                cursor.advance_slot();
                Ok(())
            }
            TypeReference::Array { element, length } => match length {
                None => {
                    Self::place_dynamic_array(layout, &variable, cursor);
                    Ok(())
                }
                Some(literal) => {
                    self.place_fixed_array(layout, variable, &element, &literal, cursor)
                }
            },
            TypeReference::UserDefined { declaration } => {
                match self.resolve(declaration, &variable.full_path)? {
                    Declaration::Enum(definition) => {
                        let bits = size::enum_width_bits(definition.members.len());
                        Self::place_packed(layout, &variable, bits, cursor);
                        Ok(())
                    }
                    Declaration::Contract(_) => {
                        // A contract-typed variable stores the contract's
                        // address.
                        Self::place_packed(layout, &variable, ADDRESS_WIDTH_BITS, cursor);
                        Ok(())
                    }
                    Declaration::Struct(definition) => {
                        self.place_struct(layout, &variable, definition, cursor)
                    }
                }
            }
            TypeReference::Elementary { identifier } => {
                if identifier == STRING_STORAGE_POINTER || identifier == BYTES_STORAGE_POINTER {
                    Self::place_string_or_bytes(layout, &variable, &identifier, cursor);
                    Ok(())
                } else {
                    let bits = size::bit_width_of(&identifier).locate(&variable.full_path)?;
                    Self::place_packed(layout, &variable, bits, cursor);
                    Ok(())
                }
            }
            TypeReference::Function => {
                // Function-typed fields are not on the normal path for state
                // variables; one takes up a whole word if stored.
                Self::place_packed(layout, &variable, WORD_SIZE_BITS, cursor);
                Ok(())
            }
        }
    }

    /// Places a `bits`-wide value with the packing rule shared by elementary
    /// values, enums, and contract references.
    ///
    /// A value that still fits in the current slot is packed alongside the
    /// previous one; a value that does not starts a fresh slot.
    fn place_packed(
        layout: &mut StorageLayout,
        variable: &PendingVariable,
        bits: usize,
        cursor: &mut Cursor,
    ) {
        if cursor.offset + bits > WORD_SIZE_BITS {
            cursor.align_to_boundary();
        }
        layout.record(cursor.slot, cursor.offset, variable.placed(bits));
        cursor.offset += bits;
        if cursor.offset == WORD_SIZE_BITS {
            cursor.advance_slot();
        }
    }

    /// Places a dynamic array: a fresh slot holding the 256-bit length word,
    /// with the contents living at the hash of that slot.
    ///
    /// The length slot is never packed alongside a preceding field, even when
    /// the current slot has room left.
    fn place_dynamic_array(
        layout: &mut StorageLayout,
        variable: &PendingVariable,
        cursor: &mut Cursor,
    ) {
        cursor.align_to_boundary();
        layout.mark_array_start(cursor.slot, variable.placed(0));

        let length_cell = StorageVariable::new(
            variable.name.clone(),
            format!("{}.length", variable.full_path),
            TypeReference::elementary(UINT256),
            WORD_SIZE_BITS,
        );
        layout.record(cursor.slot, 0, length_cell);
        cursor.advance_slot();
    }

    /// Places a fixed-size array by placing each element in turn, exactly as
    /// if the elements had been declared as consecutive variables.
    ///
    /// The array starts at a slot boundary and the cursor is forced past its
    /// last slot afterwards, so neighbouring fields never share a slot with
    /// array elements. Small elements still pack with each other inside the
    /// array.
    fn place_fixed_array(
        &self,
        layout: &mut StorageLayout,
        variable: PendingVariable,
        element: &TypeReference,
        literal: &str,
        cursor: &mut Cursor,
    ) -> Result<()> {
        let count: usize = literal.parse().map_err(|_| {
            Error::MalformedLiteral {
                literal: literal.into(),
            }
            .locate(&variable.full_path)
        })?;

        cursor.align_to_boundary();
        layout.mark_array_start(cursor.slot, variable.placed(0));

        for index in 0..count {
            let element_variable = PendingVariable {
                name:      variable.name.clone(),
                full_path: format!("{}[{index}]", variable.full_path),
                typ:       element.clone(),
            };
            self.assign_slot(layout, element_variable, cursor)?;
        }

        cursor.align_to_boundary();
        Ok(())
    }

    /// Places an inlined struct: the first member starts at a slot boundary,
    /// members are placed in declared order with the normal rules, and the
    /// cursor is forced past the struct's last slot afterwards so a following
    /// field never straddles it.
    fn place_struct(
        &self,
        layout: &mut StorageLayout,
        variable: &PendingVariable,
        definition: &StructDefinition,
        cursor: &mut Cursor,
    ) -> Result<()> {
        cursor.align_to_boundary();
        layout.mark_struct_start(cursor.slot, variable.placed(0));

        for member in &definition.members {
            let member_variable = PendingVariable {
                name:      variable.name.clone(),
                full_path: format!("{}.{}", variable.full_path, member.name),
                typ:       member.typ.clone(),
            };
            self.assign_slot(layout, member_variable, cursor)?;
        }

        cursor.align_to_boundary();
        Ok(())
    }

    /// Places a string or bytes value: a fresh slot holding the 256-bit
    /// header word that carries the length, with long contents living at the
    /// hash of that slot.
    fn place_string_or_bytes(
        layout: &mut StorageLayout,
        variable: &PendingVariable,
        identifier: &str,
        cursor: &mut Cursor,
    ) {
        cursor.align_to_boundary();
        layout.mark_array_start(cursor.slot, variable.placed(0));

        let header_identifier = if identifier == STRING_STORAGE_POINTER {
            STRING_HEADER
        } else {
            BYTES_HEADER
        };
        let header_cell = StorageVariable::new(
            variable.name.clone(),
            variable.full_path.clone(),
            TypeReference::elementary(header_identifier),
            WORD_SIZE_BITS,
        );
        layout.record(cursor.slot, 0, header_cell);
        cursor.advance_slot();
    }

    /// Resolves `id` through the catalog, attaching the `path` of the
    /// variable being placed on failure.
    fn resolve(&self, id: DeclarationId, path: &str) -> Result<&'c Declaration> {
        self.catalog
            .resolve(id)
            .ok_or_else(|| Error::UnresolvedDeclaration { id }.locate(path))
    }
}
