//! This module contains the closed representation of the compiler's AST that
//! the layout algorithm consumes.
//!
//! The raw AST JSON produced by the compiler is polymorphic and tagged by
//! node-type strings. None of that reaches this library: the ingesting
//! component is expected to decode the parts that matter for storage layout
//! into the exhaustive unions defined here before calling in. This makes an
//! unhandled type category a compile error rather than a runtime surprise.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The identifier of a declaration node in the compiler's AST.
///
/// User-defined type references carry one of these, and it resolves to the
/// referenced definition through the [`DeclarationCatalog`].
pub type DeclarationId = usize;

/// A reference to a type, as written at a variable declaration site.
///
/// # Invariants
///
/// Each individual variant in the enum describes the invariants placed upon
/// it. It is the responsibility of the code constructing these values to
/// ensure that the invariants are satisfied. Code utilising them will assume
/// that the data has been correctly constructed.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReference {
    /// A primitive value type, named by the compiler's type `identifier`
    /// (`t_bool`, `t_uint128`, `t_address`, and so on).
    ///
    /// The bit width is not stored here; it is resolved through the sizing
    /// rules in [`crate::size`] when the variable is placed.
    Elementary { identifier: String },

    /// A reference to an enum, struct, or contract `declaration` in the
    /// catalog.
    UserDefined { declaration: DeclarationId },

    /// A mapping from `key` to `value`.
    Mapping {
        #[serde(rename = "key_type")]
        key:   Box<TypeReference>,
        #[serde(rename = "value_type")]
        value: Box<TypeReference>,
    },

    /// An array of `element`s.
    ///
    /// The `length` carries the raw literal from the AST, so a fixed length
    /// that is not a non-negative integer is still representable and is
    /// rejected during placement. A `length` of [`None`] means the array is
    /// dynamically sized.
    Array {
        element: Box<TypeReference>,
        length:  Option<String>,
    },

    /// A function type.
    ///
    /// Function-typed fields are rare in storage; one occupies a full word if
    /// it is ever stored.
    Function,
}

impl TypeReference {
    /// Constructs a reference to the elementary type named by `identifier`.
    #[must_use]
    pub fn elementary(identifier: impl Into<String>) -> Self {
        Self::Elementary {
            identifier: identifier.into(),
        }
    }

    /// Constructs a reference to the user-defined type with id `declaration`.
    #[must_use]
    pub fn user_defined(declaration: DeclarationId) -> Self {
        Self::UserDefined { declaration }
    }

    /// Constructs a reference to a mapping from `key` to `value`.
    #[must_use]
    pub fn mapping(key: TypeReference, value: TypeReference) -> Self {
        Self::Mapping {
            key:   Box::new(key),
            value: Box::new(value),
        }
    }

    /// Constructs a reference to a dynamically-sized array of `element`s.
    #[must_use]
    pub fn dynamic_array(element: TypeReference) -> Self {
        Self::Array {
            element: Box::new(element),
            length:  None,
        }
    }

    /// Constructs a reference to a fixed-size array of `element`s whose length
    /// is given by the raw `length` literal from the AST.
    #[must_use]
    pub fn fixed_array(element: TypeReference, length: impl Into<String>) -> Self {
        Self::Array {
            element: Box::new(element),
            length:  Some(length.into()),
        }
    }

    /// Produces a human-readable label for the type, resolving user-defined
    /// references through the provided `catalog`.
    ///
    /// This is intended for display in debugger frontends, and hence never
    /// fails: a reference that cannot be resolved is labelled as such.
    #[must_use]
    pub fn label(&self, catalog: &DeclarationCatalog) -> String {
        match self {
            Self::Elementary { identifier } => {
                let stripped = identifier.strip_prefix("t_").unwrap_or(identifier);
                let stripped = stripped.strip_suffix("_storage_ptr").unwrap_or(stripped);
                stripped.replace('_', " ")
            }
            Self::UserDefined { declaration } => catalog
                .resolve(*declaration)
                .map_or_else(|| format!("unresolved({declaration})"), |d| d.name().into()),
            Self::Mapping { key, value } => {
                format!("mapping({} => {})", key.label(catalog), value.label(catalog))
            }
            Self::Array { element, length } => format!(
                "{}[{}]",
                element.label(catalog),
                length.as_deref().unwrap_or("")
            ),
            Self::Function => "function".into(),
        }
    }
}

/// The definition of an enum type.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    /// The fully-qualified name of the enum.
    pub canonical_name: String,

    /// The names of the enum's members, in declaration order.
    ///
    /// The member count determines the bit width of a stored value of the
    /// enum's type.
    pub members: Vec<String>,
}

/// A single member of a struct definition.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct StructMember {
    /// The name of the member as written in the struct definition.
    pub name: String,

    #[serde(rename = "type")]
    /// The type of the member.
    pub typ: TypeReference,
}

/// The definition of a struct type.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDefinition {
    /// The fully-qualified name of the struct, used as the memoization key for
    /// its independently computed layout.
    pub canonical_name: String,

    /// The members of the struct, in declaration order.
    pub members: Vec<StructMember>,
}

/// The definition of a contract.
///
/// A contract-typed state variable stores the address of the referenced
/// contract, so only the name is of interest here.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ContractDefinition {
    /// The name of the contract.
    pub name: String,
}

/// A declaration that a user-defined type reference can resolve to.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    /// An enum definition.
    Enum(EnumDefinition),

    /// A struct definition.
    Struct(StructDefinition),

    /// A contract definition.
    Contract(ContractDefinition),
}

impl Declaration {
    /// Gets the name under which the declaration is known.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(d) => &d.canonical_name,
            Self::Struct(d) => &d.canonical_name,
            Self::Contract(d) => &d.name,
        }
    }
}

/// A read-only view of the declarations in the compilation unit, keyed by
/// declaration id.
///
/// The catalog is consulted on demand while traversing type references; it is
/// never mutated during a layout computation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeclarationCatalog {
    declarations: HashMap<DeclarationId, Declaration>,
}

impl DeclarationCatalog {
    /// Creates a catalog with no declarations in it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `declaration` to the catalog under `id`, replacing any previous
    /// declaration with the same id.
    pub fn add(&mut self, id: DeclarationId, declaration: Declaration) {
        self.declarations.insert(id, declaration);
    }

    /// Resolves `id` to the corresponding declaration, if there is one.
    #[must_use]
    pub fn resolve(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(&id)
    }

    /// Gets the number of declarations in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Checks if the catalog contains no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl FromIterator<(DeclarationId, Declaration)> for DeclarationCatalog {
    fn from_iter<T: IntoIterator<Item = (DeclarationId, Declaration)>>(iter: T) -> Self {
        let declarations = iter.into_iter().collect();
        Self { declarations }
    }
}

/// A top-level state variable declaration.
///
/// The caller supplies these in the order in which the compiler lays them out,
/// with inherited variables already linearized across the inheritance chain.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct VariableDeclaration {
    /// The name of the variable as written in the contract source.
    pub name: String,

    #[serde(rename = "type")]
    /// The declared type of the variable.
    pub typ: TypeReference,
}

impl VariableDeclaration {
    /// Constructs a new variable declaration for `name` with the type `typ`.
    #[must_use]
    pub fn new(name: impl Into<String>, typ: TypeReference) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ContractDefinition,
        Declaration,
        DeclarationCatalog,
        EnumDefinition,
        TypeReference,
    };

    #[test]
    fn resolves_present_declarations() {
        let catalog: DeclarationCatalog = [(
            7,
            Declaration::Contract(ContractDefinition {
                name: "Token".into(),
            }),
        )]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve(7).map(Declaration::name), Some("Token"));
    }

    #[test]
    fn does_not_resolve_missing_declarations() {
        let catalog = DeclarationCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.resolve(7).is_none());
    }

    #[test]
    fn labels_elementary_types() {
        let catalog = DeclarationCatalog::new();
        assert_eq!(
            TypeReference::elementary("t_uint256").label(&catalog),
            "uint256"
        );
        assert_eq!(
            TypeReference::elementary("t_address_payable").label(&catalog),
            "address payable"
        );
        assert_eq!(
            TypeReference::elementary("t_string_storage_ptr").label(&catalog),
            "string"
        );
    }

    #[test]
    fn labels_composite_types() {
        let catalog: DeclarationCatalog = [(
            1,
            Declaration::Enum(EnumDefinition {
                canonical_name: "Token.State".into(),
                members:        vec!["Open".into(), "Closed".into()],
            }),
        )]
        .into_iter()
        .collect();

        let mapping = TypeReference::mapping(
            TypeReference::elementary("t_address"),
            TypeReference::dynamic_array(TypeReference::user_defined(1)),
        );
        assert_eq!(
            mapping.label(&catalog),
            "mapping(address => Token.State[])"
        );

        let array = TypeReference::fixed_array(TypeReference::elementary("t_uint8"), "4");
        assert_eq!(array.label(&catalog), "uint8[4]");
    }
}
