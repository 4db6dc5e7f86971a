//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use storage_layout_reconstructor::ast::{
    ContractDefinition,
    Declaration,
    DeclarationCatalog,
    DeclarationId,
    EnumDefinition,
    StructDefinition,
    StructMember,
    TypeReference,
    VariableDeclaration,
};

/// Constructs a declaration catalog from the provided `entries`.
#[allow(unused)] // It is actually
pub fn catalog(entries: Vec<(DeclarationId, Declaration)>) -> DeclarationCatalog {
    entries.into_iter().collect()
}

/// Constructs a variable declaration for `name` with the type `typ`.
#[allow(unused)] // It is actually
pub fn var(name: &str, typ: TypeReference) -> VariableDeclaration {
    VariableDeclaration::new(name, typ)
}

/// Constructs a reference to the elementary type named by `identifier`.
#[allow(unused)] // It is actually
pub fn elementary(identifier: &str) -> TypeReference {
    TypeReference::elementary(identifier)
}

/// Constructs a struct declaration with the canonical `name` and the provided
/// `members`.
#[allow(unused)] // It is actually
pub fn struct_decl(name: &str, members: &[(&str, TypeReference)]) -> Declaration {
    Declaration::Struct(StructDefinition {
        canonical_name: name.into(),
        members:        members
            .iter()
            .map(|(member_name, typ)| StructMember {
                name: (*member_name).into(),
                typ:  typ.clone(),
            })
            .collect(),
    })
}

/// Constructs an enum declaration with the canonical `name` and the provided
/// `members`.
#[allow(unused)] // It is actually
pub fn enum_decl(name: &str, members: &[&str]) -> Declaration {
    Declaration::Enum(EnumDefinition {
        canonical_name: name.into(),
        members:        members.iter().map(|member| (*member).into()).collect(),
    })
}

/// Constructs a contract declaration with the provided `name`.
#[allow(unused)] // It is actually
pub fn contract_decl(name: &str) -> Declaration {
    Declaration::Contract(ContractDefinition { name: name.into() })
}
