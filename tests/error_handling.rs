//! This module is an integration test that checks the failure modes of the
//! layout computation and the paths attached to them.

#![cfg(test)]

use storage_layout_reconstructor::{
    ast::TypeReference,
    build_layout,
    error::Error,
};

mod common;

#[test]
fn rejects_types_without_a_packing_rule() -> anyhow::Result<()> {
    let catalog = common::catalog(vec![]);
    let variables = vec![common::var("rate", common::elementary("t_fixed128x18"))];

    let error = build_layout(&catalog, &variables).unwrap_err();

    assert_eq!(error.path, "rate");
    assert_eq!(
        error.payload,
        Error::UnsupportedType {
            identifier: "t_fixed128x18".into()
        }
    );

    Ok(())
}

#[test]
fn rejects_malformed_array_length_literals() -> anyhow::Result<()> {
    let catalog = common::catalog(vec![]);

    for literal in ["two", "-1", "0x10", ""] {
        let arr = TypeReference::fixed_array(common::elementary("t_uint256"), literal);
        let variables = vec![common::var("arr", arr)];

        let error = build_layout(&catalog, &variables).unwrap_err();

        assert_eq!(error.path, "arr");
        assert_eq!(
            error.payload,
            Error::MalformedLiteral {
                literal: literal.into()
            }
        );
    }

    Ok(())
}

#[test]
fn rejects_references_to_missing_declarations() -> anyhow::Result<()> {
    let catalog = common::catalog(vec![]);
    let variables = vec![common::var("orphan", TypeReference::user_defined(99))];

    let error = build_layout(&catalog, &variables).unwrap_err();

    assert_eq!(error.path, "orphan");
    assert_eq!(error.payload, Error::UnresolvedDeclaration { id: 99 });

    Ok(())
}

#[test]
fn pinpoints_failures_inside_struct_definitions() -> anyhow::Result<()> {
    // The bad member is only reachable through the struct's own layout
    // computation, and the path names the struct member that failed.
    let catalog = common::catalog(vec![(
        1,
        common::struct_decl("Vault.S", &[("bad", common::elementary("t_mystery"))]),
    )]);
    let variables = vec![common::var("s", TypeReference::user_defined(1))];

    let error = build_layout(&catalog, &variables).unwrap_err();

    assert_eq!(error.path, "Vault.S.bad");
    assert_eq!(
        error.payload,
        Error::UnsupportedType {
            identifier: "t_mystery".into()
        }
    );

    Ok(())
}

#[test]
fn pinpoints_failures_in_later_variables() -> anyhow::Result<()> {
    // Everything before the failing variable is sound, but no partial layout
    // escapes: the computation fails as a whole.
    let catalog = common::catalog(vec![]);
    let variables = vec![
        common::var("flag", common::elementary("t_bool")),
        common::var("supply", common::elementary("t_uint256")),
        common::var("rate", common::elementary("t_ufixed256x18")),
    ];

    let result = build_layout(&catalog, &variables);

    let error = result.unwrap_err();
    assert_eq!(error.path, "rate");

    Ok(())
}

#[test]
fn displays_the_offending_path_with_the_error() -> anyhow::Result<()> {
    let catalog = common::catalog(vec![]);
    let variables = vec![common::var("orphan", TypeReference::user_defined(42))];

    let error = build_layout(&catalog, &variables).unwrap_err();
    let message = error.to_string();

    assert!(message.starts_with("[orphan]:"));
    assert!(message.contains("42"));

    Ok(())
}
