//! This module is an integration test that checks the packing of small value
//! types into shared slots.

#![cfg(test)]

use storage_layout_reconstructor::{ast::TypeReference, build_layout};

mod common;

#[test]
fn packs_adjacent_small_fields_into_one_slot() -> anyhow::Result<()> {
    // bool flag; address owner; uint256 x;
    let catalog = common::catalog(vec![]);
    let variables = vec![
        common::var("flag", common::elementary("t_bool")),
        common::var("owner", common::elementary("t_address")),
        common::var("x", common::elementary("t_uint256")),
    ];

    let layout = build_layout(&catalog, &variables)?;

    // The bool and the address fit together: 8 + 160 = 168 <= 256.
    assert!(layout.has_variable_at(0, 0, "flag"));
    assert!(layout.has_variable_at(0, 8, "owner"));
    assert_eq!(layout.variable_at(0, 8).unwrap().bits, 160);

    // The uint256 no longer fits and starts a fresh slot.
    assert!(layout.has_variable_at(1, 0, "x"));
    assert_eq!(layout.slot_count(), 2);

    // All done
    Ok(())
}

#[test]
fn starts_a_fresh_slot_when_a_field_does_not_fit() -> anyhow::Result<()> {
    // uint128 a; uint192 b; — 128 + 192 > 256, so b cannot share the slot.
    let catalog = common::catalog(vec![]);
    let variables = vec![
        common::var("a", common::elementary("t_uint128")),
        common::var("b", common::elementary("t_uint192")),
    ];

    let layout = build_layout(&catalog, &variables)?;

    assert!(layout.has_variable_at(0, 0, "a"));
    assert!(layout.has_variable_at(1, 0, "b"));

    // The slot that b starts leaves 64 bits free for a following small field.
    let variables_with_tail = {
        let mut variables = variables;
        variables.push(common::var("c", common::elementary("t_uint64")));
        variables
    };
    let layout = build_layout(&catalog, &variables_with_tail)?;
    assert!(layout.has_variable_at(1, 192, "c"));

    Ok(())
}

#[test]
fn fills_a_slot_exactly_before_moving_on() -> anyhow::Result<()> {
    // Four uint64 fields consume slot 0 exactly; the fifth opens slot 1.
    let catalog = common::catalog(vec![]);
    let variables = vec![
        common::var("a", common::elementary("t_uint64")),
        common::var("b", common::elementary("t_uint64")),
        common::var("c", common::elementary("t_uint64")),
        common::var("d", common::elementary("t_uint64")),
        common::var("e", common::elementary("t_uint64")),
    ];

    let layout = build_layout(&catalog, &variables)?;

    assert!(layout.has_variable_at(0, 192, "d"));
    assert!(layout.has_variable_at(1, 0, "e"));

    Ok(())
}

#[test]
fn places_enums_and_contract_references_like_small_integers() -> anyhow::Result<()> {
    let catalog = common::catalog(vec![
        (1, common::enum_decl("Vault.State", &["Open", "Frozen", "Closed"])),
        (2, common::contract_decl("Token")),
    ]);
    let variables = vec![
        common::var("state", TypeReference::user_defined(1)),
        common::var("token", TypeReference::user_defined(2)),
    ];

    let layout = build_layout(&catalog, &variables)?;

    // Three members fit in one byte; the contract reference is an address.
    assert!(layout.has_variable_at(0, 0, "state"));
    assert_eq!(layout.variable_at(0, 0).unwrap().bits, 8);
    assert!(layout.has_variable_at(0, 8, "token"));
    assert_eq!(layout.variable_at(0, 8).unwrap().bits, 160);
    assert_eq!(layout.slot_count(), 1);

    Ok(())
}
