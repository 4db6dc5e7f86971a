//! This library reconstructs the storage layout of an
//! [EVM](https://ethereum.org/en/developers/docs/evm/) smart contract—the
//! exact slot, byte offset, and bit width assigned to every state
//! variable—purely from the compiler-produced abstract syntax tree. It does
//! not depend on any compiler version's own storage-layout output, which is
//! inconsistently available across versions.
//!
//! # How it Works
//!
//! From a very high level, the reconstruction is performed as follows:
//!
//! 1. The caller decodes the compiler's AST into a [`ast::DeclarationCatalog`]
//!    and an ordered list of [`ast::VariableDeclaration`]s for the target
//!    contract, with inherited variables already linearized.
//! 2. The [`builder::LayoutBuilder`] discovers every struct type reachable
//!    from the variables and memoizes each struct's own layout, computed
//!    independently of where the struct is embedded.
//! 3. The builder then simulates the compiler's bin-packing: it threads a
//!    slot/offset cursor through the variables, recursing through struct
//!    members and fixed-array elements, packing small values together and
//!    giving every dynamic container a fresh slot for its header word.
//! 4. The placements accumulate into a [`StorageLayout`] that can then be
//!    queried, rendered, or serialised.
//!
//! The reconstruction executes no contract code and computes no storage
//! values; it assigns locations only. Where the contents of a dynamic
//! container live is a function of its header slot, and the [`addressing`]
//! module computes those locations for tooling that follows the hashes.
//!
//! # Basic Usage
//!
//! For the most basic usage of the library, it is sufficient to call
//! [`build_layout`], passing your catalog and variable list.
//!
//! ```
//! use storage_layout_reconstructor::{
//!     ast::{DeclarationCatalog, TypeReference, VariableDeclaration},
//!     build_layout,
//! };
//!
//! let catalog = DeclarationCatalog::new();
//! let variables = vec![
//!     VariableDeclaration::new("flag", TypeReference::elementary("t_bool")),
//!     VariableDeclaration::new("owner", TypeReference::elementary("t_address")),
//!     VariableDeclaration::new("supply", TypeReference::elementary("t_uint256")),
//! ];
//!
//! let layout = build_layout(&catalog, &variables).unwrap();
//!
//! assert!(layout.has_variable_at(0, 0, "flag"));
//! assert!(layout.has_variable_at(0, 8, "owner"));
//! assert!(layout.has_variable_at(1, 0, "supply"));
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod addressing;
pub mod ast;
pub mod builder;
pub mod constant;
pub mod error;
pub mod layout;
pub mod size;
pub mod utility;

// Re-exports to provide the library interface.
pub use builder::{build_layout, LayoutBuilder};
pub use layout::{StorageLayout, StorageVariable};
