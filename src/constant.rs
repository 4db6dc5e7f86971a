//! This module contains constants that are needed throughout the codebase.

/// The width of a word on the EVM in bits.
///
/// Every storage slot is exactly one word wide.
pub const WORD_SIZE_BITS: usize = 256;

/// The width of a byte on the EVM (and most other places) in bits.
pub const BYTE_SIZE_BITS: usize = 8;

/// The width of a word on the EVM in bytes.
pub const WORD_SIZE_BYTES: usize = WORD_SIZE_BITS / BYTE_SIZE_BITS;

/// The bit-width of a bool type.
///
/// Booleans take up a full byte of their slot despite carrying a single bit of
/// information.
pub const BOOL_WIDTH_BITS: usize = BYTE_SIZE_BITS;

/// The bit-width of an address type.
pub const ADDRESS_WIDTH_BITS: usize = 160;

/// The maximum length of a fixed-size byte array (`bytes1` through `bytes32`).
pub const MAX_BYTES_WIDTH_BYTES: usize = 32;

/// The type identifier that the compiler assigns to a `string` state variable.
pub const STRING_STORAGE_POINTER: &str = "t_string_storage_ptr";

/// The type identifier that the compiler assigns to a `bytes` state variable.
pub const BYTES_STORAGE_POINTER: &str = "t_bytes_storage_ptr";

/// The synthetic type identifier recorded for the slot that holds a string's
/// length-and-short-content header word.
pub const STRING_HEADER: &str = "t_string_header";

/// The synthetic type identifier recorded for the slot that holds a bytes
/// value's length-and-short-content header word.
pub const BYTES_HEADER: &str = "t_bytes_header";

/// The type identifier for a 256-bit unsigned integer, used for the synthetic
/// length cell of a dynamic array.
pub const UINT256: &str = "t_uint256";
