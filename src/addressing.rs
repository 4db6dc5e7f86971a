//! This module contains helpers that compute where the contents of
//! reference-typed storage variables actually live.
//!
//! The layout itself only records the slot that holds a dynamic container's
//! length or header word. The contents are addressed through the hash of that
//! slot, and tooling that reads or overrides raw storage needs to follow the
//! same scheme the EVM does. All preimages use big-endian (network) byte
//! ordering.

use ethnum::U256;
use sha3::{Digest, Keccak256};

/// Computes the slot at which the contents of the dynamic array, string, or
/// bytes value headed at `slot` begin.
///
/// This is `keccak256(slot)` over the 32-byte big-endian encoding of the slot
/// index.
#[must_use]
pub fn dynamic_content_base(slot: U256) -> U256 {
    keccak_word(&slot.to_be_bytes())
}

/// Computes the slot that holds the value stored under `key` in the mapping
/// rooted at `slot`.
///
/// This is `keccak256(key ++ slot)`. The `key` must already be encoded the
/// way the EVM encodes mapping keys: value-typed keys are left-padded to 32
/// bytes, while string and bytes keys are hashed over their raw contents.
#[must_use]
pub fn mapping_entry_slot(key: &[u8], slot: U256) -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(key);
    hasher.update(slot.to_be_bytes());
    finalize_word(hasher)
}

/// Computes the slot of the element at `index` within the contents that begin
/// at `base`.
///
/// Slot arithmetic wraps at 2^256, matching the EVM's own behaviour.
#[must_use]
pub fn array_element_slot(base: U256, index: U256) -> U256 {
    base.wrapping_add(index)
}

/// Hashes `data` and interprets the digest as a slot index.
fn keccak_word(data: &[u8]) -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    finalize_word(hasher)
}

#[allow(clippy::missing_panics_doc)] // Panics are guarded and should never happen
fn finalize_word(hasher: Keccak256) -> U256 {
    let hash = hasher.finalize().to_vec();
    U256::from_be_bytes(
        hash.as_slice()
            .try_into()
            .expect("The number of bytes in `hash` should be correct"),
    )
}
