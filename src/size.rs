//! This module contains the pure sizing rules that map type identifiers and
//! enum member counts to the bit widths they occupy in storage.

use crate::{
    constant::{
        ADDRESS_WIDTH_BITS,
        BOOL_WIDTH_BITS,
        BYTES_STORAGE_POINTER,
        BYTE_SIZE_BITS,
        MAX_BYTES_WIDTH_BYTES,
        STRING_STORAGE_POINTER,
        WORD_SIZE_BITS,
    },
    error::Error,
};

/// Computes the width in bits that a value of the elementary type named by
/// `identifier` occupies in storage.
///
/// The width of a `string` or `bytes` identifier is the width of its header
/// word only; the contents are not placed statically.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if `identifier` does not name an
/// elementary type with a known width.
pub fn bit_width_of(identifier: &str) -> Result<usize, Error> {
    match identifier {
        STRING_STORAGE_POINTER | BYTES_STORAGE_POINTER => Ok(WORD_SIZE_BITS),
        "t_bool" => Ok(BOOL_WIDTH_BITS),
        "t_address" | "t_address_payable" => Ok(ADDRESS_WIDTH_BITS),
        _ => {
            if let Some(suffix) = identifier.strip_prefix("t_uint") {
                integer_width(identifier, suffix)
            } else if let Some(suffix) = identifier.strip_prefix("t_int") {
                integer_width(identifier, suffix)
            } else if let Some(suffix) = identifier.strip_prefix("t_bytes") {
                bytes_width(identifier, suffix)
            } else {
                Err(unsupported(identifier))
            }
        }
    }
}

/// Computes the width in bits of a stored value of an enum with
/// `member_count` members.
///
/// This is the number of bits needed to represent the largest member index,
/// rounded up to a whole number of bytes. An empty enum cannot be declared,
/// but a count of zero is treated like a count of one rather than panicking.
#[must_use]
pub fn enum_width_bits(member_count: usize) -> usize {
    let index_bits = usize::BITS as usize
        - member_count.saturating_sub(1).leading_zeros() as usize;
    let bits = index_bits.max(1);
    bits.div_ceil(BYTE_SIZE_BITS) * BYTE_SIZE_BITS
}

/// Parses the width suffix of a `uintN` or `intN` identifier.
///
/// The compiler only produces widths that are whole bytes between 8 and 256
/// bits, so anything else is rejected rather than silently producing a width
/// that cannot be packed.
fn integer_width(identifier: &str, suffix: &str) -> Result<usize, Error> {
    let bits: usize = suffix.parse().map_err(|_| unsupported(identifier))?;
    if bits == 0 || bits > WORD_SIZE_BITS || bits % BYTE_SIZE_BITS != 0 {
        return Err(unsupported(identifier));
    }
    Ok(bits)
}

/// Parses the length suffix of a `bytesN` identifier into a width in bits.
fn bytes_width(identifier: &str, suffix: &str) -> Result<usize, Error> {
    let length: usize = suffix.parse().map_err(|_| unsupported(identifier))?;
    if length == 0 || length > MAX_BYTES_WIDTH_BYTES {
        return Err(unsupported(identifier));
    }
    Ok(length * BYTE_SIZE_BITS)
}

fn unsupported(identifier: &str) -> Error {
    Error::UnsupportedType {
        identifier: identifier.into(),
    }
}
