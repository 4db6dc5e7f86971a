//! This module contains the error types for the layout reconstruction process.
//!
//! All of the errors implement [`std::error::Error`], and hence can be used
//! with [`anyhow::Error`].

use std::fmt::Formatter;

use thiserror::Error;

use crate::ast::DeclarationId;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. A failure aborts the layout computation in
/// progress as a whole; no partial layout is ever returned.
pub type Result<T> = std::result::Result<T, LocatedError>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A type identifier for which no storage packing rule exists.
    #[error("The type {identifier:?} has no known storage packing rule")]
    UnsupportedType { identifier: String },

    /// A fixed-size array whose length literal is not a non-negative integer.
    #[error("The array length {literal:?} is not a non-negative integer literal")]
    MalformedLiteral { literal: String },

    /// A user-defined type reference whose declaration id is absent from the
    /// declaration catalog.
    #[error("The declaration with id {id} is missing from the declaration catalog")]
    UnresolvedDeclaration { id: DeclarationId },
}

/// An error that is localised to the state variable that was being placed when
/// the error occurred.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The full path of the variable whose placement failed.
    pub path: String,

    /// The error data
    pub payload: E,
}

/// Displays the error associated with the full path of the variable whose
/// placement failed.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.path, self.payload)
    }
}

/// A trait for types that can have a variable path attached to them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached variable path.
    type Located;

    /// Attach the full `path` of the variable being placed to the error.
    fn locate(self, path: &str) -> Self::Located;
}

impl Locatable for Error {
    type Located = LocatedError;

    fn locate(self, path: &str) -> Self::Located {
        Located {
            path:    path.into(),
            payload: self,
        }
    }
}

/// A blanket implementation that allows for attaching a variable path to any
/// result.
impl<T, E> Locatable for std::result::Result<T, E>
where
    E: std::error::Error + Clone,
{
    type Located = std::result::Result<T, Located<E>>;

    fn locate(self, path: &str) -> Self::Located {
        self.map_err(|payload| Located {
            path: path.into(),
            payload,
        })
    }
}

/// A library error with the associated path of the variable that caused it.
pub type LocatedError = Located<Error>;
