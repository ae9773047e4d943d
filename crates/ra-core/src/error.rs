//! Core error type.
//!
//! Only construction-time validation can fail here.  Queries never return
//! errors: "nothing found" is an empty collection, `None`, or a route with
//! `found == false`.

use thiserror::Error;

/// Errors produced while building `ra-core` values.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("geometry {id} has no vertices")]
    EmptyGeometry { id: i64 },

    #[error("geometry {id} has a non-finite vertex ({x}, {y})")]
    NonFiniteCoordinate { id: i64, x: f64, y: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ra-core`.
pub type CoreResult<T> = Result<T, CoreError>;
