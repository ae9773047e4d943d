//! Spatial-index error type.

use thiserror::Error;

use ra_core::{CoreError, IndexNodeId};

/// Errors produced by `ra-index`.
///
/// Insertion and queries are infallible.  These variants come from
/// configuration checks and from [`SpatialIndex::validate`](crate::SpatialIndex::validate).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("index invariant violated at node {node}: {reason}")]
    Invariant { node: IndexNodeId, reason: String },
}

pub type IndexResult<T> = Result<T, IndexError>;
