//! Graph-subsystem error type.

use thiserror::Error;

use ra_core::{CoreError, NodeId};

/// Errors produced by `ra-graph`.
///
/// Routing never errors: an unreachable or unsnappable query is a
/// [`Route`](crate::Route) with `found == false`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type GraphResult<T> = Result<T, GraphError>;
