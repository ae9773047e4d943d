use ra_core::CoreError;
use ra_graph::GraphError;
use ra_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("atlas configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("spatial index build failed: {0}")]
    Index(#[from] IndexError),

    #[error("road graph build failed: {0}")]
    Graph(#[from] GraphError),
}

pub type AtlasResult<T> = Result<T, AtlasError>;
