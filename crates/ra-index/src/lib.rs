//! `ra-index`: hierarchical bounding-box index over geometry records.
//!
//! A classic R-tree: leaves hold `(GeomKey, box)` entries, internal nodes
//! hold `(child, box)` entries, and every node caches the union of its
//! entries' boxes.  Nodes live in an arena (`Vec<IndexNode>`) and refer to
//! each other by [`IndexNodeId`](ra_core::IndexNodeId), so parent links do
//! not create ownership cycles.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`tree`]   | `SpatialIndex`: insert, adjust, stats, validation            |
//! | `node`     | `IndexNode`, `Entry`, `NodeKind`, `NodeBox`                  |
//! | `split`    | quadratic leaf split, positional internal split              |
//! | `query`    | range search, best-first and exhaustive k-NN                 |
//! | [`error`]  | `IndexError`, `IndexResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
mod node;
mod query;
mod split;
pub mod tree;

#[cfg(test)]
mod tests;

pub use error::{IndexError, IndexResult};
pub use node::NodeBox;
pub use tree::SpatialIndex;
