//! `ra-graph`: road graph, node snapping, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadGraph`, `GraphNode`, `RoadGraphBuilder`                |
//! | `snap`      | first-match vertex snapping over a hash grid                |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, `AStarRouter`    |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod network;
pub mod router;
mod snap;


pub use error::{GraphError, GraphResult};
pub use network::{GraphNode, RoadGraph, RoadGraphBuilder};
pub use router::{AStarRouter, DijkstraRouter, Route, Router};
