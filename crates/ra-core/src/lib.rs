//! `ra-core`: foundational types for the `road_atlas` workspace.
//!
//! This crate is a dependency of every other `ra-*` crate.  It has no `ra-*`
//! dependencies and a single required external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `GeomKey`, `NodeId`, `IndexNodeId`                    |
//! | [`geo`]         | `Point`, `BoundingBox`                                |
//! | [`geometry`]    | `Geometry`, `GeometryKind`, `GeometrySet`             |
//! | [`config`]      | `IndexConfig`, `GraphConfig`, `AtlasConfig`           |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AtlasConfig, GraphConfig, IndexConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, Point};
pub use geometry::{Geometry, GeometryKind, GeometrySet};
pub use ids::{GeomKey, IndexNodeId, NodeId};
