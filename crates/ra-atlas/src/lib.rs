//! `ra-atlas`: application context that owns the published data.
//!
//! # Load cycle
//!
//! ```text
//! atlas.load(set):
//!   ① Build     : spatial index and road graph from the same records
//!                 (side by side with the `parallel` feature).
//!   ② Publish   : under the write lock, stamp epoch = current + 1 and swap
//!                 the shared pointer.
//!   ③ Report    : info! event and LoadObserver::on_published.
//! ```
//!
//! Readers never block a build and never observe a half-built generation.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Builds index and graph concurrently via `rayon::join`. |
//! | `serde`    | Derives `Serialize` on `AtlasStats` and config types.  |

pub mod atlas;
pub mod error;
pub mod generation;
pub mod observer;
pub mod stats;

#[cfg(test)]
mod tests;

pub use atlas::Atlas;
pub use error::{AtlasError, AtlasResult};
pub use generation::Generation;
pub use observer::{LoadObserver, NoopObserver};
pub use stats::AtlasStats;
