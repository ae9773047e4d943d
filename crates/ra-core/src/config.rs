//! Tuning knobs for the spatial index, the road graph, and the atlas that
//! owns both.
//!
//! All structs are plain data with a `Default` matching the reference
//! behaviour (fan-out 2..4, snap threshold 1e-4, graph built on load).  Call
//! `validate()` before handing a hand-built config to a constructor; the
//! `ra-atlas` context does this for you.

use crate::{CoreError, CoreResult};

// ── IndexConfig ───────────────────────────────────────────────────────────────

/// Fan-out bounds of the bounding-box tree.
///
/// `max_entries` is the split threshold: a node splits when it holds more
/// than this many entries.  `min_entries` is recorded for reporting only;
/// nothing is ever deleted, so no underflow handling exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    pub max_entries: usize,
    pub min_entries: usize,
}

impl IndexConfig {
    pub const DEFAULT_MAX_ENTRIES: usize = 4;
    pub const DEFAULT_MIN_ENTRIES: usize = 2;

    pub fn validate(&self) -> CoreResult<()> {
        if self.max_entries < 2 {
            return Err(CoreError::Config(format!(
                "max_entries must be at least 2, got {}",
                self.max_entries
            )));
        }
        if self.min_entries == 0 || self.min_entries > self.max_entries / 2 {
            return Err(CoreError::Config(format!(
                "min_entries must be in 1..={}, got {}",
                self.max_entries / 2,
                self.min_entries
            )));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            min_entries: Self::DEFAULT_MIN_ENTRIES,
        }
    }
}

// ── GraphConfig ───────────────────────────────────────────────────────────────

/// Road-graph construction parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphConfig {
    /// Two vertices closer than this (strictly) become the same node.
    /// In the source's coordinate units.  `0.0` disables snapping.
    pub snap_threshold: f64,
}

impl GraphConfig {
    pub const DEFAULT_SNAP_THRESHOLD: f64 = 1e-4;

    pub fn with_snap_threshold(snap_threshold: f64) -> Self {
        Self { snap_threshold }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.snap_threshold.is_finite() || self.snap_threshold < 0.0 {
            return Err(CoreError::Config(format!(
                "snap_threshold must be finite and non-negative, got {}",
                self.snap_threshold
            )));
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { snap_threshold: Self::DEFAULT_SNAP_THRESHOLD }
    }
}

// ── AtlasConfig ───────────────────────────────────────────────────────────────

/// Everything an atlas needs to build a generation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AtlasConfig {
    pub index: IndexConfig,
    pub graph: GraphConfig,
    /// Derive the road graph on load.  When `false` every generation carries
    /// an empty graph and route queries report `found == false`.
    pub build_graph: bool,
}

impl AtlasConfig {
    pub fn validate(&self) -> CoreResult<()> {
        self.index.validate()?;
        self.graph.validate()
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            index:       IndexConfig::default(),
            graph:       GraphConfig::default(),
            build_graph: true,
        }
    }
}
