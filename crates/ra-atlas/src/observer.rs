//! Load observer trait for progress reporting.

use ra_core::GeometrySet;

use crate::{AtlasError, Generation};

/// Callbacks invoked by [`Atlas::load_with`][crate::Atlas::load_with] around
/// a rebuild.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: status line
///
/// ```
/// use ra_atlas::{Generation, LoadObserver};
///
/// struct StatusLine(String);
///
/// impl LoadObserver for StatusLine {
///     fn on_published(&mut self, generation: &Generation) {
///         self.0 = generation.stats().to_string();
///     }
/// }
/// ```
pub trait LoadObserver {
    /// Called before anything is built.
    fn on_build_start(&mut self, _geometries: &GeometrySet) {}

    /// Called when the build fails.  The published generation is unchanged.
    fn on_build_failed(&mut self, _error: &AtlasError) {}

    /// Called once the new generation is visible to readers.
    fn on_published(&mut self, _generation: &Generation) {}
}

/// A [`LoadObserver`] that does nothing.
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}
