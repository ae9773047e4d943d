//! The `Atlas` context and generation publication.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use ra_core::{AtlasConfig, GeometrySet};

use crate::{AtlasResult, Generation, LoadObserver, NoopObserver};

/// Owner of the currently published [`Generation`].
///
/// `load` builds a complete new generation off to the side and then swaps
/// the shared pointer; the lock is held only for that swap.  Readers call
/// [`snapshot`](Self::snapshot) and keep a consistent view for as long as
/// they hold the returned `Arc`, even across later loads.
///
/// # Example
///
/// ```
/// use ra_atlas::Atlas;
/// use ra_core::{AtlasConfig, BoundingBox, Geometry, GeometrySet, Point};
///
/// let atlas = Atlas::new(AtlasConfig::default()).unwrap();
/// let set: GeometrySet = (0..5)
///     .map(|i| Geometry::point(Point::new(i as f64, i as f64), i).unwrap())
///     .collect();
///
/// let generation = atlas.load(set).unwrap();
/// assert_eq!(generation.epoch(), 1);
/// assert_eq!(generation.range_search(&BoundingBox::new(0.0, 0.0, 2.0, 2.0)).len(), 3);
/// ```
#[derive(Debug)]
pub struct Atlas {
    config:  AtlasConfig,
    current: RwLock<Arc<Generation>>,
}

impl Atlas {
    /// Validate `config` and publish an empty generation (epoch 0).
    pub fn new(config: AtlasConfig) -> AtlasResult<Self> {
        config.validate()?;
        let empty = Generation::empty(&config)?;
        Ok(Self { config, current: RwLock::new(Arc::new(empty)) })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// The current generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Epoch of the current generation.
    pub fn epoch(&self) -> u64 {
        self.snapshot().epoch()
    }

    /// Replace the published data with `geometries`.
    ///
    /// On error the previous generation stays published.
    pub fn load(&self, geometries: GeometrySet) -> AtlasResult<Arc<Generation>> {
        self.load_with(geometries, &mut NoopObserver)
    }

    /// [`load`](Self::load) with progress callbacks.
    pub fn load_with<O: LoadObserver>(
        &self,
        geometries: GeometrySet,
        observer:   &mut O,
    ) -> AtlasResult<Arc<Generation>> {
        observer.on_build_start(&geometries);

        let mut generation = match Generation::build(geometries, &self.config) {
            Ok(g) => g,
            Err(e) => {
                warn!(error = %e, "generation build failed; keeping the published one");
                observer.on_build_failed(&e);
                return Err(e);
            }
        };

        let published = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            // Epochs follow publication order, not build start order.
            generation.epoch = current.epoch() + 1;
            let published = Arc::new(generation);
            *current = Arc::clone(&published);
            published
        };

        info!(
            epoch = published.epoch(),
            geometries = published.geometries().len(),
            index_height = published.index().height(),
            graph_nodes = published.graph().node_count(),
            graph_edges = published.graph().edge_count(),
            elapsed_ms = published.build_time().as_millis() as u64,
            "generation published"
        );
        observer.on_published(&published);
        Ok(published)
    }
}
