//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::QuadTreeService;
use crate::config::Settings;
use crate::infrastructure::traits::{
    FileSystem, PointGenerator, RealFileSystem, UniformPointGenerator,
};

/// Container holding the settings and I/O implementations services are built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Random point source
    pub generator: Arc<dyn PointGenerator>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(UniformPointGenerator),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        generator: Arc<dyn PointGenerator>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            generator,
        }
    }

    /// Quadtree service with command line overrides for k and the parallel switch.
    pub fn quadtree_service_with(
        &self,
        threshold: Option<usize>,
        parallel: Option<bool>,
    ) -> QuadTreeService {
        let mut options = self.settings.build_options();
        if let Some(k) = threshold {
            options.threshold = k;
        }
        if let Some(parallel) = parallel {
            options.parallel = parallel;
        }
        QuadTreeService::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.generator),
            options,
            self.settings.svg_style(),
        )
    }
}
