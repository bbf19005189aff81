//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CatalogService, TreeLayoutEngine};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::CategoryTree;
use crate::infrastructure::scene::SceneSurface;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub catalog: CatalogService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let catalog = CatalogService::new(Arc::clone(&fs));

        Self {
            settings,
            fs,
            catalog,
        }
    }

    /// Load the configured tree (or the sample catalog).
    pub fn load_tree(&self) -> ApplicationResult<CategoryTree> {
        self.catalog.load(self.settings.tree_file.as_deref())
    }

    /// Layout engine over an in-memory scene, using the configured metrics.
    pub fn scene_engine(
        &self,
        tree: &CategoryTree,
    ) -> ApplicationResult<TreeLayoutEngine<SceneSurface>> {
        TreeLayoutEngine::new(tree, self.settings.layout.clone(), SceneSurface::new())
    }
}
