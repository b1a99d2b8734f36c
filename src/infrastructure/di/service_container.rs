//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AssetService, SplitService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding the effective settings and the I/O boundary.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn split_service(&self) -> SplitService {
        SplitService::new(self.fs.clone(), self.settings.clone())
    }

    pub fn asset_service(&self) -> AssetService {
        AssetService::new(self.fs.clone())
    }
}
