//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::engine::EngineFactory;
use crate::storage::DiskRegistry;
use crate::view::ViewRenderer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engines: Arc<dyn EngineFactory>,
    views: Arc<dyn ViewRenderer>,
    disks: DiskRegistry,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        config: Config,
        engines: Arc<dyn EngineFactory>,
        views: Arc<dyn ViewRenderer>,
        disks: DiskRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                engines,
                views,
                disks,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the engine factory
    pub fn engines(&self) -> &Arc<dyn EngineFactory> {
        &self.inner.engines
    }

    /// Get the view renderer
    pub fn views(&self) -> &Arc<dyn ViewRenderer> {
        &self.inner.views
    }

    /// Get the disk registry
    pub fn disks(&self) -> &DiskRegistry {
        &self.inner.disks
    }
}
