use crate::config::LayoutConfig;
use crate::error::RegistryError;
use crate::ir::Graph;
use crate::layout::{HierarchicalLayoutResult, compute_layout};
use std::sync::Arc;

pub trait LayoutEngine: Send + Sync {
    fn engine_type(&self) -> &str;
    fn layout(&self, graph: &Graph, config: &LayoutConfig) -> HierarchicalLayoutResult;
    fn can_handle(&self, graph: &Graph) -> bool;
}

/// Depth rings, directory districts and outer infrastructure zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadialCityLayout;

impl RadialCityLayout {
    pub const ENGINE_TYPE: &'static str = "radial-city";
}

impl LayoutEngine for RadialCityLayout {
    fn engine_type(&self) -> &str {
        Self::ENGINE_TYPE
    }

    fn layout(&self, graph: &Graph, config: &LayoutConfig) -> HierarchicalLayoutResult {
        compute_layout(graph, config)
    }

    fn can_handle(&self, graph: &Graph) -> bool {
        !graph.nodes.is_empty()
    }
}

/// Engines keyed by type, kept in registration order.
#[derive(Default, Clone)]
pub struct LayoutRegistry {
    engines: Vec<Arc<dyn LayoutEngine>>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.engines.push(Arc::new(RadialCityLayout));
        registry
    }

    /// Fails if the engine type is taken; `unregister` it first to replace it.
    pub fn register(&mut self, engine: Arc<dyn LayoutEngine>) -> Result<(), RegistryError> {
        if self.has(engine.engine_type()) {
            return Err(RegistryError::DuplicateEngine(
                engine.engine_type().to_string(),
            ));
        }
        tracing::debug!(engine = engine.engine_type(), "registered layout engine");
        self.engines.push(engine);
        Ok(())
    }

    pub fn unregister(&mut self, engine_type: &str) -> Option<Arc<dyn LayoutEngine>> {
        let idx = self
            .engines
            .iter()
            .position(|e| e.engine_type() == engine_type)?;
        Some(self.engines.remove(idx))
    }

    pub fn get(&self, engine_type: &str) -> Option<Arc<dyn LayoutEngine>> {
        self.engines
            .iter()
            .find(|e| e.engine_type() == engine_type)
            .cloned()
    }

    pub fn auto_select(&self, graph: &Graph) -> Option<Arc<dyn LayoutEngine>> {
        self.engines.iter().find(|e| e.can_handle(graph)).cloned()
    }

    pub fn get_all(&self) -> &[Arc<dyn LayoutEngine>] {
        &self.engines
    }

    pub fn has(&self, engine_type: &str) -> bool {
        self.engines.iter().any(|e| e.engine_type() == engine_type)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.engines.iter().map(|e| e.engine_type()))
            .finish()
    }
}
