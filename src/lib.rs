#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, LayoutOptions};
pub use engine::{LayoutEngine, LayoutRegistry, RadialCityLayout};
pub use error::{GraphError, RegistryError};
pub use ir::{EdgeType, Graph, GraphEdge, GraphNode, NodeType};
pub use layout::{HierarchicalLayoutResult, compute_layout};
pub use theme::Theme;
