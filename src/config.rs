use crate::error::GraphError;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    pub cell_size: f32,
    pub padding: f32,
    pub min_size: f32,
    pub level_height: f32,
    pub compound_max_files: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            padding: 1.0,
            min_size: 4.0,
            level_height: 1.0,
            compound_max_files: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationConfig {
    pub max_iterations: usize,
    pub repulsion_strength: f32,
    pub attraction_strength: f32,
    pub damping: f32,
    pub min_movement: f32,
    pub jitter: f32,
    pub bounds_multiplier: f32,
    pub min_bounds_radius: f32,
    /// Fraction of one ring spacing a refined block may drift off its ring.
    pub radial_band: f32,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            repulsion_strength: 2.0,
            attraction_strength: 0.01,
            damping: 0.9,
            min_movement: 0.001,
            jitter: 0.05,
            bounds_multiplier: 1.5,
            min_bounds_radius: 10.0,
            radial_band: 0.45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalZoneConfig {
    pub gap_multiplier: f32,
    pub custom_zone_types: bool,
}

impl Default for ExternalZoneConfig {
    fn default() -> Self {
        Self {
            gap_multiplier: 2.0,
            custom_zone_types: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub threshold: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { threshold: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub ring_spacing: f32,
    pub arc_padding: f32,
    pub building_spacing: f32,
    pub center_radius: f32,
    pub density: f32,
    pub seed: Option<u32>,
    /// Also grow a crowded ring so its widest block fits, not just its node count.
    pub fit_widest_block: bool,
    pub block: BlockConfig,
    pub relaxation: RelaxationConfig,
    pub external: ExternalZoneConfig,
    pub cluster: ClusterConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ring_spacing: 20.0,
            arc_padding: 0.05,
            building_spacing: 6.0,
            center_radius: 10.0,
            density: 1.0,
            seed: None,
            fit_widest_block: false,
            block: BlockConfig::default(),
            relaxation: RelaxationConfig::default(),
            external: ExternalZoneConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn scaled_ring_spacing(&self) -> f32 {
        self.ring_spacing * self.density
    }

    pub fn scaled_center_radius(&self) -> f32 {
        self.center_radius * self.density
    }

    pub fn scaled_building_spacing(&self) -> f32 {
        self.building_spacing * self.density
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 1200.0,
            margin: 24.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// Option overlay accepted from config files and the wasm bridge.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    pub ring_spacing: Option<f32>,
    pub arc_padding: Option<f32>,
    pub building_spacing: Option<f32>,
    pub center_radius: Option<f32>,
    pub density: Option<f32>,
    pub seed: Option<u32>,
    pub fit_widest_block: Option<bool>,
    pub cell_size: Option<f32>,
    pub block_padding: Option<f32>,
    pub min_block_size: Option<f32>,
    pub level_height: Option<f32>,
    pub compound_max_files: Option<usize>,
    pub max_iterations: Option<usize>,
    pub repulsion_strength: Option<f32>,
    pub attraction_strength: Option<f32>,
    pub damping: Option<f32>,
    pub min_movement: Option<f32>,
    pub jitter: Option<f32>,
    pub radial_band: Option<f32>,
    pub zone_gap_multiplier: Option<f32>,
    pub custom_zone_types: Option<bool>,
    pub cluster_threshold: Option<usize>,
}

impl LayoutOptions {
    pub fn apply(&self, config: &mut LayoutConfig) {
        if let Some(v) = self.ring_spacing {
            config.ring_spacing = v;
        }
        if let Some(v) = self.arc_padding {
            config.arc_padding = v;
        }
        if let Some(v) = self.building_spacing {
            config.building_spacing = v;
        }
        if let Some(v) = self.center_radius {
            config.center_radius = v;
        }
        if let Some(v) = self.density {
            config.density = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(v) = self.fit_widest_block {
            config.fit_widest_block = v;
        }
        if let Some(v) = self.cell_size {
            config.block.cell_size = v;
        }
        if let Some(v) = self.block_padding {
            config.block.padding = v;
        }
        if let Some(v) = self.min_block_size {
            config.block.min_size = v;
        }
        if let Some(v) = self.level_height {
            config.block.level_height = v;
        }
        if let Some(v) = self.compound_max_files {
            config.block.compound_max_files = v;
        }
        if let Some(v) = self.max_iterations {
            config.relaxation.max_iterations = v;
        }
        if let Some(v) = self.repulsion_strength {
            config.relaxation.repulsion_strength = v;
        }
        if let Some(v) = self.attraction_strength {
            config.relaxation.attraction_strength = v;
        }
        if let Some(v) = self.damping {
            config.relaxation.damping = v;
        }
        if let Some(v) = self.min_movement {
            config.relaxation.min_movement = v;
        }
        if let Some(v) = self.jitter {
            config.relaxation.jitter = v;
        }
        if let Some(v) = self.radial_band {
            config.relaxation.radial_band = v;
        }
        if let Some(v) = self.zone_gap_multiplier {
            config.external.gap_multiplier = v;
        }
        if let Some(v) = self.custom_zone_types {
            config.external.custom_zone_types = v;
        }
        if let Some(v) = self.cluster_threshold {
            config.cluster.threshold = v;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutOptions>,
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

pub fn parse_config(contents: &str) -> Result<Config, GraphError> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" || theme_name == "night" {
            config.theme = Theme::night();
        } else if theme_name == "blueprint" || theme_name == "default" {
            config.theme = Theme::blueprint();
        }
    }
    if let Some(options) = parsed.layout {
        options.apply(&mut config.layout);
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    if let Some(v) = parsed.margin {
        config.render.margin = v;
    }
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> Result<Config, GraphError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}
