use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub ring_color: String,
    pub district_fill: String,
    pub district_stroke: String,
    pub block_fill: String,
    pub block_stroke: String,
    pub merged_block_fill: String,
    pub child_color: String,
    pub entry_color: String,
    pub text_color: String,
    pub zone_colors: Vec<String>,
}

impl Theme {
    pub fn blueprint() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 11.0,
            background: "#F7FAFF".to_string(),
            ring_color: "#D7E0F0".to_string(),
            district_fill: "#E8EEF9".to_string(),
            district_stroke: "#9FB3D9".to_string(),
            block_fill: "#FFFFFF".to_string(),
            block_stroke: "#5B6F95".to_string(),
            merged_block_fill: "#FFF4D6".to_string(),
            child_color: "#7A8AA6".to_string(),
            entry_color: "#D9480F".to_string(),
            text_color: "#1C2430".to_string(),
            zone_colors: vec![
                "#1971C2".to_string(),
                "#2F9E44".to_string(),
                "#F08C00".to_string(),
                "#C2255C".to_string(),
                "#6741D9".to_string(),
                "#0C8599".to_string(),
                "#866A2E".to_string(),
                "#868E96".to_string(),
            ],
        }
    }

    pub fn night() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 11.0,
            background: "#0B1020".to_string(),
            ring_color: "#1E2A44".to_string(),
            district_fill: "#131C33".to_string(),
            district_stroke: "#3B5B99".to_string(),
            block_fill: "#22304F".to_string(),
            block_stroke: "#8FB3FF".to_string(),
            merged_block_fill: "#3A2F4F".to_string(),
            child_color: "#C9D6F2".to_string(),
            entry_color: "#FFB86B".to_string(),
            text_color: "#E6ECFA".to_string(),
            zone_colors: vec![
                "#4DABF7".to_string(),
                "#69DB7C".to_string(),
                "#FFD43B".to_string(),
                "#F783AC".to_string(),
                "#B197FC".to_string(),
                "#3BC9DB".to_string(),
                "#E0B57A".to_string(),
                "#ADB5BD".to_string(),
            ],
        }
    }

    pub fn zone_color(&self, index: usize) -> &str {
        if self.zone_colors.is_empty() {
            return &self.block_stroke;
        }
        &self.zone_colors[index % self.zone_colors.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::blueprint()
    }
}
