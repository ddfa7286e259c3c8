use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub const ORIGIN: Position3D = Position3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the ground plane at `radius` and `angle` (radians).
    pub fn on_ring(radius: f32, angle: f32) -> Self {
        Self {
            x: radius * angle.cos(),
            y: 0.0,
            z: radius * angle.sin(),
        }
    }

    pub fn offset(self, local: Position3D) -> Self {
        Self {
            x: self.x + local.x,
            y: self.y + local.y,
            z: self.z + local.z,
        }
    }

    /// Distance from the vertical axis through the origin.
    pub fn radial_distance(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn planar_distance(&self, other: &Position3D) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Position3D,
    pub max: Position3D,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Position3D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.min.z = bounds.min.z.min(p.z);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
            bounds.max.z = bounds.max.z.max(p.z);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Position3D {
        Position3D {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
            z: (self.min.z + self.max.z) / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPlacement {
    pub node_id: String,
    pub local_position: Position3D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    pub file_id: String,
    pub position: Position3D,
    pub footprint: Footprint,
    pub children: Vec<ChildPlacement>,
    pub is_merged: bool,
    /// Every file fused into this block; just `file_id` for a regular block.
    pub merged_file_ids: Vec<String>,
}

impl BlockLayout {
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.merged_file_ids.iter().map(String::as_str)
    }
}

/// One district's slice of one depth ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictLayout {
    pub district_id: String,
    pub depth: u32,
    pub ring_radius: f32,
    pub arc_start: f32,
    pub arc_end: f32,
    pub blocks: Vec<BlockLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNodePlacement {
    pub node_id: String,
    pub position: Position3D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalZoneLayout {
    pub zone_type: String,
    pub ring_radius: f32,
    pub arc_start: f32,
    pub arc_end: f32,
    pub nodes: Vec<ExternalNodePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictArcMetadata {
    pub district_id: String,
    pub depth: u32,
    pub ring_radius: f32,
    pub arc_start: f32,
    pub arc_end: f32,
    pub node_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureZoneMetadata {
    pub zone_type: String,
    pub ring_radius: f32,
    pub arc_start: f32,
    pub arc_end: f32,
    pub node_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub district_count: usize,
    pub ring_count: usize,
    pub external_count: usize,
    pub entry_point_count: usize,
    pub orphan_count: usize,
    pub district_arcs: Vec<DistrictArcMetadata>,
    pub infrastructure_zones: Vec<InfrastructureZoneMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalLayoutResult {
    pub positions: BTreeMap<String, Position3D>,
    pub bounds: Bounds,
    pub metadata: LayoutMetadata,
    /// Entry-point blocks and globally orphaned nodes near the origin.
    pub center_blocks: Vec<BlockLayout>,
    pub districts: Vec<DistrictLayout>,
    pub external_zones: Vec<ExternalZoneLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub district_id: String,
    pub center: Position3D,
    pub size: Position3D,
    pub node_count: usize,
    pub node_ids: Vec<String>,
}
