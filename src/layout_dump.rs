use crate::ir::Graph;
use crate::layout::{
    Bounds, ClusterInfo, DistrictArcMetadata, HierarchicalLayoutResult, InfrastructureZoneMetadata,
    LayoutMetadata, district_clusters,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub node_count: usize,
    pub bounds: Bounds,
    pub metadata: LayoutMetadata,
    pub nodes: Vec<NodeDump>,
    pub blocks: Vec<BlockDump>,
    pub districts: Vec<DistrictArcMetadata>,
    pub zones: Vec<InfrastructureZoneMetadata>,
    pub clusters: Vec<ClusterInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub external: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDump {
    pub file_id: String,
    pub district_id: Option<String>,
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
    pub merged: bool,
    pub members: Vec<String>,
    pub children: usize,
}

impl LayoutDump {
    pub fn from_result(
        result: &HierarchicalLayoutResult,
        graph: &Graph,
        cluster_threshold: usize,
    ) -> Self {
        let nodes = result
            .positions
            .iter()
            .map(|(id, pos)| {
                let node = graph.nodes.get(id);
                NodeDump {
                    id: id.clone(),
                    node_type: node
                        .map(|n| n.node_type.as_str().to_string())
                        .unwrap_or_default(),
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                    external: node.is_some_and(|n| n.is_external),
                }
            })
            .collect();

        let center = result.center_blocks.iter().map(|b| (None, b));
        let placed = result
            .districts
            .iter()
            .flat_map(|d| d.blocks.iter().map(move |b| (Some(d.district_id.clone()), b)));
        let blocks = center
            .chain(placed)
            .map(|(district_id, block)| BlockDump {
                file_id: block.file_id.clone(),
                district_id,
                x: block.position.x,
                z: block.position.z,
                width: block.footprint.width,
                depth: block.footprint.depth,
                merged: block.is_merged,
                members: block.merged_file_ids.clone(),
                children: block.children.len(),
            })
            .collect();

        LayoutDump {
            node_count: result.positions.len(),
            bounds: result.bounds,
            metadata: result.metadata.clone(),
            nodes,
            blocks,
            districts: result.metadata.district_arcs.clone(),
            zones: result.metadata.infrastructure_zones.clone(),
            clusters: district_clusters(result, graph, cluster_threshold),
        }
    }
}

pub fn write_layout_dump(
    path: Option<&Path>,
    result: &HierarchicalLayoutResult,
    graph: &Graph,
    cluster_threshold: usize,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_result(result, graph, cluster_threshold);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &dump)?;
            println!();
        }
    }
    Ok(())
}
