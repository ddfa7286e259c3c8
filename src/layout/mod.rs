mod block;
pub mod cluster;
pub(crate) mod depth;
mod external;
pub mod flatten;
pub mod proximity;
mod radial;
pub(crate) mod types;
pub use cluster::{
    aggregate_bounds, compute_cluster, district_clusters, district_node_ids, should_cluster,
};
pub use external::{GENERAL_ZONE, INFRASTRUCTURE_ORDER};
pub use flatten::{compute_bounds, flatten_positions};
pub use proximity::refine_block_positions;
pub use types::*;
use block::*;
use depth::*;
use external::allocate_external_zones;
use radial::*;

use crate::config::{BlockConfig, LayoutConfig, RelaxationConfig};
use crate::ir::{Graph, GraphEdge, GraphNode};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Blocks of one district on one ring before they are placed.
struct PendingDistrict {
    file_count: usize,
    blocks: Vec<BlockLayout>,
    merged: bool,
}

pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> HierarchicalLayoutResult {
    if graph.is_empty() {
        return HierarchicalLayoutResult::default();
    }

    let classification = classify_depths(graph);
    let hierarchy = build_hierarchy(graph);
    let rings = group_by_ring(graph, &classification);
    let sizes = district_sizes(&rings);

    // Orphans with a matching directory join their district's innermost ring.
    let mut district_orphans: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut global_orphans: Vec<String> = Vec::new();
    for id in &hierarchy.orphans {
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        match match_orphan_district(node, sizes.keys().map(String::as_str)) {
            Some(district) => district_orphans.entry(district).or_default().push(id.clone()),
            None => global_orphans.push(id.clone()),
        }
    }
    let mut orphan_home: BTreeMap<&str, u32> = BTreeMap::new();
    for (depth, districts) in &rings {
        for district in districts.keys() {
            orphan_home.entry(district.as_str()).or_insert(*depth);
        }
    }

    let mut pending: BTreeMap<(u32, String), PendingDistrict> = BTreeMap::new();
    let mut demands: BTreeMap<u32, Vec<RingDemand>> = BTreeMap::new();
    for (depth, districts) in &rings {
        for (district, files) in districts {
            let merged = config.block.compound_max_files > 0
                && sizes.get(district).copied().unwrap_or(0) <= config.block.compound_max_files;
            let mut blocks = if merged {
                vec![build_compound_block(files, graph, &hierarchy, &config.block)]
            } else {
                files
                    .iter()
                    .map(|id| build_file_block(id, graph, &hierarchy, &config.block))
                    .collect()
            };
            let mut slots = files.len();
            if orphan_home.get(district.as_str()) == Some(depth) {
                if let Some(orphans) = district_orphans.get(district) {
                    blocks.extend(
                        orphans
                            .iter()
                            .map(|id| build_orphan_block(id, &config.block)),
                    );
                    slots += orphans.len();
                }
            }
            let widest = blocks
                .iter()
                .map(|b| b.footprint.width)
                .fold(0.0f32, f32::max);
            demands.entry(*depth).or_default().push(RingDemand {
                district_id: district.clone(),
                slots,
                widest,
            });
            pending.insert(
                (*depth, district.clone()),
                PendingDistrict {
                    file_count: files.len(),
                    blocks,
                    merged,
                },
            );
        }
    }

    let plan = allocate_rings(&demands, config);
    let band = config.relaxation.radial_band * config.scaled_ring_spacing();

    let mut districts = Vec::with_capacity(plan.assignments.len());
    for assignment in &plan.assignments {
        let Some(district) = pending.remove(&(assignment.depth, assignment.district_id.clone()))
        else {
            continue;
        };
        let placed = place_on_arc(district, assignment);
        let refined = refine_block_positions(&placed, &graph.edges, &config.relaxation, config.seed);
        let blocks = refined
            .into_iter()
            .map(|block| clamp_to_ring(block, assignment.ring_radius, band))
            .collect();
        districts.push(DistrictLayout {
            district_id: assignment.district_id.clone(),
            depth: assignment.depth,
            ring_radius: assignment.ring_radius,
            arc_start: assignment.arc_start,
            arc_end: assignment.arc_end,
            blocks,
        });
    }

    // Entry points and global orphans are fixed before anything else.
    let mut seed_positions = BTreeMap::new();
    let mut center_blocks = Vec::new();
    let entry_positions = entry_point_positions(classification.entry_points.len(), config);
    for (id, position) in classification.entry_points.iter().zip(entry_positions) {
        let mut block = build_file_block(id, graph, &hierarchy, &config.block);
        block.position = position;
        seed_positions.insert(id.clone(), position);
        center_blocks.push(block);
    }
    let orphan_slots = orphan_positions(global_orphans.len(), config);
    for (id, position) in global_orphans.iter().zip(orphan_slots) {
        let mut block = build_orphan_block(id, &config.block);
        block.position = position;
        seed_positions.insert(id.clone(), position);
        center_blocks.push(block);
    }

    let external_zones =
        allocate_external_zones(graph, plan.max_depth, plan.outward_offset, config);

    let positions = flatten_positions(seed_positions, &center_blocks, &districts, &external_zones);
    let bounds = compute_bounds(&positions);

    let district_ids: BTreeSet<&str> = plan
        .assignments
        .iter()
        .map(|a| a.district_id.as_str())
        .collect();
    let metadata = LayoutMetadata {
        district_count: district_ids.len(),
        ring_count: plan.radii.len(),
        external_count: external_zones.iter().map(|z| z.nodes.len()).sum(),
        entry_point_count: classification.entry_points.len(),
        orphan_count: hierarchy.orphans.len(),
        district_arcs: plan
            .assignments
            .iter()
            .map(|a| DistrictArcMetadata {
                district_id: a.district_id.clone(),
                depth: a.depth,
                ring_radius: a.ring_radius,
                arc_start: a.arc_start,
                arc_end: a.arc_end,
                node_count: a.slots,
            })
            .collect(),
        infrastructure_zones: external_zones
            .iter()
            .map(|z| InfrastructureZoneMetadata {
                zone_type: z.zone_type.clone(),
                ring_radius: z.ring_radius,
                arc_start: z.arc_start,
                arc_end: z.arc_end,
                node_count: z.nodes.len(),
            })
            .collect(),
    };

    tracing::debug!(
        nodes = graph.nodes.len(),
        positioned = positions.len(),
        districts = metadata.district_count,
        rings = metadata.ring_count,
        externals = metadata.external_count,
        "computed city layout"
    );

    HierarchicalLayoutResult {
        positions,
        bounds,
        metadata,
        center_blocks,
        districts,
        external_zones,
    }
}

/// Spreads a district's blocks across its arc. A compound block sits on the
/// centroid of the slots its files would have taken; orphans fill the tail.
fn place_on_arc(district: PendingDistrict, assignment: &RingAssignment) -> Vec<BlockLayout> {
    let PendingDistrict {
        file_count,
        mut blocks,
        merged,
    } = district;
    let slot_count = if merged {
        file_count + blocks.len().saturating_sub(1)
    } else {
        blocks.len()
    };
    let slots: Vec<Position3D> = spread_angles(assignment.arc_start, assignment.arc_end, slot_count)
        .into_iter()
        .map(|angle| Position3D::on_ring(assignment.ring_radius, angle))
        .collect();

    if merged {
        let (file_slots, rest) = slots.split_at(file_count.min(slots.len()));
        if let (Some(compound), false) = (blocks.first_mut(), file_slots.is_empty()) {
            let n = file_slots.len() as f32;
            compound.position = Position3D {
                x: file_slots.iter().map(|p| p.x).sum::<f32>() / n,
                y: 0.0,
                z: file_slots.iter().map(|p| p.z).sum::<f32>() / n,
            };
        }
        for (block, slot) in blocks.iter_mut().skip(1).zip(rest) {
            block.position = *slot;
        }
    } else {
        for (block, slot) in blocks.iter_mut().zip(&slots) {
            block.position = *slot;
        }
    }
    blocks
}

/// Keeps a refined block within `band` of its ring radius.
fn clamp_to_ring(mut block: BlockLayout, ring_radius: f32, band: f32) -> BlockLayout {
    let radius = block.position.radial_distance();
    if radius < 1e-6 {
        return block;
    }
    let clamped = radius.clamp((ring_radius - band).max(0.0), ring_radius + band);
    if clamped != radius {
        let scale = clamped / radius;
        block.position.x *= scale;
        block.position.z *= scale;
    }
    block.position.y = 0.0;
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeType, NodeType};

    fn city() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(GraphNode::file("src/main.ts", "src/main.ts"));
        for (dir, count) in [("src/api", 5), ("src/db", 4), ("src/ui", 2)] {
            for i in 0..count {
                let path = format!("{dir}/f{i}.ts");
                graph.add_node(GraphNode::file(&path, &path));
                graph.add_node(GraphNode::child(
                    &format!("{path}#C"),
                    NodeType::Class,
                    &path,
                ));
                graph.add_node(GraphNode::child(
                    &format!("{path}#C.run"),
                    NodeType::Method,
                    &format!("{path}#C"),
                ));
            }
        }
        graph.add_node(GraphNode::file("src/api/v1/users.ts", "src/api/v1/users.ts"));
        graph.add_node(GraphNode::external("pg", Some("database")));
        graph.add_node(GraphNode::external("stripe", Some("api")));
        graph.add_node(GraphNode::child("stray", NodeType::Function, "nowhere"));
        graph.add_edge("src/api/f0.ts", "src/api/f4.ts", EdgeType::Imports);
        graph.add_edge("src/main.ts", "src/api/f0.ts", EdgeType::Imports);
        graph.add_edge("src/api/f1.ts", "pg", EdgeType::DependsOn);
        graph
    }

    #[test]
    fn every_node_is_positioned_once() {
        let graph = city();
        let result = compute_layout(&graph, &LayoutConfig::default());
        assert_eq!(result.positions.len(), graph.nodes.len());
        for id in graph.nodes.keys() {
            assert!(result.positions.contains_key(id), "missing {id}");
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = city();
        let config = LayoutConfig::default();
        let first = compute_layout(&graph, &config);
        for _ in 0..10 {
            assert_eq!(compute_layout(&graph, &config), first);
        }
    }

    #[test]
    fn deeper_files_sit_farther_out() {
        let graph = city();
        let result = compute_layout(&graph, &LayoutConfig::default());
        let entry = result.positions["src/main.ts"].radial_distance();
        let shallow = result.positions["src/api/f0.ts"].radial_distance();
        let deep = result.positions["src/api/v1/users.ts"].radial_distance();
        assert!(entry < shallow);
        assert!(shallow < deep);
        assert_eq!(result.positions["src/main.ts"], Position3D::ORIGIN);
    }

    #[test]
    fn externals_ring_the_city() {
        let graph = city();
        let result = compute_layout(&graph, &LayoutConfig::default());
        let max_internal = graph
            .file_nodes()
            .map(|n| result.positions[&n.id].radial_distance())
            .fold(0.0f32, f32::max);
        for node in graph.external_nodes() {
            assert!(result.positions[&node.id].radial_distance() > max_internal);
        }
        let zones: Vec<&str> = result
            .metadata
            .infrastructure_zones
            .iter()
            .map(|z| z.zone_type.as_str())
            .collect();
        assert_eq!(zones, vec!["database", "api"]);
    }

    #[test]
    fn small_districts_merge() {
        let graph = city();
        let result = compute_layout(&graph, &LayoutConfig::default());
        let ui = result
            .districts
            .iter()
            .find(|d| d.district_id == "src/ui")
            .unwrap();
        assert_eq!(ui.blocks.len(), 1);
        assert!(ui.blocks[0].is_merged);
        assert_eq!(ui.blocks[0].children.len(), 4);
        assert_eq!(result.positions["src/ui/f0.ts"], result.positions["src/ui/f1.ts"]);
        let api = result
            .districts
            .iter()
            .find(|d| d.district_id == "src/api")
            .unwrap();
        assert!(api.blocks.iter().all(|b| !b.is_merged));
    }

    #[test]
    fn top_level_positions_stay_on_ground() {
        let result = compute_layout(&city(), &LayoutConfig::default());
        for district in &result.districts {
            for block in &district.blocks {
                assert_eq!(block.position.y, 0.0);
            }
        }
        assert_eq!(result.positions["src/api/f0.ts#C.run"].y, 1.0);
    }

    #[test]
    fn metadata_counts_match() {
        let result = compute_layout(&city(), &LayoutConfig::default());
        assert_eq!(result.metadata.district_count, 4);
        assert_eq!(result.metadata.ring_count, 2);
        assert_eq!(result.metadata.external_count, 2);
        assert_eq!(result.metadata.entry_point_count, 1);
        assert_eq!(result.metadata.orphan_count, 1);
        assert!(result.bounds.min.x < 0.0 && result.bounds.max.x > 0.0);
    }

    #[test]
    fn empty_graph_is_empty_result() {
        let result = compute_layout(&Graph::new(), &LayoutConfig::default());
        assert!(result.positions.is_empty());
        assert_eq!(result.bounds, Bounds::default());
        assert_eq!(result.metadata, LayoutMetadata::default());
    }

    #[test]
    fn district_orphans_join_their_arc() {
        let mut graph = city();
        let mut orphan = GraphNode::child("lost_helper", NodeType::Function, "ghost");
        orphan.path = Some("src/db/helpers.ts".to_string());
        graph.add_node(orphan);
        let result = compute_layout(&graph, &LayoutConfig::default());
        let db = result
            .districts
            .iter()
            .find(|d| d.district_id == "src/db")
            .unwrap();
        assert_eq!(db.blocks.last().unwrap().file_id, "lost_helper");
        assert!(result.center_blocks.iter().any(|b| b.file_id == "stray"));
        assert!(result.positions.contains_key("lost_helper"));
    }

    #[test]
    fn wide_files_keep_nominal_ring() {
        let mut graph = Graph::new();
        graph.add_node(GraphNode::file("main.ts", "main.ts"));
        for i in 0..11 {
            let path = format!("lib/f{i}.ts");
            graph.add_node(GraphNode::file(&path, &path));
            for c in 0..30 {
                graph.add_node(GraphNode::child(
                    &format!("{path}#C{c}"),
                    NodeType::Class,
                    &path,
                ));
            }
        }
        let result = compute_layout(&graph, &LayoutConfig::default());
        assert_eq!(result.districts.len(), 1);
        assert_eq!(result.districts[0].ring_radius, 30.0);
        assert_eq!(result.metadata.district_arcs[0].ring_radius, 30.0);
    }

    #[test]
    fn clamp_keeps_block_in_band() {
        let mut block = build_orphan_block("x", &BlockConfig::default());
        block.position = Position3D::new(5.0, 0.0, 0.0);
        let clamped = clamp_to_ring(block, 30.0, 9.0);
        assert!((clamped.position.radial_distance() - 21.0).abs() < 1e-4);
    }
}
