use super::*;

/// Strictly more files than the threshold collapse into an aggregate.
pub fn should_cluster(node_count: usize, threshold: usize) -> bool {
    node_count > threshold
}

/// Bounding box over the positioned ids; ids missing from `positions` are
/// skipped. Each dimension of the returned size is at least one unit.
pub fn aggregate_bounds(
    node_ids: &[String],
    positions: &BTreeMap<String, Position3D>,
) -> (Position3D, Position3D) {
    let Some(bounds) = Bounds::from_points(node_ids.iter().filter_map(|id| positions.get(id)))
    else {
        return (Position3D::ORIGIN, Position3D::new(1.0, 1.0, 1.0));
    };
    let size = Position3D::new(
        bounds.width().max(1.0),
        bounds.height().max(1.0),
        bounds.depth().max(1.0),
    );
    (bounds.center(), size)
}

pub fn compute_cluster(
    district_id: &str,
    node_ids: &[String],
    graph: &Graph,
    positions: &BTreeMap<String, Position3D>,
    threshold: usize,
) -> Option<ClusterInfo> {
    let file_count = node_ids
        .iter()
        .filter(|id| graph.nodes.get(*id).is_some_and(GraphNode::is_file))
        .count();
    if !should_cluster(file_count, threshold) {
        return None;
    }
    let (center, size) = aggregate_bounds(node_ids, positions);
    Some(ClusterInfo {
        district_id: district_id.to_string(),
        center,
        size,
        node_count: file_count,
        node_ids: node_ids.to_vec(),
    })
}

/// Node ids (files and their children) per district, merged across rings.
pub fn district_node_ids(result: &HierarchicalLayoutResult) -> BTreeMap<String, Vec<String>> {
    let mut ids: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for district in &result.districts {
        let entry = ids.entry(district.district_id.clone()).or_default();
        for block in &district.blocks {
            entry.extend(block.merged_file_ids.iter().cloned());
            entry.extend(block.children.iter().map(|c| c.node_id.clone()));
        }
    }
    for list in ids.values_mut() {
        list.sort();
        list.dedup();
    }
    ids
}

pub fn district_clusters(
    result: &HierarchicalLayoutResult,
    graph: &Graph,
    threshold: usize,
) -> Vec<ClusterInfo> {
    district_node_ids(result)
        .into_iter()
        .filter_map(|(district_id, ids)| {
            compute_cluster(&district_id, &ids, graph, &result.positions, threshold)
        })
        .collect()
}
