use super::*;

use super::depth::district_key;

/// Containment resolved from `parent_id` chains.
#[derive(Debug, Clone, Default)]
pub(crate) struct Hierarchy {
    /// File id -> (descendant id, nesting level); level 1 is a direct child.
    pub descendants: BTreeMap<String, Vec<(String, u32)>>,
    /// Nodes whose chain is broken, cyclic or never reaches a file.
    pub orphans: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Resolution {
    File(String, u32),
    Orphan,
}

pub(crate) fn build_hierarchy(graph: &Graph) -> Hierarchy {
    let mut resolved: HashMap<String, Resolution> = HashMap::new();

    for node in graph.nodes.values() {
        if node.is_file() || node.is_external || resolved.contains_key(&node.id) {
            continue;
        }

        // Walk upward until a file, a known resolution, or a dead end.
        let mut chain: Vec<&str> = vec![node.id.as_str()];
        let mut seen: HashSet<&str> = HashSet::from([node.id.as_str()]);
        let mut current = node;
        let tail = loop {
            let Some(parent_id) = current.parent_id.as_deref() else {
                break Resolution::Orphan;
            };
            if let Some(known) = resolved.get(parent_id) {
                break known.clone();
            }
            let Some(parent) = graph.nodes.get(parent_id) else {
                break Resolution::Orphan;
            };
            if parent.is_internal_file() {
                break Resolution::File(parent.id.clone(), 0);
            }
            if parent.is_file() || parent.is_external || !seen.insert(parent_id) {
                break Resolution::Orphan;
            }
            chain.push(parent_id);
            current = parent;
        };

        let chain_len = chain.len() as u32;
        for (idx, id) in chain.into_iter().enumerate() {
            let resolution = match &tail {
                Resolution::File(file_id, base) => {
                    Resolution::File(file_id.clone(), base + chain_len - idx as u32)
                }
                Resolution::Orphan => Resolution::Orphan,
            };
            resolved.insert(id.to_string(), resolution);
        }
    }

    let mut hierarchy = Hierarchy::default();
    let mut resolved: Vec<(String, Resolution)> = resolved.into_iter().collect();
    resolved.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, resolution) in resolved {
        match resolution {
            Resolution::File(file_id, level) => hierarchy
                .descendants
                .entry(file_id)
                .or_default()
                .push((id, level)),
            Resolution::Orphan => hierarchy.orphans.push(id),
        }
    }
    if !hierarchy.orphans.is_empty() {
        tracing::warn!(
            count = hierarchy.orphans.len(),
            "nodes with broken or cyclic parent chains routed to orphans"
        );
    }
    hierarchy
}

fn child_order(graph: &Graph, a: &(String, u32), b: &(String, u32)) -> std::cmp::Ordering {
    let rank = |id: &str| {
        graph
            .nodes
            .get(id)
            .map(|node| (node.node_type.block_rank(), node.display_label().to_string()))
            .unwrap_or((u8::MAX, String::new()))
    };
    rank(&a.0)
        .cmp(&rank(&b.0))
        .then_with(|| a.0.cmp(&b.0))
}

/// Area needed for a square-ish grid of children; type-like children take two cells.
pub(crate) fn block_footprint(
    graph: &Graph,
    children: &[(String, u32)],
    config: &BlockConfig,
) -> Footprint {
    if children.is_empty() {
        return Footprint {
            width: config.min_size,
            depth: config.min_size,
        };
    }
    let units: usize = children
        .iter()
        .map(|(id, _)| match graph.nodes.get(id) {
            Some(node) if node.node_type.is_type_like() => 2,
            _ => 1,
        })
        .sum();
    let side = (units as f32).sqrt().ceil().max(1.0);
    let rows = (units as f32 / side).ceil().max(1.0);
    Footprint {
        width: (side * config.cell_size + config.padding * 2.0).max(config.min_size),
        depth: (rows * config.cell_size + config.padding * 2.0).max(config.min_size),
    }
}

/// Row-major grid of children centred on the block origin.
pub(crate) fn place_children(
    children: &[(String, u32)],
    footprint: Footprint,
    config: &BlockConfig,
) -> Vec<ChildPlacement> {
    if children.is_empty() {
        return Vec::new();
    }
    let count = children.len();
    let cols = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(cols);
    let inner_width = (footprint.width - config.padding * 2.0).max(config.cell_size);
    let inner_depth = (footprint.depth - config.padding * 2.0).max(config.cell_size);
    let pitch_x = inner_width / cols as f32;
    let pitch_z = inner_depth / rows as f32;

    children
        .iter()
        .enumerate()
        .map(|(idx, (id, level))| {
            let col = idx % cols;
            let row = idx / cols;
            ChildPlacement {
                node_id: id.clone(),
                local_position: Position3D {
                    x: -inner_width / 2.0 + pitch_x * (col as f32 + 0.5),
                    y: level.saturating_sub(1) as f32 * config.level_height,
                    z: -inner_depth / 2.0 + pitch_z * (row as f32 + 0.5),
                },
            }
        })
        .collect()
}

pub(crate) fn build_file_block(
    file_id: &str,
    graph: &Graph,
    hierarchy: &Hierarchy,
    config: &BlockConfig,
) -> BlockLayout {
    let mut children = hierarchy
        .descendants
        .get(file_id)
        .cloned()
        .unwrap_or_default();
    children.sort_by(|a, b| child_order(graph, a, b));
    let footprint = block_footprint(graph, &children, config);
    BlockLayout {
        file_id: file_id.to_string(),
        position: Position3D::ORIGIN,
        footprint,
        children: place_children(&children, footprint, config),
        is_merged: false,
        merged_file_ids: vec![file_id.to_string()],
    }
}

/// Fuses the files of a small district into one block carrying every child.
pub(crate) fn build_compound_block(
    file_ids: &[String],
    graph: &Graph,
    hierarchy: &Hierarchy,
    config: &BlockConfig,
) -> BlockLayout {
    let mut children: Vec<(String, u32)> = file_ids
        .iter()
        .filter_map(|id| hierarchy.descendants.get(id))
        .flatten()
        .cloned()
        .collect();
    children.sort_by(|a, b| child_order(graph, a, b));
    let mut footprint = block_footprint(graph, &children, config);
    let min_width = config.min_size + file_ids.len().saturating_sub(1) as f32 * config.cell_size;
    footprint.width = footprint.width.max(min_width);
    let mut merged_file_ids = file_ids.to_vec();
    merged_file_ids.sort();
    BlockLayout {
        file_id: merged_file_ids.first().cloned().unwrap_or_default(),
        position: Position3D::ORIGIN,
        footprint,
        children: place_children(&children, footprint, config),
        is_merged: true,
        merged_file_ids,
    }
}

pub(crate) fn build_orphan_block(orphan_id: &str, config: &BlockConfig) -> BlockLayout {
    BlockLayout {
        file_id: orphan_id.to_string(),
        position: Position3D::ORIGIN,
        footprint: Footprint {
            width: config.min_size,
            depth: config.min_size,
        },
        children: Vec::new(),
        is_merged: false,
        merged_file_ids: vec![orphan_id.to_string()],
    }
}

/// District whose directory prefix matches the orphan's own path, longest first.
/// Orphans without a path of their own never match.
pub(crate) fn match_orphan_district<'a>(
    node: &GraphNode,
    districts: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let path = node.metadata.path.as_deref().or(node.path.as_deref())?;
    let dir = district_key(path);
    districts
        .into_iter()
        .filter(|district| dir == *district || dir.starts_with(&format!("{district}/")))
        .max_by_key(|district| district.len())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeType;

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(GraphNode::file("src/a.ts", "src/a.ts"));
        graph.add_node(GraphNode::child("A", NodeType::Class, "src/a.ts"));
        graph.add_node(GraphNode::child("A.run", NodeType::Method, "A"));
        graph.add_node(GraphNode::child("helper", NodeType::Function, "src/a.ts"));
        graph.add_node(GraphNode::child("lost", NodeType::Function, "missing"));
        graph.add_node(GraphNode::child("x", NodeType::Class, "y"));
        graph.add_node(GraphNode::child("y", NodeType::Class, "x"));
        graph.add_node(GraphNode::child("under_cycle", NodeType::Method, "x"));
        graph
    }

    #[test]
    fn resolves_nested_descendants_with_levels() {
        let graph = sample_graph();
        let hierarchy = build_hierarchy(&graph);
        let mut kids = hierarchy.descendants["src/a.ts"].clone();
        kids.sort();
        assert_eq!(
            kids,
            vec![
                ("A".to_string(), 1),
                ("A.run".to_string(), 2),
                ("helper".to_string(), 1),
            ]
        );
    }

    #[test]
    fn broken_and_cyclic_chains_become_orphans() {
        let graph = sample_graph();
        let hierarchy = build_hierarchy(&graph);
        assert_eq!(
            hierarchy.orphans,
            vec![
                "lost".to_string(),
                "under_cycle".to_string(),
                "x".to_string(),
                "y".to_string(),
            ]
        );
    }

    #[test]
    fn children_are_ordered_by_type_then_label() {
        let graph = sample_graph();
        let hierarchy = build_hierarchy(&graph);
        let block = build_file_block("src/a.ts", &graph, &hierarchy, &BlockConfig::default());
        let order: Vec<&str> = block.children.iter().map(|c| c.node_id.as_str()).collect();
        assert_eq!(order, vec!["A", "helper", "A.run"]);
        let nested = block.children.iter().find(|c| c.node_id == "A.run").unwrap();
        assert_eq!(nested.local_position.y, 1.0);
        for child in &block.children {
            assert!(child.local_position.x.abs() <= block.footprint.width / 2.0);
            assert!(child.local_position.z.abs() <= block.footprint.depth / 2.0);
        }
    }

    #[test]
    fn footprint_grows_with_children() {
        let graph = sample_graph();
        let config = BlockConfig::default();
        let empty = block_footprint(&graph, &[], &config);
        assert_eq!(empty.width, config.min_size);
        let many: Vec<(String, u32)> = (0..30).map(|i| (format!("f{i}"), 1)).collect();
        let big = block_footprint(&graph, &many, &config);
        assert!(big.width > empty.width);
        assert!(big.depth > empty.depth);
    }

    #[test]
    fn compound_block_keeps_all_children() {
        let mut graph = sample_graph();
        graph.add_node(GraphNode::file("src/b.ts", "src/b.ts"));
        graph.add_node(GraphNode::child("b_fn", NodeType::Function, "src/b.ts"));
        let hierarchy = build_hierarchy(&graph);
        let files = vec!["src/b.ts".to_string(), "src/a.ts".to_string()];
        let block = build_compound_block(&files, &graph, &hierarchy, &BlockConfig::default());
        assert!(block.is_merged);
        assert_eq!(block.file_id, "src/a.ts");
        assert_eq!(block.merged_file_ids, vec!["src/a.ts", "src/b.ts"]);
        assert_eq!(block.children.len(), 4);
    }

    #[test]
    fn orphan_matches_longest_district_prefix() {
        let mut node = GraphNode::child("o", NodeType::Function, "missing");
        assert_eq!(match_orphan_district(&node, ["src"]), None);
        node.path = Some("src/api/v1/o.ts".to_string());
        assert_eq!(
            match_orphan_district(&node, ["src", "src/api", "lib"]),
            Some("src/api".to_string())
        );
        assert_eq!(match_orphan_district(&node, ["src/ap"]), None);
    }
}
