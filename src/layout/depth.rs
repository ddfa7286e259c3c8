use super::*;

pub(crate) const ROOT_DISTRICT: &str = "root";

#[derive(Debug, Clone, Default)]
pub(crate) struct DepthClassification {
    pub effective_depths: BTreeMap<String, u32>,
    pub explicit: bool,
    pub entry_points: Vec<String>,
    pub deeper: Vec<String>,
}

pub(crate) fn path_segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect()
}

/// Directory part of a path, or `root` for top-level files.
pub(crate) fn district_key(path: &str) -> String {
    let segments = path_segments(path);
    if segments.len() <= 1 {
        return ROOT_DISTRICT.to_string();
    }
    segments[..segments.len() - 1].join("/")
}

pub(crate) fn classify_depths(graph: &Graph) -> DepthClassification {
    let files: Vec<&GraphNode> = graph.file_nodes().collect();
    if files.is_empty() {
        return DepthClassification::default();
    }

    let explicit = files.iter().any(|node| node.depth.is_some_and(|d| d > 0));
    let mut effective_depths = BTreeMap::new();
    if explicit {
        for node in &files {
            effective_depths.insert(node.id.clone(), node.depth.unwrap_or(0));
        }
    } else {
        let counts: Vec<(&str, usize)> = files
            .iter()
            .map(|node| (node.id.as_str(), path_segments(node.source_path()).len()))
            .collect();
        let min_count = counts.iter().map(|(_, c)| *c).min().unwrap_or(0);
        for (id, count) in counts {
            effective_depths.insert(id.to_string(), count.saturating_sub(min_count) as u32);
        }
    }

    let mut entry_points = Vec::new();
    let mut deeper = Vec::new();
    for (id, depth) in &effective_depths {
        if *depth == 0 {
            entry_points.push(id.clone());
        } else {
            deeper.push(id.clone());
        }
    }

    tracing::debug!(
        files = files.len(),
        explicit,
        entry_points = entry_points.len(),
        deeper = deeper.len(),
        "classified file depths"
    );

    DepthClassification {
        effective_depths,
        explicit,
        entry_points,
        deeper,
    }
}

/// Groups deeper files by depth ring and then by district. File ids inside a
/// district are sorted, districts iterate alphabetically.
pub(crate) fn group_by_ring(
    graph: &Graph,
    classification: &DepthClassification,
) -> BTreeMap<u32, BTreeMap<String, Vec<String>>> {
    let mut rings: BTreeMap<u32, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for id in &classification.deeper {
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        let depth = classification.effective_depths.get(id).copied().unwrap_or(0);
        rings
            .entry(depth)
            .or_default()
            .entry(district_key(node.source_path()))
            .or_default()
            .push(id.clone());
    }
    for districts in rings.values_mut() {
        for files in districts.values_mut() {
            files.sort();
        }
    }
    rings
}

/// Total file count of each district across every ring it spans.
pub(crate) fn district_sizes(
    rings: &BTreeMap<u32, BTreeMap<String, Vec<String>>>,
) -> BTreeMap<String, usize> {
    let mut sizes: BTreeMap<String, usize> = BTreeMap::new();
    for districts in rings.values() {
        for (district, files) in districts {
            *sizes.entry(district.clone()).or_default() += files.len();
        }
    }
    sizes
}
