use super::*;

use super::radial::{allocate_arcs, fit_radius, nominal_ring_radius, spread_angles};

pub const INFRASTRUCTURE_ORDER: [&str; 8] = [
    "database",
    "api",
    "queue",
    "cache",
    "auth",
    "logging",
    "filesystem",
    "general",
];

pub const GENERAL_ZONE: &str = "general";

/// Normalised zone key for an external node.
pub(crate) fn zone_type_for(node: &GraphNode, custom_zone_types: bool) -> String {
    let Some(raw) = node.metadata.infrastructure_type.as_deref() else {
        return GENERAL_ZONE.to_string();
    };
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return GENERAL_ZONE.to_string();
    }
    if INFRASTRUCTURE_ORDER.contains(&normalized.as_str()) || custom_zone_types {
        return normalized;
    }
    tracing::warn!(node = %node.id, zone = %normalized, "unknown infrastructure type, using general");
    GENERAL_ZONE.to_string()
}

/// Canonical zones first, then any custom zone alphabetically.
pub(crate) fn zone_order(a: &str, b: &str) -> std::cmp::Ordering {
    let rank = |zone: &str| {
        INFRASTRUCTURE_ORDER
            .iter()
            .position(|known| *known == zone)
            .unwrap_or(INFRASTRUCTURE_ORDER.len())
    };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Places external nodes on the ring beyond the deepest internal ring, one
/// contiguous arc per infrastructure zone.
pub(crate) fn allocate_external_zones(
    graph: &Graph,
    max_internal_depth: u32,
    outward_offset: f32,
    config: &LayoutConfig,
) -> Vec<ExternalZoneLayout> {
    let mut groups: BTreeMap<String, Vec<&GraphNode>> = BTreeMap::new();
    for node in graph.external_nodes() {
        groups
            .entry(zone_type_for(node, config.external.custom_zone_types))
            .or_default()
            .push(node);
    }
    if groups.is_empty() {
        return Vec::new();
    }

    let mut zones: Vec<(String, Vec<&GraphNode>)> = groups.into_iter().collect();
    zones.sort_by(|a, b| zone_order(&a.0, &b.0));
    for (_, nodes) in zones.iter_mut() {
        nodes.sort_by(|a, b| {
            a.display_label()
                .cmp(b.display_label())
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    let total: usize = zones.iter().map(|(_, nodes)| nodes.len()).sum();
    let nominal = nominal_ring_radius(max_internal_depth + 1, config) + outward_offset;
    let radius = nominal.max(fit_radius(total, config.scaled_building_spacing()));

    let weights: Vec<usize> = zones.iter().map(|(_, nodes)| nodes.len()).collect();
    let gap = config.arc_padding * config.external.gap_multiplier;
    let arcs = allocate_arcs(&weights, gap);

    tracing::debug!(zones = zones.len(), nodes = total, radius, "allocated external zones");

    zones
        .into_iter()
        .zip(arcs)
        .map(|((zone_type, nodes), (arc_start, arc_end))| {
            let angles = spread_angles(arc_start, arc_end, nodes.len());
            ExternalZoneLayout {
                zone_type,
                ring_radius: radius,
                arc_start,
                arc_end,
                nodes: nodes
                    .iter()
                    .zip(angles)
                    .map(|(node, angle)| ExternalNodePlacement {
                        node_id: node.id.clone(),
                        position: Position3D::on_ring(radius, angle),
                    })
                    .collect(),
            }
        })
        .collect()
}
