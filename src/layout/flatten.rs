use super::*;

fn insert_block(positions: &mut BTreeMap<String, Position3D>, block: &BlockLayout) {
    for member in block.member_ids() {
        positions
            .entry(member.to_string())
            .or_insert(block.position);
    }
    positions
        .entry(block.file_id.clone())
        .or_insert(block.position);
    for child in &block.children {
        positions
            .entry(child.node_id.clone())
            .or_insert_with(|| block.position.offset(child.local_position));
    }
}

/// Resolves block-relative child offsets into one absolute position map.
/// Entries already present in `seed` are kept as they are.
pub fn flatten_positions(
    seed: BTreeMap<String, Position3D>,
    center_blocks: &[BlockLayout],
    districts: &[DistrictLayout],
    external_zones: &[ExternalZoneLayout],
) -> BTreeMap<String, Position3D> {
    let mut positions = seed;
    for block in center_blocks {
        insert_block(&mut positions, block);
    }
    for district in districts {
        for block in &district.blocks {
            insert_block(&mut positions, block);
        }
    }
    for zone in external_zones {
        for node in &zone.nodes {
            positions
                .entry(node.node_id.clone())
                .or_insert(node.position);
        }
    }
    positions
}

/// Axis-aligned bounds over every position; all zeros when empty.
pub fn compute_bounds(positions: &BTreeMap<String, Position3D>) -> Bounds {
    Bounds::from_points(positions.values()).unwrap_or_default()
}
