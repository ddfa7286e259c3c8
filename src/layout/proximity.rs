use super::*;

/// Linear congruential generator used for symmetry-breaking jitter.
#[derive(Debug, Clone)]
pub(crate) struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform value in `[0, 1)`.
    pub(crate) fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// DJB2 over the sorted ids, so the seed ignores input order.
pub(crate) fn seed_for_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    let mut hash: u32 = 5381;
    for id in ids {
        for byte in id.bytes() {
            hash = hash.wrapping_mul(33).wrapping_add(byte as u32);
        }
        hash = hash.wrapping_mul(33).wrapping_add(b'|' as u32);
    }
    hash
}

/// Undirected import/dependency adjacency between distinct blocks.
pub(crate) fn block_adjacency(blocks: &[BlockLayout], edges: &[GraphEdge]) -> BTreeSet<(usize, usize)> {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    for (idx, block) in blocks.iter().enumerate() {
        owner.insert(block.file_id.as_str(), idx);
        for member in block.member_ids() {
            owner.insert(member, idx);
        }
    }
    let mut adjacency = BTreeSet::new();
    for edge in edges {
        if !edge.edge_type.is_attraction() {
            continue;
        }
        let (Some(&a), Some(&b)) = (
            owner.get(edge.source.as_str()),
            owner.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if a != b {
            adjacency.insert((a.min(b), a.max(b)));
        }
    }
    adjacency
}

/// Force-directed relaxation of one district ring: overlapping blocks repel,
/// import-connected blocks attract. Returns repositioned copies.
pub fn refine_block_positions(
    blocks: &[BlockLayout],
    edges: &[GraphEdge],
    options: &RelaxationConfig,
    seed: Option<u32>,
) -> Vec<BlockLayout> {
    let mut refined: Vec<BlockLayout> = blocks.to_vec();
    let count = refined.len();
    if count == 0 {
        return refined;
    }

    let adjacency = block_adjacency(blocks, edges);
    let seed = seed.unwrap_or_else(|| seed_for_ids(blocks.iter().map(|b| b.file_id.as_str())));
    let mut rng = SeededRng::new(seed);

    let centroid_x = blocks.iter().map(|b| b.position.x).sum::<f32>() / count as f32;
    let centroid_z = blocks.iter().map(|b| b.position.z).sum::<f32>() / count as f32;
    let spread = blocks
        .iter()
        .map(|b| {
            let dx = b.position.x - centroid_x;
            let dz = b.position.z - centroid_z;
            (dx * dx + dz * dz).sqrt()
        })
        .fold(0.0f32, f32::max);
    let bound = (spread * options.bounds_multiplier).max(options.min_bounds_radius);

    let mut xs: Vec<f32> = Vec::with_capacity(count);
    let mut zs: Vec<f32> = Vec::with_capacity(count);
    for block in blocks {
        xs.push(block.position.x + (rng.next_unit() * 2.0 - 1.0) * options.jitter);
        zs.push(block.position.z + (rng.next_unit() * 2.0 - 1.0) * options.jitter);
    }

    let mut iterations = 0usize;
    for _ in 0..options.max_iterations {
        iterations += 1;
        let mut fx = vec![0.0f32; count];
        let mut fz = vec![0.0f32; count];

        for i in 0..count {
            for j in (i + 1)..count {
                let min_dist = (refined[i].footprint.width + refined[j].footprint.width) / 2.0;
                let mut dx = xs[i] - xs[j];
                let mut dz = zs[i] - zs[j];
                let mut dist = (dx * dx + dz * dz).sqrt();
                if dist >= min_dist {
                    continue;
                }
                if dist < 1e-6 {
                    // Coincident blocks: push apart along a fixed axis.
                    dx = 1.0;
                    dz = 0.0;
                    dist = 1e-6;
                }
                let overlap = min_dist - dist;
                let magnitude = options.repulsion_strength * overlap / dist.max(1.0);
                let len = (dx * dx + dz * dz).sqrt();
                let (ux, uz) = (dx / len, dz / len);
                fx[i] += ux * magnitude;
                fz[i] += uz * magnitude;
                fx[j] -= ux * magnitude;
                fz[j] -= uz * magnitude;
            }
        }

        for &(i, j) in &adjacency {
            let dx = xs[j] - xs[i];
            let dz = zs[j] - zs[i];
            fx[i] += dx * options.attraction_strength;
            fz[i] += dz * options.attraction_strength;
            fx[j] -= dx * options.attraction_strength;
            fz[j] -= dz * options.attraction_strength;
        }

        let mut movement = 0.0f32;
        for idx in 0..count {
            let old_x = xs[idx];
            let old_z = zs[idx];
            let mut nx = old_x + fx[idx] * options.damping;
            let mut nz = old_z + fz[idx] * options.damping;
            let ox = nx - centroid_x;
            let oz = nz - centroid_z;
            let off = (ox * ox + oz * oz).sqrt();
            if off > bound {
                nx = centroid_x + ox / off * bound;
                nz = centroid_z + oz / off * bound;
            }
            movement += ((nx - old_x).powi(2) + (nz - old_z).powi(2)).sqrt();
            xs[idx] = nx;
            zs[idx] = nz;
        }
        if movement < options.min_movement {
            break;
        }
    }

    tracing::debug!(
        blocks = count,
        links = adjacency.len(),
        iterations,
        "refined district blocks"
    );

    for (idx, block) in refined.iter_mut().enumerate() {
        block.position.x = xs[idx];
        block.position.z = zs[idx];
    }
    refined
}
