use super::*;

const TAU: f32 = std::f32::consts::TAU;

/// Demand one district places on one ring.
#[derive(Debug, Clone)]
pub(crate) struct RingDemand {
    pub district_id: String,
    pub slots: usize,
    pub widest: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RingAssignment {
    pub district_id: String,
    pub depth: u32,
    pub ring_radius: f32,
    pub arc_start: f32,
    pub arc_end: f32,
    pub slots: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RingPlan {
    pub assignments: Vec<RingAssignment>,
    pub radii: BTreeMap<u32, f32>,
    pub outward_offset: f32,
    pub max_depth: u32,
}

pub(crate) fn nominal_ring_radius(depth: u32, config: &LayoutConfig) -> f32 {
    config.scaled_center_radius() + depth as f32 * config.scaled_ring_spacing()
}

/// Smallest radius whose circumference holds `slots` buildings `spacing` apart.
pub(crate) fn fit_radius(slots: usize, spacing: f32) -> f32 {
    slots as f32 * spacing / TAU
}

/// Splits the full circle into contiguous arcs proportional to `weights`,
/// leaving `padding` radians after every arc. Arcs keep input order.
pub(crate) fn allocate_arcs(weights: &[usize], padding: f32) -> Vec<(f32, f32)> {
    if weights.is_empty() {
        return Vec::new();
    }
    let count = weights.len();
    let mut padding = padding.max(0.0);
    let mut available = TAU - padding * count as f32;
    if available <= 0.0 {
        tracing::warn!(count, padding, "arc padding exceeds the circle, dropping padding");
        padding = 0.0;
        available = TAU;
    }
    let total: usize = weights.iter().sum();

    let mut arcs = Vec::with_capacity(count);
    let mut cursor = 0.0f32;
    for weight in weights {
        let share = if total == 0 {
            1.0 / count as f32
        } else {
            *weight as f32 / total as f32
        };
        let start = cursor;
        let end = start + available * share;
        arcs.push((start, end));
        cursor = end + padding;
    }
    arcs
}

/// Angles for `count` evenly spread slots across an arc, centred in each slot.
pub(crate) fn spread_angles(arc_start: f32, arc_end: f32, count: usize) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    let span = arc_end - arc_start;
    (0..count)
        .map(|idx| arc_start + span * (idx as f32 + 0.5) / count as f32)
        .collect()
}

pub(crate) fn allocate_rings(
    demands: &BTreeMap<u32, Vec<RingDemand>>,
    config: &LayoutConfig,
) -> RingPlan {
    let mut plan = RingPlan::default();
    let base_spacing = config.scaled_building_spacing();

    for (depth, districts) in demands {
        let mut districts: Vec<&RingDemand> = districts.iter().collect();
        districts.sort_by(|a, b| a.district_id.cmp(&b.district_id));

        let slots: usize = districts.iter().map(|d| d.slots).sum();
        let spacing = if config.fit_widest_block {
            districts
                .iter()
                .map(|d| d.widest)
                .fold(base_spacing, f32::max)
        } else {
            base_spacing
        };
        let nominal = nominal_ring_radius(*depth, config) + plan.outward_offset;
        let required = fit_radius(slots, spacing);
        let radius = if required > nominal {
            plan.outward_offset += required - nominal;
            tracing::debug!(depth, nominal, required, "expanded ring to fit districts");
            required
        } else {
            nominal
        };
        plan.radii.insert(*depth, radius);
        plan.max_depth = plan.max_depth.max(*depth);

        let weights: Vec<usize> = districts.iter().map(|d| d.slots).collect();
        let arcs = allocate_arcs(&weights, config.arc_padding);
        for (demand, (arc_start, arc_end)) in districts.iter().zip(arcs) {
            plan.assignments.push(RingAssignment {
                district_id: demand.district_id.clone(),
                depth: *depth,
                ring_radius: radius,
                arc_start,
                arc_end,
                slots: demand.slots,
            });
        }
    }
    plan
}

/// A single entry file sits on the origin; several share a small circle.
pub(crate) fn entry_point_positions(count: usize, config: &LayoutConfig) -> Vec<Position3D> {
    match count {
        0 => Vec::new(),
        1 => vec![Position3D::ORIGIN],
        _ => {
            let radius = config.scaled_center_radius() * 0.5;
            (0..count)
                .map(|idx| Position3D::on_ring(radius, TAU * idx as f32 / count as f32))
                .collect()
        }
    }
}

/// Global orphans ring the entry points, offset half a step.
pub(crate) fn orphan_positions(count: usize, config: &LayoutConfig) -> Vec<Position3D> {
    let radius = config.scaled_center_radius() * 0.75;
    (0..count)
        .map(|idx| Position3D::on_ring(radius, TAU * (idx as f32 + 0.5) / count as f32))
        .collect()
}
