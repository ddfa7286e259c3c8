use std::path::Path;
use std::sync::Arc;

use code_city_layout::layout::{Position3D, should_cluster};
use code_city_layout::layout_dump::LayoutDump;
use code_city_layout::render::render_svg;
use code_city_layout::{
    Graph, HierarchicalLayoutResult, LayoutConfig, LayoutEngine, LayoutRegistry,
    RadialCityLayout, Theme, compute_layout,
};

fn load_fixture(name: &str) -> Graph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    Graph::from_json(&input).expect("fixture parse failed")
}

fn layout_fixture(name: &str) -> (Graph, HierarchicalLayoutResult) {
    let graph = load_fixture(name);
    let result = compute_layout(&graph, &LayoutConfig::default());
    (graph, result)
}

#[test]
fn every_fixture_positions_every_node() {
    // Keep this list explicit so new fixtures must be added intentionally.
    for fixture in ["single_entry.json", "small_service.json", "explicit_depth.json"] {
        let (graph, result) = layout_fixture(fixture);
        assert_eq!(
            result.positions.len(),
            graph.nodes.len(),
            "{fixture}: position count"
        );
        for id in graph.nodes.keys() {
            assert!(result.positions.contains_key(id), "{fixture}: missing {id}");
        }
        for pos in result.positions.values() {
            assert!(pos.x.is_finite() && pos.y.is_finite() && pos.z.is_finite());
        }
    }
}

#[test]
fn single_entry_file_sits_at_origin() {
    let (_, result) = layout_fixture("single_entry.json");
    assert_eq!(result.positions.len(), 1);
    assert_eq!(result.positions["index.ts"], Position3D::ORIGIN);
    assert_eq!(result.metadata.entry_point_count, 1);
    assert_eq!(result.metadata.district_count, 0);
}

#[test]
fn repeated_layouts_are_identical() {
    let graph = load_fixture("small_service.json");
    let config = LayoutConfig::default();
    let first = compute_layout(&graph, &config);
    for _ in 0..10 {
        let next = compute_layout(&graph, &config);
        assert_eq!(next.positions, first.positions);
        assert_eq!(next.metadata.district_arcs, first.metadata.district_arcs);
        assert_eq!(next, first);
    }
}

#[test]
fn explicit_seed_is_reproducible() {
    let graph = load_fixture("small_service.json");
    let config = LayoutConfig {
        seed: Some(99),
        ..Default::default()
    };
    assert_eq!(compute_layout(&graph, &config), compute_layout(&graph, &config));
}

#[test]
fn deeper_files_are_farther_from_origin() {
    let (_, result) = layout_fixture("explicit_depth.json");
    let r = |id: &str| result.positions[id].radial_distance();
    assert_eq!(result.positions["app/main.ts"], Position3D::ORIGIN);
    assert!(r("app/main.ts") < r("app/core/service.ts"));
    assert!(r("app/core/service.ts") < r("app/core/repo.ts"));
    assert!(r("app/core/repo.ts") < r("app/core/deep/driver.ts"));
    assert_eq!(result.metadata.ring_count, 3);
}

#[test]
fn externals_sit_outside_every_file() {
    for fixture in ["small_service.json", "explicit_depth.json"] {
        let (graph, result) = layout_fixture(fixture);
        let max_internal = graph
            .file_nodes()
            .map(|node| result.positions[&node.id].radial_distance())
            .fold(0.0f32, f32::max);
        for node in graph.external_nodes() {
            let r = result.positions[&node.id].radial_distance();
            assert!(r > max_internal, "{fixture}: {} at {r} <= {max_internal}", node.id);
        }
    }
}

#[test]
fn arcs_on_a_ring_never_overlap() {
    let (_, result) = layout_fixture("small_service.json");
    let mut by_ring: std::collections::BTreeMap<u32, Vec<(f32, f32)>> = Default::default();
    for arc in &result.metadata.district_arcs {
        assert!(arc.arc_start < arc.arc_end, "{} has an empty arc", arc.district_id);
        by_ring
            .entry(arc.depth)
            .or_default()
            .push((arc.arc_start, arc.arc_end));
    }
    for arcs in by_ring.values_mut() {
        arcs.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in arcs.windows(2) {
            assert!(pair[1].0 >= pair[0].1);
        }
    }
}

#[test]
fn infrastructure_zones_follow_canonical_order() {
    let (_, result) = layout_fixture("small_service.json");
    let zones: Vec<(&str, usize)> = result
        .metadata
        .infrastructure_zones
        .iter()
        .map(|z| (z.zone_type.as_str(), z.node_count))
        .collect();
    assert_eq!(
        zones,
        vec![
            ("database", 2),
            ("api", 1),
            ("cache", 1),
            ("logging", 1),
            ("general", 2),
        ]
    );
    for pair in result.metadata.infrastructure_zones.windows(2) {
        assert!(pair[0].arc_end < pair[1].arc_start);
    }
    assert_eq!(result.metadata.external_count, 7);
}

#[test]
fn broken_and_cyclic_parents_still_get_positions() {
    let (_, result) = layout_fixture("small_service.json");
    assert_eq!(result.metadata.orphan_count, 5);
    for id in ["Ghost", "Phantom", "Phantom.haunt", "dangling", "seedUsers"] {
        assert!(result.positions.contains_key(id), "missing orphan {id}");
    }
    let db = result
        .districts
        .iter()
        .find(|d| d.district_id == "src/db")
        .expect("src/db district");
    assert!(db.blocks.iter().any(|b| b.file_id == "seedUsers"));
}

#[test]
fn children_ride_on_their_file_block() {
    let (_, result) = layout_fixture("small_service.json");
    let users = result.positions["src/api/users.ts"];
    let class = result.positions["UserController"];
    let method = result.positions["UserController.list"];
    assert_eq!(users.y, 0.0);
    assert_eq!(class.y, 0.0);
    assert!(method.y > 0.0);
    assert!(users.planar_distance(&class) < 10.0);
}

#[test]
fn small_districts_become_compound_blocks() {
    let (_, result) = layout_fixture("small_service.json");
    let util = result
        .districts
        .iter()
        .find(|d| d.district_id == "src/util")
        .expect("src/util district");
    assert_eq!(util.blocks.len(), 1);
    assert!(util.blocks[0].is_merged);
    let api = result
        .districts
        .iter()
        .find(|d| d.district_id == "src/api")
        .expect("src/api district");
    assert_eq!(api.blocks.len(), 4);
    assert!(api.blocks.iter().all(|b| !b.is_merged));
}

#[test]
fn cluster_threshold_is_strict() {
    assert!(!should_cluster(20, 20));
    assert!(should_cluster(21, 20));

    let (graph, result) = layout_fixture("small_service.json");
    let dump = LayoutDump::from_result(&result, &graph, 3);
    let clustered: Vec<&str> = dump.clusters.iter().map(|c| c.district_id.as_str()).collect();
    assert_eq!(clustered, vec!["src/api", "src/db/models"]);
}

#[test]
fn registry_selects_radial_engine() {
    let registry = LayoutRegistry::with_defaults();
    let graph = load_fixture("single_entry.json");
    let engine = registry.auto_select(&graph).expect("engine for non-empty graph");
    assert_eq!(engine.engine_type(), "radial-city");
    assert!(registry.auto_select(&Graph::new()).is_none());

    let mut fresh = LayoutRegistry::new();
    assert!(fresh.is_empty());
    fresh.register(Arc::new(RadialCityLayout)).unwrap();
    let result = fresh
        .get("radial-city")
        .expect("registered")
        .layout(&graph, &LayoutConfig::default());
    assert_eq!(result.positions.len(), 1);
}

#[test]
fn plan_preview_renders() {
    let (_, result) = layout_fixture("small_service.json");
    let svg = render_svg(&result, &Theme::default(), &Default::default());
    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert!(svg.contains("src/api"));
}

#[test]
fn empty_graph_yields_empty_layout() {
    let graph = Graph::from_json(r#"{"nodes": [], "edges": []}"#).unwrap();
    let result = compute_layout(&graph, &LayoutConfig::default());
    assert!(result.positions.is_empty());
    assert_eq!(result.metadata.district_count, 0);
    assert_eq!(result.bounds.min, Position3D::ORIGIN);
    assert_eq!(result.bounds.max, Position3D::ORIGIN);
}
