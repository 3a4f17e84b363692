use super::*;
use crate::traffic::TrafficMetrics;

fn node(name: &str) -> TrafficNode {
	TrafficNode {
		name: name.into(),
		..Default::default()
	}
}

fn conn(source: &str, target: &str, normal: f64, danger: f64) -> TrafficConnection {
	TrafficConnection {
		source: source.into(),
		target: target.into(),
		metrics: Some(TrafficMetrics {
			normal: Some(normal),
			warning: None,
			danger: Some(danger),
		}),
		..Default::default()
	}
}

fn region() -> TrafficNode {
	TrafficNode {
		name: "us-east-1".into(),
		entry_node: Some("INTERNET".into()),
		nodes: Some(vec![
			node("INTERNET"),
			node("api"),
			node("db"),
			node("cache"),
			node("idle"),
		]),
		connections: Some(vec![
			conn("INTERNET", "api", 100.0, 0.0),
			conn("api", "db", 40.0, 10.0),
			conn("api", "cache", 2.0, 0.0),
		]),
		..Default::default()
	}
}

fn build(focus: Focus<'_>, filters: &[TrafficFilter]) -> Scene {
	Scene::build(focus, filters, &HashMap::new(), 800.0, 600.0)
}

#[test]
fn graph_focus_shows_every_child_and_connection() {
	let r = region();
	let scene = build(Focus::Graph(&r), &[]);
	assert_eq!(scene.node_count(), 5);
	assert_eq!(scene.edge_count(), 3);
	assert_eq!(scene.max_volume, 100.0);

	let api = scene.index_of("api").unwrap();
	let info = scene.node_info(api).unwrap();
	assert_eq!(info.volume, 152.0);
	assert!(info.drillable);
	assert_eq!(scene.name_of(api), Some("api"));

	// danger share of api -> db is 20%
	let db = scene.index_of("db").unwrap();
	assert_eq!(scene.node_info(db).unwrap().severity, SeverityClass::Danger);
	assert_eq!(
		scene.edge_info(api, db).unwrap().severity,
		SeverityClass::Danger
	);
}

#[test]
fn entry_node_is_pinned_left() {
	let r = region();
	let scene = build(Focus::Graph(&r), &[]);
	let entry = scene.index_of("INTERNET").unwrap();
	let mut pinned = None;
	scene.graph.visit_nodes(|n| {
		if n.index() == entry {
			pinned = Some((n.data.is_anchor, n.x()));
		}
	});
	let (anchor, x) = pinned.unwrap();
	assert!(anchor);
	assert!(x < 0.0);
	assert!(scene.node_info(entry).unwrap().is_entry);
}

#[test]
fn focused_child_shows_only_neighbours() {
	let r = region();
	let api = r.child("api").unwrap();
	let scene = build(Focus::Focused { parent: &r, node: api }, &[]);
	assert_eq!(scene.node_count(), 4);
	assert!(scene.index_of("idle").is_none());
	assert_eq!(scene.edge_count(), 3);
	let focused = scene.index_of("api").unwrap();
	assert!(!scene.node_info(focused).unwrap().drillable);

	let db = r.child("db").unwrap();
	let scene = build(Focus::Focused { parent: &r, node: db }, &[]);
	assert_eq!(scene.node_count(), 2);
	assert_eq!(scene.edge_count(), 1);
}

#[test]
fn connection_filter_drops_thin_edges() {
	let r = region();
	let filters = [TrafficFilter {
		name: "rps".into(),
		kind: FilterKind::Connection,
		min_volume: 10.0,
	}];
	let scene = build(Focus::Graph(&r), &filters);
	assert_eq!(scene.edge_count(), 2);
	assert_eq!(scene.node_count(), 5);
}

#[test]
fn node_filter_keeps_entry_node() {
	let mut r = region();
	r.connections = Some(vec![conn("api", "db", 40.0, 0.0)]);
	let filters = [TrafficFilter {
		name: "quiet".into(),
		kind: FilterKind::Node,
		min_volume: 1.0,
	}];
	let scene = build(Focus::Graph(&r), &filters);
	assert!(scene.index_of("INTERNET").is_some());
	assert!(scene.index_of("api").is_some());
	assert!(scene.index_of("idle").is_none());
	assert!(scene.index_of("cache").is_none());
}

#[test]
fn previous_positions_are_reused() {
	let r = region();
	let mut previous = HashMap::new();
	previous.insert("db".to_string(), (42.0_f32, -7.0_f32));
	let scene = Scene::build(Focus::Graph(&r), &[], &previous, 800.0, 600.0);
	let positions = scene.positions();
	assert_eq!(positions["db"], (42.0, -7.0));
	assert_eq!(positions.len(), 5);
}

#[test]
fn find_matches_name_and_label() {
	let mut r = region();
	if let Some(nodes) = r.nodes.as_mut() {
		nodes[3].display_name = Some("Redis".into());
	}
	let mut scene = build(Focus::Graph(&r), &[]);
	assert_eq!(scene.find("API"), 1);
	assert_eq!(scene.find("a"), 2);
	assert_eq!(scene.find("redis"), 1);
	assert!(scene.matches.contains(&scene.index_of("cache").unwrap()));
	assert_eq!(scene.find("  "), 0);
	assert!(scene.matches.is_empty());
}

#[test]
fn hover_collects_neighbours() {
	let r = region();
	let mut scene = build(Focus::Graph(&r), &[]);
	let api = scene.index_of("api");
	scene.set_hover(api);
	assert_eq!(scene.hover.neighbors.len(), 3);
	assert!(scene.is_hovered(api.unwrap()));

	scene.set_hover(None);
	assert!(scene.has_active_highlight());
	for _ in 0..400 {
		scene.tick(0.016);
	}
	assert!(!scene.has_active_highlight());
}

#[test]
fn self_loop_counts_towards_node_but_is_not_simulated() {
	let mut r = region();
	if let Some(c) = r.connections.as_mut() {
		c.push(conn("cache", "cache", 5.0, 5.0));
	}
	let mut scene = build(Focus::Graph(&r), &[]);
	assert_eq!(scene.edge_count(), 3);
	let cache = scene.index_of("cache").unwrap();
	assert!(scene.edge_info(cache, cache).is_none());
	let info = scene.node_info(cache).unwrap();
	assert_eq!(info.volume, 12.0);
	assert_eq!(info.severity, SeverityClass::Danger);

	for _ in 0..10 {
		scene.tick(0.016);
	}
	assert_eq!(scene.node_count(), 5);
}

#[test]
fn both_directions_of_a_pair_are_drawn() {
	let mut r = region();
	r.connections = Some(vec![conn("api", "db", 10.0, 0.0), conn("db", "api", 3.0, 0.0)]);
	let mut scene = build(Focus::Graph(&r), &[]);
	let (api, db) = (scene.index_of("api").unwrap(), scene.index_of("db").unwrap());

	assert_eq!(scene.edge_count(), 2);
	assert_eq!(scene.edge_info(api, db).unwrap().volume, 10.0);
	assert_eq!(scene.edge_info(db, api).unwrap().volume, 3.0);
	assert!(scene.edges().iter().all(|e| e.paired));

	for _ in 0..10 {
		scene.tick(0.016);
	}
	scene.set_hover(Some(db));
	assert!(scene.hover.neighbors.contains(&api));
}

#[test]
fn one_way_edges_are_not_paired() {
	let r = region();
	let scene = build(Focus::Graph(&r), &[]);
	assert!(scene.edges().iter().all(|e| !e.paired));
}
