use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::props::{FilterKind, TrafficFilter};
use crate::traffic::{Focus, SeverityClass, TrafficConnection, TrafficNode};

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Radius of the ring new nodes are placed on.
const SPAWN_RADIUS: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub name: String,
	pub label: String,
	pub class: Option<String>,
	pub severity: SeverityClass,
	/// Total volume of the connections touching the node in this scene.
	pub volume: f64,
	pub is_entry: bool,
	/// Whether double-clicking drills into the node.
	pub drillable: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeInfo {
	pub volume: f64,
	pub severity: SeverityClass,
}

/// One directed connection as drawn.
#[derive(Clone, Copy, Debug)]
pub struct SceneEdge {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub info: EdgeInfo,
	/// Traffic also flows from `target` to `source`; both are drawn side by side.
	pub paired: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// The force-directed layout of one level of a traffic snapshot, plus the
/// pointer interaction state on top of it.
pub struct Scene {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	/// Nodes matching the current search.
	pub matches: HashSet<DefaultNodeIdx>,
	/// Node picked by click or by the dashboard.
	pub selected: Option<DefaultNodeIdx>,
	/// Largest connection volume, used to scale edge widths.
	pub max_volume: f64,
	edges: Vec<SceneEdge>,
	by_name: HashMap<String, DefaultNodeIdx>,
}

fn severity_of(class: Option<&str>, fallback: SeverityClass) -> SeverityClass {
	class.and_then(SeverityClass::from_class).unwrap_or(fallback)
}

fn connection_volume(c: &TrafficConnection) -> f64 {
	c.metrics.as_ref().map_or(0.0, |m| m.total())
}

impl Scene {
	/// Lays out the level `focus` points at.
	///
	/// Nodes found in `previous` keep their position; the rest are spread on a
	/// ring around the origin. The entry node is pinned on the left.
	pub fn build(
		focus: Focus<'_>,
		filters: &[TrafficFilter],
		previous: &HashMap<String, (f32, f32)>,
		width: f64,
		height: f64,
	) -> Self {
		let (level, members, entry): (&TrafficNode, Vec<&TrafficNode>, Option<&str>) = match focus {
			Focus::Graph(g) => (g, g.children().iter().collect(), g.entry_node.as_deref()),
			Focus::Focused { parent, node } => {
				let mut members = vec![node];
				for c in parent.connections() {
					let other = if c.source == node.name {
						&c.target
					} else if c.target == node.name {
						&c.source
					} else {
						continue;
					};
					if let Some(n) = parent.child(other) {
						if !members.iter().any(|m| m.name == n.name) {
							members.push(n);
						}
					}
				}
				(parent, members, None)
			}
		};
		let pinned = match focus {
			Focus::Focused { node, .. } => Some(node.name.as_str()),
			Focus::Graph(_) => None,
		};

		let keep_connection = |c: &TrafficConnection| {
			let in_scene = match pinned {
				Some(name) => c.source == name || c.target == name,
				None => true,
			};
			in_scene
				&& filters
					.iter()
					.filter(|f| f.kind == FilterKind::Connection)
					.all(|f| connection_volume(c) >= f.min_volume)
		};
		let connections: Vec<&TrafficConnection> =
			level.connections().iter().filter(|c| keep_connection(c)).collect();

		let volume_of = |name: &str| -> f64 {
			connections
				.iter()
				.filter(|c| c.source == name || c.target == name)
				.map(|c| connection_volume(c))
				.sum()
		};
		let worst_of = |name: &str| -> SeverityClass {
			connections
				.iter()
				.filter(|c| c.target == name)
				.filter_map(|c| c.metrics.as_ref())
				.map(|m| m.severity())
				.max()
				.unwrap_or(SeverityClass::Normal)
		};

		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut by_name = HashMap::new();
		let visible: Vec<&TrafficNode> = members
			.into_iter()
			.filter(|n| {
				let exempt = Some(n.name.as_str()) == entry || Some(n.name.as_str()) == pinned;
				exempt
					|| filters
						.iter()
						.filter(|f| f.kind == FilterKind::Node)
						.all(|f| level.volume_of(&n.name) >= f.min_volume)
			})
			.collect();

		for (i, node) in visible.iter().enumerate() {
			let is_entry = Some(node.name.as_str()) == entry;
			let (x, y) = if is_entry {
				(-(width / 3.0) as f32, 0.0)
			} else if let Some(&pos) = previous.get(&node.name) {
				pos
			} else {
				let angle = (i as f64) * 2.0 * PI / visible.len() as f64;
				(
					(SPAWN_RADIUS * angle.cos()) as f32,
					(SPAWN_RADIUS * angle.sin()) as f32,
				)
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: is_entry,
				user_data: NodeInfo {
					name: node.name.clone(),
					label: node.display_name().to_string(),
					class: node.class.clone(),
					severity: severity_of(node.class.as_deref(), worst_of(&node.name)),
					volume: volume_of(&node.name),
					is_entry,
					drillable: pinned != Some(node.name.as_str()),
				},
			});
			by_name.insert(node.name.clone(), idx);
		}

		// The simulation graph is undirected and panics on self-loops, so it gets
		// one spring per pair of distinct nodes. Drawn edges stay directed.
		let mut edges: Vec<SceneEdge> = Vec::new();
		let mut springs = HashSet::new();
		let mut max_volume: f64 = 0.0;
		for c in connections {
			let (Some(&src), Some(&tgt)) = (by_name.get(&c.source), by_name.get(&c.target)) else {
				continue;
			};
			let volume = connection_volume(c);
			max_volume = max_volume.max(volume);
			if src == tgt {
				continue;
			}
			let fallback = c.metrics.as_ref().map_or(SeverityClass::Normal, |m| m.severity());
			if springs.insert((src.min(tgt), src.max(tgt))) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
			let info = EdgeInfo {
				volume,
				severity: severity_of(c.class.as_deref(), fallback),
			};
			match edges.iter_mut().find(|e| e.source == src && e.target == tgt) {
				Some(existing) => existing.info = info,
				None => edges.push(SceneEdge {
					source: src,
					target: tgt,
					info,
					paired: false,
				}),
			}
		}
		let pairs: HashSet<(DefaultNodeIdx, DefaultNodeIdx)> =
			edges.iter().map(|e| (e.source, e.target)).collect();
		for e in &mut edges {
			e.paired = pairs.contains(&(e.target, e.source));
		}
		if let Some(m) = level.max_volume {
			max_volume = max_volume.max(m);
		}

		Self {
			graph,
			edges,
			by_name,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			matches: HashSet::new(),
			selected: None,
			max_volume,
		}
	}

	/// Current position of every node, by name.
	pub fn positions(&self) -> HashMap<String, (f32, f32)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.data.user_data.name.clone(), (node.x(), node.y()));
		});
		out
	}

	/// Carries over pan and zoom from the scene this one replaces.
	pub fn keep_viewport(&mut self, prev: &Scene) {
		self.transform = prev.transform.clone();
	}

	pub fn node_count(&self) -> usize {
		self.by_name.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn index_of(&self, name: &str) -> Option<DefaultNodeIdx> {
		self.by_name.get(name).copied()
	}

	pub fn name_of(&self, idx: DefaultNodeIdx) -> Option<&str> {
		self.by_name
			.iter()
			.find(|(_, i)| **i == idx)
			.map(|(name, _)| name.as_str())
	}

	pub fn node_info(&self, idx: DefaultNodeIdx) -> Option<NodeInfo> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.clone());
			}
		});
		found
	}

	pub fn edge_info(&self, src: DefaultNodeIdx, tgt: DefaultNodeIdx) -> Option<EdgeInfo> {
		self.edges
			.iter()
			.find(|e| e.source == src && e.target == tgt)
			.map(|e| e.info)
	}

	/// Directed edges to draw, self-loops excluded.
	pub fn edges(&self) -> &[SceneEdge] {
		&self.edges
	}

	/// Current position of every node, by index.
	pub fn node_positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Rings every node whose name or label contains `text`, case-insensitively.
	/// Returns how many matched.
	pub fn find(&mut self, text: &str) -> usize {
		self.matches.clear();
		let needle = text.trim().to_lowercase();
		if needle.is_empty() {
			return 0;
		}
		let matches = &mut self.matches;
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			if info.name.to_lowercase().contains(&needle)
				|| info.label.to_lowercase().contains(&needle)
			{
				matches.insert(node.index());
			}
		});
		self.matches.len()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for e in &self.edges {
				if e.source == idx {
					self.hover.neighbors.insert(e.target);
				} else if e.target == idx {
					self.hover.neighbors.insert(e.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
