//! The visualization engine the dashboard drives through [`VizCommand`]s.
//!
//! It owns the current snapshot, the requested drill-down path and the display
//! settings, and rebuilds the force-directed [`Scene`] whenever one of them
//! changes what is on screen.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use super::props::{TrafficFilter, VizCommand};
use super::scene::{NodeInfo, Scene};
use crate::traffic::{Focus, TrafficNode};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Every style the engine understands, with its default.
const DEFAULT_STYLES: &[(&str, &str)] = &[
	("colorBackground", "#1a1a2e"),
	("colorText", "#ffffff"),
	("colorLabelText", "#d6d6d6"),
	("colorNode", "#64b4ff"),
	("colorEntryNode", "#bcbd22"),
	("colorTraffic.normal", "#64b4ff"),
	("colorTraffic.warning", "#ff7f0e"),
	("colorTraffic.danger", "#d62728"),
	("colorSearchMatch", "#2ca02c"),
];

/// Something the dashboard may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
	/// The displayed path differs from the one last requested, either because
	/// the operator drilled in or because the requested path no longer exists.
	ViewChanged(Vec<String>),
	ObjectHighlighted(Option<String>),
	ObjectHovered(Option<String>),
	MatchesFound { total: usize, visible: usize },
}

/// Interaction and labelling switches set through `SetOptions`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
	pub allow_dragging_of_nodes: bool,
	pub show_labels: bool,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			allow_dragging_of_nodes: false,
			show_labels: true,
		}
	}
}

/// Interprets [`VizCommand`]s against the current snapshot and owns the scene drawn from it.
pub struct TrafficEngine {
	traffic: Option<TrafficNode>,
	view: Vec<String>,
	/// Path the current scene was built for.
	shown: Vec<String>,
	/// Whether the current scene is a leaf with its neighbours.
	shows_leaf: bool,
	highlight: Option<String>,
	filters: Vec<TrafficFilter>,
	options: EngineOptions,
	styles: BTreeMap<String, String>,
	modes: BTreeMap<String, String>,
	definitions: BTreeMap<String, String>,
	match_text: String,
	scene: Option<Scene>,
	width: f64,
	height: f64,
}

fn count_matches(node: &TrafficNode, needle: &str) -> usize {
	node.children()
		.iter()
		.map(|c| {
			let hit = c.name.to_lowercase().contains(needle)
				|| c.display_name().to_lowercase().contains(needle);
			usize::from(hit) + count_matches(c, needle)
		})
		.sum()
}

impl TrafficEngine {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			traffic: None,
			view: Vec::new(),
			shown: Vec::new(),
			shows_leaf: false,
			highlight: None,
			filters: Vec::new(),
			options: EngineOptions::default(),
			styles: DEFAULT_STYLES
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			modes: BTreeMap::new(),
			definitions: BTreeMap::new(),
			match_text: String::new(),
			scene: None,
			width,
			height,
		}
	}

	pub fn style_names(&self) -> Vec<&'static str> {
		DEFAULT_STYLES.iter().map(|(k, _)| *k).collect()
	}

	/// Colour for `name`, falling back to the background colour for unknown names.
	pub fn style(&self, name: &str) -> &str {
		self.styles
			.get(name)
			.or_else(|| self.styles.get("colorBackground"))
			.map_or("#000000", String::as_str)
	}

	pub fn options(&self) -> EngineOptions {
		self.options
	}

	pub fn view(&self) -> &[String] {
		&self.view
	}

	pub fn scene(&self) -> Option<&Scene> {
		self.scene.as_ref()
	}

	pub fn scene_mut(&mut self) -> Option<&mut Scene> {
		self.scene.as_mut()
	}

	pub fn definition(&self, class: &str) -> Option<&str> {
		self.definitions.get(class).map(String::as_str)
	}

	/// Text drawn next to a node, if labels are on.
	pub fn label(&self, info: &NodeInfo) -> Option<String> {
		if !self.options.show_labels {
			return None;
		}
		match self.modes.get("detailedNode").map(String::as_str) {
			Some("volume") if info.volume > 0.0 => {
				Some(format!("{} ({:.1} rps)", info.label, info.volume))
			}
			_ => Some(info.label.clone()),
		}
	}

	/// Applies `cmds` in order and returns the events they raised.
	pub fn apply_all(&mut self, cmds: Vec<VizCommand>) -> Vec<EngineEvent> {
		cmds.into_iter().flat_map(|c| self.apply(c)).collect()
	}

	pub fn apply(&mut self, cmd: VizCommand) -> Vec<EngineEvent> {
		trace!("Engine command {}", cmd.name());
		match cmd {
			VizCommand::UpdateStyles(custom) => {
				self.update_styles(&custom);
				Vec::new()
			}
			VizCommand::SetView { view, highlight } => self.set_view(view, highlight),
			VizCommand::SetFilters(filters) => {
				self.filters = filters;
				self.rebuild()
			}
			VizCommand::SetOptions {
				allow_dragging_of_nodes,
				show_labels,
			} => {
				self.options = EngineOptions {
					allow_dragging_of_nodes,
					show_labels,
				};
				Vec::new()
			}
			VizCommand::SetModes(modes) => {
				self.modes = modes;
				Vec::new()
			}
			VizCommand::UpdateDefinitions(definitions) => {
				self.definitions = definitions;
				Vec::new()
			}
			VizCommand::FindNodes(text) => {
				self.match_text = text;
				vec![self.find_nodes()]
			}
			VizCommand::UpdateData(traffic) => {
				debug!("Updating traffic data for {}", traffic.name);
				self.traffic = Some(traffic);
				let mut events = self.rebuild();
				if !self.match_text.is_empty() {
					events.push(self.find_nodes());
				}
				events
			}
		}
	}

	/// Overrides known styles with the ones supplied; the rest keep their value.
	fn update_styles(&mut self, custom: &BTreeMap<String, String>) {
		for name in self.style_names() {
			if let Some(v) = custom.get(name) {
				self.styles.insert(name.to_string(), v.clone());
			}
		}
	}

	fn set_view(&mut self, view: Vec<String>, highlight: Option<String>) -> Vec<EngineEvent> {
		let mut events = Vec::new();
		if view != self.view {
			self.view = view;
			events.extend(self.rebuild());
		}
		if highlight != self.highlight {
			self.highlight = highlight;
			events.extend(self.select_highlight());
		}
		events
	}

	fn select_highlight(&mut self) -> Option<EngineEvent> {
		let scene = self.scene.as_mut()?;
		let selected = self.highlight.as_deref().and_then(|n| scene.index_of(n));
		if selected.is_none() {
			self.highlight = None;
		}
		if selected == scene.selected {
			return None;
		}
		scene.selected = selected;
		Some(EngineEvent::ObjectHighlighted(self.highlight.clone()))
	}

	fn find_nodes(&mut self) -> EngineEvent {
		let needle = self.match_text.trim().to_lowercase();
		let visible = self.scene.as_mut().map_or(0, |s| s.find(&needle));
		let total = match (&self.traffic, needle.is_empty()) {
			(Some(t), false) => count_matches(t, &needle),
			_ => 0,
		};
		EngineEvent::MatchesFound { total, visible }
	}

	/// Lays the current level out again, keeping positions and viewport when the
	/// level itself did not change.
	fn rebuild(&mut self) -> Vec<EngineEvent> {
		let Some(traffic) = self.traffic.as_ref() else {
			return Vec::new();
		};
		let (resolved, focus) = traffic.resolve_view(&self.view);
		self.shows_leaf = matches!(focus, Focus::Focused { .. });
		let previous = self.scene.take();
		let same_level = previous.is_some() && resolved == self.shown;
		let positions = match (&previous, same_level) {
			(Some(p), true) => p.positions(),
			_ => HashMap::new(),
		};
		let mut scene = Scene::build(focus, &self.filters, &positions, self.width, self.height);
		if let (Some(p), true) = (&previous, same_level) {
			scene.keep_viewport(p);
		}
		scene.find(&self.match_text);
		debug!(
			"Scene for /{} has {} nodes and {} edges",
			resolved.join("/"),
			scene.node_count(),
			scene.edge_count()
		);

		let mut events = Vec::new();
		scene.selected = self.highlight.as_deref().and_then(|n| scene.index_of(n));
		if self.highlight.is_some() && scene.selected.is_none() {
			self.highlight = None;
			events.push(EngineEvent::ObjectHighlighted(None));
		}
		self.scene = Some(scene);
		self.shown = resolved.clone();
		if resolved != self.view {
			debug!("View /{} no longer exists", self.view.join("/"));
			self.view = resolved;
			events.insert(0, EngineEvent::ViewChanged(self.view.clone()));
		}
		events
	}

	/// Drills into the node under the pointer. Leaves of a region open their
	/// focused view, neighbours in a focused view swap focus, and the focused
	/// node itself goes nowhere.
	pub fn drill_at(&mut self, x: f64, y: f64) -> Vec<EngineEvent> {
		let Some(scene) = self.scene.as_ref() else {
			return Vec::new();
		};
		let Some(info) = scene.node_at_position(x, y).and_then(|idx| scene.node_info(idx)) else {
			return Vec::new();
		};
		if !info.drillable {
			return Vec::new();
		}
		let mut view = self.view.clone();
		if self.shows_leaf {
			view.pop();
		}
		view.push(info.name);
		let mut events = self.set_view(view, None);
		events.push(EngineEvent::ViewChanged(self.view.clone()));
		events
	}

	/// Selects the node under the pointer, or clears the selection.
	pub fn select_at(&mut self, x: f64, y: f64) -> Option<EngineEvent> {
		let scene = self.scene.as_ref()?;
		let name = scene
			.node_at_position(x, y)
			.and_then(|idx| scene.name_of(idx))
			.map(str::to_string);
		if name == self.highlight {
			return None;
		}
		self.highlight = name;
		self.select_highlight()
	}

	/// Updates hover state, reporting the hovered node when it changes.
	pub fn hover_at(&mut self, x: f64, y: f64) -> Option<EngineEvent> {
		let scene = self.scene.as_mut()?;
		let hovered = scene.node_at_position(x, y);
		if hovered == scene.hover.node {
			return None;
		}
		scene.set_hover(hovered);
		let name = hovered.and_then(|idx| scene.name_of(idx)).map(str::to_string);
		Some(EngineEvent::ObjectHovered(name))
	}

	pub fn clear_hover(&mut self) -> Option<EngineEvent> {
		let scene = self.scene.as_mut()?;
		scene.hover.node?;
		scene.set_hover(None);
		Some(EngineEvent::ObjectHovered(None))
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if let Some(s) = self.scene.as_mut() {
			s.resize(width, height);
		}
	}
}
