//! Inputs of the traffic graph and the change detection that turns a props
//! update into the minimal set of engine calls.

use std::collections::BTreeMap;

use crate::traffic::TrafficNode;

#[cfg(test)]
#[path = "props_test.rs"]
mod props_test;

/// What a filter is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
	/// Hides nodes whose connections carry less than the threshold in total.
	Node,
	/// Hides connections carrying less than the threshold.
	Connection,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrafficFilter {
	pub name: String,
	pub kind: FilterKind,
	pub min_volume: f64,
}

/// Everything the dashboard hands to the traffic graph.
#[derive(Clone, Debug, PartialEq)]
pub struct VizProps {
	pub traffic: TrafficNode,
	pub view: Vec<String>,
	/// Node name to highlight once the view is set.
	pub object_to_highlight: Option<String>,
	pub filters: Vec<TrafficFilter>,
	pub show_labels: bool,
	pub allow_dragging_of_nodes: bool,
	/// Style name to colour overrides; unknown names are ignored by the engine.
	pub styles: BTreeMap<String, String>,
	/// Display modes per detail level, e.g. `detailedNode => volume`.
	pub modes: BTreeMap<String, String>,
	/// Node class to a description shown in the notice panel.
	pub definitions: BTreeMap<String, String>,
	/// Search text; nodes whose name contains it are ringed.
	pub match_text: String,
}

impl Default for VizProps {
	fn default() -> Self {
		Self {
			traffic: TrafficNode::default(),
			view: Vec::new(),
			object_to_highlight: None,
			filters: Vec::new(),
			show_labels: true,
			allow_dragging_of_nodes: false,
			styles: BTreeMap::new(),
			modes: BTreeMap::new(),
			definitions: BTreeMap::new(),
			match_text: String::new(),
		}
	}
}

/// A single call into the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum VizCommand {
	UpdateStyles(BTreeMap<String, String>),
	SetView {
		view: Vec<String>,
		highlight: Option<String>,
	},
	SetFilters(Vec<TrafficFilter>),
	SetOptions {
		allow_dragging_of_nodes: bool,
		show_labels: bool,
	},
	SetModes(BTreeMap<String, String>),
	UpdateDefinitions(BTreeMap<String, String>),
	FindNodes(String),
	UpdateData(TrafficNode),
}

impl VizCommand {
	pub fn name(&self) -> &'static str {
		match self {
			VizCommand::UpdateStyles(_) => "updateStyles",
			VizCommand::SetView { .. } => "setView",
			VizCommand::SetFilters(_) => "setFilters",
			VizCommand::SetOptions { .. } => "setOptions",
			VizCommand::SetModes(_) => "setModes",
			VizCommand::UpdateDefinitions(_) => "updateDefinitions",
			VizCommand::FindNodes(_) => "findNodes",
			VizCommand::UpdateData(_) => "updateData",
		}
	}
}

fn set_view(p: &VizProps) -> VizCommand {
	VizCommand::SetView {
		view: p.view.clone(),
		highlight: p.object_to_highlight.clone(),
	}
}

fn set_options(p: &VizProps) -> VizCommand {
	VizCommand::SetOptions {
		allow_dragging_of_nodes: p.allow_dragging_of_nodes,
		show_labels: p.show_labels,
	}
}

/// Calls issued when the engine is first created.
pub fn initial_commands(props: &VizProps) -> Vec<VizCommand> {
	let mut cmds = vec![
		VizCommand::UpdateStyles(props.styles.clone()),
		set_options(props),
		VizCommand::SetFilters(props.filters.clone()),
		VizCommand::UpdateDefinitions(props.definitions.clone()),
	];
	if !props.modes.is_empty() {
		cmds.push(VizCommand::SetModes(props.modes.clone()));
	}
	cmds.push(set_view(props));
	cmds.push(VizCommand::UpdateData(props.traffic.clone()));
	if !props.match_text.is_empty() {
		cmds.push(VizCommand::FindNodes(props.match_text.clone()));
	}
	cmds
}

/// Compares the previous and next props and returns the engine calls needed
/// to bring the engine in line with `next`.
///
/// `next.traffic.updated` is stamped with `now_ms` when missing, so a snapshot
/// is only pushed again once a newer one arrives.
pub fn diff(old: &VizProps, next: &mut VizProps, now_ms: f64) -> Vec<VizCommand> {
	let mut cmds = Vec::new();
	if next.styles != old.styles {
		cmds.push(VizCommand::UpdateStyles(next.styles.clone()));
	}
	if next.view != old.view || next.object_to_highlight != old.object_to_highlight {
		cmds.push(set_view(next));
	}
	if next.filters != old.filters {
		cmds.push(VizCommand::SetFilters(next.filters.clone()));
	}
	if next.show_labels != old.show_labels
		|| next.allow_dragging_of_nodes != old.allow_dragging_of_nodes
	{
		cmds.push(set_options(next));
	}
	if next.modes != old.modes {
		cmds.push(VizCommand::SetModes(next.modes.clone()));
	}
	if next.definitions != old.definitions {
		cmds.push(VizCommand::UpdateDefinitions(next.definitions.clone()));
	}
	if next.match_text != old.match_text {
		cmds.push(VizCommand::FindNodes(next.match_text.clone()));
	}

	let updated = *next.traffic.updated.get_or_insert(now_ms);
	if old.traffic.nodes.is_none() || updated > old.traffic.updated.unwrap_or(0.0) {
		cmds.push(VizCommand::UpdateData(next.traffic.clone()));
	}
	cmds
}
