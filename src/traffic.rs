//! Wire format of the traffic snapshots served under `/api/state`.
//!
//! A snapshot is a tree of [`TrafficNode`]s: the root is the global view, nodes
//! with children are regions that can be drilled into, and leaves are services.
//! Connections always live on the parent and refer to children by name.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "traffic_test.rs"]
mod traffic_test;

/// Share of danger (or warning + danger) traffic above which a connection is flagged.
pub const SEVERITY_RATIO: f64 = 0.05;

/// Body of `GET /api/state`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphList {
	/// Identifiers of every graph the backend knows about, sorted.
	pub graphs: Vec<String>,
}

/// Which layout a node is drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Renderer {
	/// Top-level view of every region.
	#[serde(rename = "global")]
	Global,
	/// A region's services.
	#[default]
	#[serde(rename = "region")]
	Region,
	/// A single service and its neighbours.
	#[serde(rename = "focusedChild")]
	FocusedChild,
}

/// A graph, region or service in a traffic snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficNode {
	/// Layout used when this node is drilled into.
	#[serde(default)]
	pub renderer: Renderer,
	/// Identifier, unique among siblings and used in view paths.
	pub name: String,
	/// Label shown instead of `name`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Child that traffic enters through; pinned on the left.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub entry_node: Option<String>,
	/// Milliseconds since the epoch at which the snapshot was taken.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated: Option<f64>,
	/// Volume edge widths are scaled against, when larger than any connection.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_volume: Option<f64>,
	/// Severity or custom class, looked up in the definitions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
	/// Children; a node without them is a leaf.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nodes: Option<Vec<TrafficNode>>,
	/// Traffic between children.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub connections: Option<Vec<TrafficConnection>>,
	/// Annotations shown in the notice panel.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notices: Option<Vec<Notice>>,
}

/// Directed traffic between two siblings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficConnection {
	/// Name of the calling sibling.
	pub source: String,
	/// Name of the called sibling.
	pub target: String,
	/// Request rates, absent when unknown.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metrics: Option<TrafficMetrics>,
	/// Annotations on the connection.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notices: Option<Vec<Notice>>,
	/// Severity class overriding the one derived from metrics.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
}

/// Request rates split by outcome.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficMetrics {
	/// Successful requests per second.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub normal: Option<f64>,
	/// Degraded requests per second.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub warning: Option<f64>,
	/// Failed requests per second.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub danger: Option<f64>,
}

/// Severity bucket used to colour nodes and connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeverityClass {
	/// Error share at or below the threshold.
	Normal,
	/// Warnings and errors together above the threshold.
	Warning,
	/// Errors alone above the threshold.
	Danger,
}

impl SeverityClass {
	/// Maps a node/connection `class` attribute to a bucket, if it names one.
	pub fn from_class(class: &str) -> Option<Self> {
		match class {
			"normal" => Some(Self::Normal),
			"warning" => Some(Self::Warning),
			"danger" => Some(Self::Danger),
			_ => None,
		}
	}

	/// Style key holding this bucket's colour.
	pub fn style_key(self) -> &'static str {
		match self {
			Self::Normal => "colorTraffic.normal",
			Self::Warning => "colorTraffic.warning",
			Self::Danger => "colorTraffic.danger",
		}
	}
}

impl TrafficMetrics {
	/// All requests per second.
	pub fn total(&self) -> f64 {
		self.normal.unwrap_or(0.0) + self.warning.unwrap_or(0.0) + self.danger.unwrap_or(0.0)
	}

	/// Bucket from the error shares, see [`SEVERITY_RATIO`].
	pub fn severity(&self) -> SeverityClass {
		let total = self.total();
		if total <= 0.0 {
			return SeverityClass::Normal;
		}
		let danger = self.danger.unwrap_or(0.0);
		let warning = self.warning.unwrap_or(0.0);
		if danger / total > SEVERITY_RATIO {
			SeverityClass::Danger
		} else if (danger + warning) / total > SEVERITY_RATIO {
			SeverityClass::Warning
		} else {
			SeverityClass::Normal
		}
	}
}

/// An annotation attached to a node or connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
	/// Text of the notice.
	pub title: String,
	/// Where the notice links to, e.g. a runbook.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
	/// Defaults to info when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub severity: Option<NoticeSeverity>,
}

/// Notice severity, carried on the wire as `0`, `1` or `2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NoticeSeverity {
	/// Informational.
	Info = 0,
	/// Needs attention.
	Warning = 1,
	/// Something is broken.
	Error = 2,
}

impl TryFrom<u8> for NoticeSeverity {
	type Error = String;

	fn try_from(v: u8) -> Result<Self, String> {
		match v {
			0 => Ok(Self::Info),
			1 => Ok(Self::Warning),
			2 => Ok(Self::Error),
			other => Err(format!("unknown notice severity {other}")),
		}
	}
}

impl From<NoticeSeverity> for u8 {
	fn from(s: NoticeSeverity) -> u8 {
		s as u8
	}
}

/// What a drill-down path points at inside a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Focus<'a> {
	/// A node with children; its children and their connections are shown.
	Graph(&'a TrafficNode),
	/// A leaf inside `parent`; it is shown with the siblings it talks to.
	Focused {
		/// Node whose children and connections are drawn.
		parent: &'a TrafficNode,
		/// The focused leaf.
		node: &'a TrafficNode,
	},
}

impl<'a> Focus<'a> {
	/// The node the view is centred on.
	pub fn node(&self) -> &'a TrafficNode {
		match self {
			Focus::Graph(n) => n,
			Focus::Focused { node, .. } => node,
		}
	}

	/// A node drawn in this view, by name.
	pub fn member(&self, name: &str) -> Option<&'a TrafficNode> {
		match self {
			Focus::Graph(g) => g.child(name),
			Focus::Focused { parent, .. } => parent.child(name),
		}
	}

	/// The node whose connections are drawn in this view.
	pub fn level(&self) -> &'a TrafficNode {
		match self {
			Focus::Graph(g) => g,
			Focus::Focused { parent, .. } => parent,
		}
	}
}

impl TrafficNode {
	/// `displayName`, falling back to `name`.
	pub fn display_name(&self) -> &str {
		self.display_name.as_deref().unwrap_or(&self.name)
	}

	/// Whether the node can be drilled into as a graph.
	pub fn has_children(&self) -> bool {
		self.nodes.as_ref().is_some_and(|n| !n.is_empty())
	}

	/// Children, empty for a leaf.
	pub fn children(&self) -> &[TrafficNode] {
		self.nodes.as_deref().unwrap_or_default()
	}

	/// Connections between children.
	pub fn connections(&self) -> &[TrafficConnection] {
		self.connections.as_deref().unwrap_or_default()
	}

	/// Notices attached to the node.
	pub fn notices(&self) -> &[Notice] {
		self.notices.as_deref().unwrap_or_default()
	}

	/// Direct child by name.
	pub fn child(&self, name: &str) -> Option<&TrafficNode> {
		self.children().iter().find(|n| n.name == name)
	}

	/// Total volume of the connections touching the child `name`.
	pub fn volume_of(&self, name: &str) -> f64 {
		self.connections()
			.iter()
			.filter(|c| c.source == name || c.target == name)
			.filter_map(|c| c.metrics.as_ref())
			.map(TrafficMetrics::total)
			.sum()
	}

	/// Walks `path` from this node and returns the longest prefix that exists,
	/// together with what it resolves to.
	///
	/// Walking stops at the first unknown name and below a leaf, so the
	/// returned path is always a valid breadcrumb.
	pub fn resolve_view(&self, path: &[String]) -> (Vec<String>, Focus<'_>) {
		let mut valid = Vec::with_capacity(path.len());
		let mut focus = Focus::Graph(self);
		for segment in path {
			let Focus::Graph(current) = focus else {
				break;
			};
			let Some(child) = current.child(segment) else {
				break;
			};
			valid.push(segment.clone());
			focus = if child.has_children() {
				Focus::Graph(child)
			} else {
				Focus::Focused {
					parent: current,
					node: child,
				}
			};
		}
		(valid, focus)
	}
}
