//! The dashboard's view-model: which graph is shown, how far the operator has
//! drilled into it, and the last snapshot fetched for it.

use crate::error::FetchError;
use crate::traffic::TrafficNode;

#[cfg(test)]
#[path = "observatory_test.rs"]
mod observatory_test;

/// Identifies one in-flight graph request; later tickets win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// One clickable breadcrumb element.
#[derive(Clone, Debug, PartialEq)]
pub struct Crumb {
	/// Node name shown for this crumb.
	pub name: String,
	/// The view that clicking the crumb navigates to.
	pub path: Vec<String>,
}

/// Everything the dashboard shows, outside the graph widget itself.
#[derive(Clone, Debug, Default)]
pub struct ObservatoryState {
	/// Base URL of the state endpoint.
	pub base_url: String,
	/// Graphs offered by the picker.
	pub graphs: Vec<String>,
	/// Last snapshot of `current_graph`.
	pub traffic: TrafficNode,
	/// Drill-down path inside `current_graph`.
	pub view: Vec<String>,
	/// Empty until a graph has been loaded.
	pub current_graph: String,
	/// The graph list is being fetched.
	pub loading_graphs: bool,
	/// A graph snapshot is being fetched.
	pub loading_graph: bool,
	/// Last failure, cleared by the next successful snapshot.
	pub error: Option<String>,
	request_seq: u64,
	/// When the latest graph request was issued, in ms since the epoch.
	graph_requested_ms: f64,
}

impl ObservatoryState {
	/// Empty state talking to `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			..Default::default()
		}
	}

	/// Marks the graph list as loading.
	pub fn begin_graph_list(&mut self) {
		self.loading_graphs = true;
	}

	/// Stores a fetched graph list. Returns the graph to load when nothing has
	/// been selected yet.
	pub fn apply_graph_list(&mut self, graphs: Vec<String>) -> Option<String> {
		self.loading_graphs = false;
		self.graphs = graphs;
		if self.current_graph.is_empty() {
			self.graphs.first().cloned()
		} else {
			None
		}
	}

	/// Marks a graph request as in flight and hands out its ticket.
	pub fn begin_graph(&mut self, now_ms: f64) -> RequestTicket {
		self.request_seq += 1;
		self.loading_graph = true;
		self.graph_requested_ms = now_ms;
		RequestTicket(self.request_seq)
	}

	/// Stores a fetched snapshot of `name`.
	///
	/// Switching graphs resets the drill-down path; refreshing the same graph
	/// keeps it. Snapshots without an `updated` stamp get `now_ms`. Returns
	/// false when a newer request has already been issued and the snapshot was
	/// dropped.
	pub fn apply_graph(
		&mut self,
		ticket: RequestTicket,
		name: &str,
		mut traffic: TrafficNode,
		now_ms: f64,
	) -> bool {
		if ticket.0 != self.request_seq {
			return false;
		}
		self.loading_graph = false;
		self.error = None;
		if name != self.current_graph {
			self.current_graph = name.to_string();
			self.view.clear();
		}
		traffic.updated.get_or_insert(now_ms);
		self.traffic = traffic;
		true
	}

	/// Records a failed request. Stale failures are dropped like stale snapshots.
	pub fn apply_error(&mut self, ticket: Option<RequestTicket>, err: &FetchError) {
		match ticket {
			Some(t) if t.0 != self.request_seq => return,
			Some(_) => self.loading_graph = false,
			None => self.loading_graphs = false,
		}
		self.error = Some(err.to_string());
	}

	/// Whether a periodic refresh may go out now. A request still pending after
	/// `stale_after_ms` stops blocking refreshes; its late answer is dropped
	/// by ticket.
	pub fn refresh_due(&self, now_ms: f64, stale_after_ms: f64) -> bool {
		!self.loading_graph || now_ms - self.graph_requested_ms >= stale_after_ms
	}

	/// The graph a refresh should re-fetch.
	pub fn refresh_target(&self) -> Option<String> {
		(!self.current_graph.is_empty()).then(|| self.current_graph.clone())
	}

	/// Breadcrumb navigation.
	pub fn navigate(&mut self, path: Vec<String>) {
		self.view = path;
	}

	/// A view change reported by the visualization, e.g. after a double-click.
	pub fn view_changed(&mut self, view: Vec<String>) {
		self.view = view;
	}

	/// One crumb per path element, each navigating to the prefix ending at it.
	pub fn crumbs(&self) -> Vec<Crumb> {
		self.view
			.iter()
			.enumerate()
			.map(|(i, name)| Crumb {
				name: name.clone(),
				path: self.view[..=i].to_vec(),
			})
			.collect()
	}
}
