//! Async operations that fetch from the backend and fold the results into the
//! shared [`ObservatoryState`] signal.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info};

use super::observatory::ObservatoryState;
use crate::api;

fn now_ms() -> f64 {
	js_sys::Date::now()
}

/// Loads the graph list, then the first graph if none is selected yet.
pub fn fetch_graph_list(state: RwSignal<ObservatoryState>) {
	let base_url = state.with_untracked(|s| s.base_url.clone());
	state.update(|s| s.begin_graph_list());
	spawn_local(async move {
		match api::fetch_graph_list(&base_url).await {
			Ok(graphs) => {
				info!("Loaded {} graphs", graphs.len());
				let mut pick = None;
				state.update(|s| pick = s.apply_graph_list(graphs));
				if let Some(name) = pick {
					fetch_graph(state, name);
				}
			}
			Err(e) => {
				error!("Couldn't load graph list: {}", e);
				state.update(|s| s.apply_error(None, &e));
			}
		}
	});
}

/// Loads the snapshot of `name`, making it the current graph.
pub fn fetch_graph(state: RwSignal<ObservatoryState>, name: String) {
	debug!("Fetching graph {}", name);
	let base_url = state.with_untracked(|s| s.base_url.clone());
	let mut ticket = None;
	state.update(|s| ticket = Some(s.begin_graph(now_ms())));
	let Some(ticket) = ticket else {
		return;
	};
	spawn_local(async move {
		match api::fetch_graph(&base_url, &name).await {
			Ok(traffic) => {
				state.update(|s| {
					if s.current_graph != name {
						info!("Graph changed; new graph {}", name);
					}
					if !s.apply_graph(ticket, &name, traffic, now_ms()) {
						debug!("Dropped stale snapshot of {}", name);
					}
				});
			}
			Err(e) => {
				error!("Couldn't load graph {}: {}", name, e);
				state.update(|s| s.apply_error(Some(ticket), &e));
			}
		}
	});
}

/// Re-fetches the current graph.
pub fn refresh(state: RwSignal<ObservatoryState>) {
	match state.with_untracked(ObservatoryState::refresh_target) {
		Some(name) => fetch_graph(state, name),
		None => debug!("Nothing to refresh"),
	}
}
