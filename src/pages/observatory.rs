use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, info};

use crate::components::controls::ObservatoryControls;
use crate::components::notice::{NoticeDetails, NoticePanel};
use crate::components::traffic_graph::{FilterKind, TrafficFilter, TrafficGraph, VizProps};
use crate::config::ObservatoryConfig;
use crate::state::{ObservatoryState, actions};

#[cfg(test)]
#[path = "observatory_test.rs"]
mod observatory_test;

/// Class descriptions shown in the notice panel.
fn default_definitions() -> BTreeMap<String, String> {
	[
		("normal", "Traffic within expected error rates"),
		("warning", "Elevated error rate"),
		("danger", "Error rate above threshold"),
	]
	.into_iter()
	.map(|(k, v)| (k.to_string(), v.to_string()))
	.collect()
}

fn volume_filters(min_volume: f64) -> Vec<TrafficFilter> {
	if min_volume <= 0.0 {
		return Vec::new();
	}
	vec![TrafficFilter {
		name: "rps".to_string(),
		kind: FilterKind::Connection,
		min_volume,
	}]
}

/// How long a pending graph request may hold back periodic refreshes.
fn stale_after_ms(refresh_secs: u32) -> f64 {
	(f64::from(refresh_secs) * 3.0).max(30.0) * 1000.0
}

fn match_summary(total: usize, visible: usize) -> String {
	format!("{visible} of {total} matches shown")
}

/// The dashboard: controls on top, the live graph, and details of the
/// highlighted node underneath.
#[component]
pub fn Observatory() -> impl IntoView {
	let config = use_context::<ObservatoryConfig>().unwrap_or_default();
	let state = RwSignal::new(ObservatoryState::new(config.base_url.clone()));
	let highlighted = RwSignal::new(None::<String>);
	let match_text = RwSignal::new(String::new());
	let matches = RwSignal::new(None::<(usize, usize)>);
	let min_volume = RwSignal::new(0.0_f64);
	let definitions = default_definitions();

	actions::fetch_graph_list(state);

	if let Some(secs) = config.refresh_interval_secs {
		info!("Refreshing every {}s", secs);
		let stale_after = stale_after_ms(secs);
		let alive = Arc::new(AtomicBool::new(true));
		let alive_task = alive.clone();
		leptos::task::spawn_local(async move {
			loop {
				gloo_timers::future::sleep(Duration::from_secs(u64::from(secs))).await;
				if !alive_task.load(Ordering::Relaxed) {
					break;
				}
				let now = js_sys::Date::now();
				if !state.with_untracked(|s| s.refresh_due(now, stale_after)) {
					debug!("Previous graph request still pending; skipping refresh");
					continue;
				}
				actions::refresh(state);
			}
		});
		on_cleanup(move || alive.store(false, Ordering::Relaxed));
	}

	let viz_definitions = definitions.clone();
	let props = Signal::derive(move || {
		state.with(|s| VizProps {
			traffic: s.traffic.clone(),
			view: s.view.clone(),
			object_to_highlight: highlighted.get(),
			filters: volume_filters(min_volume.get()),
			allow_dragging_of_nodes: true,
			definitions: viz_definitions.clone(),
			match_text: match_text.get(),
			..Default::default()
		})
	});

	let details = Signal::derive(move || {
		let name = highlighted.get()?;
		state.with(|s| {
			let (_, focus) = s.traffic.resolve_view(&s.view);
			NoticeDetails::lookup(focus, &name, &definitions)
		})
	});

	let graphs = Signal::derive(move || state.with(|s| s.graphs.clone()));
	let graph = Signal::derive(move || state.with(|s| s.current_graph.clone()));
	let crumbs = Signal::derive(move || state.with(|s| s.crumbs()));
	let loading = Signal::derive(move || state.with(|s| s.loading_graphs));
	let error = Signal::derive(move || state.with(|s| s.error.clone()));
	let summary = Signal::derive(move || {
		matches
			.get()
			.filter(|_| !match_text.with(String::is_empty))
			.map(|(total, visible)| match_summary(total, visible))
	});

	let on_selection = Callback::new(move |name: String| {
		highlighted.set(None);
		actions::fetch_graph(state, name);
	});
	let on_navigate = Callback::new(move |path: Vec<String>| {
		debug!("Navigating to /{}", path.join("/"));
		highlighted.set(None);
		state.update(|s| s.navigate(path));
	});
	let on_refresh = Callback::new(move |_: ()| actions::refresh(state));
	let on_view_changed = Callback::new(move |view: Vec<String>| {
		if state.with_untracked(|s| s.view != view) {
			highlighted.set(None);
			state.update(|s| s.view_changed(view));
		}
	});
	let on_object_highlighted = Callback::new(move |name: Option<String>| highlighted.set(name));
	let on_matches_found = Callback::new(move |found: (usize, usize)| matches.set(Some(found)));

	view! {
		<div class="observatory">
			<ObservatoryControls
				graphs=graphs
				graph=graph
				crumbs=crumbs
				loading=loading
				on_selection=on_selection
				on_navigate=on_navigate
				on_refresh=on_refresh
				match_text=match_text
				match_summary=summary
			/>
			<label class="volume-filter">
				"Hide connections under "
				<input
					type="number"
					min="0"
					step="1"
					prop:value=move || min_volume.get().to_string()
					on:change=move |ev| {
						let value = event_target_value(&ev).trim().parse::<f64>().unwrap_or(0.0);
						min_volume.set(value.max(0.0));
					}
				/>
				" rps"
			</label>
			<Show when=move || error.with(Option::is_some)>
				<p class="error">{move || error.get()}</p>
			</Show>
			<div class="vizceral-container">
				<TrafficGraph
					props=props
					on_view_changed=on_view_changed
					on_object_highlighted=on_object_highlighted
					on_matches_found=on_matches_found
				/>
			</div>
			<NoticePanel details=details />
		</div>
	}
}
