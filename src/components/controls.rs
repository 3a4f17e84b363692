//! Graph picker, breadcrumb and refresh button above the graph.

use leptos::prelude::*;

use crate::state::Crumb;

/// Drop-down of the available graphs.
///
/// Shows a single "Loading..." entry until the list arrives.
#[component]
pub fn GraphPicker(
	#[prop(into)] options: Signal<Vec<String>>,
	#[prop(into)] selected: Signal<String>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] on_selection: Callback<String>,
) -> impl IntoView {
	view! {
		<Show
			when=move || !loading.get()
			fallback=|| {
				view! {
					<select>
						<option>"Loading..."</option>
					</select>
				}
			}
		>
			<select on:input=move |ev| on_selection.run(event_target_value(&ev))>
				{move || {
					let current = selected.get();
					options
						.get()
						.into_iter()
						.map(|o| {
							let is_selected = o == current;
							let label = o.clone();
							view! {
								<option value=o selected=is_selected>
									{label}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
		</Show>
	}
}

/// "Graph: [picker] root / region / service", each crumb navigating to its prefix.
#[component]
pub fn ObservatoryBreadcrumb(
	#[prop(into)] graphs: Signal<Vec<String>>,
	#[prop(into)] graph: Signal<String>,
	#[prop(into)] crumbs: Signal<Vec<Crumb>>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] on_selection: Callback<String>,
	#[prop(into)] on_navigate: Callback<Vec<String>>,
) -> impl IntoView {
	view! {
		<div class="observatory-breadcrumb">
			<span class="graph-title">"Graph:"</span>
			<GraphPicker options=graphs selected=graph loading=loading on_selection=on_selection />
			<span class="graph-name" on:click=move |_| on_navigate.run(Vec::new())>
				"root"
			</span>
			{move || {
				crumbs
					.get()
					.into_iter()
					.map(|crumb| {
						let Crumb { name, path } = crumb;
						view! {
							<span class="path-segment">
								<span class="separator">"/"</span>
								<span class="path-name">
									<a class="view-link" on:click=move |_| on_navigate.run(path.clone())>
										{name}
									</a>
								</span>
							</span>
						}
					})
					.collect_view()
			}}
		</div>
	}
}

#[component]
pub fn ObservatoryControls(
	#[prop(into)] graphs: Signal<Vec<String>>,
	#[prop(into)] graph: Signal<String>,
	#[prop(into)] crumbs: Signal<Vec<Crumb>>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] on_selection: Callback<String>,
	#[prop(into)] on_navigate: Callback<Vec<String>>,
	#[prop(into)] on_refresh: Callback<()>,
	/// Live search text, fed to the graph's node matcher.
	match_text: RwSignal<String>,
	#[prop(into)] match_summary: Signal<Option<String>>,
) -> impl IntoView {
	view! {
		<div class="observatory-controls">
			<ObservatoryBreadcrumb
				graphs=graphs
				graph=graph
				crumbs=crumbs
				loading=loading
				on_selection=on_selection
				on_navigate=on_navigate
			/>
			<input
				class="search"
				type="search"
				placeholder="Find node"
				prop:value=move || match_text.get()
				on:input=move |ev| match_text.set(event_target_value(&ev))
			/>
			<span class="match-summary">{move || match_summary.get()}</span>
			<a class="button" on:click=move |_| on_refresh.run(())>
				"Refresh"
			</a>
		</div>
	}
}
