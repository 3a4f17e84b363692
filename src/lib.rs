//! Live traffic dashboard: pick a graph, drill into regions and services, and
//! watch request volume and error rates flow between them.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
/// REST client.
pub mod api;
mod components;
/// Runtime settings.
pub mod config;
/// Error types.
pub mod error;
mod pages;
/// Dashboard view-model.
pub mod state;
/// Snapshot wire format.
pub mod traffic;

// Top-Level pages
use crate::config::ObservatoryConfig;
use crate::pages::not_found::NotFound;
use crate::pages::observatory::Observatory;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging(level: Level) {
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("Logging initialized at {}", level);
}

/// An app router which renders the dashboard and handles 404's
#[component]
pub fn App(config: ObservatoryConfig) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	info!("Using backend {}", config.base_url);
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Observatory" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Observatory />
			</Routes>
		</Router>
	}
}
