//! Runtime configuration.
//!
//! Defaults come from the build environment, then the page's query string can
//! override them, e.g. `/?api=http://10.0.0.5:8081&refresh=15&log=info`.

use log::Level;

use crate::error::ConfigError;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Backend used when `OBSERVATORY_API_URL` is not set at build time.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Settings for one dashboard session.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservatoryConfig {
	/// Base URL of the state endpoint, without a trailing slash.
	pub base_url: String,
	/// Seconds between automatic refreshes of the current graph.
	pub refresh_interval_secs: Option<u32>,
	/// Most verbose level logged to the console.
	pub log_level: Level,
}

impl Default for ObservatoryConfig {
	fn default() -> Self {
		Self {
			base_url: trim_base_url(option_env!("OBSERVATORY_API_URL").unwrap_or(DEFAULT_BASE_URL)),
			refresh_interval_secs: None,
			log_level: Level::Debug,
		}
	}
}

fn trim_base_url(url: &str) -> String {
	url.trim().trim_end_matches('/').to_string()
}

impl ObservatoryConfig {
	/// Defaults overridden by the current page's query string, together with
	/// the overrides that were rejected.
	///
	/// Runs before a logger may be installed, so rejections are returned for
	/// the caller to log.
	pub fn from_location() -> (Self, Vec<ConfigError>) {
		let mut config = Self::default();
		let mut rejected = Vec::new();
		let Some(window) = web_sys::window() else {
			return (config, rejected);
		};
		let Ok(search) = window.location().search() else {
			return (config, rejected);
		};
		let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
			return (config, rejected);
		};
		for key in ["api", "refresh", "log"] {
			if let Some(value) = params.get(key) {
				if let Err(e) = config.apply_param(key, &value) {
					rejected.push(e);
				}
			}
		}
		(config, rejected)
	}

	/// Applies one already-decoded query parameter. A bad value leaves the
	/// current setting untouched. Unknown keys are ignored.
	pub fn apply_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
		match key {
			"api" => {
				let url = trim_base_url(value);
				if url.is_empty() {
					return Err(ConfigError::EmptyApi);
				}
				self.base_url = url;
			}
			"refresh" => match value.trim().parse::<u32>() {
				Ok(0) => self.refresh_interval_secs = None,
				Ok(secs) => self.refresh_interval_secs = Some(secs),
				Err(_) => return Err(ConfigError::Refresh(value.to_string())),
			},
			"log" => match value.trim().parse::<Level>() {
				Ok(level) => self.log_level = level,
				Err(_) => return Err(ConfigError::LogLevel(value.to_string())),
			},
			_ => {}
		}
		Ok(())
	}
}
