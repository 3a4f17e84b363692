//! REST client for the state endpoint.
//!
//! `GET {base}/api/state` lists graphs, `GET {base}/api/state/{name}` returns
//! one traffic snapshot.

use gloo_net::http::{Request, Response};
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::traffic::{GraphList, TrafficNode};

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

fn graph_list_url(base_url: &str) -> String {
	format!("{base_url}/api/state")
}

fn graph_url(base_url: &str, name: &str) -> String {
	format!("{base_url}/api/state/{}", encode_segment(name))
}

/// Percent-encodes everything outside the URI unreserved set.
fn encode_segment(segment: &str) -> String {
	let mut out = String::with_capacity(segment.len());
	for b in segment.bytes() {
		match b {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
				out.push(b as char)
			}
			_ => out.push_str(&format!("%{b:02X}")),
		}
	}
	out
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
	debug!("GET {}", url);
	let resp: Response = Request::get(url).send().await?;
	if !resp.ok() {
		return Err(FetchError::Status {
			status: resp.status(),
			url: url.to_string(),
		});
	}
	Ok(resp.json::<T>().await?)
}

/// Fetches the identifiers of every available graph.
pub async fn fetch_graph_list(base_url: &str) -> Result<Vec<String>, FetchError> {
	let list: GraphList = get_json(&graph_list_url(base_url)).await?;
	Ok(list.graphs)
}

/// Fetches the traffic snapshot of graph `name`.
pub async fn fetch_graph(base_url: &str, name: &str) -> Result<TrafficNode, FetchError> {
	get_json(&graph_url(base_url, name)).await
}
