//! Details panel under the graph for the highlighted node.

use std::collections::BTreeMap;

use leptos::prelude::*;

use crate::traffic::{Focus, Notice, NoticeSeverity};

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

/// What the panel shows about one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NoticeDetails {
	pub title: String,
	pub definition: Option<String>,
	/// Total volume of the node's connections in the drawn level.
	pub volume: f64,
	pub notices: Vec<Notice>,
}

impl NoticeDetails {
	/// Details of `name` as drawn in `focus`, if it is on screen.
	pub fn lookup(
		focus: Focus<'_>,
		name: &str,
		definitions: &BTreeMap<String, String>,
	) -> Option<Self> {
		let node = focus.member(name)?;
		Some(Self {
			title: node.display_name().to_string(),
			definition: node.class.as_ref().and_then(|c| definitions.get(c)).cloned(),
			volume: focus.level().volume_of(name),
			notices: node.notices().to_vec(),
		})
	}
}

fn severity_class(severity: Option<NoticeSeverity>) -> &'static str {
	match severity {
		Some(NoticeSeverity::Error) => "notice notice-error",
		Some(NoticeSeverity::Warning) => "notice notice-warning",
		_ => "notice notice-info",
	}
}

#[component]
pub fn NoticePanel(#[prop(into)] details: Signal<Option<NoticeDetails>>) -> impl IntoView {
	view! {
		<div class="vizceral-notice">
			{move || {
				details
					.get()
					.map(|d| {
						view! {
							<h3>{d.title}</h3>
							{d.definition.map(|def| view! { <p class="definition">{def}</p> })}
							<p class="volume">{format!("{:.1} rps", d.volume)}</p>
							<ul>
								{d
									.notices
									.into_iter()
									.map(|n| {
										let class = severity_class(n.severity);
										let title = n.title;
										view! {
											<li class=class>
												{match n.link {
													Some(href) => {
														view! { <a href=href target="_blank">{title}</a> }
															.into_any()
													}
													None => view! { <span>{title}</span> }.into_any(),
												}}
											</li>
										}
									})
									.collect_view()}
							</ul>
						}
					})
			}}
		</div>
	}
}
