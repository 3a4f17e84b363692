use super::*;

fn snapshot(name: &str, updated: Option<f64>) -> TrafficNode {
	TrafficNode {
		name: name.to_string(),
		updated,
		..Default::default()
	}
}

fn path(p: &[&str]) -> Vec<String> {
	p.iter().map(|s| s.to_string()).collect()
}

#[test]
fn first_graph_list_selects_first_graph() {
	let mut s = ObservatoryState::new("http://h");
	s.begin_graph_list();
	assert!(s.loading_graphs);
	let pick = s.apply_graph_list(path(&["alpha", "beta"]));
	assert_eq!(pick.as_deref(), Some("alpha"));
	assert!(!s.loading_graphs);
	assert_eq!(s.graphs, path(&["alpha", "beta"]));
}

#[test]
fn graph_list_keeps_existing_selection() {
	let mut s = ObservatoryState::new("http://h");
	let t = s.begin_graph(0.0);
	s.apply_graph(t, "beta", snapshot("beta", Some(1.0)), 5.0);
	assert_eq!(s.apply_graph_list(path(&["alpha", "beta"])), None);
	assert_eq!(s.apply_graph_list(Vec::new()), None);

	let mut empty = ObservatoryState::new("http://h");
	assert_eq!(empty.apply_graph_list(Vec::new()), None);
}

#[test]
fn switching_graph_resets_view() {
	let mut s = ObservatoryState::new("http://h");
	let t = s.begin_graph(0.0);
	assert!(s.apply_graph(t, "alpha", snapshot("alpha", None), 10.0));
	s.navigate(path(&["region", "svc"]));

	let t = s.begin_graph(0.0);
	assert!(s.apply_graph(t, "beta", snapshot("beta", None), 20.0));
	assert_eq!(s.current_graph, "beta");
	assert!(s.view.is_empty());
	assert!(!s.loading_graph);
}

#[test]
fn refreshing_same_graph_keeps_view() {
	let mut s = ObservatoryState::new("http://h");
	let t = s.begin_graph(0.0);
	s.apply_graph(t, "alpha", snapshot("alpha", None), 10.0);
	s.view_changed(path(&["region"]));

	let target = s.refresh_target().unwrap();
	let t = s.begin_graph(0.0);
	s.apply_graph(t, &target, snapshot("alpha", Some(99.0)), 20.0);
	assert_eq!(s.view, path(&["region"]));
	assert_eq!(s.traffic.updated, Some(99.0));
}

#[test]
fn unstamped_snapshot_gets_receive_time() {
	let mut s = ObservatoryState::new("http://h");
	let t = s.begin_graph(0.0);
	s.apply_graph(t, "alpha", snapshot("alpha", None), 1234.0);
	assert_eq!(s.traffic.updated, Some(1234.0));
}

#[test]
fn stale_response_is_dropped() {
	let mut s = ObservatoryState::new("http://h");
	let slow = s.begin_graph(0.0);
	let fast = s.begin_graph(0.0);
	assert!(s.apply_graph(fast, "beta", snapshot("beta", None), 1.0));
	assert!(!s.apply_graph(slow, "alpha", snapshot("alpha", None), 2.0));
	assert_eq!(s.current_graph, "beta");

	s.apply_error(Some(slow), &FetchError::Network("gone".into()));
	assert_eq!(s.error, None);
}

#[test]
fn errors_clear_loading_flags() {
	let mut s = ObservatoryState::new("http://h");
	s.begin_graph_list();
	s.apply_error(None, &FetchError::Network("refused".into()));
	assert!(!s.loading_graphs);
	assert_eq!(s.error.as_deref(), Some("request failed: refused"));

	let t = s.begin_graph(0.0);
	s.apply_error(
		Some(t),
		&FetchError::Status {
			status: 404,
			url: "http://h/api/state/x".into(),
		},
	);
	assert!(!s.loading_graph);

	// a good snapshot clears the error
	let t = s.begin_graph(0.0);
	s.apply_graph(t, "x", snapshot("x", None), 0.0);
	assert_eq!(s.error, None);
}

#[test]
fn refresh_needs_a_selected_graph() {
	let s = ObservatoryState::new("http://h");
	assert_eq!(s.refresh_target(), None);
}

#[test]
fn crumbs_navigate_to_prefixes() {
	let mut s = ObservatoryState::new("http://h");
	s.navigate(path(&["us-east-1", "api", "api"]));
	let crumbs = s.crumbs();
	assert_eq!(crumbs.len(), 3);
	assert_eq!(crumbs[0].path, path(&["us-east-1"]));
	assert_eq!(crumbs[1].path, path(&["us-east-1", "api"]));
	// repeated names still map to their own position
	assert_eq!(crumbs[2].path, path(&["us-east-1", "api", "api"]));

	s.navigate(Vec::new());
	assert!(s.crumbs().is_empty());
}

#[test]
fn hung_request_stops_blocking_refresh_after_cutoff() {
	let mut s = ObservatoryState::new("http://x");
	assert!(s.refresh_due(0.0, 30_000.0));

	let hung = s.begin_graph(1_000.0);
	assert!(!s.refresh_due(20_000.0, 30_000.0));
	assert!(s.refresh_due(31_000.0, 30_000.0));

	let retry = s.begin_graph(31_000.0);
	assert!(!s.refresh_due(32_000.0, 30_000.0));
	assert!(!s.apply_graph(hung, "a", snapshot("a", None), 33_000.0));
	assert!(s.apply_graph(retry, "a", snapshot("a", None), 34_000.0));
	assert!(s.refresh_due(35_000.0, 30_000.0));
}
