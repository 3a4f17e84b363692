use super::*;

fn with_nodes(updated: Option<f64>) -> TrafficNode {
	TrafficNode {
		name: "edge".into(),
		updated,
		nodes: Some(vec![TrafficNode {
			name: "api".into(),
			..Default::default()
		}]),
		..Default::default()
	}
}

fn loaded(updated: f64) -> VizProps {
	VizProps {
		traffic: with_nodes(Some(updated)),
		..Default::default()
	}
}

#[test]
fn initial_commands_end_with_view_then_data() {
	let props = loaded(1.0);
	let cmds = initial_commands(&props);
	assert!(matches!(cmds[0], VizCommand::UpdateStyles(_)));
	assert_eq!(
		cmds[1],
		VizCommand::SetOptions {
			allow_dragging_of_nodes: false,
			show_labels: true,
		}
	);
	let n = cmds.len();
	assert!(matches!(cmds[n - 2], VizCommand::SetView { .. }));
	assert!(matches!(cmds[n - 1], VizCommand::UpdateData(_)));
}

#[test]
fn unchanged_props_issue_nothing() {
	let old = loaded(5.0);
	let mut next = old.clone();
	assert!(diff(&old, &mut next, 100.0).is_empty());
}

#[test]
fn view_change_issues_only_set_view() {
	let old = loaded(5.0);
	let mut next = old.clone();
	next.view = vec!["api".into()];
	assert_eq!(
		diff(&old, &mut next, 100.0),
		vec![VizCommand::SetView {
			view: vec!["api".into()],
			highlight: None,
		}]
	);

	let mut next = old.clone();
	next.object_to_highlight = Some("api".into());
	assert_eq!(diff(&old, &mut next, 100.0).len(), 1);
}

#[test]
fn option_flags_are_sent_together() {
	let old = loaded(5.0);
	let mut next = old.clone();
	next.allow_dragging_of_nodes = true;
	assert_eq!(
		diff(&old, &mut next, 100.0),
		vec![VizCommand::SetOptions {
			allow_dragging_of_nodes: true,
			show_labels: true,
		}]
	);
}

#[test]
fn each_changed_field_maps_to_its_call() {
	let old = loaded(5.0);
	let mut next = old.clone();
	next.styles.insert("colorText".into(), "#fff".into());
	next.filters.push(TrafficFilter {
		name: "rps".into(),
		kind: FilterKind::Connection,
		min_volume: 1.0,
	});
	next.modes.insert("detailedNode".into(), "volume".into());
	next.definitions.insert("db".into(), "Database".into());
	next.match_text = "ap".into();
	let cmds = diff(&old, &mut next, 100.0);
	assert_eq!(cmds.len(), 5);
	assert!(matches!(cmds[0], VizCommand::UpdateStyles(_)));
	assert!(matches!(cmds[1], VizCommand::SetFilters(_)));
	assert!(matches!(cmds[2], VizCommand::SetModes(_)));
	assert!(matches!(cmds[3], VizCommand::UpdateDefinitions(_)));
	assert_eq!(cmds[4], VizCommand::FindNodes("ap".into()));
}

#[test]
fn newer_snapshot_pushes_data() {
	let old = loaded(5.0);
	let mut next = loaded(6.0);
	assert!(matches!(
		diff(&old, &mut next, 100.0).as_slice(),
		[VizCommand::UpdateData(_)]
	));

	let mut older = loaded(4.0);
	assert!(diff(&old, &mut older, 100.0).is_empty());
}

#[test]
fn missing_stamp_is_filled_with_now() {
	let old = loaded(5.0);
	let mut next = VizProps {
		traffic: with_nodes(None),
		..Default::default()
	};
	let cmds = diff(&old, &mut next, 100.0);
	assert_eq!(next.traffic.updated, Some(100.0));
	assert!(matches!(cmds.as_slice(), [VizCommand::UpdateData(_)]));

	// the stamped props, diffed against themselves, stay quiet
	let stamped = next.clone();
	assert!(diff(&stamped, &mut next, 200.0).is_empty());
}

#[test]
fn data_is_pushed_while_old_traffic_has_no_nodes() {
	let old = VizProps {
		traffic: TrafficNode {
			updated: Some(50.0),
			..Default::default()
		},
		..Default::default()
	};
	let mut next = loaded(10.0);
	assert!(matches!(
		diff(&old, &mut next, 100.0).as_slice(),
		[VizCommand::UpdateData(_)]
	));
}
