use super::*;
use crate::traffic::{TrafficConnection, TrafficMetrics, TrafficNode};

fn region() -> TrafficNode {
	TrafficNode {
		name: "us-east-1".into(),
		nodes: Some(vec![
			TrafficNode {
				name: "api".into(),
				display_name: Some("API gateway".into()),
				class: Some("gateway".into()),
				notices: Some(vec![Notice {
					title: "p99 above target".into(),
					link: Some("http://runbook".into()),
					severity: Some(NoticeSeverity::Warning),
				}]),
				..Default::default()
			},
			TrafficNode {
				name: "db".into(),
				..Default::default()
			},
		]),
		connections: Some(vec![TrafficConnection {
			source: "api".into(),
			target: "db".into(),
			metrics: Some(TrafficMetrics {
				normal: Some(12.0),
				..Default::default()
			}),
			..Default::default()
		}]),
		..Default::default()
	}
}

#[test]
fn lookup_collects_node_details() {
	let r = region();
	let mut defs = BTreeMap::new();
	defs.insert("gateway".to_string(), "Public entry point".to_string());
	let d = NoticeDetails::lookup(Focus::Graph(&r), "api", &defs).unwrap();
	assert_eq!(d.title, "API gateway");
	assert_eq!(d.definition.as_deref(), Some("Public entry point"));
	assert_eq!(d.volume, 12.0);
	assert_eq!(d.notices.len(), 1);
}

#[test]
fn lookup_misses_nodes_off_screen() {
	let r = region();
	assert!(NoticeDetails::lookup(Focus::Graph(&r), "cache", &BTreeMap::new()).is_none());

	let d = NoticeDetails::lookup(Focus::Graph(&r), "db", &BTreeMap::new()).unwrap();
	assert_eq!(d.definition, None);
	assert!(d.notices.is_empty());
}

#[test]
fn severity_maps_to_css_class() {
	assert_eq!(severity_class(None), "notice notice-info");
	assert_eq!(
		severity_class(Some(NoticeSeverity::Error)),
		"notice notice-error"
	);
}
