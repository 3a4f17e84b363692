use super::*;

#[test]
fn graph_list_url_appends_state_path() {
	assert_eq!(
		graph_list_url("http://localhost:8081"),
		"http://localhost:8081/api/state"
	);
}

#[test]
fn graph_url_encodes_name() {
	assert_eq!(
		graph_url("http://localhost:8081", "us-east-1"),
		"http://localhost:8081/api/state/us-east-1"
	);
	assert_eq!(
		graph_url("", "eu west/2"),
		"/api/state/eu%20west%2F2"
	);
}

#[test]
fn status_error_names_url() {
	let e = FetchError::Status {
		status: 404,
		url: graph_url("http://h", "x"),
	};
	assert_eq!(e.to_string(), "http://h/api/state/x answered 404");
}
