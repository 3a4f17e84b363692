use super::*;

#[test]
fn defaults_point_at_local_backend() {
	let c = ObservatoryConfig::default();
	assert!(!c.base_url.ends_with('/'));
	assert_eq!(c.refresh_interval_secs, None);
	assert_eq!(c.log_level, Level::Debug);
}

#[test]
fn api_override_strips_trailing_slash() {
	let mut c = ObservatoryConfig::default();
	assert_eq!(c.apply_param("api", " http://10.0.0.5:8081/ "), Ok(()));
	assert_eq!(c.base_url, "http://10.0.0.5:8081");

	assert_eq!(c.apply_param("api", "   "), Err(ConfigError::EmptyApi));
	assert_eq!(c.base_url, "http://10.0.0.5:8081");
}

#[test]
fn refresh_zero_disables_and_junk_is_rejected() {
	let mut c = ObservatoryConfig::default();
	assert!(c.apply_param("refresh", "15").is_ok());
	assert_eq!(c.refresh_interval_secs, Some(15));
	assert_eq!(
		c.apply_param("refresh", "soon"),
		Err(ConfigError::Refresh("soon".into()))
	);
	assert_eq!(c.refresh_interval_secs, Some(15));
	assert!(c.apply_param("refresh", "0").is_ok());
	assert_eq!(c.refresh_interval_secs, None);
}

#[test]
fn log_level_parses_names() {
	let mut c = ObservatoryConfig::default();
	assert!(c.apply_param("log", "warn").is_ok());
	assert_eq!(c.log_level, Level::Warn);
	let err = c.apply_param("log", "loud").unwrap_err();
	assert_eq!(err.to_string(), "ignoring log level 'loud'");
	assert_eq!(c.log_level, Level::Warn);
	assert!(c.apply_param("unknown", "x").is_ok());
	assert_eq!(c.log_level, Level::Warn);
}
