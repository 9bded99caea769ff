use duw_domain::stubs::MapConfigSource;
use duw_domain::{ConfigError, ConfigSource};

#[test]
fn absent_settings_fall_back_to_defaults() {
  let config = MapConfigSource::new();
  assert_eq!(config.get_string("DB_PATH", "duw_data.db"), "duw_data.db");
  assert_eq!(config.get_int("POLLING_RATE_SECONDS", 5), Ok(5));
}

#[test]
fn explicit_values_override_defaults() {
  let config = MapConfigSource::new().with("DB_PATH", "/tmp/x.db").with("POLLING_RATE_SECONDS", "-2");
  assert_eq!(config.get_string("DB_PATH", "duw_data.db"), "/tmp/x.db");
  assert_eq!(config.get_int("POLLING_RATE_SECONDS", 5), Ok(-2));
}

#[test]
fn malformed_integer_is_an_error_not_a_default() {
  for bad in ["", "5s", " 5", "five", "1.5"] {
    let config = MapConfigSource::new().with("POLLING_RATE_SECONDS", bad);
    match config.get_int("POLLING_RATE_SECONDS", 5) {
      Err(ConfigError::InvalidInteger { name, value }) => {
        assert_eq!(name, "POLLING_RATE_SECONDS");
        assert_eq!(value, bad);
      }
      other => panic!("expected invalid integer for {:?}, got {:?}", bad, other),
    }
  }
}

#[test]
fn required_lookups_report_missing_settings() {
  let config = MapConfigSource::new().with("PORT", "8080");
  assert_eq!(config.require_int("PORT"), Ok(8080));
  assert_eq!(config.require_string("TOKEN"), Err(ConfigError::Missing("TOKEN".into())));
  assert_eq!(config.require_int("TOKEN"), Err(ConfigError::Missing("TOKEN".into())));
}
