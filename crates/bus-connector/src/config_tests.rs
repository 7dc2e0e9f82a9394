//! Tests for configuration sources.

use super::*;

fn scoped(entries: &[(&str, &str)]) -> config::Config {
    let mut builder = config::Config::builder();
    for (key, value) in entries {
        builder = builder
            .set_override(*key, *value)
            .expect("override key is valid");
    }
    builder.build().expect("configuration builds")
}

#[test]
fn test_key_suffixes_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for key in ConfigKey::ALL {
        assert!(seen.insert(key.suffix()), "duplicate suffix {}", key);
    }
    assert_eq!(seen.len(), 14);
}

#[test]
fn test_key_with_prefix() {
    assert_eq!(ConfigKey::ServerUrl.with_prefix("audit."), "audit.server-url");
    assert_eq!(ConfigKey::Queue.with_prefix(""), "queue");
    assert_eq!(
        ConfigKey::ReconnectionAttemptCount.with_prefix("x-"),
        "x-reconnection-attempt-count"
    );
}

// ============================================================================
// PropertyMap
// ============================================================================

#[test]
fn test_parse_properties_text() {
    let map = PropertyMap::parse(
        "# broker settings\n\
         ! legacy comment\n\
         \n\
         conn.server-url = tcp://broker:7222\n\
         conn.user-name: admin\n\
         conn.client-id\n\
         conn.queue=orders\n\
         conn.queue=orders-v2\n",
    );

    assert_eq!(map.len(), 4);
    assert_eq!(map.get("conn.server-url"), Some("tcp://broker:7222"));
    assert_eq!(map.get("conn.user-name"), Some("admin"));
    assert_eq!(map.get("conn.client-id"), Some(""));
    assert_eq!(map.get("conn.queue"), Some("orders-v2"));
}

#[test]
fn test_parse_whitespace_separated_properties() {
    let map = PropertyMap::parse("conn.queue orders\n\tconn.topic\t  =  logins\nconn.user-name :admin\n");

    assert_eq!(map.get("conn.queue"), Some("orders"));
    assert_eq!(map.get("conn.topic"), Some("logins"));
    assert_eq!(map.get("conn.user-name"), Some("admin"));
}

#[test]
fn test_parse_continuation_lines() {
    let map = PropertyMap::parse(
        "conn.server-url = tcp://primary:7222,\\\n    tcp://backup:7222\nconn.queue = orders\n",
    );

    assert_eq!(
        map.get("conn.server-url"),
        Some("tcp://primary:7222,tcp://backup:7222")
    );
    assert_eq!(map.get("conn.queue"), Some("orders"));
}

#[test]
fn test_parse_escaped_backslash_does_not_continue() {
    let map = PropertyMap::parse("conn.client-id = dept\\\\\nconn.queue = orders\n");

    assert_eq!(map.get("conn.client-id"), Some("dept\\"));
    assert_eq!(map.get("conn.queue"), Some("orders"));
}

#[test]
fn test_parse_escapes_in_keys_and_values() {
    let map = PropertyMap::parse(
        r"conn.odd\ key\=x = a\tbé\:c
conn.user-name = \u00
# comment ending in backslash \
conn.queue = orders
",
    );

    assert_eq!(map.get("conn.odd key=x"), Some("a\tb\u{e9}:c"));
    assert_eq!(map.get("conn.user-name"), Some("\\u00"));
    assert_eq!(map.get("conn.queue"), Some("orders"));
    assert_eq!(map.len(), 3);
}

#[test]
fn test_property_map_distinguishes_absent_from_empty() {
    let map = PropertyMap::new().with("conn.client-id", "");

    assert_eq!(map.get_string("conn.client-id"), Some(String::new()));
    assert_eq!(map.get_string("conn.user-name"), None);
}

#[test]
fn test_property_map_integers() {
    let map = PropertyMap::new()
        .with("count", " 5 ")
        .with("zero", "0")
        .with("negative", "-1")
        .with("blank", "  ")
        .with("bad", "five");

    assert_eq!(map.get_int("count").unwrap(), Some(5));
    assert_eq!(map.get_int("zero").unwrap(), Some(0));
    assert_eq!(map.get_int("negative").unwrap(), Some(-1));
    assert_eq!(map.get_int("blank").unwrap(), None);
    assert_eq!(map.get_int("missing").unwrap(), None);

    let error = map.get_int("bad").unwrap_err();
    assert!(matches!(
        error,
        ConfigurationError::InvalidValue { ref key, ref value, .. } if key == "bad" && value == "five"
    ));
}

#[test]
fn test_property_map_booleans() {
    let map = PropertyMap::new()
        .with("yes", "TRUE")
        .with("no", "false")
        .with("blank", "")
        .with("bad", "maybe");

    assert_eq!(map.get_bool("yes").unwrap(), Some(true));
    assert_eq!(map.get_bool("no").unwrap(), Some(false));
    assert_eq!(map.get_bool("blank").unwrap(), None);
    assert_eq!(map.get_bool("missing").unwrap(), None);
    assert!(map.get_bool("bad").is_err());
}

#[test]
fn test_property_map_from_iterator() {
    let map: PropertyMap = vec![("a", "1"), ("b", "2")].into_iter().collect();
    assert_eq!(map.get("a"), Some("1"));
    assert_eq!(map.get("b"), Some("2"));
}

// ============================================================================
// Scoped accessor
// ============================================================================

#[test]
fn test_scoped_config_nested_lookup() {
    let config = scoped(&[
        ("conn.server-url", "tcp://broker:7222"),
        ("conn.connection-attempt-count", "3"),
        ("conn.multicast-enabled", "true"),
    ]);

    assert_eq!(
        ConfigSource::get_string(&config, "conn.server-url"),
        Some("tcp://broker:7222".to_string())
    );
    assert_eq!(
        ConfigSource::get_int(&config, "conn.connection-attempt-count").unwrap(),
        Some(3)
    );
    assert_eq!(
        ConfigSource::get_bool(&config, "conn.multicast-enabled").unwrap(),
        Some(true)
    );
}

#[test]
fn test_scoped_config_absent_and_blank_keys() {
    let config = scoped(&[("conn.connection-attempt-delay", "")]);

    assert_eq!(ConfigSource::get_string(&config, "conn.queue"), None);
    assert_eq!(
        ConfigSource::get_int(&config, "conn.connection-attempt-count").unwrap(),
        None
    );
    assert_eq!(
        ConfigSource::get_int(&config, "conn.connection-attempt-delay").unwrap(),
        None
    );
    assert_eq!(
        ConfigSource::get_bool(&config, "conn.multicast-enabled").unwrap(),
        None
    );
}

#[test]
fn test_scoped_config_rejects_bad_integer() {
    let config = scoped(&[("conn.connection-attempt-count", "lots")]);

    let error = ConfigSource::get_int(&config, "conn.connection-attempt-count").unwrap_err();
    assert!(matches!(error, ConfigurationError::InvalidValue { .. }));
}

#[test]
fn test_scoped_config_rejects_out_of_range_integer() {
    let config = config::Config::builder()
        .set_override("conn.connection-attempt-delay", 10_000_000_000_i64)
        .unwrap()
        .build()
        .unwrap();

    let error = ConfigSource::get_int(&config, "conn.connection-attempt-delay").unwrap_err();
    assert!(matches!(error, ConfigurationError::InvalidValue { .. }));
}

#[test]
fn test_scoped_config_reads_snake_case_keys() {
    // `config::Environment` maps BUS_CONNECTOR__CONN__SERVER_URL to this shape
    let config = scoped(&[
        ("conn.server_url", "tcp://broker:7222"),
        ("conn.connection_attempt_count", "3"),
        ("conn.multicast_enabled", "true"),
    ]);

    assert_eq!(
        ConfigSource::get_string(&config, "conn.server-url"),
        Some("tcp://broker:7222".to_string())
    );
    assert_eq!(
        ConfigSource::get_int(&config, "conn.connection-attempt-count").unwrap(),
        Some(3)
    );
    assert_eq!(
        ConfigSource::get_bool(&config, "conn.multicast-enabled").unwrap(),
        Some(true)
    );
}

#[test]
fn test_scoped_config_prefers_kebab_case_keys() {
    let config = scoped(&[
        ("conn.server-url", "tcp://file:7222"),
        ("conn.server_url", "tcp://env:7222"),
    ]);

    assert_eq!(
        ConfigSource::get_string(&config, "conn.server-url"),
        Some("tcp://file:7222".to_string())
    );
}
