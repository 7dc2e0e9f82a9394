//! Integration tests for connector configuration across both sources

use bus_connector::{
    build_connection_factory, build_destination, has_server_url, ClientDefaults, ConfigKey,
    Connector, Destination, PropertyMap,
};

fn scoped(entries: &[(&str, &str)]) -> config::Config {
    let mut builder = config::Config::builder();
    for (key, value) in entries {
        builder = builder.set_override(*key, *value).unwrap();
    }
    builder.build().unwrap()
}

const FULL: &[(&str, &str)] = &[
    ("idp.server-url", "tcp://broker-a:7222,ssl://broker-b:7243"),
    ("idp.client-id", "keycloak"),
    ("idp.user-name", "publisher"),
    ("idp.user-password", "secret"),
    ("idp.multicast-daemon", "7444"),
    ("idp.multicast-enabled", "true"),
    ("idp.connection-attempt-count", "3"),
    ("idp.connection-attempt-delay", "750"),
    ("idp.connection-attempt-timeout", "1000"),
    ("idp.reconnection-attempt-count", "12"),
    ("idp.reconnection-attempt-delay", "1500"),
    ("idp.reconnection-attempt-timeout", "2000"),
    ("idp.topic", "idp-events"),
];

/// The documented example: server URL and queue only
#[test]
fn test_minimal_configuration_example() {
    let properties = PropertyMap::new()
        .with("myconn.server-url", "tcp://broker:7222")
        .with("myconn.queue", "orders");

    let factory = build_connection_factory(&properties, "myconn.").unwrap();
    assert_eq!(factory.server_url(), Some("tcp://broker:7222"));
    assert_eq!(factory.connection(), &ClientDefaults::connection());
    assert_eq!(factory.reconnection(), &ClientDefaults::reconnection());
    assert_eq!(factory.multicast_enabled(), ClientDefaults::MULTICAST_ENABLED);

    assert_eq!(
        build_destination(&properties, "myconn."),
        Some(Destination::Queue("orders".to_string()))
    );
}

/// Property map and scoped accessor agree on the same input
#[test]
fn test_sources_produce_identical_results() {
    let properties: PropertyMap = FULL.iter().copied().collect();
    let config = scoped(FULL);

    let from_properties = build_connection_factory(&properties, "idp.").unwrap();
    let from_config = build_connection_factory(&config, "idp.").unwrap();
    assert_eq!(from_properties, from_config);

    assert_eq!(
        build_destination(&properties, "idp."),
        build_destination(&config, "idp.")
    );
    assert_eq!(
        build_destination(&config, "idp."),
        Some(Destination::Topic("idp-events".to_string()))
    );
}

/// Sources agree when every optional key is absent
#[test]
fn test_sources_agree_on_defaults() {
    let entries = [("idp.server-url", "tcp://broker:7222")];
    let properties: PropertyMap = entries.iter().copied().collect();
    let config = scoped(&entries);

    assert_eq!(
        build_connection_factory(&properties, "idp.").unwrap(),
        build_connection_factory(&config, "idp.").unwrap()
    );
}

/// Without a server URL a connector is never considered configured
#[test]
fn test_missing_server_url_never_configured() {
    for server_url in [None, Some("")] {
        let mut properties = PropertyMap::new();
        for key in ConfigKey::ALL {
            if key != ConfigKey::ServerUrl {
                properties.insert(key.with_prefix("idp."), "1");
            }
        }
        if let Some(url) = server_url {
            properties.insert(ConfigKey::ServerUrl.with_prefix("idp."), url);
        }

        assert!(!has_server_url(&properties, "idp."));
        assert!(Connector::from_source(&properties, "idp.").unwrap().is_none());
    }
}

/// Queue beats topic; topic only when queue is absent or empty
#[test]
fn test_destination_precedence() {
    let unrelated = PropertyMap::new().with("q", "Q").with("t", "T");
    let cases = [
        (PropertyMap::new().with("queue", "Q").with("topic", "T"), Some(Destination::Queue("Q".to_string()))),
        (PropertyMap::new().with("topic", "T"), Some(Destination::Topic("T".to_string()))),
        (PropertyMap::new().with("queue", "").with("topic", "T"), Some(Destination::Topic("T".to_string()))),
        (unrelated, None),
        (PropertyMap::new(), None),
    ];

    for (properties, expected) in cases {
        assert_eq!(build_destination(&properties, ""), expected);
    }
}

/// Connectors sharing one namespace stay independent
#[test]
fn test_multiple_connectors_in_one_namespace() {
    let properties = PropertyMap::parse(
        "admin.server-url=tcp://admin-broker:7222\n\
         admin.queue=admin-events\n\
         admin.connection-attempt-count=9\n\
         user.server-url=tcp://user-broker:7222\n\
         user.topic=user-events\n",
    );

    let admin = Connector::from_source(&properties, "admin.").unwrap().unwrap();
    let user = Connector::from_source(&properties, "user.").unwrap().unwrap();

    assert_eq!(admin.factory().connection().count, 9);
    assert_eq!(
        user.factory().connection().count,
        ClientDefaults::CONNECTION_ATTEMPT_COUNT
    );
    assert_eq!(
        user.destination(),
        Some(&Destination::Topic("user-events".to_string()))
    );
}
