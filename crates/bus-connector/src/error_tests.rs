//! Tests for error types.

use super::*;

#[test]
fn test_write_operation_tags() {
    assert_eq!(WriteOperation::WriteInt.to_string(), "writeInt");
    assert_eq!(WriteOperation::WriteByte.to_string(), "writeByte");
    assert_eq!(WriteOperation::WriteBytes.to_string(), "writeBytes");
}

#[test]
fn test_message_write_error_keeps_cause() {
    let error = MessageWriteError::new(WriteOperation::WriteBytes, FieldWriteError::MessageClosed);

    assert_eq!(error.operation(), WriteOperation::WriteBytes);
    assert_eq!(error.cause(), &FieldWriteError::MessageClosed);
    assert!(error.to_string().contains("writeBytes"));

    let source = std::error::Error::source(&error).expect("cause is exposed as source");
    assert_eq!(source.to_string(), "message is closed for writing");
}

#[test]
fn test_error_transience() {
    let write: ConnectorError =
        MessageWriteError::new(WriteOperation::WriteByte, FieldWriteError::MessageClosed).into();
    assert!(write.is_transient());

    let config: ConnectorError = ConfigurationError::Missing {
        key: "conn.server-url".to_string(),
    }
    .into();
    assert!(!config.is_transient());

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let encoding: ConnectorError = EncodingError::from(json_error).into();
    assert!(!encoding.is_transient());

    assert!(!ConnectorError::NoDestination {
        prefix: "conn.".to_string()
    }
    .is_transient());
}

#[test]
fn test_invalid_value_message() {
    let error = ConfigurationError::InvalidValue {
        key: "conn.connection-attempt-count".to_string(),
        value: "many".to_string(),
        expected: "an integer".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Invalid value 'many' for 'conn.connection-attempt-count': expected an integer"
    );
}
