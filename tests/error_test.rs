//! Tests for error types

use trial_metrics::Error;

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("mean of an empty sample sequence".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("empty sample sequence"));
}

#[test]
fn test_not_found_error() {
    let error = Error::NotFound("exp-trial_id-3-metric_store.dat".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Snapshot not found"));
    assert!(error_str.contains("trial_id-3"));
}

#[test]
fn test_snapshot_error() {
    let error = Error::Snapshot("unknown compression tag 9".to_string());
    assert_eq!(format!("{error}"), "Snapshot error: unknown compression tag 9");
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("missing Utf8 column 'metric'".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("'metric'"));
}

#[test]
fn test_render_error() {
    let error = Error::Render("backend busy".to_string());
    assert!(format!("{error}").contains("Render error"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::NotFound("x".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("NotFound"));
}

#[test]
fn test_result_type_alias() {
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> trial_metrics::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> trial_metrics::Result<i32> {
        Err(Error::InvalidInput("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
