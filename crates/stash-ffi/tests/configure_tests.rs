//! Runtime configuration tests
//!
//! These live in their own test binary because they change process-wide
//! settings (the input size limit) that would race with unrelated tests.

use serial_test::serial;
use stash::*;

fn error_of(result: StashResult) -> Option<String> {
    unsafe {
        let err = result.error_message();
        stash_free_result(result);
        err
    }
}

#[test]
#[serial]
fn test_buffer_limit_is_enforced() {
    unsafe {
        let config = br#"{"log_level": "info", "max_buffer_len": 8}"#;
        assert!(error_of(stash_configure(StashData::from_slice(config))).is_none());

        let err = error_of(stash_echo(StashData::from_slice(&[0u8; 9]))).unwrap();
        assert!(err.contains("exceeds the limit of 8"));

        let err = error_of(stash_blob_open(StashData::from_slice(&[0u8; 9]))).unwrap();
        assert!(err.starts_with("invalid input: bytes"));

        let result = stash_echo(StashData::from_slice(&[1u8; 8]));
        assert_eq!(result.payload().unwrap(), &[1u8; 8]);
        stash_free_result(result);

        assert!(error_of(stash_configure(StashData::from_slice(b"{}"))).is_none());
        assert!(error_of(stash_echo(StashData::from_slice(&[0u8; 9]))).is_none());
    }
}

#[test]
#[serial]
fn test_invalid_configuration_is_rejected() {
    unsafe {
        let err = error_of(stash_configure(StashData::from_slice(b"{not json"))).unwrap();
        assert!(err.contains("invalid configuration"));

        let err = error_of(stash_configure(StashData::from_slice(br#"{"max_buffer_len": 0}"#))).unwrap();
        assert!(err.contains("max_buffer_len"));

        let err = error_of(stash_configure(StashData::from_slice(br#"{"log_format": "xml"}"#))).unwrap();
        assert!(err.contains("invalid configuration"));

        let err = error_of(stash_configure(StashData::empty())).unwrap();
        assert!(err.contains("must not be empty"));
    }
}

#[test]
#[serial]
fn test_configured_level_is_reported() {
    unsafe {
        let config = br#"{"log_level": "error"}"#;
        assert!(error_of(stash_configure(StashData::from_slice(config))).is_none());
    }

    let result = stash_stats();
    let stats: serde_json::Value = unsafe { serde_json::from_slice(result.payload().unwrap()).unwrap() };
    unsafe { stash_free_result(result) };
    assert_eq!(stats["log_level"], "error");

    unsafe {
        assert!(error_of(stash_configure(StashData::from_slice(b"{}"))).is_none());
    }
}

#[test]
#[serial]
fn test_control_inputs_ignore_buffer_limit() {
    unsafe {
        let config = br#"{"max_buffer_len": 1}"#;
        assert!(error_of(stash_configure(StashData::from_slice(config))).is_none());

        // payloads are held to the limit
        let err = error_of(stash_echo(StashData::from_slice(b"ab"))).unwrap();
        assert!(err.contains("exceeds the limit of 1"));

        // control inputs are not, so the host can still recover
        assert!(error_of(stash_set_log_level(StashData::from_slice(b"debug"))).is_none());
        assert!(error_of(stash_configure(StashData::from_slice(b"{}"))).is_none());

        assert!(error_of(stash_echo(StashData::from_slice(b"ab"))).is_none());
    }
}
