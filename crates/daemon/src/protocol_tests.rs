// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use bx_core::PackageKind;
use serde_json::json;

fn identity() -> BlueprintIdentity {
    BlueprintIdentity::new("vFW", "1.0.0", "a1b2").with_request("req-1", "sub-1")
}

#[test]
fn execute_request_survives_encoding() {
    let request = Request::Execute {
        identity: identity(),
        request: ExecutionRequest::new("python configure.py", 30)
            .with_properties(json!({"vnf": "fw-1"})),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn status_response_survives_encoding() {
    let response = Response::Status {
        uptime_secs: 3600,
        requests_active: 2,
        version: PROTOCOL_VERSION.to_string(),
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn requests_are_tagged_by_type() {
    let encoded = encode(&Request::Ping).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert_eq!(json_str, r#"{"type":"Ping"}"#);
}

#[test]
fn prepare_manifest_defaults_to_empty() {
    let raw = r#"{"type":"Prepare","identity":{"name":"vFW","version":"1.0.0","uuid":"a1b2"}}"#;
    let decoded: Request = decode(raw.as_bytes()).expect("decode failed");

    match decoded {
        Request::Prepare { manifest, .. } => assert!(manifest.is_empty()),
        other => panic!("Expected Prepare request, got {:?}", other),
    }
}

#[test]
fn prepare_manifest_keeps_entry_order() {
    let manifest = PackageManifest::new()
        .with(PackageKind::AnsibleGalaxy, ["geerlingguy.ntp"])
        .with(PackageKind::Pip, ["requests"]);
    let request = Request::Prepare {
        identity: identity(),
        manifest: manifest.clone(),
    };

    let decoded: Request = decode(&encode(&request).expect("encode failed")).expect("decode failed");
    assert_eq!(
        decoded,
        Request::Prepare {
            identity: identity(),
            manifest
        }
    );
}

#[test]
fn upload_request_carries_base64_archive() {
    let bytes = [0x50, 0x4b, 0x03, 0x04, 0xff, 0x00];
    let request = Request::upload(identity(), "zip", &bytes);

    let Request::Upload {
        archive_format,
        data,
        ..
    } = &request
    else {
        panic!("Expected Upload request");
    };
    assert_eq!(archive_format, "zip");
    assert_eq!(decode_archive(data).expect("valid base64"), bytes);
    assert_eq!(request.kind(), "upload");
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = decode::<Request>(b"{not json").expect_err("should fail");
    assert!(matches!(err, ProtocolError::Json(_)));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let payload = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, payload)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + payload.len());
    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, payload.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, payload);
}

#[tokio::test]
async fn empty_stream_reports_closed_connection() {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let err = read_message(&mut cursor).await.expect_err("should fail");
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let len = (MAX_MESSAGE_SIZE as u32) + 1;
    let mut cursor = std::io::Cursor::new(len.to_be_bytes().to_vec());

    let err = read_message(&mut cursor).await.expect_err("should fail");
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn request_and_response_helpers_use_framing() {
    let mut buffer = Vec::new();
    write_message(&mut buffer, &encode(&Request::Status).expect("encode failed"))
        .await
        .expect("write failed");
    let mut cursor = std::io::Cursor::new(buffer);
    let request = read_request(&mut cursor, DEFAULT_TIMEOUT)
        .await
        .expect("read failed");
    assert_eq!(request, Request::Status);

    let mut out = Vec::new();
    let response = Response::Error {
        message: "Archive type tar is not valid.".to_string(),
    };
    write_response(&mut out, &response, DEFAULT_TIMEOUT)
        .await
        .expect("write failed");
    let mut cursor = std::io::Cursor::new(out);
    let bytes = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(decode::<Response>(&bytes).expect("decode failed"), response);
}

#[tokio::test]
async fn stalled_reader_times_out() {
    let (mut client, _server) = tokio::io::duplex(64);
    let err = read_request(&mut client, std::time::Duration::from_millis(20))
        .await
        .expect_err("should time out");
    assert!(matches!(err, ProtocolError::Timeout));
}
