//! REST client tests against a mocked OpenTok API
//!
//! Covers session creation, the archive endpoints and status mapping.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use opentok::client::USER_AGENT;
use opentok::{
    ArchiveListOptions, ArchiveMode, ArchiveStatus, OpenTokError, Role, SessionProperties,
    TokenOptions,
};
use opentok_test_utils::*;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_create_session_returns_signing_session() {
    let server = MockServer::start().await;
    mount_create_session(&server, TEST_SESSION_ID).await;

    let client = test_client(&server.uri());
    let session = client
        .create_session(&SessionProperties::default())
        .await
        .unwrap();

    assert_eq!(session.session_id(), TEST_SESSION_ID);
    assert_eq!(session.api_key(), TEST_API_KEY);

    session
        .generate_default_token()
        .unwrap()
        .assert_valid_token()
        .assert_session(TEST_SESSION_ID)
        .assert_signed_with(TEST_API_SECRET);
}

#[tokio::test]
async fn test_create_session_sends_properties_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .and(header("user-agent", USER_AGENT))
        .and(header("accept", "application/json"))
        .and(body_string_contains("location=216.38.134.114"))
        .and(body_string_contains("p2p.preference=enabled"))
        .and(body_string_contains("archiveMode=always"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "session_id": "p2p-session" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let properties = SessionProperties {
        location: Some(IpAddr::V4(Ipv4Addr::new(216, 38, 134, 114))),
        p2p: true,
        archive_mode: ArchiveMode::Always,
    };
    let session = test_client(&server.uri())
        .create_session(&properties)
        .await
        .unwrap();

    assert_eq!(session.session_id(), "p2p-session");
    assert_eq!(session.properties(), &properties);
}

#[tokio::test]
async fn test_create_session_empty_response_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_session(&SessionProperties::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_create_session_unparseable_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<sessions/>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_session(&SessionProperties::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_create_session_rejected_credentials() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        "POST",
        "/session/create",
        403,
        Some("Invalid partner credentials"),
    )
    .await;

    let err = test_client(&server.uri())
        .create_session(&SessionProperties::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpenTokError::Request { status: 403, ref message } if message == "Invalid partner credentials"
    ));
}

#[test]
fn test_client_generates_tokens_without_network() {
    // Unroutable endpoint: token signing must not touch it
    let client = test_client("http://127.0.0.1:1");
    let options = TokenOptions {
        role: Some(Role::Subscriber),
        ..TokenOptions::default()
    };

    client
        .generate_token(TEST_SESSION_ID, &options)
        .unwrap()
        .assert_partner(TEST_API_KEY)
        .assert_role(Role::Subscriber)
        .assert_signed_with(TEST_API_SECRET);
}

// ============================================================================
// Archives
// ============================================================================

#[tokio::test]
async fn test_start_archive_sends_session_and_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(archive_path()))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .and(body_json(json!({ "sessionId": TEST_SESSION_ID, "name": "Foo" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_archive_json(ArchiveStatus::Started)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let archive = test_client(&server.uri())
        .start_archive(TEST_SESSION_ID, Some("Foo"))
        .await
        .unwrap();

    assert_eq!(archive.id, TEST_ARCHIVE_ID);
    assert_eq!(archive.status, ArchiveStatus::Started);
    assert_eq!(archive.session_id, TEST_SESSION_ID);
    assert_eq!(archive.url, None);
}

#[tokio::test]
async fn test_start_archive_omits_missing_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(archive_path()))
        .and(body_json(json!({ "sessionId": TEST_SESSION_ID })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_archive_json(ArchiveStatus::Started)),
        )
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .start_archive(TEST_SESSION_ID, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_start_archive_conflict() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        "POST",
        &archive_path(),
        409,
        Some("The session is already being recorded"),
    )
    .await;

    let err = test_client(&server.uri())
        .start_archive(TEST_SESSION_ID, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::Request { status: 409, .. }));
}

#[tokio::test]
async fn test_start_archive_rejects_empty_session_id() {
    let server = MockServer::start().await;
    mount_start_archive(&server).await;

    let err = test_client(&server.uri())
        .start_archive("", None)
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_archive() {
    let server = MockServer::start().await;
    mount_stop_archive(&server, TEST_ARCHIVE_ID).await;

    let archive = test_client(&server.uri())
        .stop_archive(TEST_ARCHIVE_ID)
        .await
        .unwrap();
    assert_eq!(archive.status, ArchiveStatus::Stopped);
}

#[tokio::test]
async fn test_get_archive_available() {
    let server = MockServer::start().await;
    mount_get_archive(
        &server,
        TEST_ARCHIVE_ID,
        test_archive_json(ArchiveStatus::Available),
    )
    .await;

    let archive = test_client(&server.uri())
        .get_archive(TEST_ARCHIVE_ID)
        .await
        .unwrap();

    assert_eq!(archive.status, ArchiveStatus::Available);
    assert_eq!(archive.partner_id, TEST_API_KEY);
    assert_eq!(archive.duration, 62);
    assert_eq!(archive.size, 8_347_554);
    assert!(archive.url.is_some());
}

#[tokio::test]
async fn test_get_archive_unknown_status() {
    let server = MockServer::start().await;
    let mut body = test_archive_json(ArchiveStatus::Started);
    body["status"] = json!("transcoding");
    mount_get_archive(&server, TEST_ARCHIVE_ID, body).await;

    let archive = test_client(&server.uri())
        .get_archive(TEST_ARCHIVE_ID)
        .await
        .unwrap();
    assert_eq!(archive.status, ArchiveStatus::Unknown);
}

#[tokio::test]
async fn test_get_archive_not_found() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        "GET",
        &format!("{}/{TEST_ARCHIVE_ID_2}", archive_path()),
        404,
        None,
    )
    .await;

    let err = test_client(&server.uri())
        .get_archive(TEST_ARCHIVE_ID_2)
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::NotFound(_)));
}

#[tokio::test]
async fn test_list_archives() {
    let server = MockServer::start().await;
    mount_list_archives(
        &server,
        6,
        vec![
            test_archive_json(ArchiveStatus::Available),
            archive_json(TEST_ARCHIVE_ID_2, ArchiveStatus::Expired),
        ],
    )
    .await;

    let list = test_client(&server.uri())
        .list_archives(&ArchiveListOptions::default())
        .await
        .unwrap();

    assert_eq!(list.count, 6);
    assert_eq!(list.items.len(), 2);
    let second = list.items.get(1).unwrap();
    assert_eq!(second.id, TEST_ARCHIVE_ID_2);
    assert_eq!(second.status, ArchiveStatus::Expired);
}

#[tokio::test]
async fn test_list_archives_sends_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(archive_path()))
        .and(query_param("offset", "10"))
        .and(query_param("count", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": 12, "items": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = ArchiveListOptions {
        offset: Some(10),
        count: Some(5),
    };
    let list = test_client(&server.uri())
        .list_archives(&options)
        .await
        .unwrap();
    assert!(list.items.is_empty());
}

#[tokio::test]
async fn test_list_archives_rejects_oversized_page() {
    let server = MockServer::start().await;
    mount_list_archives(&server, 0, vec![]).await;

    let options = ArchiveListOptions {
        offset: None,
        count: Some(1001),
    };
    let err = test_client(&server.uri())
        .list_archives(&options)
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_archive() {
    let server = MockServer::start().await;
    mount_delete_archive(&server, TEST_ARCHIVE_ID).await;

    test_client(&server.uri())
        .delete_archive(TEST_ARCHIVE_ID)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_archive_still_recording() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        "DELETE",
        &format!("{}/{TEST_ARCHIVE_ID}", archive_path()),
        409,
        Some("Archive is still recording"),
    )
    .await;

    let err = test_client(&server.uri())
        .delete_archive(TEST_ARCHIVE_ID)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpenTokError::Request { status: 409, ref message } if message == "Archive is still recording"
    ));
}

// ============================================================================
// Failure mapping
// ============================================================================

#[tokio::test]
async fn test_server_error_hides_body() {
    let server = MockServer::start().await;
    mount_error(&server, "GET", &archive_path(), 503, Some("db pool exhausted")).await;

    let err = test_client(&server.uri())
        .list_archives(&ArchiveListOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpenTokError::Request { status: 503, ref message } if message == "OpenTok service unavailable"
    ));
}

#[tokio::test]
async fn test_wrong_credentials_do_not_match_stubs() {
    let server = MockServer::start().await;
    mount_get_archive(
        &server,
        TEST_ARCHIVE_ID,
        test_archive_json(ArchiveStatus::Available),
    )
    .await;

    let client = opentok::OpenTok::new(
        opentok::ClientConfig::new(
            TEST_API_KEY,
            opentok::secret::SecretString::from(OTHER_API_SECRET),
        )
        .with_api_url(server.uri()),
    )
    .unwrap();

    let err = client.get_archive(TEST_ARCHIVE_ID).await.unwrap_err();
    assert!(matches!(err, OpenTokError::NotFound(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let config = test_config("http://127.0.0.1:1").with_http_timeout(Duration::from_secs(2));
    let client = opentok::OpenTok::new(config).unwrap();

    let err = client
        .create_session(&SessionProperties::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OpenTokError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/{TEST_ARCHIVE_ID}", archive_path())))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_archive_json(ArchiveStatus::Started))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_http_timeout(Duration::from_millis(200));
    let client = opentok::OpenTok::new(config).unwrap();

    let err = client.get_archive(TEST_ARCHIVE_ID).await.unwrap_err();
    assert!(matches!(err, OpenTokError::Transport(_)));
}
