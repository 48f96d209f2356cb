//! wiremock stubs for the OpenTok REST API
//!
//! Every stub requires the partner auth header for the test account, so a
//! client that sends the wrong credentials gets wiremock's default 404.

use crate::fixtures::test_archive_json;
use crate::test_ids::{TEST_API_KEY, TEST_API_SECRET};
use opentok::ArchiveStatus;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Value of `X-TB-PARTNER-AUTH` for the test account.
pub fn test_partner_auth() -> String {
    format!("{TEST_API_KEY}:{TEST_API_SECRET}")
}

/// Archive collection path for the test account.
pub fn archive_path() -> String {
    format!("/v2/partner/{TEST_API_KEY}/archive")
}

/// Stub `POST /session/create` returning `session_id`.
pub async fn mount_create_session(server: &MockServer, session_id: &str) {
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "session_id": session_id,
            "partner_id": TEST_API_KEY.to_string(),
            "create_dt": "Mon Mar 17 00:41:31 PDT 2014",
        }])))
        .mount(server)
        .await;
}

/// Stub `POST /v2/partner/{key}/archive` returning a started archive.
pub async fn mount_start_archive(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(archive_path()))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_archive_json(ArchiveStatus::Started)),
        )
        .mount(server)
        .await;
}

/// Stub `POST /v2/partner/{key}/archive/{id}/stop` returning a stopped archive.
pub async fn mount_stop_archive(server: &MockServer, archive_id: Uuid) {
    Mock::given(method("POST"))
        .and(path(format!("{}/{archive_id}/stop", archive_path())))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_archive_json(ArchiveStatus::Stopped)),
        )
        .mount(server)
        .await;
}

/// Stub `GET /v2/partner/{key}/archive/{id}` returning `body`.
pub async fn mount_get_archive(server: &MockServer, archive_id: Uuid, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{archive_id}", archive_path())))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Stub `GET /v2/partner/{key}/archive` returning `items`.
///
/// `count` is the total number of archives on the account, which may exceed
/// the page length.
pub async fn mount_list_archives(server: &MockServer, count: u32, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(archive_path()))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": count,
            "items": items,
        })))
        .mount(server)
        .await;
}

/// Stub `DELETE /v2/partner/{key}/archive/{id}` returning 204.
pub async fn mount_delete_archive(server: &MockServer, archive_id: Uuid) {
    Mock::given(method("DELETE"))
        .and(path(format!("{}/{archive_id}", archive_path())))
        .and(header("x-tb-partner-auth", test_partner_auth().as_str()))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Stub any request to `path` with `method` returning an error status and
/// an optional `{"message": ...}` body.
pub async fn mount_error(
    server: &MockServer,
    http_method: &str,
    request_path: &str,
    status: u16,
    message: Option<&str>,
) {
    let mut response = ResponseTemplate::new(status);
    if let Some(message) = message {
        response = response.set_body_json(json!({ "code": status, "message": message }));
    }
    Mock::given(method(http_method))
        .and(path(request_path))
        .respond_with(response)
        .mount(server)
        .await;
}
