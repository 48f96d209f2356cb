//! Session, config and client fixtures.

use crate::test_ids::{TEST_API_KEY, TEST_API_SECRET, TEST_ARCHIVE_ID, TEST_SESSION_ID};
use opentok::secret::SecretString;
use opentok::{ArchiveStatus, ClientConfig, OpenTok, Session, SessionProperties};
use serde_json::{json, Value};
use uuid::Uuid;

/// Session identity for [`TEST_SESSION_ID`] owned by the test account.
pub fn test_session() -> Session {
    test_session_with_id(TEST_SESSION_ID)
}

/// Session identity for `session_id` owned by the test account.
pub fn test_session_with_id(session_id: &str) -> Session {
    Session::new(
        session_id.to_string(),
        TEST_API_KEY,
        SecretString::from(TEST_API_SECRET),
        SessionProperties::default(),
    )
}

/// Client configuration pointing at `api_url` (usually a mock server).
pub fn test_config(api_url: &str) -> ClientConfig {
    ClientConfig::new(TEST_API_KEY, SecretString::from(TEST_API_SECRET)).with_api_url(api_url)
}

/// Client pointing at `api_url`.
///
/// # Panics
///
/// Panics if the client cannot be built.
pub fn test_client(api_url: &str) -> OpenTok {
    OpenTok::new(test_config(api_url)).expect("test client should build")
}

/// Archive JSON as the REST API returns it.
///
/// Includes a download URL only for `available` archives, as the service does.
pub fn archive_json(id: Uuid, status: ArchiveStatus) -> Value {
    let status = serde_json::to_value(status).expect("status serializes");
    let available = status == json!("available");
    json!({
        "createdAt": 1_395_183_243_556_i64,
        "duration": if available { 62 } else { 0 },
        "id": id.to_string(),
        "name": "Foo",
        "partnerId": TEST_API_KEY,
        "reason": "",
        "sessionId": TEST_SESSION_ID,
        "size": if available { 8_347_554 } else { 0 },
        "status": status,
        "url": if available {
            json!(format!("https://archives.example.com/{id}.mp4"))
        } else {
            Value::Null
        },
    })
}

/// Archive JSON for [`TEST_ARCHIVE_ID`].
pub fn test_archive_json(status: ArchiveStatus) -> Value {
    archive_json(TEST_ARCHIVE_ID, status)
}
