//! Archive resources returned by the REST API.

use crate::error::OpenTokError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest page the archive listing endpoint returns.
pub const MAX_ARCHIVE_PAGE_SIZE: u32 = 1000;

/// Lifecycle state of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    /// Recorded and available for download.
    Available,
    /// Past the retention window; the file is gone.
    Expired,
    /// Recording failed.
    Failed,
    /// No clients are connected; recording resumes when one joins.
    Paused,
    /// Recording in progress.
    Started,
    /// Recording finished, file not yet available.
    Stopped,
    /// Uploaded to the configured storage target.
    Uploaded,
    /// Deleted through the API.
    Deleted,
    /// A state this library does not know about.
    #[serde(other)]
    Unknown,
}

/// A recording of a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    /// Archive identifier.
    pub id: Uuid,
    /// Current state.
    pub status: ArchiveStatus,
    /// Name given when the archive was started.
    #[serde(default)]
    pub name: Option<String>,
    /// Why the archive stopped or failed.
    #[serde(default)]
    pub reason: Option<String>,
    /// Session that was recorded.
    pub session_id: String,
    /// Account that owns the archive.
    pub partner_id: u32,
    /// Creation time in milliseconds since the epoch.
    pub created_at: i64,
    /// File size in bytes (0 while recording).
    #[serde(default)]
    pub size: u64,
    /// Length in seconds (0 while recording).
    #[serde(default)]
    pub duration: u64,
    /// Download URL, present only while the archive is available.
    #[serde(default)]
    pub url: Option<String>,
}

/// One page of archives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveList {
    /// Total number of archives for the account.
    pub count: u32,
    /// Archives on this page, most recent first.
    pub items: Vec<Archive>,
}

/// Paging for `list_archives`. Unset fields use the service defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveListOptions {
    /// Number of archives to skip.
    pub offset: Option<u32>,
    /// Page size, at most [`MAX_ARCHIVE_PAGE_SIZE`].
    pub count: Option<u32>,
}

impl ArchiveListOptions {
    /// Query parameters for the listing request.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::InvalidArgument` if `count` exceeds the page cap.
    pub fn to_query(self) -> Result<Vec<(&'static str, u32)>, OpenTokError> {
        let mut query = Vec::with_capacity(2);
        if let Some(offset) = self.offset {
            query.push(("offset", offset));
        }
        if let Some(count) = self.count {
            if count > MAX_ARCHIVE_PAGE_SIZE {
                return Err(OpenTokError::InvalidArgument(format!(
                    "Archive count must be at most {MAX_ARCHIVE_PAGE_SIZE}, got {count}"
                )));
            }
            query.push(("count", count));
        }
        Ok(query)
    }
}

/// Body of `POST /v2/partner/{key}/archive`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartArchiveRequest<'a> {
    pub session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}
