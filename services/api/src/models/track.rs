//! Track models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::AuthorSummary;

/// Track entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub author: Uuid,
    pub playlist: Uuid,
    /// Ids of users that liked the track, each at most once
    pub liked: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Track {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.liked.contains(&user_id)
    }
}

/// Track as returned by the listing endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackListing {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub playlist: Uuid,
    pub created_at: DateTime<Utc>,
    /// Whether the requesting user liked the track
    pub liked: bool,
    /// Number of distinct likers
    pub liked_length: i64,
    pub author: AuthorSummary,
}

/// Body of `POST /track/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTrackRequest {
    pub name: Option<String>,
}

/// Query parameters for track listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackListQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LikeState {
    pub liked: bool,
}
