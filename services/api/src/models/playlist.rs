//! Playlist models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playlist entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub image: String,
    /// Track ids in insertion order
    pub tracks: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request for playlist creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlaylistRequest {
    pub image: Option<String>,
}
