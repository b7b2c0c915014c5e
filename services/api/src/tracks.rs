//! Track operations behind the `/tracks` and `/track` routes

use common::error::DatabaseError;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    listing::{PageRequest, TrackScope},
    middleware::AuthUser,
    models::track::{LikeState, Track, TrackListQuery, TrackListing},
    repositories::TrackRepository,
    validation::validate_track_name,
};

/// Ranked page of tracks in `scope` for `requester`
pub async fn list_tracks(
    tracks: &dyn TrackRepository,
    requester: Uuid,
    scope: TrackScope,
    query: &TrackListQuery,
    max_page_size: u32,
) -> ApiResult<Vec<TrackListing>> {
    let page = PageRequest::from_query(query, max_page_size);
    Ok(tracks.list(requester, scope, page).await?)
}

/// Attach a new track named `name` to playlist `playlist_id`
pub async fn post_track(
    tracks: &dyn TrackRepository,
    requester: &AuthUser,
    playlist_id: Uuid,
    name: Option<&str>,
) -> ApiResult<Track> {
    let name = validate_track_name(name).map_err(ApiError::Validation)?;

    tracks
        .create(playlist_id, requester.id, &name)
        .await
        .map_err(|e| match e {
            DatabaseError::MissingReference(_) => {
                ApiError::NotFound("User not found".to_string())
            }
            other => ApiError::Database(other),
        })?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))
}

/// Like the track if the requester has not, unlike it otherwise
pub async fn toggle_like(
    tracks: &dyn TrackRepository,
    requester: &AuthUser,
    track_id: Uuid,
) -> ApiResult<LikeState> {
    let liked = tracks
        .toggle_like(track_id, requester.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found".to_string()))?;

    Ok(LikeState { liked })
}

/// Remove a track; only its author or an administrator may
pub async fn delete_track(
    tracks: &dyn TrackRepository,
    requester: &AuthUser,
    track_id: Uuid,
) -> ApiResult<Track> {
    let track = tracks
        .find_by_id(track_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found".to_string()))?;

    if track.author != requester.id && !requester.is_admin() {
        return Err(ApiError::Permission(
            "Only the author or an administrator can delete this track".to_string(),
        ));
    }

    let deleted = tracks
        .delete(track_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found".to_string()))?;

    info!("User {} deleted track {}", requester.id, deleted.id);
    Ok(deleted)
}
