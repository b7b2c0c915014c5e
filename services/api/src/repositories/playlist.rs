//! Playlist repository for PostgreSQL

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::PlaylistRepository;
use crate::models::playlist::Playlist;

fn playlist_from_row(row: &PgRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        image: row.get("image"),
        tracks: row.get("tracks"),
        created_at: row.get("created_at"),
    }
}

/// Playlist repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgPlaylistRepository {
    pool: PgPool,
}

impl PgPlaylistRepository {
    /// Create a new playlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for PgPlaylistRepository {
    async fn create(&self, image: &str) -> DatabaseResult<Playlist> {
        let row = sqlx::query(
            r#"
            INSERT INTO playlists (image)
            VALUES ($1)
            RETURNING id, image, tracks, created_at
            "#,
        )
        .bind(image)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let playlist = playlist_from_row(&row);
        info!("Created playlist {}", playlist.id);
        Ok(playlist)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Playlist>> {
        let row = sqlx::query("SELECT id, image, tracks, created_at FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(playlist_from_row))
    }
}
