//! Track repository for PostgreSQL

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::TrackRepository;
use crate::{
    listing::{PageRequest, Ranking, TrackScope},
    models::{
        track::{Track, TrackListing},
        user::AuthorSummary,
    },
};

const TRACK_COLUMNS: &str = "id, name, image, author_id, playlist_id, liked, created_at";

fn track_from_row(row: &PgRow) -> Track {
    Track {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        author: row.get("author_id"),
        playlist: row.get("playlist_id"),
        liked: row.get("liked"),
        created_at: row.get("created_at"),
    }
}

fn listing_from_row(row: &PgRow) -> TrackListing {
    TrackListing {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        playlist: row.get("playlist_id"),
        created_at: row.get("created_at"),
        liked: row.get("liked"),
        liked_length: row.get("liked_length"),
        author: AuthorSummary {
            id: row.get("author_id"),
            name: row.get("author_name"),
            gender: row.get("author_gender"),
            location: row.get("author_location"),
            website: row.get("author_website"),
            picture: row.get("author_picture"),
        },
    }
}

/// Build the listing query for one scope.
///
/// The author join only selects public profile columns.
fn listing_query(
    requester: Uuid,
    scope: TrackScope,
    page: PageRequest,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT t.id, t.name, t.image, t.playlist_id, t.created_at,
               cardinality(t.liked)::BIGINT AS liked_length,
               "#,
    );
    builder
        .push_bind(requester)
        .push(
            r#" = ANY(t.liked) AS liked,
               u.id AS author_id, u.name AS author_name, u.gender AS author_gender,
               u.location AS author_location, u.website AS author_website,
               u.picture AS author_picture
        FROM tracks t
        JOIN users u ON u.id = t.author_id
        "#,
        );

    match scope {
        TrackScope::Global => {}
        TrackScope::Playlist(playlist) => {
            builder.push(" WHERE t.playlist_id = ").push_bind(playlist);
        }
        TrackScope::Liked => {
            builder
                .push(" WHERE ")
                .push_bind(requester)
                .push(" = ANY(t.liked)");
        }
        TrackScope::Author(author) => {
            builder.push(" WHERE t.author_id = ").push_bind(author);
        }
    }

    match scope.ranking() {
        Ranking::Popular => {
            builder.push(" ORDER BY liked_length DESC, liked DESC, t.created_at DESC, t.id DESC");
        }
        Ranking::Newest => {
            builder.push(" ORDER BY t.created_at DESC, t.id DESC");
        }
    }

    builder
        .push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));

    builder
}

/// Track repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgTrackRepository {
    pool: PgPool,
}

impl PgTrackRepository {
    /// Create a new track repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for PgTrackRepository {
    async fn list(
        &self,
        requester: Uuid,
        scope: TrackScope,
        page: PageRequest,
    ) -> DatabaseResult<Vec<TrackListing>> {
        let rows = listing_query(requester, scope, page)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(listing_from_row).collect())
    }

    async fn create(
        &self,
        playlist_id: Uuid,
        author: Uuid,
        name: &str,
    ) -> DatabaseResult<Option<Track>> {
        // Insert and append in one statement so a track never exists outside
        // its playlist's sequence.
        let row = sqlx::query(&format!(
            r#"
            WITH inserted AS (
                INSERT INTO tracks (name, image, author_id, playlist_id)
                SELECT $1::TEXT, p.image, $2::UUID, p.id
                FROM playlists p
                WHERE p.id = $3
                RETURNING {TRACK_COLUMNS}
            ),
            appended AS (
                UPDATE playlists
                SET tracks = array_append(tracks, inserted.id)
                FROM inserted
                WHERE playlists.id = inserted.playlist_id
            )
            SELECT {TRACK_COLUMNS} FROM inserted
            "#
        ))
        .bind(name)
        .bind(author)
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let track = row.as_ref().map(track_from_row);
        if let Some(track) = &track {
            info!("Created track {} in playlist {}", track.id, playlist_id);
        }
        Ok(track)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Track>> {
        let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(track_from_row))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> DatabaseResult<Option<bool>> {
        let liked: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE tracks
            SET liked = CASE
                    WHEN $2 = ANY(liked) THEN array_remove(liked, $2)
                    ELSE array_append(liked, $2)
                END
            WHERE id = $1
            RETURNING $2 = ANY(liked)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(liked)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<Option<Track>> {
        let row = sqlx::query(&format!(
            r#"
            WITH deleted AS (
                DELETE FROM tracks
                WHERE id = $1
                RETURNING {TRACK_COLUMNS}
            ),
            pulled AS (
                UPDATE playlists
                SET tracks = array_remove(tracks, deleted.id)
                FROM deleted
                WHERE playlists.id = deleted.playlist_id
            )
            SELECT {TRACK_COLUMNS} FROM deleted
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let track = row.as_ref().map(track_from_row);
        if let Some(track) = &track {
            info!("Deleted track {}", track.id);
        }
        Ok(track)
    }
}
