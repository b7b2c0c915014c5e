//! Repositories for database operations
//!
//! Every repository is a trait so handlers can run against PostgreSQL in
//! production and against [`memory::InMemoryStore`] in development and tests.
//! Mutations that touch a set-valued field are single atomic operations in
//! every implementation.

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::{
    listing::{PageRequest, TrackScope},
    models::{
        playlist::Playlist,
        track::{Track, TrackListing},
        user::{NewUser, Profile, User},
    },
};

pub mod memory;
pub mod playlist;
pub mod track;
pub mod user;

pub use playlist::PgPlaylistRepository;
pub use track::PgTrackRepository;
pub use user::PgUserRepository;

/// User account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email yields `DatabaseError::Conflict`
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Replace the profile; `None` if the user does not exist
    async fn update_profile(&self, id: Uuid, profile: &Profile) -> DatabaseResult<Option<User>>;

    /// Store a new password hash and drop any pending reset token;
    /// `false` if the user does not exist
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool>;

    /// Add `follower` to the user's followers if absent, remove it otherwise.
    /// Returns the post-toggle membership, `None` if the user does not exist.
    async fn toggle_follower(&self, id: Uuid, follower: Uuid) -> DatabaseResult<Option<bool>>;
}

/// Playlist storage
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Insert an empty playlist
    async fn create(&self, image: &str) -> DatabaseResult<Playlist>;

    /// Find a playlist by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Playlist>>;
}

/// Track storage
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Ranked page of tracks in `scope` as seen by `requester`
    async fn list(
        &self,
        requester: Uuid,
        scope: TrackScope,
        page: PageRequest,
    ) -> DatabaseResult<Vec<TrackListing>>;

    /// Create a track in `playlist_id`, inheriting the playlist image, and
    /// append it to the playlist. `None` if the playlist does not exist.
    async fn create(
        &self,
        playlist_id: Uuid,
        author: Uuid,
        name: &str,
    ) -> DatabaseResult<Option<Track>>;

    /// Find a track by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Track>>;

    /// Add `user_id` to the likers if absent, remove it otherwise.
    /// Returns the post-toggle state, `None` if the track does not exist.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> DatabaseResult<Option<bool>>;

    /// Delete a track and pull it from its playlist, returning what was removed
    async fn delete(&self, id: Uuid) -> DatabaseResult<Option<Track>>;
}
