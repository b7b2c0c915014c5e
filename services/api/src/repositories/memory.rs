//! In-memory storage backend
//!
//! Implements every repository trait over a single mutex-guarded state, so
//! each operation observes and mutates it atomically. Used for local
//! development (`STORAGE_BACKEND=memory`) and for tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{PlaylistRepository, TrackRepository, UserRepository};
use crate::{
    listing::{PageRequest, TrackScope, rank_page},
    models::{
        playlist::Playlist,
        track::{Track, TrackListing},
        user::{NewUser, Profile, User},
    },
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    playlists: HashMap<Uuid, Playlist>,
    tracks: HashMap<Uuid, Track>,
}

/// Flip `id`'s membership in `set`, returning whether it is now present
fn toggle_member(set: &mut Vec<Uuid>, id: Uuid) -> bool {
    match set.iter().position(|member| *member == id) {
        Some(index) => {
            set.remove(index);
            false
        }
        None => {
            set.push(id);
            true
        }
    }
}

/// Storage backend keeping everything in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed track, bypassing playlist bookkeeping
    #[cfg(test)]
    pub(crate) async fn insert_track(&self, track: Track) {
        let mut state = self.state.lock().await;
        if let Some(playlist) = state.playlists.get_mut(&track.playlist) {
            playlist.tracks.push(track.id);
        }
        state.tracks.insert(track.id, track);
    }

    /// Replace a stored user's role
    #[cfg(test)]
    pub(crate) async fn set_role(&self, id: Uuid, role: &str) {
        if let Some(user) = self.state.lock().await.users.get_mut(&id) {
            user.role = role.to_string();
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|user| user.email == new_user.email) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            password_reset_token: None,
            password_reset_expires: None,
            role: new_user.role,
            profile: Profile::default(),
            followers: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn update_profile(&self, id: Uuid, profile: &Profile) -> DatabaseResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.profile = profile.clone();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.password_reset_token = None;
                user.password_reset_expires = None;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn toggle_follower(&self, id: Uuid, follower: Uuid) -> DatabaseResult<Option<bool>> {
        let mut state = self.state.lock().await;
        Ok(state
            .users
            .get_mut(&id)
            .map(|user| toggle_member(&mut user.followers, follower)))
    }
}

#[async_trait]
impl PlaylistRepository for InMemoryStore {
    async fn create(&self, image: &str) -> DatabaseResult<Playlist> {
        let playlist = Playlist {
            id: Uuid::new_v4(),
            image: image.to_string(),
            tracks: Vec::new(),
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .await
            .playlists
            .insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Playlist>> {
        Ok(self.state.lock().await.playlists.get(&id).cloned())
    }
}

#[async_trait]
impl TrackRepository for InMemoryStore {
    async fn list(
        &self,
        requester: Uuid,
        scope: TrackScope,
        page: PageRequest,
    ) -> DatabaseResult<Vec<TrackListing>> {
        let state = self.state.lock().await;

        // Tracks whose author is gone drop out, like the SQL inner join
        let listings = state
            .tracks
            .values()
            .filter(|track| scope.matches(track, requester))
            .filter_map(|track| {
                let author = state.users.get(&track.author)?;
                Some(TrackListing {
                    id: track.id,
                    name: track.name.clone(),
                    image: track.image.clone(),
                    playlist: track.playlist,
                    created_at: track.created_at,
                    liked: track.is_liked_by(requester),
                    liked_length: track.liked.len() as i64,
                    author: author.author_summary(),
                })
            })
            .collect();

        Ok(rank_page(listings, &scope, page))
    }

    async fn create(
        &self,
        playlist_id: Uuid,
        author: Uuid,
        name: &str,
    ) -> DatabaseResult<Option<Track>> {
        let mut state = self.state.lock().await;
        if !state.playlists.contains_key(&playlist_id) {
            return Ok(None);
        }
        if !state.users.contains_key(&author) {
            return Err(DatabaseError::MissingReference(
                "tracks_author_id_fkey".to_string(),
            ));
        }
        let Some(playlist) = state.playlists.get_mut(&playlist_id) else {
            return Ok(None);
        };

        let track = Track {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image: playlist.image.clone(),
            author,
            playlist: playlist_id,
            liked: Vec::new(),
            created_at: Utc::now(),
        };
        playlist.tracks.push(track.id);
        state.tracks.insert(track.id, track.clone());
        Ok(Some(track))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Track>> {
        Ok(self.state.lock().await.tracks.get(&id).cloned())
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> DatabaseResult<Option<bool>> {
        let mut state = self.state.lock().await;
        Ok(state
            .tracks
            .get_mut(&id)
            .map(|track| toggle_member(&mut track.liked, user_id)))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<Option<Track>> {
        let mut state = self.state.lock().await;
        let Some(track) = state.tracks.remove(&id) else {
            return Ok(None);
        };

        if let Some(playlist) = state.playlists.get_mut(&track.playlist) {
            playlist.tracks.retain(|track_id| *track_id != id);
        }
        Ok(Some(track))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::ROLE_USER;

    async fn user(store: &InMemoryStore, email: &str) -> User {
        UserRepository::create(
            store,
            NewUser {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role: ROLE_USER.to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_toggle_member_is_a_set_flip() {
        let id = Uuid::new_v4();
        let mut set = vec![];
        assert!(toggle_member(&mut set, id));
        assert_eq!(set, vec![id]);
        assert!(!toggle_member(&mut set, id));
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        user(&store, "ada@example.com").await;

        let err = UserRepository::create(
            &store,
            NewUser {
                email: "ada@example.com".to_string(),
                password_hash: "other".to_string(),
                role: ROLE_USER.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_track_inherits_image_and_appends() {
        let store = InMemoryStore::new();
        let author = user(&store, "ada@example.com").await;
        let playlist = PlaylistRepository::create(&store, "https://img/cover.png")
            .await
            .unwrap();

        let track = TrackRepository::create(&store, playlist.id, author.id, "Intro")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.image, "https://img/cover.png");
        assert_eq!(track.author, author.id);
        assert!(track.liked.is_empty());

        let playlist = PlaylistRepository::find_by_id(&store, playlist.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(playlist.tracks, vec![track.id]);

        TrackRepository::delete(&store, track.id).await.unwrap();
        let playlist = PlaylistRepository::find_by_id(&store, playlist.id)
            .await
            .unwrap()
            .unwrap();
        assert!(playlist.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_create_track_in_missing_playlist() {
        let store = InMemoryStore::new();
        let author = user(&store, "ada@example.com").await;

        let track = TrackRepository::create(&store, Uuid::new_v4(), author.id, "Intro")
            .await
            .unwrap();
        assert!(track.is_none());
    }

    #[tokio::test]
    async fn test_create_track_requires_existing_author() {
        let store = InMemoryStore::new();
        let playlist = PlaylistRepository::create(&store, "").await.unwrap();

        let err = TrackRepository::create(&store, playlist.id, Uuid::new_v4(), "Intro")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::MissingReference(_)));

        let playlist = PlaylistRepository::find_by_id(&store, playlist.id)
            .await
            .unwrap()
            .unwrap();
        assert!(playlist.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_listing_skips_tracks_without_author() {
        let store = InMemoryStore::new();
        let author = user(&store, "ada@example.com").await;
        let playlist = PlaylistRepository::create(&store, "").await.unwrap();
        TrackRepository::create(&store, playlist.id, author.id, "kept")
            .await
            .unwrap();
        store
            .insert_track(Track {
                id: Uuid::new_v4(),
                name: "orphan".to_string(),
                image: String::new(),
                author: Uuid::new_v4(),
                playlist: playlist.id,
                liked: Vec::new(),
                created_at: Utc::now(),
            })
            .await;

        let page = PageRequest { page: 1, limit: 10 };
        let listed = store
            .list(author.id, TrackScope::Global, page)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "kept");
    }

    #[tokio::test]
    async fn test_toggle_follower() {
        let store = InMemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;

        assert_eq!(store.toggle_follower(ada.id, bob.id).await.unwrap(), Some(true));
        assert_eq!(store.toggle_follower(ada.id, bob.id).await.unwrap(), Some(false));
        assert_eq!(store.toggle_follower(Uuid::new_v4(), bob.id).await.unwrap(), None);
    }
}
