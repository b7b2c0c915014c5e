//! Integration tests for the PostgreSQL repositories
//!
//! These tests run the repository SQL against a live database pointed to by
//! `DATABASE_URL`. Every test works on its own users and playlists so they can
//! share one database.

use api::{
    listing::{PageRequest, TrackScope},
    models::{
        track::TrackListing,
        user::{NewUser, Profile, ROLE_USER, User},
    },
    repositories::{
        PgPlaylistRepository, PgTrackRepository, PgUserRepository, PlaylistRepository,
        TrackRepository, UserRepository,
    },
};
use common::{
    database::{DatabaseConfig, init_pool, run_migrations},
    error::DatabaseError,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

async fn user(users: &PgUserRepository) -> User {
    users
        .create(NewUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "hash".to_string(),
            role: ROLE_USER.to_string(),
        })
        .await
        .unwrap()
}

fn names(listings: &[TrackListing]) -> Vec<&str> {
    listings.iter().map(|l| l.name.as_str()).collect()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_listing_ranks_by_likes_then_requester_like() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let playlists = PgPlaylistRepository::new(pool.clone());
    let tracks = PgTrackRepository::new(pool);

    let author = user(&users).await;
    let me = user(&users).await;
    let playlist = playlists.create("https://img/cover.png").await.unwrap();

    // Created before "first-5", so only the requester's like can rank it first
    let seeded = [
        ("second-5", 4, true),
        ("first-5", 5, false),
        ("three", 3, false),
        ("one", 1, false),
        ("zero", 0, false),
    ];
    for (name, likes, mine) in seeded {
        let track = tracks
            .create(playlist.id, author.id, name)
            .await
            .unwrap()
            .unwrap();
        for _ in 0..likes {
            tracks.toggle_like(track.id, Uuid::new_v4()).await.unwrap();
        }
        if mine {
            tracks.toggle_like(track.id, me.id).await.unwrap();
        }
    }

    let scope = TrackScope::Playlist(playlist.id);
    let first = tracks
        .list(me.id, scope, PageRequest { page: 1, limit: 2 })
        .await
        .unwrap();
    assert_eq!(names(&first), vec!["second-5", "first-5"]);
    assert!(first[0].liked);
    assert!(!first[1].liked);
    assert_eq!(first[0].liked_length, 5);
    assert_eq!(first[0].author.id, author.id);

    let second = tracks
        .list(me.id, scope, PageRequest { page: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(names(&second), vec!["three", "one"]);

    let last = tracks
        .list(me.id, scope, PageRequest { page: 3, limit: 2 })
        .await
        .unwrap();
    assert_eq!(names(&last), vec!["zero"]);

    let everything = PageRequest { page: 1, limit: 10 };
    let by_author = tracks
        .list(me.id, TrackScope::Author(author.id), everything)
        .await
        .unwrap();
    assert_eq!(by_author.len(), 5);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_liked_listing_is_newest_first() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let playlists = PgPlaylistRepository::new(pool.clone());
    let tracks = PgTrackRepository::new(pool);

    let author = user(&users).await;
    let me = user(&users).await;
    let playlist = playlists.create("").await.unwrap();

    let old = tracks
        .create(playlist.id, author.id, "old-popular")
        .await
        .unwrap()
        .unwrap();
    let new = tracks
        .create(playlist.id, author.id, "new-quiet")
        .await
        .unwrap()
        .unwrap();
    tracks
        .create(playlist.id, author.id, "not-mine")
        .await
        .unwrap();

    for _ in 0..3 {
        tracks.toggle_like(old.id, Uuid::new_v4()).await.unwrap();
    }
    tracks.toggle_like(old.id, me.id).await.unwrap();
    tracks.toggle_like(new.id, me.id).await.unwrap();

    let liked = tracks
        .list(me.id, TrackScope::Liked, PageRequest { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(names(&liked), vec!["new-quiet", "old-popular"]);
    assert!(liked.iter().all(|track| track.liked));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_toggles_are_set_flips() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let playlists = PgPlaylistRepository::new(pool.clone());
    let tracks = PgTrackRepository::new(pool);

    let ada = user(&users).await;
    let bob = user(&users).await;
    let playlist = playlists.create("").await.unwrap();
    let track = tracks
        .create(playlist.id, ada.id, "Intro")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tracks.toggle_like(track.id, bob.id).await.unwrap(), Some(true));
    assert_eq!(tracks.toggle_like(track.id, bob.id).await.unwrap(), Some(false));
    let after = tracks.find_by_id(track.id).await.unwrap().unwrap();
    assert!(after.liked.is_empty());
    assert_eq!(tracks.toggle_like(Uuid::new_v4(), bob.id).await.unwrap(), None);

    assert_eq!(users.toggle_follower(ada.id, bob.id).await.unwrap(), Some(true));
    assert_eq!(users.toggle_follower(ada.id, bob.id).await.unwrap(), Some(false));
    let after = users.find_by_id(ada.id).await.unwrap().unwrap();
    assert!(after.followers.is_empty());
    assert_eq!(users.toggle_follower(Uuid::new_v4(), bob.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_track_create_and_delete_keep_playlist_in_sync() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let playlists = PgPlaylistRepository::new(pool.clone());
    let tracks = PgTrackRepository::new(pool);

    let author = user(&users).await;
    let playlist = playlists.create("https://img/cover.png").await.unwrap();

    let missing = tracks
        .create(Uuid::new_v4(), author.id, "Intro")
        .await
        .unwrap();
    assert!(missing.is_none());

    let err = tracks
        .create(playlist.id, Uuid::new_v4(), "Intro")
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::MissingReference(_)));

    let track = tracks
        .create(playlist.id, author.id, "Intro")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track.image, "https://img/cover.png");
    assert_eq!(track.author, author.id);

    let stored = playlists.find_by_id(playlist.id).await.unwrap().unwrap();
    assert_eq!(stored.tracks, vec![track.id]);

    let deleted = tracks.delete(track.id).await.unwrap();
    assert_eq!(deleted, Some(track.clone()));
    let stored = playlists.find_by_id(playlist.id).await.unwrap().unwrap();
    assert!(stored.tracks.is_empty());
    assert!(tracks.delete(track.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_user_writes() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool);
    let ada = user(&users).await;

    let err = users
        .create(NewUser {
            email: ada.email.clone(),
            password_hash: "other".to_string(),
            role: ROLE_USER.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));

    let profile = Profile {
        name: "Ada".to_string(),
        website: "https://ada.dev".to_string(),
        ..Profile::default()
    };
    let updated = users
        .update_profile(ada.id, &profile)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.profile, profile);

    assert!(users.update_password_hash(ada.id, "new-hash").await.unwrap());
    let found = users.find_by_email(&ada.email).await.unwrap().unwrap();
    assert_eq!(found.password_hash, "new-hash");
    assert!(!users
        .update_password_hash(Uuid::new_v4(), "new-hash")
        .await
        .unwrap());
}
