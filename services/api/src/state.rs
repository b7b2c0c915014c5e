//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::AppConfig,
    jwt::JwtService,
    repositories::{
        PgPlaylistRepository, PgTrackRepository, PgUserRepository, PlaylistRepository,
        TrackRepository, UserRepository, memory::InMemoryStore,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present on the Postgres backend, used for health checks
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
    pub jwt_service: JwtService,
    pub user_repository: Arc<dyn UserRepository>,
    pub playlist_repository: Arc<dyn PlaylistRepository>,
    pub track_repository: Arc<dyn TrackRepository>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: AppConfig, jwt_service: JwtService) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            playlist_repository: Arc::new(PgPlaylistRepository::new(pool.clone())),
            track_repository: Arc::new(PgTrackRepository::new(pool.clone())),
            db_pool: Some(pool),
            config,
            jwt_service,
        }
    }

    /// State backed by one shared in-memory store
    pub fn in_memory(store: InMemoryStore, config: AppConfig, jwt_service: JwtService) -> Self {
        Self {
            user_repository: Arc::new(store.clone()),
            playlist_repository: Arc::new(store.clone()),
            track_repository: Arc::new(store),
            db_pool: None,
            config,
            jwt_service,
        }
    }
}
