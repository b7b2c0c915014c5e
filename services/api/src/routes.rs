//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::{
    accounts,
    error::{ApiError, ApiResult},
    listing::TrackScope,
    middleware::{AuthUser, auth_middleware},
    models::{
        Envelope,
        playlist::NewPlaylistRequest,
        track::{NewTrackRequest, TrackListQuery, TrackListing},
        user::{LoginRequest, PasswordChangeRequest, ProfileUpdate, SignupRequest},
    },
    state::AppState,
    tracks,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/account", get(get_account))
        .route("/account/profile", put(update_profile))
        .route("/account/password", put(change_password))
        .route("/users/:id", get(get_user))
        .route("/users/:id/follow", put(toggle_follow))
        .route("/playlist", post(create_playlist))
        .route("/playlist/:id", get(get_playlist))
        .route("/tracks", get(list_tracks))
        .route("/tracks/liked", get(list_liked_tracks))
        .route("/tracks/playlist/:id", get(list_playlist_tracks))
        .route("/tracks/author/:id", get(list_author_tracks))
        .route("/track/:id", post(post_track).delete(delete_track))
        .route("/track/like/:id", put(toggle_like))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => "ok",
            _ => "unavailable",
        },
        None => "in-memory",
    };

    let status = if database == "unavailable" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "trackshare-api",
            "database": database,
        })),
    )
}

/// Create an account
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let response =
        accounts::signup(state.user_repository.as_ref(), &state.jwt_service, payload).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(response))))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let response =
        accounts::login(state.user_repository.as_ref(), &state.jwt_service, payload).await?;
    Ok(Json(Envelope::new(response)))
}

/// The caller's own account
pub async fn get_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let account = accounts::account(state.user_repository.as_ref(), &user).await?;
    Ok(Json(Envelope::new(account)))
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<ProfileUpdate>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let account = accounts::update_profile(state.user_repository.as_ref(), &user, payload).await?;
    Ok(Json(Envelope::new(account)))
}

/// Change the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<PasswordChangeRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    accounts::change_password(state.user_repository.as_ref(), &user, payload).await?;
    Ok(Json(Envelope::new(json!({ "message": "Password has been changed" }))))
}

/// Another user's public profile
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = accounts::public_profile(state.user_repository.as_ref(), id).await?;
    Ok(Json(Envelope::new(user)))
}

/// Follow or unfollow a user
pub async fn toggle_follow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let follow = accounts::toggle_follow(state.user_repository.as_ref(), &user, id).await?;
    Ok(Json(Envelope::new(follow)))
}

/// Create an empty playlist
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<NewPlaylistRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let image = payload.image.unwrap_or_default();
    let playlist = state.playlist_repository.create(&image).await?;

    info!("User {} created playlist {}", user.id, playlist.id);
    Ok((StatusCode::CREATED, Json(Envelope::new(playlist))))
}

/// Get a playlist by ID
pub async fn get_playlist(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state
        .playlist_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;

    Ok(Json(Envelope::new(playlist)))
}

async fn list_scoped(
    state: &AppState,
    user: &AuthUser,
    scope: TrackScope,
    query: &TrackListQuery,
) -> ApiResult<Json<Envelope<Vec<TrackListing>>>> {
    let listed = tracks::list_tracks(
        state.track_repository.as_ref(),
        user.id,
        scope,
        query,
        state.config.max_page_size,
    )
    .await?;

    Ok(Json(Envelope::new(listed)))
}

/// Most liked tracks across the whole catalogue
pub async fn list_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<TrackListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    list_scoped(&state, &user, TrackScope::Global, &query).await
}

/// Tracks the caller liked, newest first
pub async fn list_liked_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<TrackListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    list_scoped(&state, &user, TrackScope::Liked, &query).await
}

/// Tracks in one playlist
pub async fn list_playlist_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<TrackListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    list_scoped(&state, &user, TrackScope::Playlist(id), &query).await
}

/// Tracks by one author
pub async fn list_author_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<TrackListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    list_scoped(&state, &user, TrackScope::Author(id), &query).await
}

/// Add a track to playlist `:id`
pub async fn post_track(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    payload: Option<Json<NewTrackRequest>>,
) -> ApiResult<impl IntoResponse> {
    let track = tracks::post_track(
        state.track_repository.as_ref(),
        &user,
        id,
        payload.as_ref().and_then(|Json(body)| body.name.as_deref()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(Envelope::new(track))))
}

/// Toggle the caller's like on track `:id`
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let like = tracks::toggle_like(state.track_repository.as_ref(), &user, id).await?;
    Ok(Json(Envelope::new(like)))
}

/// Delete track `:id`
pub async fn delete_track(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let track = tracks::delete_track(state.track_repository.as_ref(), &user, id).await?;
    Ok(Json(Envelope::new(track)))
}
