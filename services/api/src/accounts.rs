//! Account operations: sign up, log in, profile and follow management

use common::error::DatabaseError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    middleware::AuthUser,
    models::user::{
        AccountResponse, AuthResponse, FollowState, LoginRequest, NewUser, PasswordChangeRequest,
        ProfileUpdate, PublicUser, ROLE_USER, SignupRequest, User,
    },
    password::{compare_password, hash_password},
    repositories::UserRepository,
    validation::{validate_email, validate_password, validate_profile},
};

fn issue_token(jwt: &JwtService, user: &User) -> ApiResult<AuthResponse> {
    let token = jwt.generate_token(user).map_err(|e| {
        tracing::error!("Failed to generate access token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: jwt.token_expiry(),
        user: user.to_account(),
    })
}

async fn require_user(users: &dyn UserRepository, id: Uuid) -> ApiResult<User> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Create an account and log it in
pub async fn signup(
    users: &dyn UserRepository,
    jwt: &JwtService,
    request: SignupRequest,
) -> ApiResult<AuthResponse> {
    validate_email(&request.email).map_err(ApiError::Validation)?;
    validate_password(&request.password).map_err(ApiError::Validation)?;

    let password_hash = hash_password(&request.password).await?;
    let user = users
        .create(NewUser {
            email: request.email,
            password_hash,
            role: ROLE_USER.to_string(),
        })
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::Conflict(
                "Account with that email address already exists".to_string(),
            ),
            other => ApiError::Database(other),
        })?;

    info!("Signed up user {}", user.id);
    issue_token(jwt, &user)
}

/// Exchange email and password for a bearer token
pub async fn login(
    users: &dyn UserRepository,
    jwt: &JwtService,
    request: LoginRequest,
) -> ApiResult<AuthResponse> {
    let Some(user) = users.find_by_email(&request.email).await? else {
        warn!("Login attempt for unknown email");
        return Err(ApiError::Unauthorized);
    };

    if !compare_password(&request.password, &user.password_hash).await? {
        warn!("Login attempt with wrong password for user {}", user.id);
        return Err(ApiError::Unauthorized);
    }

    info!("User {} logged in", user.id);
    issue_token(jwt, &user)
}

/// The requester's own account
pub async fn account(
    users: &dyn UserRepository,
    requester: &AuthUser,
) -> ApiResult<AccountResponse> {
    Ok(require_user(users, requester.id).await?.to_account())
}

/// Apply a partial profile update to the requester's account
pub async fn update_profile(
    users: &dyn UserRepository,
    requester: &AuthUser,
    update: ProfileUpdate,
) -> ApiResult<AccountResponse> {
    validate_profile(&update).map_err(ApiError::Validation)?;

    let mut profile = require_user(users, requester.id).await?.profile;
    profile.apply(update);

    let user = users
        .update_profile(requester.id, &profile)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(user.to_account())
}

/// Replace the requester's password
pub async fn change_password(
    users: &dyn UserRepository,
    requester: &AuthUser,
    request: PasswordChangeRequest,
) -> ApiResult<()> {
    validate_password(&request.password).map_err(ApiError::Validation)?;

    let password_hash = hash_password(&request.password).await?;
    if !users
        .update_password_hash(requester.id, &password_hash)
        .await?
    {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("User {} changed password", requester.id);
    Ok(())
}

/// Another user's public profile
pub async fn public_profile(users: &dyn UserRepository, id: Uuid) -> ApiResult<PublicUser> {
    Ok(require_user(users, id).await?.to_public())
}

/// Follow `target` if the requester does not yet, unfollow otherwise
pub async fn toggle_follow(
    users: &dyn UserRepository,
    requester: &AuthUser,
    target: Uuid,
) -> ApiResult<FollowState> {
    if target == requester.id {
        return Err(ApiError::Validation("You cannot follow yourself".to_string()));
    }

    let following = users
        .toggle_follower(target, requester.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(FollowState { following })
}
