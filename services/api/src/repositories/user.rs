//! User repository for PostgreSQL

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::UserRepository;
use crate::models::user::{NewUser, Profile, User};

const USER_COLUMNS: &str = "id, email, password_hash, password_reset_token, \
     password_reset_expires, role, name, gender, location, website, picture, \
     followers, created_at, updated_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        password_reset_token: row.get("password_reset_token"),
        password_reset_expires: row.get("password_reset_expires"),
        role: row.get("role"),
        profile: Profile {
            name: row.get("name"),
            gender: row.get("gender"),
            location: row.get("location"),
            website: row.get("website"),
            picture: row.get("picture"),
        },
        followers: row.get("followers"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.email);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(user_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_profile(&self, id: Uuid, profile: &Profile) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = $2, gender = $3, location = $4, website = $5, picture = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.gender)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(&profile.picture)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_reset_token = NULL,
                password_reset_expires = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_follower(&self, id: Uuid, follower: Uuid) -> DatabaseResult<Option<bool>> {
        let following: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET followers = CASE
                    WHEN $2 = ANY(followers) THEN array_remove(followers, $2)
                    ELSE array_append(followers, $2)
                END
            WHERE id = $1
            RETURNING $2 = ANY(followers)
            "#,
        )
        .bind(id)
        .bind(follower)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(following)
    }
}
