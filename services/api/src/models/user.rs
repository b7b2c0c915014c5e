//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Role name granting moderation rights over every track
pub const ROLE_ADMIN: &str = "admin";

/// Role assigned on sign up
pub const ROLE_USER: &str = "user";

/// Avatar edge length used when the caller does not ask for one
pub const DEFAULT_AVATAR_SIZE: u32 = 200;

/// Public profile fields of an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub gender: String,
    pub location: String,
    pub website: String,
    pub picture: String,
}

impl Profile {
    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(website) = update.website {
            self.website = website;
        }
        if let Some(picture) = update.picture {
            self.picture = picture;
        }
    }
}

/// User entity as stored
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub role: String,
    pub profile: Profile,
    pub followers: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Gravatar URL for this account's email
    pub fn gravatar(&self, size: u32) -> String {
        gravatar(&self.email, size)
    }

    /// Private view returned to the account owner
    pub fn to_account(&self) -> AccountResponse {
        AccountResponse {
            id: self.id,
            email: self.email.clone(),
            role: self.role.clone(),
            profile: self.profile.clone(),
            followers: self.followers.len(),
            gravatar: self.gravatar(DEFAULT_AVATAR_SIZE),
            created_at: self.created_at,
        }
    }

    /// View of the account visible to other users
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            profile: self.profile.clone(),
            followers: self.followers.len(),
            gravatar: self.gravatar(DEFAULT_AVATAR_SIZE),
        }
    }

    /// Summary embedded into track listings
    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.profile.name.clone(),
            gender: self.profile.gender.clone(),
            location: self.profile.location.clone(),
            website: self.profile.website.clone(),
            picture: self.profile.picture.clone(),
        }
    }
}

/// Derive a Gravatar URL from an email address.
///
/// The email is hashed as given, so differently-cased addresses map to
/// different avatars. An empty email yields the generic fallback avatar.
pub fn gravatar(email: &str, size: u32) -> String {
    if email.is_empty() {
        return format!("https://gravatar.com/avatar/?s={size}&d=retro");
    }

    let hash = Sha256::digest(email.as_bytes());
    format!("https://gravatar.com/avatar/{hash:x}?s={size}&d=retro")
}

/// New user creation payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub picture: Option<String>,
}

/// Owner view of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub profile: Profile,
    pub followers: usize,
    pub gravatar: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub profile: Profile,
    pub followers: usize,
    pub gravatar: String,
}

/// Author fields embedded into each listed track.
///
/// Only public profile data lives here; credentials, email and relation
/// lists have no field to leak through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
    pub location: String,
    pub website: String,
    pub picture: String,
}

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change request
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChangeRequest {
    pub password: String,
}

/// Token issued on sign up and log in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: AccountResponse,
}

/// Result of a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowState {
    pub following: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            password_reset_token: Some("reset".to_string()),
            password_reset_expires: None,
            role: ROLE_USER.to_string(),
            profile: Profile {
                name: "Ada".to_string(),
                ..Profile::default()
            },
            followers: vec![Uuid::new_v4()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gravatar_is_deterministic() {
        let first = gravatar("ada@example.com", 200);
        let second = gravatar("ada@example.com", 200);
        assert_eq!(first, second);
        assert!(first.starts_with("https://gravatar.com/avatar/"));
        assert!(first.ends_with("?s=200&d=retro"));
    }

    #[test]
    fn test_gravatar_is_case_sensitive() {
        assert_ne!(
            gravatar("Ada@example.com", 200),
            gravatar("ada@example.com", 200)
        );
    }

    #[test]
    fn test_gravatar_embeds_size_and_hash() {
        let url = gravatar("ada@example.com", 64);
        let hash = url
            .strip_prefix("https://gravatar.com/avatar/")
            .and_then(|rest| rest.strip_suffix("?s=64&d=retro"))
            .unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_gravatar_without_email_falls_back() {
        assert_eq!(
            gravatar("", DEFAULT_AVATAR_SIZE),
            "https://gravatar.com/avatar/?s=200&d=retro"
        );
    }

    #[test]
    fn test_author_summary_hides_private_fields() {
        let json = serde_json::to_value(user("ada@example.com").author_summary()).unwrap();
        let object = json.as_object().unwrap();

        for hidden in [
            "password",
            "password_hash",
            "email",
            "followers",
            "likedPlaylists",
            "likedTracks",
        ] {
            assert!(!object.contains_key(hidden), "{hidden} leaked");
        }
        assert_eq!(object["name"], "Ada");
    }

    #[test]
    fn test_account_view_hides_credentials() {
        let json = serde_json::to_value(user("ada@example.com").to_account()).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("passwordResetToken"));
        assert_eq!(object["followers"], 1);
    }

    #[test]
    fn test_profile_apply_keeps_absent_fields() {
        let mut profile = Profile {
            name: "Ada".to_string(),
            location: "London".to_string(),
            ..Profile::default()
        };
        profile.apply(ProfileUpdate {
            website: Some("https://ada.dev".to_string()),
            ..ProfileUpdate::default()
        });
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.location, "London");
        assert_eq!(profile.website, "https://ada.dev");
    }
}
