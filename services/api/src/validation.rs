//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::user::ProfileUpdate;

/// Longest accepted track name, in characters
pub const MAX_TRACK_NAME_CHARS: usize = 200;

/// Longest accepted URL-valued profile field, in bytes
const MAX_URL_LEN: usize = 2048;

/// Longest accepted free-text profile field, in characters
const MAX_PROFILE_TEXT_CHARS: usize = 100;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a track name and return it trimmed
pub fn validate_track_name(name: Option<&str>) -> Result<String, String> {
    let name = name.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err("Track name is required".to_string());
    }

    if name.chars().count() > MAX_TRACK_NAME_CHARS {
        return Err(format!(
            "Track name must be at most {MAX_TRACK_NAME_CHARS} characters long"
        ));
    }

    Ok(name.to_string())
}

/// Validate the fields present in a profile update
pub fn validate_profile(update: &ProfileUpdate) -> Result<(), String> {
    let text_fields = [
        ("Name", &update.name),
        ("Gender", &update.gender),
        ("Location", &update.location),
    ];
    for (label, value) in text_fields {
        if let Some(value) = value {
            if value.chars().count() > MAX_PROFILE_TEXT_CHARS {
                return Err(format!(
                    "{label} must be at most {MAX_PROFILE_TEXT_CHARS} characters long"
                ));
            }
        }
    }

    let url_fields = [("Website", &update.website), ("Picture", &update.picture)];
    for (label, value) in url_fields {
        if let Some(value) = value {
            validate_url(label, value)?;
        }
    }

    Ok(())
}

/// Empty clears the field; anything else must be an http(s) URL
fn validate_url(label: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }

    if value.len() > MAX_URL_LEN {
        return Err(format!("{label} must be at most {MAX_URL_LEN} characters long"));
    }

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| {
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Failed to compile URL regex")
    });

    if !regex.is_match(value) {
        return Err(format!("{label} must be an http or https URL"));
    }

    Ok(())
}
