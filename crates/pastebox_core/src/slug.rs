//! Paste and attachment slug helpers.

use crate::constants::{SLUG_LONG_LEN, SLUG_MAX_LEN, SLUG_SHORT_LEN};
use crate::error::AppError;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a random alphanumeric slug.
///
/// Long slugs are meant for pastes whose address doubles as a shared secret.
pub fn generate_slug(long: bool) -> String {
    let len = if long { SLUG_LONG_LEN } else { SLUG_SHORT_LEN };
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a slug that does not collide according to `exists_check`.
///
/// # Errors
/// Propagates errors from `exists_check`.
pub fn generate_unique_slug<F>(long: bool, mut exists_check: F) -> Result<String, AppError>
where
    F: FnMut(&str) -> Result<bool, AppError>,
{
    loop {
        let slug = generate_slug(long);
        if !exists_check(&slug)? {
            return Ok(slug);
        }
    }
}

/// Validate a caller-provided slug.
///
/// Accepts 1..=128 characters from `[A-Za-z0-9._-]`, excluding `.` and `..`.
///
/// # Errors
/// [`AppError::BadRequest`] describing the first violated rule.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() {
        return Err(AppError::BadRequest("Slug must not be empty".to_string()));
    }
    if slug.len() > SLUG_MAX_LEN {
        return Err(AppError::BadRequest(format!(
            "Slug exceeds maximum of {} characters",
            SLUG_MAX_LEN
        )));
    }
    if slug == "." || slug == ".." {
        return Err(AppError::BadRequest("Slug must not be a dot path".to_string()));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(AppError::BadRequest(format!(
            "Slug contains unsupported character '{}'",
            bad
        )));
    }
    Ok(())
}
