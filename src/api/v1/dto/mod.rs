/*
 * Responsibility
 * - request/response DTOs for v1
 * - request bodies validate their own shape; owner ids never come from the body
 */
pub mod auth;
pub mod experiences;
pub mod portfolio;
pub mod posts;
pub mod profiles;
pub mod projects;
pub mod social_media;
pub mod tools;
pub mod users;

/// Shape checks run before a request body reaches a service.
pub trait Validate {
    fn validate(&self) -> Result<(), &'static str>;
}

pub(crate) fn required(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(message);
    }
    Ok(())
}

pub(crate) fn not_blank(value: &Option<String>, message: &'static str) -> Result<(), &'static str> {
    match value {
        Some(v) if v.trim().is_empty() => Err(message),
        _ => Ok(()),
    }
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

/// Tri-state for nullable columns:
/// - field missing: `None` (do not update)
/// - `null`: `Some(None)` (set NULL)
/// - value: `Some(Some(v))`
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(looks_like_email("me@example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("me@example"));
        assert!(!looks_like_email("me@@example.com"));
        assert!(!looks_like_email("me@example..com"));
    }
}
