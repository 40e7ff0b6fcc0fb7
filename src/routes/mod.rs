pub mod home;
pub mod posts;
pub mod tags;
pub mod users;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// Integer id from the `{id}` path segment. Anything that isn't an integer
/// is treated like an unknown route.
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(RecordId(id))
    }
}

/// Raw urlencoded pairs from a form body. Keeps repeated keys, which the
/// multi-select `tags` and `posts` fields rely on.
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value submitted under `key`, if any.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// First value submitted under `key`; absent is a 400.
    pub fn required(&self, key: &str) -> Result<String, AppError> {
        self.optional(key)
            .ok_or_else(|| AppError::BadRequest(format!("missing form field `{key}`")))
    }

    /// Every value under `key` that parses as an id. Unparseable values are
    /// dropped, the same as ids that match no record.
    pub fn ids(&self, key: &str) -> Vec<i64> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .filter_map(|(_, v)| v.trim().parse().ok())
            .collect()
    }
}

/// Id/label pair for a checkbox in a multi-select form.
pub struct Choice {
    pub id: i64,
    pub label: String,
    pub checked: bool,
}
