//! One-shot messages carried across a redirect.
//!
//! Mutating handlers return a [`Flash`]: a 303 redirect with the message
//! attached as a response extension. [`persist_flash`] moves that message
//! into the session, and the next page render drains it through
//! [`Flashes`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub redirect_to: String,
    pub message: String,
}

impl Flash {
    pub fn new(redirect_to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct FlashMessage(String);

impl IntoResponse for Flash {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.redirect_to).into_response();
        response.extensions_mut().insert(FlashMessage(self.message));
        response
    }
}

/// Appends any message a handler attached to its response to the session.
pub async fn persist_flash(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut response = next.run(request).await;

    if let Some(FlashMessage(message)) = response.extensions_mut().remove::<FlashMessage>() {
        let mut pending: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
        pending.push(message);
        session.insert(FLASH_KEY, pending).await?;
    }

    Ok(response)
}

/// Handle on the session's pending flash messages. Nothing is read until
/// [`Layout::new`] drains it, so a request that fails before rendering a
/// page leaves the messages for the next one.
pub struct Flashes(Option<Session>);

impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await.ok();
        Ok(Flashes(session))
    }
}

impl Flashes {
    /// Removes and returns the pending messages.
    pub async fn take(self) -> Vec<String> {
        let Some(session) = self.0 else {
            return Vec::new();
        };

        session
            .remove(FLASH_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

/// Data every page passes to `base.html`.
pub struct Layout {
    pub flashes: Vec<String>,
    pub static_hash: &'static str,
}

impl Layout {
    pub async fn new(flashes: Flashes) -> Self {
        Self::with_messages(flashes.take().await)
    }

    fn with_messages(flashes: Vec<String>) -> Self {
        Self {
            flashes,
            static_hash: crate::STATIC_HASH,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::with_messages(Vec::new())
    }
}
