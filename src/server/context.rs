//! Request-scoped session context
//!
//! Loads the session record named by the request's cookie and writes it back
//! through the injected [`SessionStore`] when the response is produced.

use crate::server::core::AppState;
use crate::session::{ClientId, SessionData, resolve_identity};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::convert::Infallible;
use uuid::Uuid;

pub struct RequestContext {
    jar: CookieJar,
    key: String,
    session: SessionData,
    is_new: bool,
    dirty: bool,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let existing = jar
            .get(&state.config.session_cookie)
            .map(|cookie| cookie.value().to_string())
            .and_then(|key| state.sessions.get(&key).map(|session| (key, session)));

        let context = match existing {
            Some((key, session)) => Self {
                jar,
                key,
                session,
                is_new: false,
                dirty: false,
            },
            None => Self {
                jar,
                key: Uuid::new_v4().simple().to_string(),
                session: SessionData::default(),
                is_new: true,
                dirty: false,
            },
        };

        Ok(context)
    }
}

impl RequestContext {
    /// Client id of this session, creating one if needed
    pub fn identity(&mut self) -> ClientId {
        if self.session.client_id.is_none() {
            self.dirty = true;
        }
        resolve_identity(&mut self.session)
    }

    /// Mutable access for operations that rebind the identity
    pub fn session_mut(&mut self) -> &mut SessionData {
        self.dirty = true;
        &mut self.session
    }

    /// Queues a one-shot message for the next rendered listing.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.session.flashes.push(message.into());
        self.dirty = true;
    }

    /// Drains pending flash messages.
    pub fn take_flashes(&mut self) -> Vec<String> {
        if !self.session.flashes.is_empty() {
            self.dirty = true;
        }
        std::mem::take(&mut self.session.flashes)
    }

    /// Persists the session and attaches its cookie to `response`.
    ///
    /// Untouched fresh sessions are not stored, so requests that never need an
    /// identity (admin, favicon) do not hand out cookies.
    pub fn finish(self, state: &AppState, response: impl IntoResponse) -> Response {
        if self.is_new && !self.dirty {
            return response.into_response();
        }

        let ttl = state.config.session_ttl();
        let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        state.sessions.set(&self.key, self.session, ttl);

        let cookie = Cookie::build((state.config.session_cookie.clone(), self.key))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build();

        (self.jar.add(cookie), response).into_response()
    }
}
