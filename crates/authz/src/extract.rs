use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use libris_kernel::settings::AuthSettings;

use crate::gate::{gate, GateOutcome};
use crate::session::{SessionContext, SessionId, SessionStore, UserIdentity, LOGIN_KEY};

/// Session store plus the cookie and redirect conventions around it.
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
    cookie_name: Arc<str>,
    login_path: Arc<str>,
}

impl Sessions {
    pub fn new(store: Arc<dyn SessionStore>, settings: &AuthSettings) -> Self {
        Self {
            store,
            cookie_name: settings.session_cookie.as_str().into(),
            login_path: settings.login_path.as_str().into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Session id carried by the request cookie, if well-formed.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        cookie_value(headers, &self.cookie_name)?.parse().ok()
    }

    /// Create a session holding `identity` and return its id.
    pub async fn open(&self, identity: &UserIdentity) -> anyhow::Result<SessionId> {
        let mut context = SessionContext::new();
        context.insert(LOGIN_KEY, identity)?;
        let id = SessionId::generate();
        self.store.save(id, context).await?;
        tracing::info!(user_id = %identity.user_id, "session opened");
        Ok(id)
    }

    /// Drop the session referenced by the request, if any.
    pub async fn close(&self, headers: &HeaderMap) -> anyhow::Result<()> {
        if let Some(id) = self.session_id(headers) {
            self.store.remove(&id).await?;
        }
        Ok(())
    }

    /// `Set-Cookie` value binding the client to `id`.
    pub fn cookie(&self, id: SessionId) -> String {
        format!("{}={}; HttpOnly; SameSite=Lax; Path=/", self.cookie_name, id)
    }

    /// `Set-Cookie` value clearing the session cookie.
    pub fn expired_cookie(&self) -> String {
        format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", self.cookie_name)
    }

    /// Run the login gate against the session referenced by `headers`.
    ///
    /// Store failures close the gate.
    pub async fn resolve(&self, headers: &HeaderMap) -> GateOutcome {
        let context = match self.session_id(headers) {
            Some(id) => match self.store.load(&id).await {
                Ok(context) => context,
                Err(err) => {
                    tracing::warn!(error = %err, "session lookup failed; treating as logged out");
                    None
                }
            },
            None => None,
        };
        gate(context.as_ref(), &self.login_path)
    }
}

/// Logged-in identity of the caller.
///
/// Handlers taking this extractor never run for anonymous callers; those are
/// answered with [`LoginRequired`].
#[derive(Debug, Clone)]
pub struct SessionUser(pub UserIdentity);

/// Rejection sending the caller to the login page.
#[derive(Debug, Clone)]
pub struct LoginRequired {
    pub location: String,
}

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        Redirect::to(&self.location).into_response()
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    Sessions: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LoginRequired;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Sessions::from_ref(state);
        match sessions.resolve(&parts.headers).await {
            GateOutcome::Admitted(identity) => Ok(SessionUser(identity)),
            GateOutcome::Redirect(location) => {
                tracing::debug!(%location, "no logged-in identity; redirecting");
                Err(LoginRequired { location })
            }
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
