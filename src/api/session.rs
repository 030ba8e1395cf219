use std::future::{ready, Ready};

use actix_session::{storage::CookieSessionStore, Session, SessionExt, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use tracing::warn;

use crate::error::{KithError, KithResult};
use crate::model::{Id, User};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const INSTAGRAM_STATE_KEY: &str = "instagram_state";
pub const COOKIE_NAME: &str = "session";

/// Cookie sessions holding only the signed-in user's id.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(COOKIE_NAME.into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Starts a fresh session for `user_id`.
pub fn persist_user(session: &Session, user_id: Id<User>) -> KithResult<()> {
    session.renew();
    session
        .insert(USER_ID_KEY, user_id.to_db())
        .map_err(|e| KithError::Other(format!("failed to persist session: {}", e)))
}

pub fn session_user(session: &Session) -> KithResult<Option<Id<User>>> {
    let raw = session
        .get::<String>(USER_ID_KEY)
        .map_err(|e| KithError::Other(format!("failed to read session: {}", e)))?;
    Ok(raw.and_then(|raw| match Id::parse(&raw) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "invalid user id in session cookie");
            None
        }
    }))
}

/// The signed-in user. Extracting it fails with 401 when nobody is signed in.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Id<User>);

impl FromRequest for CurrentUser {
    type Error = KithError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = session_user(&req.get_session()).and_then(|id| {
            id.map(CurrentUser)
                .ok_or_else(|| KithError::Unauthorized("login required".into()))
        });
        ready(user)
    }
}
