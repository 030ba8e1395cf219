use actix_session::Session;
use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::ApiResult;
use crate::api::session::{CurrentUser, INSTAGRAM_STATE_KEY};
use crate::api::state::AppState;
use crate::error::KithError;
use crate::integrations::gravatar::{self, GravatarLookup};
use crate::integrations::instagram::{self, Authorization};

const MAX_AVATAR_SIZE: u32 = 2048;

#[derive(Debug, Deserialize)]
pub struct GravatarQuery {
    pub email: String,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct InstagramExchange {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct InstagramUsername {
    pub username: String,
}

#[get("/gravatar")]
pub async fn gravatar_lookup(
    state: web::Data<AppState>,
    _user: CurrentUser,
    query: web::Query<GravatarQuery>,
) -> ApiResult<web::Json<GravatarLookup>> {
    let GravatarQuery { email, size } = query.into_inner();
    let size = size.unwrap_or(gravatar::DEFAULT_SIZE);
    if size == 0 || size > MAX_AVATAR_SIZE {
        return Err(KithError::invalid("size", "must be between 1 and 2048"));
    }
    let probe = state.gravatar_check;
    let lookup = state
        .blocking(move || gravatar::lookup(&email, size, probe))
        .await?;
    Ok(web::Json(lookup))
}

#[get("/instagram/authorize")]
pub async fn instagram_authorize(
    state: web::Data<AppState>,
    session: Session,
    _user: CurrentUser,
) -> ApiResult<web::Json<Authorization>> {
    let config = state
        .instagram
        .as_ref()
        .ok_or_else(|| KithError::NotConfigured("Instagram".into()))?;
    let csrf = instagram::new_state();
    session
        .insert(INSTAGRAM_STATE_KEY, &csrf)
        .map_err(|e| KithError::Other(format!("failed to persist session: {}", e)))?;
    Ok(web::Json(instagram::authorize_url(config, &csrf)?))
}

/// Completes the OAuth round trip started by `/instagram/authorize` in the
/// same session.
#[post("/instagram/exchange")]
pub async fn instagram_exchange(
    state: web::Data<AppState>,
    session: Session,
    user: CurrentUser,
    payload: web::Json<InstagramExchange>,
) -> ApiResult<web::Json<InstagramUsername>> {
    let config = state
        .instagram
        .clone()
        .ok_or_else(|| KithError::NotConfigured("Instagram".into()))?;
    let req = payload.into_inner();

    let expected = session
        .remove_as::<String>(INSTAGRAM_STATE_KEY)
        .and_then(Result::ok);
    if expected.as_deref() != Some(req.state.as_str()) {
        warn!(user_id = %user.0, "instagram state mismatch");
        return Err(KithError::Forbidden("OAuth state does not match".into()));
    }

    let profile = state
        .blocking(move || instagram::exchange_code(&config, &req.code))
        .await?;
    info!(user_id = %user.0, "instagram account linked");
    Ok(web::Json(InstagramUsername {
        username: profile.username,
    }))
}
