use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::{KithError, KithResult};

const AUTHORIZE_URL: &str = "https://api.instagram.com/oauth/authorize";
const TOKEN_URL: &str = "https://api.instagram.com/oauth/access_token";
const PROFILE_URL: &str = "https://graph.instagram.com/me";
const SCOPE: &str = "user_profile";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl InstagramConfig {
    /// All three values are required; anything missing disables the proxy.
    pub fn from_parts(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            client_id: client_id.filter(|s| !s.is_empty())?,
            client_secret: client_secret.filter(|s| !s.is_empty())?,
            redirect_uri: redirect_uri.filter(|s| !s.is_empty())?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub url: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramProfile {
    pub id: String,
    pub username: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Random hex token tying the callback to the session that started it.
pub fn new_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn authorize_url(config: &InstagramConfig, state: &str) -> KithResult<Authorization> {
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", SCOPE),
            ("response_type", "code"),
            ("state", state),
        ],
    )
    .map_err(|e| KithError::Other(format!("bad authorize URL: {}", e)))?;
    Ok(Authorization {
        url: url.into(),
        state: state.to_string(),
    })
}

/// Exchanges an authorization code and fetches the profile it grants. The
/// access token is used once and dropped.
pub fn exchange_code(config: &InstagramConfig, code: &str) -> KithResult<InstagramProfile> {
    let code = code.trim();
    if code.is_empty() {
        return Err(KithError::BlankField {
            field: "code".into(),
        });
    }

    let token: TokenResponse = ureq::post(TOKEN_URL)
        .timeout(REQUEST_TIMEOUT)
        .send_form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code", code),
        ])
        .map_err(upstream("token exchange"))?
        .into_json()
        .map_err(|e| KithError::Upstream(format!("unreadable token response: {}", e)))?;

    ureq::get(PROFILE_URL)
        .timeout(REQUEST_TIMEOUT)
        .query("fields", "id,username")
        .query("access_token", &token.access_token)
        .call()
        .map_err(upstream("profile fetch"))?
        .into_json()
        .map_err(|e| KithError::Upstream(format!("unreadable profile response: {}", e)))
}

fn upstream(step: &'static str) -> impl Fn(ureq::Error) -> KithError {
    move |e| match e {
        ureq::Error::Status(code, resp) => {
            let body: String = resp.into_string().unwrap_or_default().chars().take(200).collect();
            warn!(step, status = code, body = %body, "instagram request failed");
            KithError::Upstream(format!("Instagram {} failed (HTTP {})", step, code))
        }
        ureq::Error::Transport(t) => KithError::Upstream(format!("could not reach Instagram: {}", t)),
    }
}
