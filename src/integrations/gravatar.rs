use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{KithError, KithResult};
use crate::validation;

const AVATAR_BASE: &str = "https://gravatar.com/avatar";
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_SIZE: u32 = 200;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GravatarLookup {
    pub hash: String,
    pub url: String,
    /// `None` when the existence probe is disabled.
    pub exists: Option<bool>,
}

/// SHA-256 of the trimmed, lower-cased address, hex encoded.
pub fn gravatar_hash(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

pub fn avatar_url(hash: &str, size: u32) -> String {
    format!("{}/{}?s={}&d=identicon", AVATAR_BASE, hash, size)
}

/// Validates the email, builds the avatar URL and optionally asks Gravatar
/// whether a real image exists.
pub fn lookup(email: &str, size: u32, probe: bool) -> KithResult<GravatarLookup> {
    let email = validation::email(email, "email")?;
    let hash = gravatar_hash(&email);
    let exists = if probe { Some(has_avatar(&hash)?) } else { None };
    Ok(GravatarLookup {
        url: avatar_url(&hash, size),
        hash,
        exists,
    })
}

/// `d=404` makes Gravatar answer 404 instead of a placeholder image.
fn has_avatar(hash: &str) -> KithResult<bool> {
    let url = format!("{}/{}?d=404", AVATAR_BASE, hash);
    match ureq::head(&url).timeout(PROBE_TIMEOUT).call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::Status(404, _)) => Ok(false),
        Err(ureq::Error::Status(code, _)) => {
            Err(KithError::Upstream(format!("Gravatar answered HTTP {}", code)))
        }
        Err(ureq::Error::Transport(t)) => {
            Err(KithError::Upstream(format!("could not reach Gravatar: {}", t)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_normalizes_case_and_whitespace() {
        let expected = "84059b07d4be67b806386c0aad8070a23f18836bbaae342275dc0a83414c32ee";
        assert_eq!(gravatar_hash("MyEmailAddress@example.com "), expected);
        assert_eq!(gravatar_hash("myemailaddress@example.com"), expected);
    }

    #[test]
    fn lookup_without_probe_stays_offline() {
        let found = lookup("someone@example.com", 80, false).unwrap();
        assert_eq!(found.exists, None);
        assert!(found.url.ends_with("?s=80&d=identicon"));
        assert!(found.url.contains(&found.hash));
    }

    #[test]
    fn lookup_rejects_bad_email() {
        assert!(lookup("not-an-email", DEFAULT_SIZE, false).is_err());
    }
}
