use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{category_repo, user_repo};
use crate::error::{KithError, KithResult};
use crate::model::{Category, Id, User};
use crate::validation::{self, trim_optional};

const BAD_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

/// Creates an account with the default categories.
pub fn register(conn: &Connection, name: &str, email: &str, password: &str) -> KithResult<User> {
    let valid_name = validation::non_blank(name, "name")?;
    let valid_email = validation::email(email, "email")?;
    validation::password(password, "password")?;

    if user_repo::find_by_email(conn, &valid_email)?.is_some() {
        return Err(KithError::AlreadyExists {
            entity_type: "User".into(),
            identifier: valid_email,
        });
    }

    let user = User::create(valid_name, valid_email, hash_password(password)?);
    let tx = conn.unchecked_transaction()?;
    user_repo::insert(&tx, &user)?;
    for category in Category::defaults() {
        category_repo::insert(&tx, user.id, &category)?;
    }
    tx.commit()?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Unknown emails and wrong passwords fail identically.
pub fn login(conn: &Connection, email: &str, password: &str) -> KithResult<User> {
    let user = user_repo::find_by_email(conn, email)?
        .ok_or_else(|| KithError::Unauthorized(BAD_CREDENTIALS.into()))?;
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "failed login");
        return Err(KithError::Unauthorized(BAD_CREDENTIALS.into()));
    }
    Ok(user)
}

pub fn require_user(conn: &Connection, user_id: Id<User>) -> KithResult<User> {
    user_repo::find_by_id(conn, user_id)?.ok_or_else(|| KithError::not_found("User", user_id))
}

/// Present fields are applied; blank optional fields clear the value.
pub fn update_profile(conn: &Connection, user_id: Id<User>, update: ProfileUpdate) -> KithResult<User> {
    let mut user = require_user(conn, user_id)?;
    if let Some(name) = update.name {
        user.name = validation::non_blank(&name, "name")?;
    }
    if let Some(bio) = update.bio {
        user.bio = trim_optional(Some(&bio));
    }
    if let Some(location) = update.location {
        user.location = trim_optional(Some(&location));
    }
    if let Some(avatar_url) = update.avatar_url {
        user.avatar_url = trim_optional(Some(&avatar_url))
            .map(|url| validation::image_url(&url, "avatarUrl"))
            .transpose()?;
    }
    user_repo::update_profile(conn, &user)?;
    Ok(user)
}

pub fn change_password(
    conn: &Connection,
    user_id: Id<User>,
    current: &str,
    new_password: &str,
) -> KithResult<()> {
    let user = require_user(conn, user_id)?;
    if !verify_password(current, &user.password_hash) {
        return Err(KithError::Forbidden("current password is incorrect".into()));
    }
    validation::password(new_password, "newPassword")?;
    user_repo::update_password(conn, user_id, &hash_password(new_password)?)?;
    info!(user_id = %user_id, "password changed");
    Ok(())
}

fn hash_password(password: &str) -> KithResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| KithError::Other(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}
