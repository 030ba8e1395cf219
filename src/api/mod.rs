pub mod activities;
pub mod auth;
pub mod categories;
pub mod error;
pub mod friends;
pub mod health;
pub mod imports;
pub mod integrations;
pub mod relationships;
pub mod session;
pub mod shares;
pub mod state;
pub mod stats;

use actix_web::web;

use crate::error::KithError;

pub use session::{session_middleware, CurrentUser};
pub use state::AppState;

/// Image payloads arrive base64 encoded inside JSON.
const JSON_LIMIT: usize = 16 * 1024 * 1024;

/// Mounts the JSON API under `/api`. Every route except health and the
/// auth entry points needs a signed-in session.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| KithError::invalid("body", err.to_string()).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _req| KithError::invalid("query", err.to_string()).into());
    let path = web::PathConfig::default()
        .error_handler(|err, _req| KithError::invalid("id", err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json)
            .app_data(query)
            .app_data(path)
            .service(health::health)
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(auth::update_me)
            .service(auth::change_password)
            .service(friends::list_friends)
            .service(friends::create_friend)
            .service(friends::get_friend)
            .service(friends::update_friend)
            .service(friends::delete_friend)
            .service(friends::archive_friend)
            .service(friends::unarchive_friend)
            .service(friends::add_contact)
            .service(friends::set_categories)
            .service(friends::friend_activities)
            .service(friends::introductions)
            .service(stats::friend_reminder)
            .service(stats::set_friend_reminder)
            .service(friends::relabel_contact)
            .service(friends::remove_contact)
            .service(categories::list_categories)
            .service(categories::create_category)
            .service(categories::rename_category)
            .service(categories::delete_category)
            .service(categories::archive_category)
            .service(categories::unarchive_category)
            .service(categories::category_friends)
            .service(relationships::list_relationships)
            .service(relationships::create_relationship)
            .service(relationships::delete_relationship)
            .service(activities::contact_gaps)
            .service(activities::list_activities)
            .service(activities::log_activity)
            .service(activities::delete_activity)
            .service(stats::network_stats)
            .service(stats::reminders)
            .service(stats::birthdays)
            .service(shares::list_shares)
            .service(shares::create_share)
            .service(shares::accept_share)
            .service(shares::decline_share)
            .service(shares::cancel_share)
            .service(imports::import_vcard)
            .service(imports::import_text)
            .service(imports::face_region)
            .service(imports::commit_import)
            .service(integrations::gravatar_lookup)
            .service(integrations::instagram_authorize)
            .service(integrations::instagram_exchange),
    );
}
