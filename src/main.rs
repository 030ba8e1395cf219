use std::path::Path;

use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};

use kith::api::{self, session_middleware, AppState};
use kith::config::Settings;
use kith::{db, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = Settings::parse();
    telemetry::init(settings.log_format);

    let conn = db::open(&settings.database).map_err(std::io::Error::other)?;
    info!(path = %settings.database.display(), "database ready");

    let key = match &settings.session_key_file {
        Some(path) => load_key(path)?,
        None => {
            warn!("no session key file configured; sessions end on restart");
            Key::generate()
        }
    };

    let state = web::Data::new(AppState::new(conn, &settings));
    let cookie_secure = settings.cookie_secure;

    info!(bind = %settings.bind, port = settings.port, "starting server");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure))
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((settings.bind.as_str(), settings.port))?
    .run()
    .await
}

fn load_key(path: &Path) -> std::io::Result<Key> {
    let bytes = std::fs::read(path)?;
    Key::try_from(bytes.as_slice()).map_err(|e| {
        std::io::Error::other(format!(
            "session key at {} is unusable: {}",
            path.display(),
            e
        ))
    })
}
