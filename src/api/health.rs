use actix_web::{get, web};
use serde::Serialize;

use crate::api::error::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Answers once the database is reachable.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> ApiResult<web::Json<Health>> {
    state
        .with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await?;
    Ok(web::Json(Health { status: "ok" }))
}
