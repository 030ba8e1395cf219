use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::error::KithError;
use crate::model::{Activity, Id};
use crate::ops::activity_ops::{self, NewActivity};
use crate::queries::activity_queries::{self, ActivityEntry, ContactGap};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;
const DEFAULT_GAP_DAYS: i64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GapQuery {
    pub days: Option<i64>,
}

/// Newest first. A `from`/`to` bound switches to a range query; `limit`
/// caps either form.
#[get("/activities")]
pub async fn list_activities(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ActivityQuery>,
) -> ApiResult<web::Json<Vec<ActivityEntry>>> {
    let ActivityQuery { from, to, limit } = query.into_inner();
    let limit = match limit {
        Some(0) => return Err(KithError::invalid("limit", "must be positive")),
        Some(n) => n.min(MAX_LIMIT),
        None => DEFAULT_LIMIT,
    };
    let entries = state
        .with_conn(move |conn| {
            if from.is_none() && to.is_none() {
                return activity_queries::recent(conn, user.0, limit);
            }
            let from = from.unwrap_or(DateTime::UNIX_EPOCH);
            let to = to.unwrap_or_else(Utc::now);
            let mut entries = activity_queries::in_range(conn, user.0, from, to)?;
            entries.truncate(limit);
            Ok(entries)
        })
        .await?;
    Ok(web::Json(entries))
}

#[post("/activities")]
pub async fn log_activity(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<NewActivity>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner();
    let activity = state
        .with_conn(move |conn| activity_ops::log_activity(conn, user.0, input, Utc::now()))
        .await?;
    Ok(HttpResponse::Created().json(activity))
}

#[delete("/activities/{id}")]
pub async fn delete_activity(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Activity>>,
) -> ApiResult<HttpResponse> {
    let activity_id = path.into_inner();
    state
        .with_conn(move |conn| activity_ops::delete_activity(conn, user.0, activity_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Friends not contacted in `days` (default 30) days.
#[get("/activities/gaps")]
pub async fn contact_gaps(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<GapQuery>,
) -> ApiResult<web::Json<Vec<ContactGap>>> {
    let days = query.days.unwrap_or(DEFAULT_GAP_DAYS);
    if days < 0 {
        return Err(KithError::invalid("days", "must not be negative"));
    }
    let gaps = state
        .with_conn(move |conn| activity_queries::not_contacted_in(conn, user.0, days, Utc::now()))
        .await?;
    Ok(web::Json(gaps))
}
