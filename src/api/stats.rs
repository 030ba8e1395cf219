use actix_web::{get, put, web};
use chrono::Utc;
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::error::KithError;
use crate::model::{Friend, Id};
use crate::ops::friend_ops;
use crate::queries::friend_queries::{self, UpcomingBirthday};
use crate::queries::reminder_queries::{self, ReminderStatus};
use crate::queries::stats_queries::{self, NetworkStats};

const DEFAULT_BIRTHDAY_DAYS: i64 = 30;
const MAX_BIRTHDAY_DAYS: i64 = 366;

#[derive(Debug, Default, Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct BirthdayQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderUpdate {
    pub days: Option<i32>,
}

#[get("/stats")]
pub async fn network_stats(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> ApiResult<web::Json<NetworkStats>> {
    let stats = state
        .with_conn(move |conn| stats_queries::stats(conn, user.0, Utc::now()))
        .await?;
    Ok(web::Json(stats))
}

/// Due reminders, or every friend with an interval when `?all=true`.
#[get("/reminders")]
pub async fn reminders(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ReminderQuery>,
) -> ApiResult<web::Json<Vec<ReminderStatus>>> {
    let all = query.all;
    let statuses = state
        .with_conn(move |conn| {
            if all {
                reminder_queries::all_reminders(conn, user.0, Utc::now())
            } else {
                reminder_queries::due_reminders(conn, user.0, Utc::now())
            }
        })
        .await?;
    Ok(web::Json(statuses))
}

#[get("/friends/{id}/reminder")]
pub async fn friend_reminder(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<Option<ReminderStatus>>> {
    let friend_id = path.into_inner();
    let status = state
        .with_conn(move |conn| reminder_queries::reminder_status(conn, user.0, friend_id, Utc::now()))
        .await?;
    Ok(web::Json(status))
}

/// `{"days": 14}` sets the interval, `{"days": null}` clears it.
#[put("/friends/{id}/reminder")]
pub async fn set_friend_reminder(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
    payload: web::Json<ReminderUpdate>,
) -> ApiResult<web::Json<Friend>> {
    let friend_id = path.into_inner();
    let days = payload.into_inner().days;
    let friend = state
        .with_conn(move |conn| friend_ops::set_reminder(conn, user.0, friend_id, days))
        .await?;
    Ok(web::Json(friend))
}

#[get("/birthdays")]
pub async fn birthdays(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<BirthdayQuery>,
) -> ApiResult<web::Json<Vec<UpcomingBirthday>>> {
    let days = query.days.unwrap_or(DEFAULT_BIRTHDAY_DAYS);
    if !(0..=MAX_BIRTHDAY_DAYS).contains(&days) {
        return Err(KithError::invalid("days", "must be between 0 and 366"));
    }
    let upcoming = state
        .with_conn(move |conn| {
            friend_queries::upcoming_birthdays(conn, user.0, days, Utc::now().date_naive())
        })
        .await?;
    Ok(web::Json(upcoming))
}
