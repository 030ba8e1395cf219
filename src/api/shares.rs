use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::model::{ContactShare, Friend, Id};
use crate::ops::share_ops;
use crate::queries::share_queries::{self, ShareInbox};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShare {
    pub friend_id: Id<Friend>,
    pub recipient_email: String,
    pub message: Option<String>,
}

#[get("/shares")]
pub async fn list_shares(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> ApiResult<web::Json<ShareInbox>> {
    let inbox = state
        .with_conn(move |conn| share_queries::inbox(conn, user.0))
        .await?;
    Ok(web::Json(inbox))
}

#[post("/shares")]
pub async fn create_share(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<NewShare>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let share = state
        .with_conn(move |conn| {
            share_ops::share_friend(
                conn,
                user.0,
                req.friend_id,
                &req.recipient_email,
                req.message.as_deref(),
            )
        })
        .await?;
    Ok(HttpResponse::Created().json(share))
}

/// Responds with the friend created in the recipient's network.
#[post("/shares/{id}/accept")]
pub async fn accept_share(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<ContactShare>>,
) -> ApiResult<HttpResponse> {
    let share_id = path.into_inner();
    let friend = state
        .with_conn(move |conn| share_ops::accept_share(conn, user.0, share_id))
        .await?;
    Ok(HttpResponse::Created().json(friend))
}

#[post("/shares/{id}/decline")]
pub async fn decline_share(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<ContactShare>>,
) -> ApiResult<web::Json<ContactShare>> {
    let share_id = path.into_inner();
    let share = state
        .with_conn(move |conn| share_ops::decline_share(conn, user.0, share_id))
        .await?;
    Ok(web::Json(share))
}

#[delete("/shares/{id}")]
pub async fn cancel_share(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<ContactShare>>,
) -> ApiResult<HttpResponse> {
    let share_id = path.into_inner();
    state
        .with_conn(move |conn| share_ops::cancel_share(conn, user.0, share_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
