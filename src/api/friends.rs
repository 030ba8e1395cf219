use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::model::{Activity, Category, ContactEntry, Friend, Id};
use crate::ops::contact_ops::{self, NewContact};
use crate::ops::friend_ops::{self, FriendPatch, NewFriend};
use crate::ops::category_ops;
use crate::queries::activity_queries;
use crate::queries::friend_queries::{self, FriendDetail, FriendFilter};
use crate::queries::relationship_queries;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIds {
    pub category_ids: Vec<Id<Category>>,
}

#[derive(Debug, Deserialize)]
pub struct LabelUpdate {
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Introductions {
    pub introduced_by: Vec<Friend>,
    pub introduced: Vec<Friend>,
}

#[get("/friends")]
pub async fn list_friends(
    state: web::Data<AppState>,
    user: CurrentUser,
    filter: web::Query<FriendFilter>,
) -> ApiResult<web::Json<Vec<Friend>>> {
    let filter = filter.into_inner();
    let friends = state
        .with_conn(move |conn| friend_queries::list_friends(conn, user.0, &filter))
        .await?;
    Ok(web::Json(friends))
}

#[post("/friends")]
pub async fn create_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<NewFriend>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner();
    let friend = state
        .with_conn(move |conn| friend_ops::add_friend(conn, user.0, input))
        .await?;
    Ok(HttpResponse::Created().json(friend))
}

#[get("/friends/{id}")]
pub async fn get_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<FriendDetail>> {
    let friend_id = path.into_inner();
    let detail = state
        .with_conn(move |conn| friend_queries::friend_detail(conn, user.0, friend_id, Utc::now()))
        .await?;
    Ok(web::Json(detail))
}

#[put("/friends/{id}")]
pub async fn update_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
    payload: web::Json<FriendPatch>,
) -> ApiResult<web::Json<Friend>> {
    let friend_id = path.into_inner();
    let patch = payload.into_inner();
    let friend = state
        .with_conn(move |conn| friend_ops::update_friend(conn, user.0, friend_id, patch))
        .await?;
    Ok(web::Json(friend))
}

#[delete("/friends/{id}")]
pub async fn delete_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<HttpResponse> {
    let friend_id = path.into_inner();
    state
        .with_conn(move |conn| friend_ops::delete_friend(conn, user.0, friend_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/friends/{id}/archive")]
pub async fn archive_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<Friend>> {
    let friend_id = path.into_inner();
    let friend = state
        .with_conn(move |conn| friend_ops::archive_friend(conn, user.0, friend_id))
        .await?;
    Ok(web::Json(friend))
}

#[post("/friends/{id}/unarchive")]
pub async fn unarchive_friend(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<Friend>> {
    let friend_id = path.into_inner();
    let friend = state
        .with_conn(move |conn| friend_ops::unarchive_friend(conn, user.0, friend_id))
        .await?;
    Ok(web::Json(friend))
}

#[post("/friends/{id}/contacts")]
pub async fn add_contact(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
    payload: web::Json<NewContact>,
) -> ApiResult<HttpResponse> {
    let friend_id = path.into_inner();
    let contact = payload.into_inner();
    let entry = state
        .with_conn(move |conn| contact_ops::add_contact(conn, user.0, friend_id, contact))
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

#[put("/friends/{id}/categories")]
pub async fn set_categories(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
    payload: web::Json<CategoryIds>,
) -> ApiResult<web::Json<Vec<Category>>> {
    let friend_id = path.into_inner();
    let ids = payload.into_inner().category_ids;
    let categories = state
        .with_conn(move |conn| category_ops::set_categories(conn, user.0, friend_id, ids))
        .await?;
    Ok(web::Json(categories))
}

#[get("/friends/{id}/activities")]
pub async fn friend_activities(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<Vec<Activity>>> {
    let friend_id = path.into_inner();
    let activities = state
        .with_conn(move |conn| activity_queries::activities_for(conn, user.0, friend_id))
        .await?;
    Ok(web::Json(activities))
}

#[get("/friends/{id}/introductions")]
pub async fn introductions(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Friend>>,
) -> ApiResult<web::Json<Introductions>> {
    let friend_id = path.into_inner();
    let intros = state
        .with_conn(move |conn| {
            Ok(Introductions {
                introduced_by: relationship_queries::introduced_by(conn, user.0, friend_id)?,
                introduced: relationship_queries::introductions_by(conn, user.0, friend_id)?,
            })
        })
        .await?;
    Ok(web::Json(intros))
}

#[put("/contacts/{id}")]
pub async fn relabel_contact(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<ContactEntry>>,
    payload: web::Json<LabelUpdate>,
) -> ApiResult<web::Json<ContactEntry>> {
    let entry_id = path.into_inner();
    let label = payload.into_inner().label;
    let entry = state
        .with_conn(move |conn| {
            contact_ops::update_contact_label(conn, user.0, entry_id, label.as_deref())
        })
        .await?;
    Ok(web::Json(entry))
}

#[delete("/contacts/{id}")]
pub async fn remove_contact(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<ContactEntry>>,
) -> ApiResult<HttpResponse> {
    let entry_id = path.into_inner();
    state
        .with_conn(move |conn| contact_ops::remove_contact(conn, user.0, entry_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
