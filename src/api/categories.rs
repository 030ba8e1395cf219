use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::model::{Category, Friend, Id};
use crate::ops::category_ops;
use crate::queries::category_queries;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryName {
    pub name: String,
}

/// Active categories, or only archived ones with `?archived=true`.
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<CategoryListQuery>,
) -> ApiResult<web::Json<Vec<Category>>> {
    let archived = query.archived;
    let categories = state
        .with_conn(move |conn| {
            if archived {
                category_queries::archived_categories(conn, user.0)
            } else {
                category_queries::active_categories(conn, user.0)
            }
        })
        .await?;
    Ok(web::Json(categories))
}

#[post("/categories")]
pub async fn create_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<CategoryName>,
) -> ApiResult<HttpResponse> {
    let name = payload.into_inner().name;
    let category = state
        .with_conn(move |conn| category_ops::add_category(conn, user.0, &name))
        .await?;
    Ok(HttpResponse::Created().json(category))
}

#[put("/categories/{id}")]
pub async fn rename_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Category>>,
    payload: web::Json<CategoryName>,
) -> ApiResult<web::Json<Category>> {
    let category_id = path.into_inner();
    let name = payload.into_inner().name;
    let category = state
        .with_conn(move |conn| category_ops::rename_category(conn, user.0, category_id, &name))
        .await?;
    Ok(web::Json(category))
}

#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Category>>,
) -> ApiResult<HttpResponse> {
    let category_id = path.into_inner();
    state
        .with_conn(move |conn| category_ops::delete_category(conn, user.0, category_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/categories/{id}/archive")]
pub async fn archive_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Category>>,
) -> ApiResult<web::Json<Category>> {
    let category_id = path.into_inner();
    let category = state
        .with_conn(move |conn| category_ops::archive_category(conn, user.0, category_id))
        .await?;
    Ok(web::Json(category))
}

#[post("/categories/{id}/unarchive")]
pub async fn unarchive_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Category>>,
) -> ApiResult<web::Json<Category>> {
    let category_id = path.into_inner();
    let category = state
        .with_conn(move |conn| category_ops::unarchive_category(conn, user.0, category_id))
        .await?;
    Ok(web::Json(category))
}

#[get("/categories/{id}/friends")]
pub async fn category_friends(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Category>>,
) -> ApiResult<web::Json<Vec<Friend>>> {
    let category_id = path.into_inner();
    let friends = state
        .with_conn(move |conn| category_queries::friends_in_category(conn, user.0, category_id))
        .await?;
    Ok(web::Json(friends))
}
