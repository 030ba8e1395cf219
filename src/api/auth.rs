use actix_session::Session;
use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::session::{persist_user, CurrentUser};
use crate::api::state::AppState;
use crate::model::User;
use crate::ops::auth_ops::{self, ProfileUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let user = state
        .with_conn(move |conn| auth_ops::register(conn, &req.name, &req.email, &req.password))
        .await?;
    persist_user(&session, user.id)?;
    Ok(HttpResponse::Created().json(user))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let req = payload.into_inner();
    let user = state
        .with_conn(move |conn| auth_ops::login(conn, &req.email, &req.password))
        .await?;
    persist_user(&session, user.id)?;
    info!(user_id = %user.id, "signed in");
    Ok(web::Json(user))
}

#[post("/auth/logout")]
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[get("/auth/me")]
pub async fn me(state: web::Data<AppState>, user: CurrentUser) -> ApiResult<web::Json<User>> {
    let user = state
        .with_conn(move |conn| auth_ops::require_user(conn, user.0))
        .await?;
    Ok(web::Json(user))
}

#[put("/auth/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<ProfileUpdate>,
) -> ApiResult<web::Json<User>> {
    let update = payload.into_inner();
    let user = state
        .with_conn(move |conn| auth_ops::update_profile(conn, user.0, update))
        .await?;
    Ok(web::Json(user))
}

#[put("/auth/password")]
pub async fn change_password(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<PasswordChange>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    state
        .with_conn(move |conn| {
            auth_ops::change_password(conn, user.0, &req.current_password, &req.new_password)
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
