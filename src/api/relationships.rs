use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::model::{Friend, Id, Relationship, RelationshipKind};
use crate::ops::relationship_ops;
use crate::queries::relationship_queries;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipQuery {
    pub friend_id: Option<Id<Friend>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelationship {
    pub from_friend_id: Id<Friend>,
    pub to_friend_id: Id<Friend>,
    pub kind: RelationshipKind,
    pub note: Option<String>,
}

/// With `friendId`, relationships touching that friend seen from its side;
/// otherwise every relationship the user has recorded.
#[get("/relationships")]
pub async fn list_relationships(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<RelationshipQuery>,
) -> ApiResult<HttpResponse> {
    match query.friend_id {
        Some(friend_id) => {
            let related = state
                .with_conn(move |conn| relationship_queries::relationships_for(conn, user.0, friend_id))
                .await?;
            Ok(HttpResponse::Ok().json(related))
        }
        None => {
            let all = state
                .with_conn(move |conn| relationship_queries::all_relationships(conn, user.0))
                .await?;
            Ok(HttpResponse::Ok().json(all))
        }
    }
}

#[post("/relationships")]
pub async fn create_relationship(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<NewRelationship>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let rel = state
        .with_conn(move |conn| {
            relationship_ops::add_relationship(
                conn,
                user.0,
                req.from_friend_id,
                req.to_friend_id,
                req.kind,
                req.note.as_deref(),
            )
        })
        .await?;
    Ok(HttpResponse::Created().json(rel))
}

#[delete("/relationships/{id}")]
pub async fn delete_relationship(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Id<Relationship>>,
) -> ApiResult<HttpResponse> {
    let rel_id = path.into_inner();
    state
        .with_conn(move |conn| relationship_ops::remove_relationship(conn, user.0, rel_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
