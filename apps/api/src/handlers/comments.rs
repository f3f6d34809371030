//! Comment handlers, nested under a post.

use actix_web::{HttpRequest, HttpResponse, web};
use yatube_core::services::{
    CreateResource, DestroyResource, ListQuery, ListResource, RetrieveResource, UpdateResource,
};
use yatube_shared::dto::{CommentInput, ListParams};

use super::{pagination, payload};
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /v1/posts/{post_id}/comments
pub async fn list(
    state: web::Data<AppState>,
    caller: Caller,
    req: HttpRequest,
    path: web::Path<i32>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let window = pagination::window(&params);
    let query = ListQuery {
        window,
        ..Default::default()
    };

    let page = state
        .comments
        .list(caller.requester(), &path.into_inner(), query)
        .await?;
    Ok(pagination::respond(&req, window, page))
}

/// POST /v1/posts/{post_id}/comments
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .create(caller.requester(), &path.into_inner(), payload::<CommentInput>(&body))
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /v1/posts/{post_id}/comments/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, id) = path.into_inner();
    let comment = state
        .comments
        .retrieve(caller.requester(), &post_id, id)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT /v1/posts/{post_id}/comments/{id}
pub async fn update(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(i32, i32)>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let (post_id, id) = path.into_inner();
    let comment = state
        .comments
        .update(caller.requester(), &post_id, id, payload::<CommentInput>(&body), false)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PATCH /v1/posts/{post_id}/comments/{id}
pub async fn partial_update(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(i32, i32)>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let (post_id, id) = path.into_inner();
    let comment = state
        .comments
        .update(caller.requester(), &post_id, id, payload::<CommentInput>(&body), true)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /v1/posts/{post_id}/comments/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, id) = path.into_inner();
    state
        .comments
        .destroy(caller.requester(), &post_id, id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
