//! Post handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use yatube_core::services::{
    CreateResource, DestroyResource, ListQuery, ListResource, RetrieveResource, UpdateResource,
};
use yatube_shared::dto::{ListParams, PostInput};

use super::{pagination, payload};
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /v1/posts
pub async fn list(
    state: web::Data<AppState>,
    caller: Caller,
    req: HttpRequest,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let window = pagination::window(&params);
    let query = ListQuery {
        window,
        ..Default::default()
    };

    let page = state.posts.list(caller.requester(), &(), query).await?;
    Ok(pagination::respond(&req, window, page))
}

/// POST /v1/posts
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create(caller.requester(), &(), payload::<PostInput>(&body))
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /v1/posts/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .retrieve(caller.requester(), &(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /v1/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(caller.requester(), &(), path.into_inner(), payload::<PostInput>(&body), false)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH /v1/posts/{id}
pub async fn partial_update(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(caller.requester(), &(), path.into_inner(), payload::<PostInput>(&body), true)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /v1/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .destroy(caller.requester(), &(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
