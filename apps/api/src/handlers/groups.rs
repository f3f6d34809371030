//! Group handlers (read-only).

use actix_web::{HttpRequest, HttpResponse, web};
use yatube_core::services::{ListQuery, ListResource, RetrieveResource};
use yatube_shared::dto::ListParams;

use super::pagination;
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /v1/groups
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

    let page = state.groups.list(caller.requester(), &(), query).await?;
    Ok(pagination::respond(&req, window, page))
}

/// GET /v1/groups/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .retrieve(caller.requester(), &(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(group))
}
