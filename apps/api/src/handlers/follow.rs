//! Follow handlers. Every action requires an authenticated caller.

use actix_web::{HttpRequest, HttpResponse, web};
use yatube_core::services::{CreateResource, ListQuery, ListResource};
use yatube_shared::dto::{FollowInput, ListParams};

use super::{pagination, payload};
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /v1/follow?search=<term>
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
    }
    .with_search(params.search.as_deref());

    let page = state.follows.list(caller.requester(), &(), query).await?;
    Ok(pagination::respond(&req, window, page))
}

/// POST /v1/follow
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let follow = state
        .follows
        .create(caller.requester(), &(), payload::<FollowInput>(&body))
        .await?;
    Ok(HttpResponse::Created().json(follow))
}
