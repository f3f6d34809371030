//! Limit/offset pagination of list responses.
//!
//! Without `limit` a listing is returned as a plain JSON array. With it the
//! response is wrapped in a [`Paginated`] envelope whose `next` and
//! `previous` links carry the original query with updated `limit`/`offset`.

use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use yatube_core::ports::{Page, Window};
use yatube_shared::Paginated;
use yatube_shared::dto::ListParams;

pub const MAX_LIMIT: u64 = 100;
/// Largest offset a SQL `OFFSET` clause accepts.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// The window requested by `limit`/`offset`, if any.
///
/// A missing, non-numeric or zero `limit` disables pagination; an unusable
/// `offset` counts as 0 and an oversized one is capped at [`MAX_OFFSET`].
pub fn window(params: &ListParams) -> Option<Window> {
    let limit = params
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|&limit| limit > 0)?;
    let offset = params
        .offset
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0)
        .min(MAX_OFFSET);

    Some(Window {
        limit: limit.min(MAX_LIMIT),
        offset,
    })
}

/// Render a listing, paginated when `window` is set.
pub fn respond<T: Serialize>(req: &HttpRequest, window: Option<Window>, page: Page<T>) -> HttpResponse {
    let Some(window) = window else {
        return HttpResponse::Ok().json(page.items);
    };

    let next_offset = window.offset.saturating_add(window.limit);
    let next = (next_offset < page.total).then(|| page_url(req, window.limit, Some(next_offset)));
    let previous = (window.offset > 0).then(|| {
        let offset = window.offset.saturating_sub(window.limit);
        page_url(req, window.limit, (offset > 0).then_some(offset))
    });

    HttpResponse::Ok().json(Paginated {
        count: page.total,
        next,
        previous,
        results: page.items,
    })
}

fn page_url(req: &HttpRequest, limit: u64, offset: Option<u64>) -> String {
    let info = req.connection_info();
    let mut params: Vec<String> = req
        .query_string()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            key != "limit" && key != "offset"
        })
        .map(str::to_string)
        .collect();

    params.push(format!("limit={limit}"));
    if let Some(offset) = offset {
        params.push(format!("offset={offset}"));
    }

    format!(
        "{}://{}{}?{}",
        info.scheme(),
        info.host(),
        req.path(),
        params.join("&")
    )
}
