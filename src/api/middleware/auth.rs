//! Caller resolution middleware.
//!
//! No `Authorization` header means guest. A guest is identified by the
//! client-held `X-Guest-Id` key, issued fresh when none is sent and echoed
//! on every guest response. A token that does not map to a live
//! session is rejected with 401, never downgraded to guest.

use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::accounts;
use crate::api::error::ApiError;
use crate::api::types::{bearer_token, guest_id, ApiContext, CallerContext, GUEST_ID_HEADER};
use crate::models::Owner;

/// Resolve the caller and inject `CallerContext` for downstream handlers.
pub async fn resolve_caller(req: Request<axum::body::Body>, next: Next) -> Response {
    match resolve_caller_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn resolve_caller_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let sent_guest_id = guest_id(req.headers())?;
    let caller = match bearer_token(req.headers())? {
        None => CallerContext::guest(sent_guest_id.unwrap_or_else(Uuid::new_v4)),
        Some(token) => {
            let user_id = {
                let conn = ctx.open_db()?;
                accounts::resolve(&conn, &token)?
            };
            CallerContext {
                owner: Owner::User(user_id),
                token: Some(token),
                guest_id: sent_guest_id,
            }
        }
    };

    let echoed = match caller.owner {
        Owner::Guest(key) => Some(key),
        Owner::User(_) => None,
    };
    req.extensions_mut().insert(caller);
    let mut response = next.run(req).await;

    if let Some(key) = echoed {
        if let Ok(value) = HeaderValue::from_str(&key.to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(GUEST_ID_HEADER), value);
        }
    }
    Ok(response)
}
