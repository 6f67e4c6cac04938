use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    Json,
};

use super::AppState;

/// Extract the caller's token from `Authorization: Bearer …` or `?token=`.
fn provided_token(req: &Request<Body>) -> Option<String> {
    let header_token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());

    header_token.or_else(|| {
        req.uri().query().and_then(|q| {
            q.split('&')
                .find_map(|pair| pair.strip_prefix("token="))
                .map(|s| s.to_string())
        })
    })
}

pub(crate) async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: middleware::Next,
) -> impl IntoResponse {
    let Some(ref expected) = state.api_token else {
        return next.run(req).await;
    };

    match provided_token(&req) {
        Some(ref token) if token == expected => next.run(req).await,
        Some(_) => {
            tracing::debug!(path = %req.uri().path(), "rejected request with invalid token");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "invalid token"})),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "missing or invalid Authorization header"})),
        )
            .into_response(),
    }
}
