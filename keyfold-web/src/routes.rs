use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use keyfold::{BrowseHandler, KeyfoldError};
use log::{error, info};
use serde::Deserialize;

use crate::views;

pub fn router(handler: Arc<BrowseHandler>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/buckets/{bucket}", get(browse))
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(handler)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    info!("{} - {} {}", response.status().as_u16(), method, path);
    response
}

async fn index(
    State(handler): State<Arc<BrowseHandler>>,
) -> Response {
    match handler.list_buckets().await {
        Ok(buckets) => {
            Html(views::buckets_page(&buckets)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct BrowseQuery {
    #[serde(default)]
    prefix: String,
}

async fn browse(
    State(handler): State<Arc<BrowseHandler>>,
    Path(bucket): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    match handler.list_children(&bucket, &query.prefix).await {
        Ok(entries) => Html(views::entries_page(
            &bucket,
            &query.prefix,
            &entries,
        ))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page(
            StatusCode::NOT_FOUND.as_u16(),
            "no such page",
        )),
    )
        .into_response()
}

/// Each failure renders its own page with the matching status code;
/// nothing is collapsed into a redirect to the bucket index.
fn error_response(error: &KeyfoldError) -> Response {
    error!("browse request failed: {}", error);
    let status = match error {
        KeyfoldError::NotFound(_) => StatusCode::NOT_FOUND,
        KeyfoldError::AccessDenied(_) => StatusCode::FORBIDDEN,
        KeyfoldError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        KeyfoldError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        KeyfoldError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        KeyfoldError::Config(_)
        | KeyfoldError::Internal(_)
        | KeyfoldError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Html(views::error_page(status.as_u16(), &error.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                KeyfoldError::NotFound("b".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                KeyfoldError::AccessDenied("b".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                KeyfoldError::InvalidArgument("p".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (KeyfoldError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                KeyfoldError::Unavailable("s".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error_response(&error).status(), expected);
        }
    }
}
