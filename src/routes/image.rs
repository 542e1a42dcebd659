use std::sync::Arc;

use anyhow::anyhow;
use poem::{
    Request, Response, handler,
    http::{StatusCode, header},
    web::Data,
};

use crate::{
    AppState,
    core::request::{RawQuery, parse_request},
};

const CACHE_CONTROL: &str = "public, immutable, no-transform, s-maxage=31536000, max-age=31536000";
const ERROR_PAGE: &str = "<h1>Internal Error</h1><p>Sorry, there was a problem</p>";

/// `GET /<text>.<ext>?<query>`: parse, compile and screenshot.
#[handler]
pub async fn render_image(req: &Request, state: Data<&Arc<AppState>>) -> Response {
    let query = RawQuery::from_query_string(req.uri().query().unwrap_or(""));
    let request = match parse_request(req.uri().path(), &query, &state.defaults) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected request: {}", e);
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .content_type("text/plain; charset=utf-8")
                .body(e.to_string());
        }
    };

    let html = state.compiler.compile(&request);

    if state.html_debug {
        return Response::builder()
            .content_type("text/html; charset=utf-8")
            .body(html);
    }

    let rasterizer = state.rasterizer.clone();
    let file_type = request.file_type;
    let result = tokio::task::spawn_blocking(move || rasterizer.rasterize(&html, file_type))
        .await
        .map_err(|e| anyhow!("Task join error: {}", e))
        .and_then(|rendered| rendered);

    match result {
        Ok(bytes) => {
            tracing::info!(
                "Render completed successfully, format: {}, size: {} bytes",
                file_type.as_str(),
                bytes.len()
            );
            Response::builder()
                .content_type(file_type.mime_type())
                .header(header::CACHE_CONTROL, CACHE_CONTROL)
                .body(bytes)
        }
        Err(e) => {
            tracing::error!("Render error: {:#}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .content_type("text/html; charset=utf-8")
                .body(ERROR_PAGE)
        }
    }
}
