//! Middleware for logging JSON requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated in `debug` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 256;

/// The largest request body the middleware will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Log the method, URI and status of each request along with both bodies.
///
/// The request line and status are logged at the `info` level, the bodies at
/// the `debug` level. Bodies longer than [LOG_BODY_LENGTH_LIMIT] bytes are
/// truncated, and the full body is logged at the `trace` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Ok(body_bytes) = read_body(body).await else {
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    };

    tracing::info!("Received {} {}", parts.method, parts.uri);
    log_body("request", &body_bytes);

    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;

    let (parts, body) = response.into_parts();
    let Ok(body_bytes) = read_body(body).await else {
        tracing::error!("Could not read the response body for logging");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    tracing::info!("Sending {}", parts.status);
    log_body("response", &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, MAX_BODY_BYTES).await
}

fn log_body(kind: &str, body: &[u8]) {
    if body.is_empty() {
        return;
    }

    let text = String::from_utf8_lossy(body);

    if text.len() > LOG_BODY_LENGTH_LIMIT {
        let cut = floor_char_boundary(&text, LOG_BODY_LENGTH_LIMIT);
        tracing::debug!("{kind} body: {}...", &text[..cut]);
        tracing::trace!("Full {kind} body: {text}");
    } else {
        tracing::debug!("{kind} body: {text}");
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    (0..=index)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{floor_char_boundary, logging_middleware};

    #[tokio::test]
    async fn passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server
            .post("/echo")
            .json(&json!({ "label": "Épicerie" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({ "label": "Épicerie" }));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // "é" takes two bytes.
        assert_eq!(floor_char_boundary("é", 1), 0);
        assert_eq!(floor_char_boundary("abc", 2), 2);
    }
}
