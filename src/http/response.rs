//! HTTP response building module
//!
//! Builders for the responses the summary server emits. Every response carries
//! the `Server` header and, when enabled, the CORS allow-origin header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

pub const JSON_CONTENT_TYPE: &str = "application/json";
const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers shared by every response
#[derive(Debug, Clone, Copy)]
pub struct CommonHeaders<'a> {
    pub server_name: &'a str,
    pub enable_cors: bool,
}

impl CommonHeaders<'_> {
    fn apply(self, builder: Builder) -> Builder {
        let builder = builder.header("Server", self.server_name);
        if self.enable_cors {
            builder.header("Access-Control-Allow-Origin", "*")
        } else {
            builder
        }
    }
}

/// Build a JSON response; `HEAD` keeps the headers but drops the body
pub fn build_json_response(
    status: StatusCode,
    body: Bytes,
    etag: Option<&str>,
    common: CommonHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let mut builder = common
        .apply(Response::builder().status(status))
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", body.len())
        .header("Cache-Control", "no-cache");
    if let Some(etag) = etag {
        builder = builder.header("ETag", etag);
    }

    let body = if is_head { Bytes::new() } else { body };
    finish(builder, body, status.as_str())
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, common: CommonHeaders<'_>) -> Response<Full<Bytes>> {
    let builder = common
        .apply(Response::builder().status(StatusCode::NOT_MODIFIED))
        .header("ETag", etag)
        .header("Cache-Control", "no-cache");
    finish(builder, Bytes::new(), "304")
}

/// Build 404 Not Found response for paths other than the summary endpoint
pub fn build_404_response(common: CommonHeaders<'_>, is_head: bool) -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::NOT_FOUND,
        Bytes::from_static(br#"{"error":"Not Found"}"#),
        None,
        common,
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(common: CommonHeaders<'_>) -> Response<Full<Bytes>> {
    let body = Bytes::from_static(br#"{"error":"Method Not Allowed"}"#);
    let builder = common
        .apply(Response::builder().status(StatusCode::METHOD_NOT_ALLOWED))
        .header("Allow", ALLOWED_METHODS)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", body.len());
    finish(builder, body, "405")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(common: CommonHeaders<'_>) -> Response<Full<Bytes>> {
    let mut builder = common
        .apply(Response::builder().status(StatusCode::NO_CONTENT))
        .header("Allow", ALLOWED_METHODS);

    if common.enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, If-None-Match")
            .header("Access-Control-Max-Age", "86400");
    }

    finish(builder, Bytes::new(), "OPTIONS")
}

/// Build plain-text health probe response
pub fn build_health_response(
    status: StatusCode,
    text: &'static str,
    common: CommonHeaders<'_>,
) -> Response<Full<Bytes>> {
    let builder = common
        .apply(Response::builder().status(status))
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-store");
    finish(builder, Bytes::from_static(text.as_bytes()), "health")
}

fn finish(builder: Builder, body: Bytes, label: &str) -> Response<Full<Bytes>> {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to build {label} response: {e}"));
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    const PLAIN: CommonHeaders<'static> = CommonHeaders {
        server_name: "test/1.0",
        enable_cors: false,
    };

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let response = build_json_response(
            StatusCode::OK,
            Bytes::from_static(b"{\"a\":1}"),
            Some("\"abc\""),
            PLAIN,
            false,
        );
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Content-Length"], "7");
        assert_eq!(headers["ETag"], "\"abc\"");
        assert_eq!(headers["Server"], "test/1.0");
        assert!(headers.get("Access-Control-Allow-Origin").is_none());
        assert_eq!(body_of(response).await.as_ref(), b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let response =
            build_json_response(StatusCode::OK, Bytes::from_static(b"[1,2]"), None, PLAIN, true);
        assert_eq!(response.headers()["Content-Length"], "5");
        assert!(body_of(response).await.is_empty());
    }

    #[test]
    fn test_cors_headers() {
        let cors = CommonHeaders {
            server_name: "test/1.0",
            enable_cors: true,
        };
        let response = build_options_response(cors);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, HEAD, OPTIONS"
        );

        let response = build_options_response(PLAIN);
        assert!(response.headers().get("Access-Control-Allow-Methods").is_none());
    }

    #[tokio::test]
    async fn test_405_lists_allowed_methods() {
        let response = build_405_response(PLAIN);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], "GET, HEAD, OPTIONS");
        assert_eq!(
            body_of(response).await.as_ref(),
            br#"{"error":"Method Not Allowed"}"#
        );
    }
}
