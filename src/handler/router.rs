//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health probes,
//! the summary endpoint, and access logging.

use crate::config::{AppState, StatusMode};
use crate::http::{self, cache, CommonHeaders};
use crate::logger::{self, AccessLogEntry};
use crate::summary::{ResponseKind, SummaryRequest};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling.
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = route_request(&req, &state).await;

    let logging = &state.config.logging;
    if logging.access_log {
        log_access(&req, &response, peer_addr, started, &logging.access_log_format);
    }
    Ok(response)
}

async fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let http_config = &state.config.http;
    let common = CommonHeaders {
        server_name: &http_config.server_name,
        enable_cors: http_config.enable_cors,
    };
    let method = req.method();
    let path = req.uri().path();

    // 1. Check HTTP method
    match *method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return http::build_options_response(common),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_405_response(common);
        }
    }
    let is_head = *method == Method::HEAD;

    // 2. Health check endpoints
    let health = &http_config.health;
    if health.enabled {
        if path == health.liveness_path {
            return http::build_health_response(StatusCode::OK, "ok", common);
        }
        if path == health.readiness_path {
            return if state.router.store().is_accessible().await {
                http::build_health_response(StatusCode::OK, "ok", common)
            } else {
                http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable", common)
            };
        }
    }

    // 3. Summary endpoint
    if path == http_config.summary_path {
        return serve_summary(req, state, common, is_head).await;
    }

    http::build_404_response(common, is_head)
}

async fn serve_summary<B>(
    req: &Request<B>,
    state: &AppState,
    common: CommonHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let request = SummaryRequest::from_query(req.uri().query());
    let summary = state.router.handle(&request).await;
    let status = status_for(summary.kind, state.config.http.status_mode);

    if summary.kind != ResponseKind::Found {
        return http::build_json_response(status, summary.body, None, common, is_head);
    }

    let etag = cache::generate_etag(&summary.body);
    let if_none_match = req
        .headers()
        .get("if-none-match")
        .and_then(|v| v.to_str().ok());
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, common);
    }

    http::build_json_response(status, summary.body, Some(&etag), common, is_head)
}

/// Status code for a summary outcome
pub const fn status_for(kind: ResponseKind, mode: StatusMode) -> StatusCode {
    match (mode, kind) {
        (StatusMode::Compat, _) | (StatusMode::Strict, ResponseKind::Found) => StatusCode::OK,
        (StatusMode::Strict, ResponseKind::NotFound) => StatusCode::NOT_FOUND,
        (StatusMode::Strict, ResponseKind::BadRequest) => StatusCode::BAD_REQUEST,
        (StatusMode::Strict, ResponseKind::Fault) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.elapsed = started.elapsed();

    logger::log_access(&entry, format);
}

fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use std::path::Path;

    fn state_for(folder: &Path, mode: StatusMode) -> Arc<AppState> {
        let mut config = Config::defaults().unwrap();
        config.store.folder = folder.display().to_string();
        config.http.status_mode = mode;
        config.logging.access_log = false;
        Arc::new(AppState::new(&config))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> (StatusCode, Bytes) {
        let response = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = response.status();
        (status, response.into_body().collect().await.unwrap().to_bytes())
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_weekly_summary_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let raw = "{\"month\": \"2025-11\",  \"weeks\": [{\"w\": 1}]}\n";
        std::fs::write(dir.path().join("weekly_summary_2025-11.json"), raw).unwrap();
        let state = state_for(dir.path(), StatusMode::Compat);

        let response = handle_request(get("/?month=2025-11&type=weekly"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert!(response.headers().contains_key("ETag"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), raw.as_bytes());
    }

    #[tokio::test]
    async fn test_compat_mode_always_200() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path(), StatusMode::Compat);

        let (status, body) = send(&state, get("/?month=2025-11&type=weekly")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Weekly summary not found");

        let (status, body) = send(&state, get("/?month=2025-11")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Attendance summary not found");
        assert_eq!(value["message"], "일간 출석 파일이 없습니다.");
    }

    #[tokio::test]
    async fn test_storage_fault_is_200_in_compat_and_500_in_strict() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");

        let compat = state_for(&missing, StatusMode::Compat);
        let (status, body) = send(&compat, get("/?month=2025-11&type=weekly")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert!(value["error"].is_string());

        let strict = state_for(&missing, StatusMode::Strict);
        let (status, _) = send(&strict, get("/?month=2025-11&type=weekly")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_strict_mode_statuses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("attendance_summary_2025-11.json"), "{}").unwrap();
        let state = state_for(dir.path(), StatusMode::Strict);

        assert_eq!(send(&state, get("/?month=2025-11")).await.0, StatusCode::OK);
        assert_eq!(
            send(&state, get("/?month=2025-10")).await.0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send(&state, get("/?month=..%2F..%2Fetc")).await.0,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weekly_summary_2025-11.json"), "[1]").unwrap();
        let state = state_for(dir.path(), StatusMode::Compat);

        let first = handle_request(get("/?month=2025-11&type=weekly"), Arc::clone(&state), peer())
            .await
            .unwrap();
        let etag = first.headers()["ETag"].clone();

        let req = Request::builder()
            .uri("/?month=2025-11&type=weekly")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weekly_summary_2025-11.json"), "[1,2,3]").unwrap();
        let state = state_for(dir.path(), StatusMode::Compat);

        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/?month=2025-11&type=weekly")
            .body(())
            .unwrap();
        let response = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(response.headers()["Content-Length"], "7");
        assert!(response.into_body().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_methods_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path(), StatusMode::Compat);

        let post = Request::builder()
            .method(Method::POST)
            .uri("/?month=2025-11")
            .body(())
            .unwrap();
        assert_eq!(send(&state, post).await.0, StatusCode::METHOD_NOT_ALLOWED);

        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .body(())
            .unwrap();
        assert_eq!(send(&state, options).await.0, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, get("/elsewhere?month=2025-11")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.as_ref(), br#"{"error":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let dir = tempfile::tempdir().unwrap();
        let ready = state_for(dir.path(), StatusMode::Compat);
        assert_eq!(send(&ready, get("/healthz")).await.0, StatusCode::OK);
        assert_eq!(send(&ready, get("/readyz")).await.0, StatusCode::OK);

        let not_ready = state_for(&dir.path().join("missing"), StatusMode::Compat);
        assert_eq!(send(&not_ready, get("/healthz")).await.0, StatusCode::OK);
        let (status, body) = send(&not_ready, get("/readyz")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.as_ref(), b"unavailable");
    }

    #[test]
    fn test_status_mapping() {
        for kind in [
            ResponseKind::Found,
            ResponseKind::NotFound,
            ResponseKind::BadRequest,
            ResponseKind::Fault,
        ] {
            assert_eq!(status_for(kind, StatusMode::Compat), StatusCode::OK);
        }
        assert_eq!(
            status_for(ResponseKind::NotFound, StatusMode::Strict),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(ResponseKind::Fault, StatusMode::Strict),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
