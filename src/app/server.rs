//! HTTP front door
//!
//! Two routes: a liveness answer on `GET /` and repository submission on
//! `POST /`. A submission is answered as soon as the URL is validated; the
//! clone and scan happen later and are never reflected in the response.

use crate::core::shutdown::ShutdownCoordinator;
use crate::fetcher::Fetcher;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    fetcher: Fetcher,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    message: String,
    status: u16,
}

impl StatusBody {
    fn response(status: StatusCode, message: impl Into<String>) -> Response {
        let body = StatusBody {
            message: message.into(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

pub fn router(fetcher: Fetcher) -> Router {
    Router::new()
        .route("/", get(welcome).post(fetch_project))
        .with_state(AppState { fetcher })
}

async fn welcome() -> Response {
    StatusBody::response(StatusCode::OK, "OK")
}

async fn fetch_project(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("rejected fetch request: {}", rejection.body_text());
            return StatusBody::response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.fetcher.retrieve_project(&request.url) {
        Ok(ticket) => {
            log::debug!("fetch of '{}' running in the background", ticket.folder());
            (StatusCode::OK, "OK").into_response()
        }
        Err(e) => {
            log::warn!("could not fetch project: {}", e);
            StatusBody::response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// Serve until the coordinator signals shutdown, then drain open connections
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: ShutdownCoordinator,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{CloneError, CloneStatus, Cloner, FetchConfig};
    use crate::notifications::NotificationManager;
    use crate::queue::{JobConsumer, JobQueue};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::task::JoinHandle;

    struct NoopCloner;

    #[async_trait]
    impl Cloner for NoopCloner {
        fn name(&self) -> &'static str {
            "noop"
        }

        async fn clone_repo(&self, _url: &str, _dest: &Path) -> Result<CloneStatus, CloneError> {
            Ok(CloneStatus::Cloned)
        }
    }

    struct TestServer {
        base: String,
        shutdown: ShutdownCoordinator,
        handle: JoinHandle<std::io::Result<()>>,
        consumer: JobConsumer,
        _staging: TempDir,
    }

    async fn start() -> TestServer {
        let staging = TempDir::new().unwrap();
        let (publisher, consumer) = JobQueue::new();
        let config = FetchConfig {
            staging_dir: staging.path().to_path_buf(),
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(
            config,
            Arc::new(NoopCloner),
            publisher,
            Arc::new(NotificationManager::new()),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/", listener.local_addr().unwrap());
        let shutdown = ShutdownCoordinator::new();
        let handle = tokio::spawn(serve(listener, router(fetcher), shutdown.clone()));

        TestServer {
            base,
            shutdown,
            handle,
            consumer,
            _staging: staging,
        }
    }

    async fn post(base: &str, body: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(base)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_welcome() {
        let server = start().await;
        let response = reqwest::get(&server.base).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"message": "OK", "status": 200}));
    }

    #[tokio::test]
    async fn test_accepted_url_is_queued() {
        let mut server = start().await;
        let response = post(&server.base, r#"{"url": "https://github.com/foae/dimago"}"#).await;

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");

        let job = server.consumer.recv().await.unwrap();
        assert_eq!(job.folder, "dimago");
        assert_eq!(job.url, "https://github.com/foae/dimago");
    }

    #[tokio::test]
    async fn test_unsupported_host_is_bad_request() {
        let server = start().await;
        let response = post(&server.base, r#"{"url": "https://gitlab.com/x/y"}"#).await;

        assert_eq!(response.status().as_u16(), 400);
        assert!(response.text().await.unwrap().contains("gitlab.com"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let server = start().await;
        for body in ["not json", r#"{"link": "https://github.com/x/y"}"#] {
            let response = post(&server.base, body).await;
            assert_eq!(response.status().as_u16(), 400, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(&server.base)
            .body(r#"{"url": "https://github.com/x/y"}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_server_stops_on_shutdown() {
        let server = start().await;
        server.shutdown.trigger_shutdown();

        let result = tokio::time::timeout(Duration::from_secs(2), server.handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
