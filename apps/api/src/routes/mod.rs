pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analysis::handlers as analysis;
use crate::errors::AppError;
use crate::insight::handlers as insight;
use crate::state::AppState;

/// Room for multipart framing and the job description on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 256 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Keyword analysis
        .route(
            "/api/v1/analyze",
            post(analysis::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // AI insight
        .route("/api/v1/insight", post(insight::handle_generate_insight))
        .route("/api/v1/insight/normalize", post(insight::handle_normalize))
        .fallback(not_found)
        .with_state(state)
}

/// Permissive when no origins are configured; otherwise only the listed origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::insight::models::SkillTerms;
    use crate::insight::source::{decode_reply, InsightReply, InsightSource};

    const BOUNDARY: &str = "insight-test-boundary";

    /// Replays a fixed model reply; `None` simulates an upstream failure.
    struct CannedSource(Option<&'static str>);

    #[async_trait]
    impl InsightSource for CannedSource {
        async fn fetch_insight(&self, _terms: &SkillTerms) -> Result<InsightReply, AppError> {
            match self.0 {
                Some(text) => Ok(decode_reply(text)),
                None => Err(AppError::Llm("upstream unavailable".to_string())),
            }
        }
    }

    fn test_config(rate_limit: Duration, max_upload_bytes: usize) -> Config {
        Config {
            openai_api_key: "test-key".to_string(),
            openai_base_url: "http://localhost:0".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            insight_rate_limit: rate_limit,
            max_upload_bytes,
            cors_allowed_origins: vec![],
        }
    }

    fn app_with(reply: Option<&'static str>, rate_limit: Duration) -> Router {
        let state = AppState::new(
            test_config(rate_limit, 1024),
            Arc::new(CannedSource(reply)),
        );
        build_router(state)
    }

    fn app() -> Router {
        app_with(Some("Great candidate overall."), Duration::ZERO)
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/v1/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_normalize_endpoint_accepts_object() {
        let request = json_request(
            "/api/v1/insight/normalize",
            json!({
                "insight": "Insight Summary: Solid.",
                "recommendations": [],
                "grouped": {"High": ["Kubernetes"], "Critical": ["Go"]}
            }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "summary": "Solid.",
                "recommendations": [],
                "grouped": {"Critical": ["Kubernetes", "Go"]}
            })
        );
    }

    #[tokio::test]
    async fn test_normalize_endpoint_accepts_bare_string() {
        let request = json_request(
            "/api/v1/insight/normalize",
            json!("Ok.\nRecommendations:\n1. Add X\n2. Add Y"),
        );
        let body = body_json(app().oneshot(request).await.unwrap()).await;
        assert_eq!(body["summary"], "Ok.");
        assert_eq!(body["recommendations"], json!(["Add X", "Add Y"]));
        assert_eq!(body["grouped"], json!({}));
    }

    #[tokio::test]
    async fn test_insight_requires_terms() {
        let request = json_request("/api/v1/insight", json!({"matched": [], "missing": []}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "No skills provided for analysis"
        );
    }

    #[tokio::test]
    async fn test_insight_normalizes_free_text_reply() {
        let reply = "Insight Summary: Strong in backend.\n\nRecommendations:\n1. Learn Kubernetes\n2. Learn Terraform\nGroup by Priority:\nHigh: Kubernetes\nMedium: Terraform";
        let app = app_with(Some(reply), Duration::ZERO);
        let request = json_request(
            "/api/v1/insight",
            json!({"matched": ["rust"], "missing": ["kubernetes", "terraform"]}),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "summary": "Strong in backend.",
                "recommendations": ["Learn Kubernetes", "Learn Terraform"],
                "grouped": {"Critical": ["Kubernetes"], "Important": ["Terraform"]}
            })
        );
    }

    #[tokio::test]
    async fn test_insight_normalizes_json_reply() {
        let reply = r#"```json
{"insight": "Good match.", "recommendations": ["Add metrics"], "grouped": {"Low": ["Figma"]}}
```"#;
        let app = app_with(Some(reply), Duration::ZERO);
        let request = json_request("/api/v1/insight", json!({"missing": ["figma"]}));

        let body = body_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(
            body,
            json!({
                "summary": "Good match.",
                "recommendations": ["Add metrics"],
                "grouped": {"Nice-to-Have": ["Figma"]}
            })
        );
    }

    #[tokio::test]
    async fn test_insight_second_call_is_rate_limited() {
        let app = app_with(Some("Fine."), Duration::from_secs(60));
        let terms = json!({"matched": ["rust"]});

        let first = app
            .clone()
            .oneshot(json_request("/api/v1/insight", terms.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(json_request("/api/v1/insight", terms))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_insight_upstream_failure_is_500() {
        let app = app_with(None, Duration::ZERO);
        let response = app
            .oneshot(json_request("/api/v1/insight", json!({"matched": ["rust"]})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_text_resume() {
        let request = multipart_request(&[
            (
                "resume",
                Some("cv.txt"),
                "Rust and Kubernetes for 6 years, 40% faster, 12 services",
            ),
            ("job_description", None, "Rust Kubernetes Terraform, 5 years"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["suggestions"][0]["category"], "skills");
        let matched = body["suggestions"][0]["items"]["matched"]
            .as_array()
            .unwrap();
        assert!(matched.contains(&json!("rust")));
        assert!(matched.contains(&json!("kubernetes")));
    }

    #[tokio::test]
    async fn test_analyze_requires_job_description() {
        let request = multipart_request(&[("resume", Some("cv.txt"), "Rust")]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_requires_resume() {
        let request = multipart_request(&[("job_description", None, "Rust")]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_file() {
        // test config allows 1024 bytes
        let big = "a".repeat(2048);
        let request = multipart_request(&[
            ("resume", Some("cv.txt"), big.as_str()),
            ("job_description", None, "Rust"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "File too large (max 1024 bytes)"
        );
    }

    #[tokio::test]
    async fn test_analyze_unreadable_docx_is_422() {
        let request = multipart_request(&[
            ("resume", Some("cv.docx"), "not a zip archive"),
            ("job_description", None, "Rust"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
