//! HTTP API for the GroundTruth service.
//!
//! This module provides:
//! - Health and metrics monitoring
//! - The runtime `env-config.js` bridge for the browser bundle
//! - The consultation session API
//! - Catalog and label lookups
//! - The built UI, with unknown paths falling back to `index.html`

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::AssetsConfig;
use crate::error::{I18nError, ServiceError};
use crate::service::CopilotService;

pub mod catalog;
pub mod sessions;
use catalog::{catalog_handler, districts_handler, labels_handler};
use sessions::{
    cancel_edit_handler, create_session_handler, delete_session_handler, follow_up_handler,
    get_session_handler, open_edit_handler, reset_handler, set_query_handler,
    submit_query_handler, wizard_handler,
};

/// Application state
pub struct AppState {
    pub service: Arc<CopilotService>,
    /// Handed to the browser through `env-config.js`
    api_key: Option<SecretString>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        service: Arc<CopilotService>,
        api_key: Option<SecretString>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            service,
            api_key,
            metrics,
        }
    }

    /// Create an i18n-aware error from a service error
    pub fn i18n_error(&self, error: ServiceError) -> I18nError {
        I18nError::new(error, self.service.i18n.clone(), "en")
    }
}

/// Build the full router: API routes plus the static UI
pub fn router(state: Arc<AppState>, assets: &AssetsConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session endpoints
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/wizard", post(wizard_handler))
        .route(
            "/sessions/{id}/query",
            post(submit_query_handler).put(set_query_handler),
        )
        .route("/sessions/{id}/follow-up", post(follow_up_handler))
        .route("/sessions/{id}/edit", post(open_edit_handler))
        .route("/sessions/{id}/edit/cancel", post(cancel_edit_handler))
        .route("/sessions/{id}/reset", post(reset_handler))
        // Catalog endpoints
        .route("/catalog", get(catalog_handler))
        .route("/catalog/states/{state}/districts", get(districts_handler))
        .route("/labels/{lang}", get(labels_handler))
        .layer(cors);

    // Unknown paths get index.html so client-side routes survive a reload
    let static_files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .service(
            ServeDir::new(&assets.dist_dir).fallback(ServeFile::new(assets.index_path())),
        );

    Router::new()
        .route("/health", get(health_handler))
        .route("/env-config.js", get(env_config_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api_routes)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health & Metrics ===

async fn health_handler() -> &'static str {
    "HEALTHY"
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// === Runtime configuration bridge ===

async fn env_config_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate",
            ),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::X_FRAME_OPTIONS, "DENY"),
        ],
        env_config_script(state.api_key.as_ref()),
    )
}

/// The key is emitted as a JSON string literal so quotes and backslashes cannot break out
fn env_config_script(api_key: Option<&SecretString>) -> String {
    let key = match api_key {
        Some(key) => serde_json::Value::from(key.expose_secret()).to_string(),
        None => "null".to_string(),
    };
    format!("window.process = {{ env: {{ API_KEY: {key} }} }};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::service::tests::{StubCollaborator, setup_inputs};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(stub: StubCollaborator, api_key: Option<&str>) -> (Router, TempDir) {
        let dist = TempDir::new().unwrap();
        std::fs::write(dist.path().join("index.html"), "<html>GroundTruth</html>").unwrap();
        std::fs::write(dist.path().join("app.js"), "console.log('ui');").unwrap();

        let service = Arc::new(CopilotService::new(Arc::new(stub), SessionConfig::default()));
        let state = Arc::new(AppState::new(
            service,
            api_key.map(|k| SecretString::from(k.to_string())),
            None,
        ));
        let assets = AssetsConfig {
            dist_dir: dist.path().to_path_buf(),
        };
        (router(state, &assets), dist)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dist) = app(StubCollaborator::default(), None);
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "HEALTHY");
    }

    #[tokio::test]
    async fn test_env_config_escapes_key() {
        let (app, _dist) = app(StubCollaborator::default(), Some(r#"abc"123\x"#));
        let response = send(&app, Method::GET, "/env-config.js", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/javascript");
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(
            body_text(response).await,
            r#"window.process = { env: { API_KEY: "abc\"123\\x" } };"#
        );
    }

    #[tokio::test]
    async fn test_env_config_without_key() {
        let (app, _dist) = app(StubCollaborator::default(), None);
        let response = send(&app, Method::GET, "/env-config.js", None).await;
        assert_eq!(
            body_text(response).await,
            "window.process = { env: { API_KEY: null } };"
        );
    }

    #[tokio::test]
    async fn test_static_assets_and_spa_fallback() {
        let (app, _dist) = app(StubCollaborator::default(), None);

        let response = send(&app, Method::GET, "/app.js", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(body_text(response).await, "console.log('ui');");

        let response = send(&app, Method::GET, "/consult/step/2", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>GroundTruth</html>");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (app, _dist) = app(StubCollaborator::default(), None);
        let response = send(&app, Method::GET, "/metrics", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_api_flow() {
        let stub = StubCollaborator::replying("Use certified seed.");
        let (app, _dist) = app(stub, None);

        let response = send(&app, Method::POST, "/api/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["mode"], "setup");
        assert_eq!(snapshot["wizard"]["phase"], "language");
        let id = snapshot["id"].as_str().unwrap().to_string();

        for input in setup_inputs() {
            let body = serde_json::to_value(&input).unwrap();
            let response = send(
                &app,
                Method::POST,
                &format!("/api/sessions/{id}/wizard"),
                Some(body),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/sessions/{id}/query"),
            Some(json!({"text": "Which onion variety?"})),
        )
        .await;
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["mode"], "idle");
        assert_eq!(snapshot["queryText"], "Which onion variety?");
        assert_eq!(snapshot["context"]["cropOrTask"], "Onion");

        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/query"),
            Some(json!({})),
        )
        .await;
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["mode"], "consulting");
        assert_eq!(snapshot["messages"][1]["text"], "Use certified seed.");
        assert_eq!(snapshot["messages"][1]["role"], "model");

        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/edit"),
            Some(json!({"target": "assumptions"})),
        )
        .await;
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["mode"], "editing");
        assert_eq!(snapshot["editTarget"], "assumptions");
        assert_eq!(snapshot["wizard"]["phase"], "sub_locality");

        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/edit/cancel"),
            None,
        )
        .await;
        assert_eq!(body_json(response).await["mode"], "consulting");

        let response = send(&app, Method::POST, &format!("/api/sessions/{id}/reset"), None).await;
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["mode"], "idle");
        assert_eq!(snapshot["messages"], json!([]));

        let response = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "session_not_found");
    }

    #[tokio::test]
    async fn test_invalid_transition_conflict() {
        let (app, _dist) = app(StubCollaborator::default(), None);
        let response = send(&app, Method::POST, "/api/sessions", None).await;
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/follow-up"),
            Some(json!({"text": "Hello"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["code"], "invalid_transition");
        assert_eq!(body["details"]["mode"], "setup");

        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/wizard"),
            Some(json!({"type": "next"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/wizard"),
            Some(json!({"type": "next"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "wizard_phase_invalid");
    }

    #[tokio::test]
    async fn test_catalog_and_labels() {
        let (app, _dist) = app(StubCollaborator::default(), None);

        let body = body_json(send(&app, Method::GET, "/api/catalog", None).await).await;
        assert_eq!(body["languages"].as_array().unwrap().len(), 10);
        assert_eq!(body["languages"][0]["code"], "hi");
        assert_eq!(body["intents"].as_array().unwrap().len(), 5);
        assert!(body["states"].as_array().unwrap().contains(&json!("Telangana")));

        let body = body_json(
            send(&app, Method::GET, "/api/catalog/states/Bihar/districts", None).await,
        )
        .await;
        assert!(body["districts"].as_array().unwrap().contains(&json!("Patna")));

        let response = send(&app, Method::GET, "/api/catalog/states/Atlantis/districts", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(send(&app, Method::GET, "/api/labels/te", None).await).await;
        assert_eq!(body["locale"], "te");
        assert_eq!(body["labels"]["edit"], "సవరించు");

        let body = body_json(send(&app, Method::GET, "/api/labels/kn", None).await).await;
        assert_eq!(body["locale"], "hi");
        assert_eq!(body["labels"]["next"], "अगला");
    }
}
