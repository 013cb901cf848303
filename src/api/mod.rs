//! HTTP control API.
//!
//! Thin axum adapter over [`ControlSurface`]. Every route answers JSON.

use axum::{
    Router,
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, instrument};

use crate::control::ControlSurface;
use crate::state::ConfigError;

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    month: Option<String>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Rejection for a configuration update.
#[derive(Debug)]
pub struct ApiError(ConfigError);

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Builds the router for the control API.
pub fn router(control: ControlSurface) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/toggle", post(toggle))
        .route("/api/history", get(history))
        .route("/api/logs", get(logs))
        .route("/api/config", get(get_config).post(set_config))
        .layer(TraceLayer::new_for_http())
        .with_state(control)
}

async fn status(State(control): State<ControlSurface>) -> impl IntoResponse {
    Json(control.status())
}

#[instrument(skip(control))]
async fn toggle(State(control): State<ControlSurface>) -> impl IntoResponse {
    Json(control.toggle())
}

async fn history(
    State(control): State<ControlSurface>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let month = query.month.and_then(|m| m.trim().parse::<u32>().ok());
    Json(control.history(month))
}

async fn logs(State(control): State<ControlSurface>) -> impl IntoResponse {
    Json(control.logs())
}

async fn get_config(State(control): State<ControlSurface>) -> impl IntoResponse {
    Json(control.config())
}

#[instrument(skip_all)]
async fn set_config(
    State(control): State<ControlSurface>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    match control.set_config(&body).await {
        Ok(_) => Ok(Json(OkResponse { ok: true })),
        Err(e) => {
            debug!(error = %e, "configuration rejected");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::{JsonStore, Recorder};
    use crate::state::{Configuration, LogBook, SharedState, Statistics};

    fn app(temp: &TempDir) -> Router {
        let now = NaiveDate::from_ymd_opt(2025, 7, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let state = Arc::new(SharedState::new(
            Configuration::default(),
            Statistics::starting(now.date()),
            LogBook::default(),
            Arc::new(ManualClock::new(now)),
        ));
        let store = Arc::new(JsonStore::new(temp.path()));
        router(ControlSurface::new(state, Arc::new(Recorder::new(store))))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_status_shape() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        let (status, json) = call(&app, Method::GET, "/api/status", Body::empty()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "disabled");
        assert_eq!(json["speed_history"].as_array().unwrap().len(), 30);
        assert_eq!(json["today_date"], "2025-07-20");
        assert_eq!(json["uptime_seconds"], 0);
        assert_eq!(json["daily_quota_gb"], 200);
    }

    #[tokio::test]
    async fn test_toggle_requires_post() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let (status, _) = call(&app, Method::GET, "/api/toggle", Body::empty()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, json) = call(&app, Method::POST, "/api/toggle", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_running"], true);

        let (_, json) = call(&app, Method::GET, "/api/status", Body::empty()).await;
        assert_eq!(json["status"], "evaluating");
    }

    #[tokio::test]
    async fn test_history_month_parameter() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let (_, json) = call(&app, Method::GET, "/api/history?month=2", Body::empty()).await;
        assert_eq!(json["month"], 2);
        assert_eq!(json["days"].as_array().unwrap().len(), 28);

        for uri in ["/api/history", "/api/history?month=abc", "/api/history?month=13"] {
            let (status, json) = call(&app, Method::GET, uri, Body::empty()).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(json["month"], 7, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_config_update_roundtrip() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        let payload = r#"{"speed_limit_mbps":3,"daily_quota_gb":10,"schedule_start":"01:00","schedule_end":"05:00","urls":["https://example.com/f"]}"#;

        let (status, json) = call(&app, Method::POST, "/api/config", Body::from(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        let (_, json) = call(&app, Method::GET, "/api/config", Body::empty()).await;
        assert_eq!(json["speed_limit_mbps"], 3);
        assert_eq!(json["urls"][0], "https://example.com/f");

        let (_, json) = call(&app, Method::GET, "/api/logs", Body::empty()).await;
        assert_eq!(json["max_entries"], 500);
        let last = json["entries"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["time"], "09:30:00");
        assert!(last["msg"].as_str().unwrap().starts_with("config updated"));
    }

    #[tokio::test]
    async fn test_malformed_config_is_bad_request() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let (status, json) = call(&app, Method::POST, "/api/config", Body::from("{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("malformed"));

        let (_, json) = call(&app, Method::GET, "/api/config", Body::empty()).await;
        assert_eq!(json["speed_limit_mbps"], 5);
    }
}
