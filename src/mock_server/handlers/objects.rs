//! Object endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::codes;
use crate::mock_server::state::MockState;

/// Query parameters for fetching an object.
#[derive(Debug, Default, Deserialize)]
pub struct GetObjectQuery {
    pub include: Option<String>,
    pub keys: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// GET /classes/{class_name}/{object_id}
pub async fn get_object(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((class_name, object_id)): Path<(String, String)>,
    Query(query): Query<GetObjectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let latency = {
        let mut state = state.write().await;
        state.request_count += 1;
        state.latency
    };
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }

    let state = state.read().await;

    if let Some(required) = &state.required_application_id {
        let sent = headers
            .get("x-parse-application-id")
            .and_then(|v| v.to_str().ok());
        if sent != Some(required.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "unauthorized" })),
            )
                .into_response();
        }
    }

    match state.get_object(&class_name, &object_id) {
        Some(object) => {
            let include = split_list(query.include.as_deref());
            let keys = split_list(query.keys.as_deref());
            (StatusCode::OK, Json(state.render(object, &include, &keys))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "code": codes::OBJECT_NOT_FOUND,
                "error": "Object not found."
            })),
        )
            .into_response(),
    }
}
