use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Collections served by the mock, with the page size used when `limit` is
/// absent.
pub const COLLECTIONS: [(&str, usize); 6] = [
    ("usdy-token-operations", 100),
    ("ousg-fund-management", 50),
    ("ondo-global-markets", 100),
    ("token-pricing-and-nav", 100),
    ("redemptions-and-subscriptions", 100),
    ("flux-finance-lending", 10),
];

pub type Records = BTreeMap<String, Map<String, Value>>;

#[derive(Clone, Default)]
pub struct AppState {
    db: Arc<RwLock<HashMap<String, Records>>>,
    api_key: Option<Arc<str>>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Mock API accepting any bearer token.
pub fn app() -> Router {
    router(AppState::default())
}

/// Mock API that only accepts `Bearer {api_key}`.
pub fn app_with_api_key(api_key: &str) -> Router {
    router(AppState {
        api_key: Some(Arc::from(api_key)),
        ..AppState::default()
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{collection}", get(list_records).post(create_record))
        .route(
            "/{collection}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .fallback(|| async { not_found() })
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
}

fn known_collection(collection: &str) -> Option<usize> {
    COLLECTIONS
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, limit)| *limit)
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let authorized = match (token, state.api_key.as_deref()) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(token), Some(expected)) => token == expected,
    };
    if !authorized {
        tracing::warn!(path = %request.uri().path(), "rejected unauthenticated request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        )
            .into_response();
    }
    next.run(request).await
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(page): Query<Pagination>,
) -> Response {
    let Some(default_limit) = known_collection(&collection) else {
        return not_found();
    };
    let db = state.db.read().await;
    let records: Vec<Value> = db
        .get(&collection)
        .map(|records| {
            records
                .values()
                .skip(page.offset.unwrap_or(0))
                .take(page.limit.unwrap_or(default_limit))
                .cloned()
                .map(Value::Object)
                .collect()
        })
        .unwrap_or_default();
    Json(records).into_response()
}

async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(mut input): Json<Map<String, Value>>,
) -> Response {
    if known_collection(&collection).is_none() {
        return not_found();
    }
    let id = Uuid::new_v4().to_string();
    input.insert("id".to_string(), Value::String(id.clone()));
    tracing::debug!(%collection, %id, "created record");
    state
        .db
        .write()
        .await
        .entry(collection)
        .or_default()
        .insert(id, input.clone());
    (StatusCode::CREATED, Json(input)).into_response()
}

async fn get_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let db = state.db.read().await;
    match db.get(&collection).and_then(|records| records.get(&id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => not_found(),
    }
}

/// Merge the supplied fields into the stored record.
async fn update_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(input): Json<Map<String, Value>>,
) -> Response {
    let mut db = state.db.write().await;
    let Some(record) = db
        .get_mut(&collection)
        .and_then(|records| records.get_mut(&id))
    else {
        return not_found();
    };
    for (key, value) in input {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Json(record.clone()).into_response()
}

async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let mut db = state.db.write().await;
    match db
        .get_mut(&collection)
        .and_then(|records| records.remove(&id))
    {
        Some(_) => Json(json!({"id": id, "deleted": true})).into_response(),
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_collection_is_known() {
        assert_eq!(known_collection("flux-finance-lending"), Some(10));
        assert_eq!(known_collection("ousg-fund-management"), Some(50));
        assert_eq!(known_collection("widgets"), None);
    }

    #[test]
    fn pagination_fields_are_optional() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert!(page.limit.is_none());
        assert!(page.offset.is_none());
    }

    #[test]
    fn not_found_uses_json_message() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
