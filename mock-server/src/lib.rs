//! In-memory stand-in for the Tick v2 REST API.
//!
//! Every route lives under `/{subscription_id}/api/v2/` and ends in `.json`.
//! Collections are created on first write and keyed by their path, so
//! `projects.json`, `clients.json` and `projects/12/tasks.json` are all
//! independent collections. `status/{code}.json` answers with that status,
//! which lets clients exercise their error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const TOKEN_PREFIX: &str = "Token token=";

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    collections: HashMap<String, BTreeMap<u64, Map<String, Value>>>,
}

impl Store {
    fn list(&self, collection: &str, filters: &HashMap<String, String>) -> Vec<Value> {
        self.collections
            .get(collection)
            .into_iter()
            .flat_map(|records| records.values())
            .filter(|record| matches_filters(record, filters))
            .cloned()
            .map(Value::Object)
            .collect()
    }

    fn create(&mut self, collection: &str, mut fields: Map<String, Value>) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        fields.insert("id".to_string(), json!(id));
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, fields.clone());
        Value::Object(fields)
    }

    fn get(&self, collection: &str, id: u64) -> Option<Value> {
        self.collections
            .get(collection)
            .and_then(|records| records.get(&id))
            .cloned()
            .map(Value::Object)
    }

    fn update(&mut self, collection: &str, id: u64, fields: Map<String, Value>) -> Option<Value> {
        let record = self.collections.get_mut(collection)?.get_mut(&id)?;
        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        Some(Value::Object(record.clone()))
    }

    fn delete(&mut self, collection: &str, id: u64) -> bool {
        self.collections
            .get_mut(collection)
            .is_some_and(|records| records.remove(&id).is_some())
    }
}

fn matches_filters(record: &Map<String, Value>, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, expected)| match record.get(key) {
        Some(Value::String(actual)) => actual == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::default();
    Router::new()
        .route("/{subscription_id}/api/v2/{*path}", any(dispatch))
        .layer(middleware::from_fn(require_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn require_token(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(TOKEN_PREFIX))
        .is_some_and(|token| !token.is_empty());
    if !authorized {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    next.run(request).await
}

/// Where a request path points once the `.json` suffix is removed.
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    Status(&'a str),
    Collection(&'a str),
    Record(&'a str, u64),
}

fn resolve(path: &str) -> Option<Target<'_>> {
    let path = path.strip_suffix(".json")?;
    if let Some(code) = path.strip_prefix("status/") {
        return Some(Target::Status(code));
    }
    match path.rsplit_once('/') {
        Some((collection, id)) => match id.parse() {
            Ok(id) => Some(Target::Record(collection, id)),
            Err(_) => Some(Target::Collection(path)),
        },
        None if path.is_empty() => None,
        None => Some(Target::Collection(path)),
    }
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

async fn dispatch(
    State(db): State<Db>,
    Path((_subscription_id, path)): Path<(String, String)>,
    Query(filters): Query<HashMap<String, String>>,
    method: Method,
    body: Bytes,
) -> Response {
    debug!(%method, path = %path, "handling request");
    let Some(target) = resolve(&path) else {
        return error_response(StatusCode::NOT_FOUND, "not found");
    };

    match (target, method) {
        (Target::Status(code), _) => match code.parse().map(StatusCode::from_u16) {
            Ok(Ok(status)) if status.as_u16() >= 200 => {
                (status, Json(json!({ "status": status.as_u16() }))).into_response()
            }
            _ => error_response(StatusCode::BAD_REQUEST, "invalid status code"),
        },
        (Target::Collection(collection), Method::GET) => {
            Json(db.read().await.list(collection, &filters)).into_response()
        }
        (Target::Collection(collection), Method::POST) => match parse_object(&body) {
            Some(fields) => {
                let record = db.write().await.create(collection, fields);
                (StatusCode::CREATED, Json(record)).into_response()
            }
            None => error_response(StatusCode::UNPROCESSABLE_ENTITY, "expected a JSON object"),
        },
        (Target::Record(collection, id), Method::GET) => match db.read().await.get(collection, id) {
            Some(record) => Json(record).into_response(),
            None => error_response(StatusCode::NOT_FOUND, "not found"),
        },
        (Target::Record(collection, id), Method::PUT) => {
            let Some(fields) = parse_object(&body) else {
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, "expected a JSON object");
            };
            match db.write().await.update(collection, id, fields) {
                Some(record) => Json(record).into_response(),
                None => error_response(StatusCode::NOT_FOUND, "not found"),
            }
        }
        (Target::Record(collection, id), Method::DELETE) => {
            if db.write().await.delete(collection, id) {
                StatusCode::NO_CONTENT.into_response()
            } else {
                error_response(StatusCode::NOT_FOUND, "not found")
            }
        }
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_collection_and_record_paths() {
        assert_eq!(resolve("projects.json"), Some(Target::Collection("projects")));
        assert_eq!(resolve("projects/12.json"), Some(Target::Record("projects", 12)));
        assert_eq!(
            resolve("projects/12/tasks.json"),
            Some(Target::Collection("projects/12/tasks"))
        );
        assert_eq!(resolve("status/503.json"), Some(Target::Status("503")));
    }

    #[test]
    fn resolve_rejects_paths_without_suffix() {
        assert_eq!(resolve("projects"), None);
        assert_eq!(resolve(".json"), None);
    }

    #[test]
    fn filters_compare_stringified_values() {
        let record = json!({"id": 3, "name": "Acme", "archived": false});
        let Value::Object(record) = record else { unreachable!() };

        let filters = HashMap::from([("name".to_string(), "Acme".to_string())]);
        assert!(matches_filters(&record, &filters));
        let filters = HashMap::from([("archived".to_string(), "false".to_string())]);
        assert!(matches_filters(&record, &filters));
        let filters = HashMap::from([("id".to_string(), "4".to_string())]);
        assert!(!matches_filters(&record, &filters));
        let filters = HashMap::from([("missing".to_string(), "x".to_string())]);
        assert!(!matches_filters(&record, &filters));
    }

    #[test]
    fn update_keeps_id() {
        let mut store = Store::default();
        let created = store.create("clients", Map::new());
        let id = created["id"].as_u64().unwrap();

        let Value::Object(fields) = json!({"id": 99, "name": "Renamed"}) else { unreachable!() };
        let updated = store.update("clients", id, fields).unwrap();
        assert_eq!(updated, json!({"id": id, "name": "Renamed"}));
    }

    #[test]
    fn ids_are_unique_across_collections() {
        let mut store = Store::default();
        let a = store.create("clients", Map::new());
        let b = store.create("projects", Map::new());
        assert_ne!(a["id"], b["id"]);
        assert!(store.delete("clients", a["id"].as_u64().unwrap()));
        assert!(!store.delete("clients", a["id"].as_u64().unwrap()));
    }
}
