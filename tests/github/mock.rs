//! In-process stand-in for the GitHub contents API, backed by the in-memory
//! store.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use folio::{DocumentStore, InMemoryDocumentStore, StoreError, VersionTag};
use serde_json::{json, Value};

pub const TOKEN: &str = "secret-token";

type Reply = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct Mock {
    pub store: InMemoryDocumentStore,
    puts: Arc<Mutex<Vec<Value>>>,
}

impl Mock {
    pub fn new(store: InMemoryDocumentStore) -> Self {
        Self {
            store,
            puts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Request bodies of every PUT received, in order.
    pub fn puts(&self) -> Vec<Value> {
        self.puts.lock().unwrap().clone()
    }
}

/// Serve the mock on an ephemeral port and return its base URL.
pub async fn spawn(mock: Mock) -> String {
    let app = Router::new()
        .route("/repos/:owner/:name", get(repository))
        .route("/repos/:owner/:name/commits", get(commits))
        .route(
            "/repos/:owner/:name/contents/*path",
            get(get_contents).put(put_contents),
        )
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(message(StatusCode::UNAUTHORIZED, "Bad credentials")),
    }
}

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

fn store_error(err: StoreError) -> Reply {
    match err {
        StoreError::NotFound { .. } => message(StatusCode::NOT_FOUND, "Not Found"),
        StoreError::Unauthorized(_) => message(StatusCode::UNAUTHORIZED, "Bad credentials"),
        StoreError::VersionConflict { .. } => {
            message(StatusCode::CONFLICT, "is at 0000 but expected 1111")
        }
        other => message(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

/// Base64 wrapped at 60 columns, the way the contents API sends it.
fn wrapped_base64(content: &[u8]) -> String {
    let encoded = STANDARD.encode(content);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect()
}

async fn repository(
    Path((owner, name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    (
        StatusCode::OK,
        Json(json!({ "full_name": format!("{}/{}", owner, name) })),
    )
}

async fn get_contents(
    State(mock): State<Mock>,
    Path((_owner, _name, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    if query.get("ref").map(String::as_str) != Some("main") {
        return message(StatusCode::NOT_FOUND, "No commit found for the ref");
    }

    match mock.store.fetch_document(&path).await {
        Ok(document) => {
            return (
                StatusCode::OK,
                Json(json!({
                    "type": "file",
                    "name": path.rsplit('/').next().unwrap_or(&path),
                    "path": document.path,
                    "sha": document.version.as_str(),
                    "size": document.content.len(),
                    "encoding": "base64",
                    "content": wrapped_base64(&document.content),
                })),
            )
        }
        Err(StoreError::NotFound { .. }) => {}
        Err(err) => return store_error(err),
    }

    match mock.store.list_directory(&path).await {
        Ok(entries) => {
            let listing: Vec<Value> = entries
                .into_iter()
                .map(|entry| {
                    json!({
                        "type": entry.kind,
                        "name": entry.name,
                        "path": entry.path,
                        "sha": entry.version.as_str(),
                        "size": entry.size,
                    })
                })
                .collect();
            (StatusCode::OK, Json(Value::Array(listing)))
        }
        Err(err) => store_error(err),
    }
}

async fn put_contents(
    State(mock): State<Mock>,
    Path((_owner, _name, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    mock.puts.lock().unwrap().push(body.clone());

    let message_text = body["message"].as_str().unwrap_or_default();
    let content = match STANDARD.decode(body["content"].as_str().unwrap_or_default()) {
        Ok(content) => content,
        Err(_) => return message(StatusCode::UNPROCESSABLE_ENTITY, "content is not valid Base64"),
    };

    let result = match body["sha"].as_str() {
        Some(sha) => {
            mock.store
                .write_document(&path, &content, &VersionTag::new(sha), message_text)
                .await
        }
        None => match mock.store.create_document(&path, &content, message_text).await {
            Err(StoreError::VersionConflict { .. }) => {
                return message(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Invalid request.\n\n\"sha\" wasn't supplied.",
                )
            }
            other => other,
        },
    };

    match result {
        Ok(version) => (
            StatusCode::OK,
            Json(json!({ "content": { "path": path, "sha": version.as_str() } })),
        ),
        Err(err) => store_error(err),
    }
}

async fn commits(
    State(mock): State<Mock>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let limit = query
        .get("per_page")
        .and_then(|n| n.parse().ok())
        .unwrap_or(30);

    match mock.store.list_recent_changes(limit).await {
        Ok(changes) => {
            let items: Vec<Value> = changes
                .into_iter()
                .map(|change| {
                    json!({
                        "sha": change.id,
                        "commit": {
                            "message": change.message,
                            "author": {
                                "name": change.author,
                                "date": change.timestamp.to_rfc3339(),
                            }
                        }
                    })
                })
                .collect();
            (StatusCode::OK, Json(Value::Array(items)))
        }
        Err(err) => store_error(err),
    }
}
