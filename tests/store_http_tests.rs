// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP store integration tests against an in-process stub file host.
//!
//! The stub speaks the same conditional-PUT protocol as the production
//! host: entity tags on every response, `If-None-Match: *` guarding
//! creation, `If-Match` guarding replacement, and 412 on a lost race.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use site_tracker::models::GeoPoint;
use site_tracker::repository::{ActivityRepository, RetryPolicy};
use site_tracker::services::{GeofenceValidator, LifecycleEngine};
use site_tracker::store::{HttpDocumentStore, StoreError, VersionedStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;

struct StubHost {
    documents: DashMap<String, (String, u64)>,
    revision: AtomicU64,
    /// When false the host omits entity tags, like a plain file server.
    send_etags: bool,
    /// Bearer token the host demands, if any.
    expected_token: Option<String>,
}

impl StubHost {
    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn etag(revision: u64) -> String {
        format!("\"rev-{}\"", revision)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.expected_token {
            None => true,
            Some(token) => headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v == format!("Bearer {}", token))
                .unwrap_or(false),
        }
    }

    fn tagged(&self, status: StatusCode, revision: u64, body: String) -> Response {
        let mut response = (status, body).into_response();
        if self.send_etags {
            response
                .headers_mut()
                .insert(header::ETAG, Self::etag(revision).parse().unwrap());
        }
        response
    }
}

async fn get_document(
    State(host): State<Arc<StubHost>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !host.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match host.documents.get(&name) {
        Some(entry) => {
            let (body, revision) = entry.value();
            host.tagged(StatusCode::OK, *revision, body.clone())
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_document(
    State(host): State<Arc<StubHost>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !host.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    let if_match = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok());

    if if_none_match == Some("*") {
        return match host.documents.entry(name) {
            Entry::Occupied(_) => StatusCode::PRECONDITION_FAILED.into_response(),
            Entry::Vacant(slot) => {
                let revision = host.next_revision();
                slot.insert((body, revision));
                host.tagged(StatusCode::CREATED, revision, String::new())
            }
        };
    }

    if let Some(expected) = if_match {
        return match host.documents.get_mut(&name) {
            None => StatusCode::PRECONDITION_FAILED.into_response(),
            Some(mut entry) => {
                let (stored_body, stored_revision) = entry.value_mut();
                if StubHost::etag(*stored_revision) != expected {
                    return StatusCode::PRECONDITION_FAILED.into_response();
                }
                let revision = host.next_revision();
                *stored_body = body;
                *stored_revision = revision;
                host.tagged(StatusCode::OK, revision, String::new())
            }
        };
    }

    // Unconditional writes are refused: every writer must hold a version.
    StatusCode::BAD_REQUEST.into_response()
}

async fn list_documents(
    State(host): State<Arc<StubHost>>,
    headers: HeaderMap,
) -> Response {
    if !host.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let names: Vec<String> = host
        .documents
        .iter()
        .map(|entry| entry.key().clone())
        .collect();
    Json(names).into_response()
}

/// Spin up a stub host on an ephemeral port; returns its base URL.
async fn serve_stub(send_etags: bool, expected_token: Option<&str>) -> String {
    let host = Arc::new(StubHost {
        documents: DashMap::new(),
        revision: AtomicU64::new(0),
        send_etags,
        expected_token: expected_token.map(str::to_string),
    });

    let app = Router::new()
        .route("/", get(list_documents))
        .route("/{name}", get(get_document).put(put_document))
        .with_state(host);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: String, token: Option<&str>) -> HttpDocumentStore {
    HttpDocumentStore::new(
        base_url,
        token.map(str::to_string),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let base = serve_stub(true, None).await;
    let store = client(base, None);

    let version = store.create("a1", r#"{"x":1}"#).await.unwrap();
    let entry = store.get("a1").await.unwrap();

    assert_eq!(entry.body, r#"{"x":1}"#);
    assert_eq!(entry.version, version);
    assert_eq!(entry.id, "a1");
}

#[tokio::test]
async fn test_create_existing_is_already_exists() {
    let base = serve_stub(true, None).await;
    let store = client(base, None);

    store.create("a1", "{}").await.unwrap();
    assert!(matches!(
        store.create("a1", "{}").await,
        Err(StoreError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let base = serve_stub(true, None).await;
    let store = client(base, None);

    assert!(matches!(
        store.get("missing").await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_stale_writer_sees_version_conflict() {
    let base = serve_stub(true, None).await;
    let store = client(base, None);

    let v1 = store.create("a1", "one").await.unwrap();
    let v2 = store.conditional_update("a1", "two", &v1).await.unwrap();
    assert_ne!(v1, v2);

    assert!(matches!(
        store.conditional_update("a1", "three", &v1).await,
        Err(StoreError::VersionConflict(_))
    ));

    // The conflicting write changed nothing.
    assert_eq!(store.get("a1").await.unwrap().body, "two");
}

#[tokio::test]
async fn test_list_fetches_every_document() {
    let base = serve_stub(true, None).await;
    let store = client(base, None);

    store.create("a1", "one").await.unwrap();
    store.create("a2", "two").await.unwrap();

    let mut ids: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    ids.sort();

    // Host names carry the .json suffix; entry ids must not.
    assert_eq!(ids, vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_host_without_entity_tags_is_unusable() {
    let base = serve_stub(false, None).await;
    let store = client(base, None);

    let err = store.create("a1", "{}").await.unwrap_err();
    match err {
        StoreError::Unavailable(msg) => assert!(msg.contains("entity tag")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bearer_token_is_sent_and_checked() {
    let base = serve_stub(true, Some("sekrit")).await;

    let authed = client(base.clone(), Some("sekrit"));
    authed.create("a1", "{}").await.unwrap();

    let anonymous = client(base, None);
    let err = anonymous.get("a1").await.unwrap_err();
    match err {
        StoreError::Unavailable(msg) => assert!(msg.contains("401")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_engine_flow_over_the_wire() {
    let base = serve_stub(true, None).await;
    let store: Arc<dyn VersionedStore> = Arc::new(client(base, None));
    let repository = ActivityRepository::new(
        store,
        RetryPolicy {
            max_attempts: 8,
            backoff_min_ms: 1,
            backoff_max_ms: 5,
        },
    );
    let engine = Arc::new(LifecycleEngine::new(
        repository,
        GeofenceValidator::new(0.0),
    ));

    let created = engine
        .create_activity(&common::admin(), common::fenced_activity("v1"))
        .await
        .unwrap();
    engine
        .start_work(
            &common::vendor("v1"),
            &created.id,
            GeoPoint::new(40.700, -73.900),
        )
        .await
        .unwrap();

    // Concurrent samplers racing through real HTTP conditional writes.
    let mut handles = vec![];
    for i in 0..3u32 {
        let engine = engine.clone();
        let id = created.id.clone();
        handles.push(tokio::spawn(async move {
            let point = GeoPoint::new(40.700 + f64::from(i) * 0.00001, -73.900);
            engine
                .record_breadcrumb(&common::vendor("v1"), &id, point)
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("Task join failed")
            .expect("Breadcrumb recording failed");
    }

    let done = engine
        .complete_work(
            &common::vendor("v1"),
            &created.id,
            GeoPoint::new(40.700, -73.900),
        )
        .await
        .unwrap();

    assert_eq!(done.properties.breadcrumbs.len(), 5);
    assert_eq!(
        done.properties
            .breadcrumbs
            .last()
            .unwrap()
            .triggering_action,
        "complete"
    );

    let listed = engine
        .list_activities(&common::admin(), None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
