//! HTTP-level tests for the user and fence routes.
//!
//! The router runs over the in-memory store, so no database is needed.

#[cfg(feature = "server")]
mod route_tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use geofence_users::api::{create_router, AppState};
    use geofence_users::MemoryUserStore;

    fn app(store: Arc<MemoryUserStore>) -> axum::Router {
        create_router(AppState::new(store))
    }

    async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Arc::new(MemoryUserStore::new())), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_create_user_returns_envelope_with_identity() {
        let store = Arc::new(MemoryUserStore::new());
        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/users/create",
            Some(json!({"name": "Alice", "lat": 40.785091, "lng": -73.968285})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully created user");
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"]["name"], "Alice");
        assert_eq!(body["data"]["location"]["latitude"], 40.785091);
        assert_eq!(body["data"]["location"]["longitude"], -73.968285);
        assert!(!body["data"]["id"].as_str().unwrap().is_empty());
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_user_is_rejected_before_store() {
        let store = Arc::new(MemoryUserStore::new());

        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/users/create",
            Some(json!({"name": "", "lat": 40.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Field 'name' failed on the 'required' tag"));
        assert!(message.contains("Field 'lng' failed on the 'required' tag"));
        assert!(body.get("data").is_none());

        let (status, _) = send(
            app(store.clone()),
            "POST",
            "/api/v1/users/create",
            Some(json!({"name": "Bob", "lat": 123.0, "lng": 0.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(store.users().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/users/create")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(Arc::new(MemoryUserStore::new()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_default_fence_lists_contained_users() {
        let store = Arc::new(MemoryUserStore::new());
        for (name, lat, lng) in [("inside", 40.77, -73.97), ("outside", 0.0, 0.0)] {
            let (status, _) = send(
                app(store.clone()),
                "POST",
                "/api/v1/users/create",
                Some(json!({"name": name, "lat": lat, "lng": lng})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(app(store.clone()), "GET", "/api/v1/users/", None).await;
        assert_eq!(status, StatusCode::OK);
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["name"], "inside");
        assert_eq!(store.fence_count().await, 0);
    }

    #[tokio::test]
    async fn test_custom_fence_from_body() {
        let store = Arc::new(MemoryUserStore::new());
        send(
            app(store.clone()),
            "POST",
            "/api/v1/users/create",
            Some(json!({"name": "Sydney", "lat": -33.8688, "lng": 151.2093})),
        )
        .await;

        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/users/within",
            Some(json!({
                "label": "sydney",
                "vertices": [[151.0, -34.0], [151.5, -34.0], [151.5, -33.5], [151.0, -33.5]]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "Sydney");

        let (status, body) = send(
            app(store),
            "POST",
            "/api/v1/users/within",
            Some(json!({"vertices": [[0.0, 0.0], [1.0, 1.0]]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("vertices"));
    }

    #[tokio::test]
    async fn test_closed_two_point_ring_is_a_bad_request() {
        let store = Arc::new(MemoryUserStore::new());
        send(
            app(store.clone()),
            "POST",
            "/api/v1/users/create",
            Some(json!({"name": "On the segment", "lat": 0.5, "lng": 0.5})),
        )
        .await;

        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/users/within",
            Some(json!({"label": "sliver", "vertices": [[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Field 'vertices' failed on the 'min' tag");
        assert!(body.get("data").is_none());
        assert_eq!(store.fence_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_fence_returns_empty_list() {
        let (status, body) = send(
            app(Arc::new(MemoryUserStore::new())),
            "GET",
            "/api/v1/users/",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }
}
