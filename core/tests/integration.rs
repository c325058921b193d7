//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `ApiClient`
//! verb over real HTTP through `UreqTransport`, covering the success paths
//! and each failure class the client distinguishes.

use serde_json::json;
use tick_core::{ApiClient, ApiError, ClientConfig, ClientIdentity, UreqTransport};
use tracing_test::traced_test;

/// Start the mock server on a random port and return its base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

fn client(base_url: &str, token: &str) -> ApiClient<UreqTransport> {
    ApiClient::new(
        ClientConfig::with_base_url(base_url),
        ClientIdentity::new("4242", token, "Acme", "ops@acme.test"),
        UreqTransport::new(),
    )
}

#[test]
fn crud_lifecycle() {
    let base = spawn_server();
    let client = client(&base, "secret");

    // Step 1: list — should be empty.
    let clients = client.get("clients", &[]).unwrap();
    assert_eq!(clients, json!([]));

    // Step 2: create.
    let created = client.post("clients", &json!({"name": "Acme"})).unwrap();
    assert_eq!(created["name"], "Acme");
    let id = created["id"].as_u64().unwrap();

    // Step 3: get it back, twice.
    let first = client.get(&format!("clients/{id}"), &[]).unwrap();
    let second = client.get(&format!("clients/{id}"), &[]).unwrap();
    assert_eq!(first, json!({"id": id, "name": "Acme"}));
    assert_eq!(first, second);

    // Step 4: filtered list.
    client.post("clients", &json!({"name": "Globex"})).unwrap();
    let filtered = client.get("clients", &[("name", "Globex")]).unwrap();
    assert_eq!(filtered.as_array().map(Vec::len), Some(1));
    assert_eq!(filtered[0]["name"], "Globex");

    // Step 5: update returns the raw response.
    let updated = client
        .put(&format!("clients/{id}"), &json!({"archived": true}))
        .unwrap();
    assert_eq!(updated.status, 200);
    let body: serde_json::Value = serde_json::from_slice(&updated.body).unwrap();
    assert_eq!(body["archived"], true);
    assert_eq!(body["name"], "Acme");

    // Step 6: delete returns the raw response.
    let deleted = client.delete(&format!("clients/{id}")).unwrap();
    assert_eq!(deleted.status, 204);
    assert!(deleted.body.is_empty());

    // Step 7: delete again — 404.
    let err = client.delete(&format!("clients/{id}")).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
#[traced_test]
fn missing_record_is_response_error() {
    let base = spawn_server();
    let err = client(&base, "secret").get("projects/999", &[]).unwrap_err();

    let response = err.response().expect("404 should carry the response");
    assert_eq!(response.status, 404);
    assert_eq!(response.reason, "Not Found");
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, json!({"error": "not found"}));
    assert!(logs_contain("projects/999"));
    assert!(logs_contain("code=404"));
}

#[test]
fn empty_token_is_rejected_by_the_api() {
    let base = spawn_server();
    let err = client(&base, "").post("tasks", &json!({"name": "x"})).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
#[traced_test]
fn server_error_is_response_error() {
    let base = spawn_server();
    let err = client(&base, "secret").get("status/500", &[]).unwrap_err();

    assert!(matches!(err, ApiError::Response(ref r) if r.status == 500));
    assert!(logs_contain("server error"));
    assert!(logs_contain("code=500"));
}

#[test]
#[traced_test]
fn unreachable_host_is_generic_failure() {
    // Bind then drop so the port is very likely closed.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = format!("http://127.0.0.1:{port}/");

    let err = client(&base, "secret")
        .post("tasks", &json!({"name": "x"}))
        .unwrap_err();

    assert!(matches!(err, ApiError::Generic { ref message } if message == "Something went wrong"));
    assert!(logs_contain("without a response"));
    assert!(!logs_contain("code="));
}
