//! `RestBackend` against a local HTTP listener serving canned responses.
//!
//! Verifies:
//! - 401 maps to `Unauthenticated`, any other non-2xx to `Rejected` with the body
//! - 204 and empty bodies read as "no organization"
//! - Unparseable bodies map to `Decode`, refused connections to `Network`
//! - Requests carry the project key and bearer token

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use firstshift_auth::Role;
use firstshift_backend::{BackendError, OrgBackend, RestBackend, RestConfig};
use firstshift_core::{OrganizationId, UserId};

struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl CannedServer {
    /// Answer every request with `status` and `body`.
    async fn spawn(status: &'static str, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let head = read_request(&mut stream).await;
                seen.lock().unwrap().push(head);
                write_response(&mut stream, status, &body).await;
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle,
        }
    }

    fn backend(&self) -> RestBackend {
        backend_at(&self.base_url)
    }

    fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read one request, body included. Returns the request head.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    head
}

async fn write_response(stream: &mut TcpStream, status: &str, body: &str) {
    let response = if status.starts_with("204") {
        format!("HTTP/1.1 {status}\r\nConnection: close\r\n\r\n")
    } else {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    };
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn backend_at(base_url: &str) -> RestBackend {
    RestBackend::new(RestConfig {
        base_url: base_url.to_string(),
        anon_key: "anon-key".to_string(),
        access_token: "session-token".to_string(),
        user_id: UserId::new(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn no_content_resolves_to_no_organization() {
    let server = CannedServer::spawn("204 No Content", String::new()).await;

    let resolved = server.backend().get_or_init_active_org().await.unwrap();
    assert_eq!(resolved, None);

    let head = server.last_request();
    assert!(head.starts_with("POST /rest/v1/rpc/get_or_init_active_org "), "{head}");
    let lower = head.to_ascii_lowercase();
    assert!(lower.contains("apikey: anon-key"));
    assert!(lower.contains("authorization: bearer session-token"));
}

#[tokio::test]
async fn empty_success_body_resolves_to_no_organization() {
    let server = CannedServer::spawn("200 OK", String::new()).await;
    assert_eq!(server.backend().get_or_init_active_org().await.unwrap(), None);
}

#[tokio::test]
async fn setof_row_resolves_to_record() {
    let org = OrganizationId::new();
    let body = json!([{ "organization_id": org, "organization_name": "Cafe", "role": "manager" }]);
    let server = CannedServer::spawn("200 OK", body.to_string()).await;

    let record = server.backend().get_or_init_active_org().await.unwrap().unwrap();
    assert_eq!(record.organization_id, org);
    assert_eq!(record.organization_name, "Cafe");
    assert_eq!(record.role, Role::Manager);
}

#[tokio::test]
async fn unauthorized_maps_to_unauthenticated() {
    let server = CannedServer::spawn("401 Unauthorized", r#"{"message":"JWT expired"}"#.to_string()).await;
    let err = server.backend().get_or_init_active_org().await.unwrap_err();
    assert_eq!(err, BackendError::Unauthenticated);
}

#[tokio::test]
async fn other_failures_are_rejected_with_the_body() {
    let body = r#"{"message":"not a member of this organization"}"#;
    let server = CannedServer::spawn("403 Forbidden", body.to_string()).await;

    let err = server.backend().set_active_org(OrganizationId::new()).await.unwrap_err();
    match err {
        BackendError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("not a member"), "{message}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(server.last_request().starts_with("POST /rest/v1/rpc/set_active_org "));

    let server = CannedServer::spawn("410 Gone", r#"{"message":"code expired"}"#.to_string()).await;
    let err = server.backend().join_org_with_code("abcd2345").await.unwrap_err();
    assert!(matches!(err, BackendError::Rejected { status: 410, .. }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = CannedServer::spawn("200 OK", "<html>maintenance</html>".to_string()).await;
    let err = server.backend().list_memberships().await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
    assert!(server.last_request().starts_with("GET /rest/v1/organization_members?"));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend_at(&format!("http://{addr}"))
        .get_or_init_active_org()
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Network(_)));
}
