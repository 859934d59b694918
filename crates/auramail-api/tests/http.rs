//! HTTP tests for the API client.
//!
//! These tests serve canned responses from a loopback listener so the
//! client's request shape and error mapping are checked end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

use auramail_api::{ApiClient, Error, MailFilter, OutgoingEmail, Token};

/// Serves a single canned response and returns the raw request it received.
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let status = status.to_string();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}"), handle)
}

/// Reads one HTTP request (head plus `Content-Length` body).
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map_or(0, |v| v.trim().parse::<usize>().unwrap());

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn token() -> Token {
    Token::new("tok-123")
}

#[tokio::test]
async fn test_login_has_no_bearer() {
    let (base, server) =
        serve_once("200 OK", r#"{"token": "fresh", "email": "me@example.com"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let login = assert_ok!(client.login().await);
    assert_eq!(login.token.as_str(), "fresh");
    assert_eq!(login.email.as_deref(), Some("me@example.com"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/auth/login HTTP/1.1"));
    assert!(!request.to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_identity_sends_bearer() {
    let (base, server) = serve_once("200 OK", r#"{"email": "me@example.com"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let identity = assert_ok!(client.identity(&token()).await);
    assert_eq!(identity.email, "me@example.com");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/auth/me HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn test_fetch_messages_query() {
    let body = r#"{"emails": [{"id": "a", "subject": "One"}], "total_emails": 42, "page": 2}"#;
    let (base, server) = serve_once("200 OK", body).await;
    let client = ApiClient::new(&base).unwrap();

    let page = assert_ok!(
        client
            .fetch_messages(&token(), 2, MailFilter::SpamAndPhishing)
            .await
    );
    assert_eq!(page.emails.len(), 1);
    assert_eq!(page.total_emails, 42);

    let request = server.await.unwrap();
    assert!(
        request.starts_with("GET /api/fetch_emails?page=2&filter=spam_and_phishing HTTP/1.1"),
        "unexpected request line: {request}"
    );
}

#[tokio::test]
async fn test_fetch_sent_messages_query() {
    let (base, server) = serve_once("200 OK", r#"{"emails": [], "total_emails": 0}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let page = assert_ok!(client.fetch_sent_messages(&token(), 1).await);
    assert!(page.emails.is_empty());
    assert_eq!(page.page, None);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/fetch_sent_emails?page=1 HTTP/1.1"));
}

#[tokio::test]
async fn test_fetch_messages_error_body_with_success_status() {
    let (base, _server) = serve_once("200 OK", r#"{"error": "Token expired"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let err = assert_err!(client.fetch_messages(&token(), 1, MailFilter::ValidOnly).await);
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "Token expired");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_sent_messages_error_body_with_success_status() {
    let (base, _server) = serve_once("200 OK", r#"{"error": "Token expired"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let err = assert_err!(client.fetch_sent_messages(&token(), 1).await);
    assert_eq!(err.to_string(), "Token expired");
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_fetch_message_path() {
    let (base, server) = serve_once("200 OK", r#"{"id": "m-1", "body": "Hello there"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let record = assert_ok!(client.fetch_message(&token(), "m-1").await);
    assert_eq!(record.body.as_deref(), Some("Hello there"));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/emails/m-1 HTTP/1.1"));
}

#[tokio::test]
async fn test_delete_body_and_result() {
    let (base, server) = serve_once("200 OK", r#"{"deleted": false}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let result = assert_ok!(client.delete_message(&token(), "m1").await);
    assert!(!result.deleted);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/delete_email HTTP/1.1"));
    assert!(request.ends_with(r#"{"msg_id":"m1"}"#));
}

#[tokio::test]
async fn test_proofread_body() {
    let (base, server) = serve_once("200 OK", r#"{"proofread_body": "Hello, world."}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let result = assert_ok!(client.proofread(&token(), "helo world").await);
    assert_eq!(result.proofread_body, "Hello, world.");

    let request = server.await.unwrap();
    assert!(request.ends_with(r#"{"body":"helo world"}"#));
}

#[tokio::test]
async fn test_server_message_is_verbatim() {
    let (base, _server) = serve_once("404 Not Found", r#"{"error": "Message not found"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let err = assert_err!(client.mark_as_read(&token(), "gone").await);
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Message not found");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_without_message() {
    let (base, _server) = serve_once("500 Internal Server Error", "<html>oops</html>").await;
    let client = ApiClient::new(&base).unwrap();

    let err = assert_err!(client.summarize(&token(), "m1").await);
    assert!(matches!(err, Error::Status(500)));
    assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn test_send_rejected_with_success_status() {
    let (base, _server) = serve_once("200 OK", r#"{"error": "Invalid recipient"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let email = OutgoingEmail {
        to: "nobody".into(),
        subject: "Hi".into(),
        body: "Body".into(),
    };
    let err = assert_err!(client.send_email(&token(), &email).await);
    assert_eq!(err.to_string(), "Invalid recipient");
}

#[tokio::test]
async fn test_send_accepts_empty_object() {
    let (base, server) = serve_once("200 OK", "{}").await;
    let client = ApiClient::new(&base).unwrap();

    let email = OutgoingEmail {
        to: "bob@example.com".into(),
        subject: "Hi".into(),
        body: "Body".into(),
    };
    assert_ok!(client.send_email(&token(), &email).await);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/send_email HTTP/1.1"));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and hold the connection without ever answering.
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let client = ApiClient::new(&format!("http://{addr}"))
        .unwrap()
        .with_timeout(Duration::from_millis(100));

    let err = assert_err!(client.generate_reply(&token(), "m1").await);
    assert!(matches!(err, Error::Timeout), "got {err:?}");
    assert!(err.is_transport());
}
