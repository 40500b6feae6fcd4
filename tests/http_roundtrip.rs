//! End-to-end tests against a minimal HTTP/1.1 server on a local socket

use std::time::Duration;
use supportbot_client::api::{AskRequest, ChatClient, SendOptions};
use supportbot_client::config::{DashboardSettings, WidgetSettings};
use supportbot_client::dashboard::DashboardClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_test::assert_ok;

/// Raw request as the server saw it
struct Captured {
    head: String,
    body: String,
}

/// Serve exactly one connection: capture the request, then write `parts`
/// with a short pause between each, then close.
async fn serve_once(parts: Vec<Vec<u8>>) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;
        let _ = tx.send(captured);

        for part in parts {
            socket.write_all(&part).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let _ = socket.shutdown().await;
    });

    (base, rx)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while data.len() < head_end + length {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    Captured {
        head,
        body: String::from_utf8_lossy(&data[head_end..]).into_owned(),
    }
}

fn streamed_head(status: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
        status
    )
    .into_bytes()
}

fn json_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .into_bytes()
}

fn widget(base: &str) -> WidgetSettings {
    WidgetSettings {
        base_url: base.to_string(),
        widget_id: "w-42".to_string(),
        delay_ms: 0,
        ..WidgetSettings::default()
    }
}

fn instant() -> SendOptions {
    SendOptions::new().with_delay(Duration::ZERO)
}

#[tokio::test]
async fn streams_fragments_over_http() {
    let event = "data: {\"content\":\"Ol\u{e1}\"}\n".as_bytes().to_vec();
    // split inside the two-byte 'á'
    let split = event.len() - 4;
    let parts = vec![
        streamed_head("200 OK"),
        event[..split].to_vec(),
        event[split..].to_vec(),
        b": ping\n\ndata: {not json}\n".to_vec(),
        b"data: {\"content\":\" mundo\"}\ndata: {\"done\":true}\n".to_vec(),
    ];
    let (base, request) = serve_once(parts).await;

    let client = assert_ok!(ChatClient::new(widget(&base)));
    let mut received = Vec::new();
    let result = client
        .send("hola", |fragment| received.push(fragment), instant())
        .await;

    assert_ok!(result);
    assert_eq!(received, vec!["Ol\u{e1}", " mundo"]);

    let captured = request.await.unwrap();
    assert!(captured.head.starts_with("POST /chat/widget/w-42/chat/stream HTTP/1.1"));
    assert!(captured
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body, serde_json::json!({ "content": "hola" }));
}

#[tokio::test]
async fn final_line_without_newline_is_delivered() {
    let parts = vec![
        streamed_head("200 OK"),
        b"data: {\"content\":\"last\"}".to_vec(),
    ];
    let (base, _request) = serve_once(parts).await;

    let client = ChatClient::new(widget(&base)).unwrap();
    let mut received = Vec::new();
    client
        .send("hi", |fragment| received.push(fragment), instant())
        .await
        .unwrap();

    assert_eq!(received, vec!["last"]);
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let (base, _request) = serve_once(vec![b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops".to_vec()]).await;

    let client = ChatClient::new(widget(&base)).unwrap();
    let mut received = Vec::new();
    let err = client
        .send("hi", |fragment| received.push(fragment), instant())
        .await
        .unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.message, "oops");
    assert!(received.is_empty());
}

#[tokio::test]
async fn unreachable_server_reports_status_zero() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = ChatClient::new(widget(&base)).unwrap();
    let err = client.send("hi", |_| {}, instant()).await.unwrap_err();

    assert_eq!(err.status, 0);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn one_shot_answer_is_parsed() {
    let body = r#"{"response":"Hi there","sources":["faq.md"],"confidence":0.9}"#;
    let (base, request) = serve_once(vec![json_response("200 OK", body)]).await;

    let client = ChatClient::new(widget(&base)).unwrap();
    let answer = client.send_once("hello").await.unwrap();

    assert_eq!(answer.response, "Hi there");
    assert_eq!(answer.sources, vec!["faq.md"]);
    let captured = request.await.unwrap();
    assert!(captured.head.starts_with("POST /chat/widget/w-42/chat HTTP/1.1"));
}

#[tokio::test]
async fn dashboard_ask_sends_api_key() {
    let body = r#"{"response":"42","sources":[],"confidence":1.0,"bot_id":"b1"}"#;
    let (base, request) = serve_once(vec![json_response("200 OK", body)]).await;

    let client = DashboardClient::new(DashboardSettings {
        base_url: base,
        api_key: Some("secret".to_string()),
        ..DashboardSettings::default()
    })
    .unwrap();
    let answer = client
        .ask(&AskRequest::new("meaning?").with_context("docs"))
        .await
        .unwrap();

    assert_eq!(answer.bot_id.as_deref(), Some("b1"));
    let captured = request.await.unwrap();
    assert!(captured.head.starts_with("POST /chat HTTP/1.1"));
    assert!(captured.head.to_ascii_lowercase().contains("x-api-key: secret"));
    let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent, serde_json::json!({ "message": "meaning?", "context": "docs" }));
}

#[tokio::test]
async fn dashboard_error_uses_body() {
    let (base, _request) = serve_once(vec![json_response("401 Unauthorized", "bad key")]).await;

    let client = DashboardClient::new(DashboardSettings {
        base_url: base,
        ..DashboardSettings::default()
    })
    .unwrap();
    let err = client.list_documents().await.unwrap_err();

    assert_eq!(err.status, 401);
    assert_eq!(err.message, "bad key");
}
