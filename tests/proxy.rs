//! End-to-end relays through a live gateway listener.

use std::time::Duration;

use futures_util::stream::{self, Stream};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::timeout;

use simple_gateway::config::{CorsConfig, Requirements};
use simple_gateway::routing::RouteTable;

mod common;
use common::MockResponse;

/// A request body that arrives in several chunks.
fn chunks(parts: &'static [&'static str]) -> impl Stream<Item = Result<&'static str, std::io::Error>> {
    stream::iter(parts.iter().map(|part| Ok(*part)))
}

#[tokio::test]
async fn test_path_is_rewritten_onto_target() {
    let (upstream, mut requests) = common::start_recording_backend(MockResponse::ok("invoice")).await;
    let routes = RouteTable::new([common::route("billing", &format!("http://{upstream}/v1"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let response = common::client()
        .get(format!("http://{gateway}/billing/invoices/42?expand=lines"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "invoice");

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/v1/invoices/42?expand=lines");
    assert_eq!(seen.header("host"), Some(upstream.to_string().as_str()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_status_and_headers_pass_through() {
    let response = MockResponse::status("201 Created")
        .with_header("X-Upstream", "mock")
        .with_header("Content-Type", "text/plain");
    let (upstream, mut requests) = common::start_recording_backend(response).await;
    let require = Requirements { authorization: true, ..Default::default() };
    let routes = RouteTable::new([common::gated_route("users", &format!("http://{upstream}"), require)]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let response = common::client()
        .put(format!("http://{gateway}/USERS/7"))
        .header("authorization", "Bearer abc")
        .header("x-trace", "t-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["x-upstream"], "mock");
    assert_eq!(response.headers()["content-type"], "text/plain");

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.target, "/7");
    assert_eq!(seen.header("authorization"), Some("Bearer abc"));
    assert_eq!(seen.header("x-trace"), Some("t-1"));
    assert!(seen.body.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let redirect = MockResponse::status("302 Found").with_header("Location", "/elsewhere");
    let upstream = common::start_programmable_backend(move |_| {
        let redirect = redirect.clone();
        async move { redirect }
    })
    .await;
    let routes = RouteTable::new([common::route("files", &format!("http://{upstream}"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let response = common::client().get(format!("http://{gateway}/files/a")).send().await.unwrap();
    assert_eq!(response.status(), 302);
    assert_eq!(response.headers()["location"], "/elsewhere");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_body_is_streamed_upstream() {
    let (upstream, mut requests) = common::start_recording_backend(MockResponse::ok("stored")).await;
    let routes = RouteTable::new([common::route("upload", &format!("http://{upstream}/store"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let body = reqwest::Body::wrap_stream(chunks(&["first,", "second,", "third"]));
    let response = common::client()
        .post(format!("http://{gateway}/upload/blob"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "stored");

    let seen = tokio::time::timeout(Duration::from_secs(5), requests.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/store/blob");
    assert_eq!(seen.body, b"first,second,third");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_chunks_reach_upstream_before_body_ends() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let upstream = common::start_raw_backend(move |mut conn| {
        let seen = seen_tx.clone();
        async move {
            if common::read_head(&mut conn).await.is_none() {
                return;
            }
            while let Some(chunk) = common::read_chunk(&mut conn).await {
                if chunk.is_empty() {
                    break;
                }
                let _ = seen.send(chunk);
            }
            let _ = conn.write_all(MockResponse::ok("stored").to_wire().as_bytes()).await;
            let _ = conn.shutdown().await;
        }
    })
    .await;
    let routes = RouteTable::new([common::route("upload", &format!("http://{upstream}"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let (body_tx, body_rx) = mpsc::unbounded_channel::<&'static str>();
    let body = stream::unfold(body_rx, |mut rx| async move {
        rx.recv().await.map(|part| (Ok::<_, std::io::Error>(part), rx))
    });
    body_tx.send("first,").unwrap();
    let pending = tokio::spawn(
        common::client()
            .post(format!("http://{gateway}/upload/blob"))
            .body(reqwest::Body::wrap_stream(body))
            .send(),
    );

    // The client is still holding the rest of its body.
    let mut received = Vec::new();
    timeout(Duration::from_secs(5), async {
        while received.len() < "first,".len() {
            received.extend(seen_rx.recv().await.unwrap());
        }
    })
    .await
    .unwrap();
    assert_eq!(received, b"first,");
    assert!(!pending.is_finished());

    body_tx.send("last").unwrap();
    drop(body_tx);

    let response = timeout(Duration::from_secs(5), pending).await.unwrap().unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "stored");

    let mut rest = Vec::new();
    while let Ok(chunk) = seen_rx.try_recv() {
        rest.extend(chunk);
    }
    assert_eq!(rest, b"last");

    shutdown.trigger();
}

#[tokio::test]
async fn test_response_chunks_reach_client_before_upstream_finishes() {
    let upstream = common::start_raw_backend(|mut conn| async move {
        if common::read_request(&mut conn).await.is_none() {
            return;
        }
        let head = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nfirst\r\n";
        let _ = conn.write_all(head.as_bytes()).await;
        let _ = conn.flush().await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        let _ = conn.write_all(b"6\r\nsecond\r\n0\r\n\r\n").await;
        let _ = conn.shutdown().await;
    })
    .await;
    let routes = RouteTable::new([common::route("feed", &format!("http://{upstream}"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let mut response = timeout(
        Duration::from_secs(1),
        common::client().get(format!("http://{gateway}/feed/events")).send(),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(response.status(), 200);

    // The upstream is still sleeping before its second chunk.
    let first = timeout(Duration::from_secs(1), response.chunk()).await.unwrap().unwrap();
    assert_eq!(first.as_deref(), Some(&b"first"[..]));

    let mut rest = Vec::new();
    while let Some(chunk) = timeout(Duration::from_secs(5), response.chunk()).await.unwrap().unwrap() {
        rest.extend_from_slice(&chunk);
    }
    assert_eq!(rest, b"second");

    shutdown.trigger();
}

#[tokio::test]
async fn test_dead_upstream_is_internal_error() {
    let upstream = common::dead_address().await;
    let routes = RouteTable::new([common::route("gone", &format!("http://{upstream}"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    let response = common::client().get(format!("http://{gateway}/gone/x")).send().await.unwrap();
    assert_eq!(response.status(), 500);
    assert!(response.bytes().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_fixed_backend_answers_every_path() {
    let upstream = common::start_mock_backend("pong").await;
    let routes = RouteTable::new([common::route("ping", &format!("http://{upstream}"))]);
    let (gateway, shutdown) = common::spawn_gateway(routes, CorsConfig::default()).await;

    for path in ["/ping", "/ping/", "/ping/a/b/c"] {
        let response = common::client().get(format!("http://{gateway}{path}")).send().await.unwrap();
        assert_eq!(response.status(), 200, "{path}");
        assert_eq!(response.text().await.unwrap(), "pong");
    }

    shutdown.trigger();
}
