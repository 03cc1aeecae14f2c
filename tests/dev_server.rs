// tests/dev_server.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use sitepipe::config::ServerSection;
use sitepipe::serve::livereload::LIVERELOAD_WS_PATH;
use sitepipe::serve::server::LIVERELOAD_SCRIPT_TAG;
use sitepipe::serve::{router, DevServer, LiveReloadHub};
use sitepipe_test_utils::with_timeout;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn Error>>;

async fn get(app: axum::Router, uri: &str) -> Result<(StatusCode, Option<String>, String), Box<dyn Error>> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, content_type, String::from_utf8(body.to_vec())?))
}

#[tokio::test]
async fn html_pages_get_the_livereload_script() -> TestResult {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("index.html"),
        "<html><body><h1>Home</h1></body></html>",
    )?;

    let (status, _, body) = get(router(dir.path(), LiveReloadHub::new()), "/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!("<html><body><h1>Home</h1>{LIVERELOAD_SCRIPT_TAG}</body></html>")
    );
    Ok(())
}

#[tokio::test]
async fn other_assets_are_served_untouched() -> TestResult {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("css"))?;
    fs::write(dir.path().join("css/site.css"), "body{margin:0}")?;

    let (status, content_type, body) =
        get(router(dir.path(), LiveReloadHub::new()), "/css/site.css").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/css"));
    assert_eq!(body, "body{margin:0}");
    Ok(())
}

#[tokio::test]
async fn client_script_and_missing_files() -> TestResult {
    let dir = tempdir()?;
    let hub = LiveReloadHub::new();

    let (status, content_type, body) = get(router(dir.path(), hub.clone()), "/__livereload.js").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/javascript"));
    assert!(body.contains("/__livereload"));

    let (status, _, _) = get(router(dir.path(), hub), "/missing.html").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn binding_port_zero_picks_a_free_port() -> TestResult {
    let dir = tempdir()?;
    let section = ServerSection {
        port: 0,
        ..ServerSection::default()
    };

    let server = DevServer::bind(&section, dir.path(), LiveReloadHub::new()).await?;

    assert_ne!(server.local_addr().port(), 0);
    assert_eq!(server.url(), format!("http://{}", server.local_addr()));
    Ok(())
}

#[tokio::test]
async fn disconnected_client_releases_its_subscription() -> TestResult {
    let dir = tempdir()?;
    let hub = LiveReloadHub::new();
    let section = ServerSection {
        port: 0,
        ..ServerSection::default()
    };
    let server = DevServer::bind(&section, dir.path(), hub.clone()).await?;
    let addr = server.local_addr();
    let server_task = tokio::spawn(server.serve());

    let mut stream = TcpStream::connect(addr).await?;
    let handshake = format!(
        "GET {LIVERELOAD_WS_PATH} HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Connection: Upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Version: 13\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n"
    );
    stream.write_all(handshake.as_bytes()).await?;

    // Read until the `connected` greeting has arrived after the 101 response.
    let mut received = Vec::new();
    let mut buf = [0u8; 512];
    while !String::from_utf8_lossy(&received).contains("connected") {
        let n = with_timeout(stream.read(&mut buf)).await?;
        assert_ne!(n, 0, "server closed the connection during the handshake");
        received.extend_from_slice(&buf[..n]);
    }
    assert!(String::from_utf8_lossy(&received).starts_with("HTTP/1.1 101"));
    assert_eq!(hub.subscriber_count(), 1);

    drop(stream);

    with_timeout(async {
        while hub.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    server_task.abort();
    Ok(())
}
