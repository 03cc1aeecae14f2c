// src/serve/server.rs

//! Static dev server for the output tree with live-reload injection.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::model::ServerSection;
use crate::errors::Result;
use crate::serve::livereload::{
    client_script, LiveReloadHub, ReloadMessage, LIVERELOAD_SCRIPT_PATH, LIVERELOAD_WS_PATH,
};

/// Tag injected into every served HTML page.
pub const LIVERELOAD_SCRIPT_TAG: &str = r#"<script src="/__livereload.js"></script>"#;

/// Insert [`LIVERELOAD_SCRIPT_TAG`] before the last `</body>`, or append it
/// when there is none. Pages that already carry the tag are returned as is.
pub fn inject_livereload_script(html: &str) -> String {
    if html.contains(LIVERELOAD_SCRIPT_TAG) {
        return html.to_string();
    }

    // ASCII lowercasing keeps byte offsets intact.
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + LIVERELOAD_SCRIPT_TAG.len());
            out.push_str(&html[..idx]);
            out.push_str(LIVERELOAD_SCRIPT_TAG);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{LIVERELOAD_SCRIPT_TAG}"),
    }
}

/// Router serving `output` plus the live-reload endpoints.
pub fn router(output: &Path, hub: LiveReloadHub) -> Router {
    Router::new()
        .route(LIVERELOAD_WS_PATH, get(ws_handler))
        .route(LIVERELOAD_SCRIPT_PATH, get(script_handler))
        .fallback_service(ServeDir::new(output))
        .layer(middleware::from_fn(inject_into_html))
        .with_state(hub)
}

/// A dev server bound to its address but not yet serving.
#[derive(Debug)]
pub struct DevServer {
    listener: TcpListener,
    router: Router,
    addr: SocketAddr,
}

impl DevServer {
    /// Bind `server.host:server.port`. Port `0` picks a free port.
    pub async fn bind(server: &ServerSection, output: &Path, hub: LiveReloadHub) -> Result<Self> {
        let listener = TcpListener::bind((server.host.as_str(), server.port))
            .await
            .with_context(|| format!("binding dev server to {}:{}", server.host, server.port))?;
        let addr = listener.local_addr()?;

        Ok(Self {
            listener,
            router: router(output, hub),
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve until the process exits.
    pub async fn serve(self) -> Result<()> {
        info!(url = %self.url(), "dev server listening");
        axum::serve(self.listener, self.router)
            .await
            .context("dev server stopped")?;
        Ok(())
    }
}

/// Open `url` in the default browser; failure is only logged.
pub fn open_browser(url: &str) {
    if let Err(err) = open::that(url) {
        warn!(url = %url, error = %err, "failed to open browser");
    }
}

async fn inject_into_html(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer HTML response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Ok(html) = std::str::from_utf8(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    let injected = inject_livereload_script(html);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(injected))
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        client_script(),
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<LiveReloadHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_reloads(socket, hub))
}

async fn forward_reloads(mut socket: WebSocket, hub: LiveReloadHub) {
    let mut rx = hub.subscribe();
    debug!(clients = hub.subscriber_count(), "live-reload client connected");

    if !send_message(&mut socket, &ReloadMessage::Connected).await {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                // The client never sends anything we act on.
                Some(Ok(_)) => {}
            },
            received = rx.recv() => match received {
                Ok(msg) => {
                    if !send_message(&mut socket, &msg).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "live-reload client lagged; skipping messages");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!("live-reload client disconnected");
}

/// Returns `false` once the client is gone.
async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(err) => {
            warn!(error = %err, "failed to serialize live-reload message");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
