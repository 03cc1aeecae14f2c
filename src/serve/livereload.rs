// src/serve/livereload.rs

//! Live-reload messages and the broadcast hub behind `/__livereload`.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live-reload websocket.
pub const LIVERELOAD_WS_PATH: &str = "/__livereload";

/// Path of the client script injected into every HTML page.
pub const LIVERELOAD_SCRIPT_PATH: &str = "/__livereload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Sent once when a browser connects.
    Connected,

    /// Output changed; reload the page.
    Reload,

    /// A task failed; the page stays and shows an overlay.
    BuildFailed {
        task: String,
        message: String,
    },
}

/// Broadcasts [`ReloadMessage`]s to every connected browser.
///
/// Cloning is cheap; all clones share the same channel. Messages sent with
/// no subscriber are dropped.
#[derive(Debug, Clone)]
pub struct LiveReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl LiveReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine: nobody has the page open.
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LiveReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client script served at [`LIVERELOAD_SCRIPT_PATH`].
///
/// Connects back to the host that served the page, reloads on `reload` and
/// shows a dismissable overlay on `build_failed`. When the socket drops it
/// retries with a growing delay.
pub fn client_script() -> String {
    format!(
        r#"
(function() {{
  'use strict';

  var attempts = 0;
  var maxAttempts = 10;
  var overlayId = '__sitepipe_overlay';

  function showOverlay(msg) {{
    var el = document.getElementById(overlayId);
    if (!el) {{
      el = document.createElement('pre');
      el.id = overlayId;
      el.style.cssText = 'position:fixed;left:0;right:0;bottom:0;margin:0;padding:1em;' +
        'background:#300;color:#fdd;font:13px monospace;z-index:2147483647;white-space:pre-wrap;';
      el.onclick = function() {{ el.remove(); }};
      document.body.appendChild(el);
    }}
    el.textContent = '[sitepipe] ' + msg.message;
  }}

  function connect() {{
    var proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
    var ws = new WebSocket(proto + location.host + '{ws_path}');

    ws.onopen = function() {{
      attempts = 0;
    }};

    ws.onmessage = function(event) {{
      var msg = JSON.parse(event.data);
      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;
        case 'build_failed':
          showOverlay(msg);
          break;
        case 'connected':
          console.log('[sitepipe] live reload connected');
          break;
      }}
    }};

    ws.onclose = function() {{
      if (attempts < maxAttempts) {{
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        ws_path = LIVERELOAD_WS_PATH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_to_every_subscriber() {
        let hub = LiveReloadHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.send(ReloadMessage::Reload);

        assert_eq!(a.try_recv().unwrap(), ReloadMessage::Reload);
        assert_eq!(b.try_recv().unwrap(), ReloadMessage::Reload);
    }

    #[test]
    fn send_without_subscribers_is_silent() {
        LiveReloadHub::new().send(ReloadMessage::Reload);
    }

    #[test]
    fn build_failed_serializes_with_type_tag() {
        let msg = ReloadMessage::BuildFailed {
            task: "hugo".to_string(),
            message: "hugo build failed (exit code 255)".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"build_failed","task":"hugo","message":"hugo build failed (exit code 255)"}"#
        );
    }

    #[test]
    fn script_targets_websocket_path() {
        assert!(client_script().contains("'/__livereload'"));
    }
}
