// src/serve/mod.rs

//! Dev server: static files from the output tree, a live-reload websocket
//! and the client script that listens on it.

pub mod livereload;
pub mod server;

pub use livereload::{LiveReloadHub, ReloadMessage};
pub use server::{inject_livereload_script, open_browser, router, DevServer};
