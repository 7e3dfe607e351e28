//! Development server for folio sites.
//!
//! Renders pages on demand through a [`folio_site::Site`], serves the static
//! directory, and reloads connected browsers when watched files change.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{router, DevServer, DevServerConfig, ServerError, ServerState};
pub use watcher::{FileWatcher, WatchEvent, WatchKind};
pub use websocket::{inject_reload_script, ReloadHub, ReloadMessage};
