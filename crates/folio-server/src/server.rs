//! Development server implementation.

use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    handler::Handler,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use folio_site::{Site, NOT_FOUND_DESCRIPTION};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use crate::watcher::{FileWatcher, WatchEvent, WatchKind};
use crate::websocket::{
    inject_reload_script, reload_client_script, ReloadHub, ReloadMessage, RELOAD_SCRIPT_PATH,
    RELOAD_SOCKET_PATH,
};

/// Description used when a route does not accept the request method.
pub const METHOD_NOT_ALLOWED_DESCRIPTION: &str =
    "The method is not allowed for the requested URL.";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,

    /// Reload browsers when watched files change
    pub live_reload: bool,

    /// Directory containing markdown pages
    pub content_dir: PathBuf,

    /// Directory containing templates
    pub templates_dir: PathBuf,

    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            open: true,
            live_reload: true,
            content_dir: PathBuf::from("pages"),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl DevServerConfig {
    /// Socket address built from host and port.
    pub fn address(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared server state.
pub struct ServerState {
    site: Site,
    reload: ReloadHub,
    live_reload: bool,
}

type SharedState = Arc<RwLock<ServerState>>;

impl ServerState {
    pub fn new(site: Site, live_reload: bool) -> Self {
        Self {
            site,
            reload: ReloadHub::new(),
            live_reload,
        }
    }

    pub fn reload_hub(&self) -> &ReloadHub {
        &self.reload
    }

    fn html(&self, response: folio_site::Response) -> Response {
        let body = if self.live_reload {
            inject_reload_script(&response.body)
        } else {
            response.body
        };
        (response.status, Html(body)).into_response()
    }
}

/// Build the router serving a site.
///
/// Every `GET` outside `/static` goes through [`Site::respond`]. Other
/// methods get a 405 error page.
pub fn router(state: Arc<RwLock<ServerState>>, static_dir: &FsPath, live_reload: bool) -> Router {
    let static_files =
        ServeDir::new(static_dir).not_found_service(not_found_handler.with_state(state.clone()));

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/{*path}", get(page_handler))
        .nest_service("/static", static_files);

    if live_reload {
        app = app
            .route(RELOAD_SOCKET_PATH, get(ws_handler))
            .route(RELOAD_SCRIPT_PATH, get(reload_script_handler));
    }

    app.method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    site: Site,
}

impl DevServer {
    pub fn new(config: DevServerConfig, site: Site) -> Self {
        Self { config, site }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.address()?;

        let state = Arc::new(RwLock::new(ServerState::new(
            self.site,
            self.config.live_reload,
        )));

        let watch_roots = vec![
            (self.config.content_dir.clone(), WatchKind::Content),
            (self.config.templates_dir.clone(), WatchKind::Templates),
            (self.config.static_dir.clone(), WatchKind::Static),
        ];

        let (watcher, mut rx) = FileWatcher::new(&watch_roots)?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            drop(watcher);
        });

        let app = router(state, &self.config.static_dir, self.config.live_reload);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("Serving site at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app).await.map_err(ServerError::Serve)?;

        Ok(())
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &SharedState, event: WatchEvent) {
    let mut state = state.write().await;

    match event.kind {
        WatchKind::Templates => {
            tracing::info!("Template changed: {}", event.path.display());
            state.site.reload_templates();
        }
        WatchKind::Content => {
            tracing::info!("Page changed: {}", event.path.display());
        }
        WatchKind::Static => {
            tracing::debug!("Static file changed: {}", event.path.display());
        }
    }

    if state.live_reload {
        state.reload.send(ReloadMessage::Reload);
    }
}

async fn respond(state: &SharedState, path: &str) -> Response {
    let mut state = state.write().await;
    let response = state.site.respond(path);
    tracing::debug!("GET {} -> {}", path, response.status);
    state.html(response)
}

/// Handler for `/`.
async fn root_handler(State(state): State<SharedState>) -> Response {
    respond(&state, "/").await
}

/// Handler for every other page path.
async fn page_handler(Path(path): Path<String>, State(state): State<SharedState>) -> Response {
    respond(&state, &format!("/{}", path)).await
}

async fn not_found_handler(State(state): State<SharedState>) -> Response {
    let mut state = state.write().await;
    let response = state
        .site
        .render_error(StatusCode::NOT_FOUND, NOT_FOUND_DESCRIPTION);
    state.html(response)
}

async fn method_not_allowed_handler(State(state): State<SharedState>) -> Response {
    let mut state = state.write().await;
    let response = state
        .site
        .render_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_DESCRIPTION);
    state.html(response)
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one browser until it disconnects.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let mut rx = {
        let state = state.read().await;
        state.reload.subscribe()
    };

    let mut msg = ReloadMessage::Connected;
    loop {
        let Ok(json) = serde_json::to_string(&msg) else {
            break;
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }

        match rx.recv().await {
            Ok(next) => msg = next,
            Err(_) => break,
        }
    }
}

/// Handler for the live reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(),
    )
}
