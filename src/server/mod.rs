//! Preview server with live reload
//!
//! Pages are rendered on request from the current [`Site`] snapshot. With
//! watching enabled, source changes trigger a full rebuild; the snapshot is
//! swapped only when the rebuild succeeds, so a broken edit keeps the last good
//! site online.

use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::loader::is_content_file;
use crate::site::Site;
use crate::templates::{PageRenderer, STYLESHEET, STYLESHEET_PATH};
use crate::{Blog, CONFIG_FILE};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// A built site together with the directories its assets come from
pub struct Snapshot {
    pub site: Site,
    pub static_dir: PathBuf,
    pub source_dir: PathBuf,
}

impl Snapshot {
    fn new(blog: &Blog, site: Site) -> Self {
        Self {
            site,
            static_dir: blog.static_dir.clone(),
            source_dir: blog.source_dir.clone(),
        }
    }
}

/// Server state
pub struct ServerState {
    snapshot: ArcSwap<Snapshot>,
    renderer: PageRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(blog: &Blog, site: Site, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new(blog, site)),
            renderer: PageRenderer::new()?,
            reload_tx,
            live_reload,
        })
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Rebuild from disk and swap the snapshot in if the build succeeds.
    ///
    /// The configuration is re-read, so moved asset directories take effect.
    pub fn rebuild(&self, base_dir: &Path) -> Result<()> {
        let blog = Blog::new(base_dir)?;
        let site = Site::build(&blog)?;
        self.snapshot.store(Arc::new(Snapshot::new(&blog, site)));
        let _ = self.reload_tx.send(());
        Ok(())
    }
}

/// Build the router serving `state`
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // The initial build must succeed; there is nothing to serve otherwise
    let site = Site::build(blog)?;
    let root = site.config.root.clone();
    let state = Arc::new(ServerState::new(blog, site, watch)?);

    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, root);
    tracing::info!("Server running at {}", url);
    if watch {
        tracing::info!("Live reload enabled. Watching for changes...");
    }
    tracing::info!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let blog = blog.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&blog, &state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch sources and rebuild the snapshot on change.
///
/// The watched directories are the ones configured at startup; moving
/// `source_dir` or `static_dir` needs a restart to be watched.
fn watch_and_reload(blog: &Blog, state: &ServerState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&blog.source_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match state.rebuild(&blog.base_dir) {
                    Ok(()) => tracing::info!("Rebuilt successfully"),
                    Err(e) => tracing::error!("Rebuild failed, keeping previous site: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Render routes from the snapshot, otherwise serve assets, otherwise 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let snapshot = state.current();
    let site = &snapshot.site;
    let path = request.uri().path().to_string();

    let Some(relative) = strip_root(&site.config.root, &path) else {
        return not_found(&state, site, &path);
    };

    match state.renderer.render_path(site, relative) {
        Ok(rendered) if rendered.is_found() => return page(&state, StatusCode::OK, rendered.html),
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", path, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response();
        }
    }

    if is_servable_asset(relative) {
        if let Some(response) = serve_asset(&snapshot, relative).await {
            return response;
        }
    }

    not_found(&state, site, &path)
}

/// Look an asset up in the static directory, then next to the posts
async fn serve_asset(snapshot: &Snapshot, relative: &str) -> Option<Response> {
    let uri: Uri = relative.parse().ok()?;

    for dir in [&snapshot.static_dir, &snapshot.source_dir] {
        let request = Request::builder().uri(uri.clone()).body(Body::empty()).ok()?;
        let mut service = ServeDir::new(dir);
        match service.try_call(request).await {
            Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                return Some(response.into_response())
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to serve {}: {}", relative, e);
                return None;
            }
        }
    }

    if relative.trim_start_matches('/') == STYLESHEET_PATH {
        return Some(([(header::CONTENT_TYPE, "text/css")], STYLESHEET).into_response());
    }

    None
}

fn not_found(state: &ServerState, site: &Site, path: &str) -> Response {
    match state.renderer.render_not_found(site, path) {
        Ok(html) => page(state, StatusCode::NOT_FOUND, html),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {:#}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn page(state: &ServerState, status: StatusCode, html: String) -> Response {
    let html = if state.live_reload {
        inject_live_reload(&html)
    } else {
        html
    };
    (status, Html(html)).into_response()
}

/// Strip the configured site root from a request path
fn strip_root<'a>(root: &str, path: &'a str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Post sources and hidden files are never served raw.
///
/// Checked on the decoded path, the form `ServeDir` reads from disk.
fn is_servable_asset(relative: &str) -> bool {
    let decoded = percent_decode_str(relative).decode_utf8_lossy();
    let hidden = decoded
        .split('/')
        .any(|s| s.starts_with('.') || s.starts_with('_'));
    !hidden && !is_content_file(Path::new(decoded.as_ref()))
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
