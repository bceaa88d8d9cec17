use anyhow::Result;
use axum::{
    Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use percent_encoding::percent_decode_str;
use std::{
    ffi::OsStr,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    time::{Duration, Instant},
};
use tokio::sync::broadcast::{self, error::RecvError};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use vault_core::log;

const LIVERELOAD_ROUTE: &str = "/__livereload";
const RELOAD_MESSAGE: &str = "reload";

/// Output changes closer together than this collapse into one reload.
const RELOAD_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the live development server
#[derive(Debug, Clone)]
pub struct LiveServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Site root to serve and watch
    pub root: PathBuf,
    /// Auto-open browser
    pub open: bool,
    /// File or directory names whose changes never trigger a reload
    pub ignore: Vec<String>,
}

impl Default for LiveServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("./public"),
            open: false,
            ignore: vec![],
        }
    }
}

/// Static preview server with live reload. Article URLs are extension-less
/// (`/t/overview` serves `t/overview.html`) and unknown paths fall back to
/// the root `index.html`, which routes the listing pages client-side.
pub struct LiveServer {
    config: LiveServerConfig,
}

impl LiveServer {
    pub fn new(config: LiveServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let (reload_tx, _) = broadcast::channel::<String>(100);

        if !self.config.root.exists() {
            return Err(anyhow::anyhow!(
                "Root directory does not exist: {}",
                self.config.root.display()
            ));
        }

        let state = AppState {
            root: self.config.root.clone(),
            reload_tx: reload_tx.clone(),
        };

        // Dropping the debouncer stops the watch, so it lives as long as the server
        let _watcher = watch_output(&self.config.root, self.config.ignore.clone(), reload_tx)?;

        let app = Router::new()
            .route(LIVERELOAD_ROUTE, get(websocket_handler))
            .fallback(serve_site)
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        log!("serve"; "serving {} at http://{}", self.config.root.display(), addr);
        log!("serve"; "live reload at ws://{}{}", addr, LIVERELOAD_ROUTE);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                log!("error"; "failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    root: PathBuf,
    reload_tx: broadcast::Sender<String>,
}

async fn serve_site(State(state): State<AppState>, request: Request) -> Response {
    let Some(path) = resolve_path(&state.root, request.uri().path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    if path.extension().is_some_and(|ext| ext == "html") {
        return match tokio::fs::read_to_string(&path).await {
            Ok(html) => Html(inject_livereload_script(&html)).into_response(),
            Err(e) => {
                log!("error"; "failed to read {}: {}", path.display(), e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }

    match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Map a percent-encoded request path onto a file below `root`.
///
/// Tries the exact file, then `<path>.html`, then `<path>/index.html`, and
/// finally the root `index.html`. Paths escaping the root and paths that
/// do not decode to UTF-8 resolve to nothing.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let request_path = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let exact = root.join(relative);
    if exact.is_file() {
        return Some(exact);
    }

    if !request_path.ends_with('/') && !relative.as_os_str().is_empty() {
        let mut with_ext = exact.clone().into_os_string();
        with_ext.push(".html");
        let with_ext = PathBuf::from(with_ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }

    let index = exact.join("index.html");
    if index.is_file() {
        return Some(index);
    }

    let fallback = root.join("index.html");
    fallback.is_file().then_some(fallback)
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket_connection(socket, state.reload_tx))
}

async fn websocket_connection(mut socket: WebSocket, reload_tx: broadcast::Sender<String>) {
    let mut reloads = reload_tx.subscribe();

    if socket.send(Message::Text("connected".to_string().into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            reload = reloads.recv() => match reload {
                Ok(message) => {
                    if socket.send(Message::Text(message.into())).await.is_err() {
                        break;
                    }
                }
                // Missed reloads still end in a reload on the next message
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => {
                if !matches!(incoming, Some(Ok(_))) {
                    break;
                }
            }
        }
    }
}

/// Watch the served root and broadcast a reload after output changes.
fn watch_output(
    root: &Path,
    ignore: Vec<String>,
    reload_tx: broadcast::Sender<String>,
) -> Result<Debouncer<RecommendedWatcher>> {
    let mut throttle = ReloadThrottle::default();

    let mut debouncer = new_debouncer(Duration::from_millis(500), move |res: DebounceEventResult| {
        let events = match res {
            Ok(events) => events,
            Err(e) => {
                log!("error"; "file watcher: {:?}", e);
                return;
            }
        };

        let mut changed = events.iter().filter(|event| !is_ignored(&event.path, &ignore)).peekable();
        if changed.peek().is_none() {
            return;
        }
        for event in changed {
            vault_core::debug!("watch"; "changed: {}", event.path.display());
        }

        if throttle.ready(Instant::now()) {
            // No subscribers just means no browser is open
            let _ = reload_tx.send(RELOAD_MESSAGE.to_string());
            log!("watch"; "reloading browsers");
        }
    })?;

    debouncer.watcher().watch(root, RecursiveMode::Recursive)?;
    log!("watch"; "watching output in {}", root.display());

    Ok(debouncer)
}

/// Whether any component of `path` is one of the ignored names.
fn is_ignored(path: &Path, ignore: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => ignore.iter().any(|ignored| name == OsStr::new(ignored)),
        _ => false,
    })
}

/// A rebuild rewrites every page at once; only the first change in each
/// [`RELOAD_INTERVAL`] reloads the browsers.
#[derive(Debug, Default)]
struct ReloadThrottle {
    last: Option<Instant>,
}

impl ReloadThrottle {
    fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < RELOAD_INTERVAL => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Inject the live reload client before `</body>`, or append it.
pub fn inject_livereload_script(html: &str) -> String {
    let script = format!(
        r#"
<script>
(function() {{
    const socket = new WebSocket('ws://' + location.host + '{LIVERELOAD_ROUTE}');
    socket.onmessage = function(event) {{
        if (event.data === '{RELOAD_MESSAGE}') {{
            location.reload();
        }}
    }};
    socket.onclose = function() {{
        console.log('Live reload disconnected');
    }};
}})();
</script>
"#
    );

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script.len());
        result.push_str(&html[..pos]);
        result.push_str(&script);
        result.push_str(&html[pos..]);
        result
    } else {
        format!("{}{}", html, script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("t")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("users.json"), "[]").unwrap();
        fs::write(dir.path().join("t/overview.html"), "<body></body>").unwrap();
        fs::write(dir.path().join("t/tubevault.css"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolve_exact_file() {
        let dir = site();
        assert_eq!(
            resolve_path(dir.path(), "/t/tubevault.css"),
            Some(dir.path().join("t/tubevault.css"))
        );
        assert_eq!(
            resolve_path(dir.path(), "/users.json"),
            Some(dir.path().join("users.json"))
        );
    }

    #[test]
    fn test_resolve_clean_article_url() {
        let dir = site();
        assert_eq!(
            resolve_path(dir.path(), "/t/overview"),
            Some(dir.path().join("t/overview.html"))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_root_index() {
        let dir = site();
        let index = Some(dir.path().join("index.html"));
        assert_eq!(resolve_path(dir.path(), "/"), index);
        assert_eq!(resolve_path(dir.path(), "/users"), index);
        assert_eq!(resolve_path(dir.path(), "/t/missing"), index);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site();
        assert_eq!(resolve_path(dir.path(), "/../etc/passwd"), None);
    }

    #[test]
    fn test_resolve_decodes_article_url() {
        let dir = site();
        fs::write(dir.path().join("t/my page.html"), "<body></body>").unwrap();
        fs::write(dir.path().join("t/café.html"), "<body></body>").unwrap();

        assert_eq!(
            resolve_path(dir.path(), "/t/my%20page"),
            Some(dir.path().join("t/my page.html"))
        );
        assert_eq!(
            resolve_path(dir.path(), "/t/caf%C3%A9"),
            Some(dir.path().join("t/café.html"))
        );
        assert_eq!(resolve_path(dir.path(), "/%2e%2e/etc/passwd"), None);
        assert_eq!(resolve_path(dir.path(), "/t/%FF"), None);
    }

    #[tokio::test]
    async fn test_encoded_url_serves_article_not_index() {
        let dir = site();
        fs::write(dir.path().join("index.html"), "<body>INDEX</body>").unwrap();
        fs::write(dir.path().join("t/my page.html"), "<body>ARTICLE</body>").unwrap();

        let (reload_tx, _) = broadcast::channel(1);
        let app = Router::new().fallback(serve_site).with_state(AppState {
            root: dir.path().to_path_buf(),
            reload_tx,
        });

        let request = axum::http::Request::builder()
            .uri("/t/my%20page")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("<body>ARTICLE"));
        assert!(body.contains("/__livereload"));
    }

    #[test]
    fn test_ignored_names_match_whole_components() {
        let ignore = vec![".git".to_string()];
        assert!(is_ignored(Path::new("/site/.git/index"), &ignore));
        assert!(!is_ignored(Path::new("/site/t/overview.html"), &ignore));
        assert!(!is_ignored(Path::new("/site/t/.github.html"), &ignore));
    }

    #[test]
    fn test_reload_throttle() {
        let mut throttle = ReloadThrottle::default();
        let start = Instant::now();

        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(300)));
        assert!(throttle.ready(start + RELOAD_INTERVAL));
    }

    #[test]
    fn test_resolve_without_index_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_path(dir.path(), "/anything"), None);
    }

    #[test]
    fn test_inject_livereload_script() {
        let html = inject_livereload_script("<html><body><p>x</p></body></html>");
        let script = html.find("new WebSocket('ws://' + location.host + '/__livereload')").unwrap();
        assert!(script < html.rfind("</body>").unwrap());

        let bare = inject_livereload_script("<p>x</p>");
        assert!(bare.starts_with("<p>x</p>\n<script>"));
    }
}
