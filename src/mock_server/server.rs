//! Mock FOSSology server.
//!
//! Provides an axum-based HTTP server that simulates the FOSSology REST API
//! below `/repo/api/v1`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::handlers;
use super::state::{MockState, SharedState};

/// A mock FOSSology server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening, including `/repo`.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with a fresh installation's data.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}/repo", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the server URL.
    ///
    /// Use this URL when creating a `FossologyClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        let protected = Router::new()
            // Session routes
            .route("/users/self", get(handlers::get_current_user))
            .route(
                "/groups",
                get(handlers::list_groups).post(handlers::create_group),
            )
            // Folder routes
            .route(
                "/folders",
                get(handlers::list_folders).post(handlers::create_folder),
            )
            .route(
                "/folders/:id",
                get(handlers::get_folder).delete(handlers::delete_folder),
            )
            // Upload routes
            .route(
                "/uploads",
                get(handlers::list_uploads).post(handlers::create_upload),
            )
            .route(
                "/uploads/:id",
                get(handlers::get_upload).delete(handlers::delete_upload),
            )
            .route("/uploads/:id/summary", get(handlers::get_upload_summary))
            // Job routes
            .route("/jobs", get(handlers::list_jobs).post(handlers::schedule_job))
            .route("/jobs/all", get(handlers::list_jobs))
            .route("/jobs/:id", get(handlers::get_job))
            // Report routes
            .route("/report", get(handlers::generate_report))
            .route("/report/:id", get(handlers::download_report))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

        let api = Router::new()
            .route("/tokens", axum::routing::post(handlers::create_token))
            .route("/info", get(handlers::get_info))
            .route("/health", get(handlers::get_health))
            .merge(protected)
            .with_state(state);

        Router::new().nest("/repo/api/v1", api)
    }
}

/// Reject requests without an accepted bearer token.
async fn require_token(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    if !state.read().await.accepts(&token) {
        return handlers::info(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    next.run(request).await
}
