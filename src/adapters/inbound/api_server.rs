//! HTTP API Server
//!
//! Public front end: the translation route that dispatches through the
//! pool, and the maintenance routes that list, register and prune
//! endpoints. All routes except static assets sit behind the shared-secret
//! check when a secret is configured.

use crate::application::{DispatchError, Dispatcher, RegistryError, RegistryService};
use crate::infrastructure::ShutdownController;
use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Uniform JSON envelope for every non-translation reply.
#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    code: u16,
    msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn ok<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        code: 200,
        msg: "ok",
        data: Some(data),
    })
    .into_response()
}

/// Client-visible failure. Carries no detail about which endpoint or
/// store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiFailure {
    Error,
    Forbidden,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiFailure::Error => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
            ApiFailure::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        };
        let body: Envelope<()> = Envelope {
            code: status.as_u16(),
            msg,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DispatchError> for ApiFailure {
    fn from(e: DispatchError) -> Self {
        tracing::warn!("translate failed: {}", e);
        ApiFailure::Error
    }
}

impl From<RegistryError> for ApiFailure {
    fn from(e: RegistryError) -> Self {
        tracing::error!("registry operation failed: {}", e);
        ApiFailure::Error
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
    pub registry: Arc<RegistryService>,
    /// Shared secret; `None` disables the check
    pub password: Option<Arc<str>>,
}

impl ApiState {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        registry: Arc<RegistryService>,
        password: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            password: password.filter(|p| !p.is_empty()).map(Arc::from),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthQuery {
    password: Option<String>,
}

/// Build the application router.
///
/// Unmatched paths fall through to static files from `static_dir`, which
/// are served without authorization.
pub fn build_router(state: ApiState, static_dir: &str) -> Router {
    Router::new()
        .route("/translate", post(translate_handler))
        .route("/api", get(list_handler).post(register_handler))
        .route("/clear", post(clear_handler))
        .route("/checkAuth", post(check_auth_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the translation pool.
pub struct ApiServer {
    listen_addr: String,
    static_dir: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, static_dir: String, state: ApiState) -> Self {
        Self {
            listen_addr,
            static_dir,
            state,
        }
    }

    /// Serve until `shutdown` fires.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let app = build_router(self.state.clone(), &self.static_dir);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("Server ready on {}", self.listen_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;
        tracing::info!("server stopped");
        Ok(())
    }
}

/// Caller credential: `Authorization` header, else `password` query param.
fn credential(req: &Request) -> Option<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    if let Some(header) = header {
        return Some(header.to_string());
    }
    Query::<AuthQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.password)
}

async fn require_auth(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let Some(password) = state.password.as_deref() else {
        return next.run(req).await;
    };
    if credential(&req).as_deref() == Some(password) {
        next.run(req).await
    } else {
        tracing::debug!("rejected unauthorized request to {}", req.uri().path());
        ApiFailure::Forbidden.into_response()
    }
}

// Handler functions

async fn translate_handler(
    State(state): State<ApiState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Value>, ApiFailure> {
    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!("invalid translate body: {}", e);
            ApiFailure::Error
        })?
    };

    let reply = state.dispatcher.dispatch(uri.path(), &payload).await?;
    Ok(Json(reply))
}

async fn list_handler(State(state): State<ApiState>) -> Result<Response, ApiFailure> {
    let records = state.registry.list().await?;
    Ok(ok(records))
}

async fn register_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Response, ApiFailure> {
    let submitted: Vec<String> = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("invalid register body: {}", e);
        ApiFailure::Error
    })?;

    state.registry.register(&submitted).await?;
    Ok(ok(json!({})))
}

async fn clear_handler(State(state): State<ApiState>) -> Result<Response, ApiFailure> {
    state.registry.prune().await?;
    Ok(ok(json!({})))
}

/// Only the header counts here; a query-string password gets through the
/// middleware but is not a valid credential for this check.
async fn check_auth_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Response, ApiFailure> {
    let Some(password) = state.password.as_deref() else {
        return Ok(ok(json!({"anonymous": true})));
    };
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if header == Some(password) {
        Ok(ok(json!({"anonymous": false})))
    } else {
        Err(ApiFailure::Forbidden)
    }
}
