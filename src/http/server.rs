//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single dispatching fallback
//! - Wire up tower layers (tracing, request ID)
//! - Drive every request through prepare → middleware → route → actions
//! - Map pipeline errors onto error routes and assemble the response
//! - Bind, serve and stop with graceful shutdown
//!
//! # Design Decisions
//! - All tables and capabilities are frozen into one `Arc<Core>` at startup
//! - Every failure ends in a rendered response; nothing escapes the handler
//! - No timeout layer: preprocessing, middleware and actions run to completion

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{self, HeaderValue},
    response::Response as HttpResponse,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::capabilities::{Capabilities, Storage};
use crate::config::{validate_config, ConfigError, PistachioConfig, ValidationError};
use crate::defaults::{answers, errors};
use crate::error::{PistachioError, BAD_GATEWAY};
use crate::http::request::{prepare, MakeRequestUuid, Request};
use crate::http::response::{Envelope, Response};
use crate::lifecycle::Shutdown;
use crate::observability::{Logger, TracingLogger};
use crate::pipeline::{
    execute, resolve, run_chain, ActionRegistry, ErrorAction, ErrorActionRegistry, Middleware,
    Renderer, RendererRegistry,
};
use crate::routing::{find_route, HandlerSpec, RouteTable};

/// Immutable state shared by every request task.
struct Core {
    routes: RouteTable<HandlerSpec>,
    error_routes: std::collections::BTreeMap<String, String>,
    answers: RouteTable<String>,
    content_type: HeaderValue,
    max_body_size: usize,
    logger: Arc<dyn Logger>,
    actions: ActionRegistry,
    error_actions: ErrorActionRegistry,
    renderers: RendererRegistry,
    middleware: Vec<Arc<dyn Middleware>>,
    db: Option<Storage>,
}

impl Core {
    /// Middleware, routing and the action pipeline for one prepared request.
    async fn process(
        &self,
        mut request: Request,
        response: &Response,
    ) -> (Arc<Request>, Result<Value, PistachioError>) {
        request.attach_storage(self.db.clone());
        let (method, raw_url) = (request.method.clone(), request.raw_url.clone());

        let mut request = match run_chain(&self.middleware, request, response).await {
            Ok(request) => request,
            Err(rejection) => {
                let request = rejection
                    .request
                    .unwrap_or_else(|| Request::new(method, raw_url));
                return (Arc::new(request), Err(rejection.error));
            }
        };

        let matched = find_route(&request.url, &self.routes);
        request.params = matched.params;
        let actions = resolve(matched.handler, &request.method, &self.actions);

        tracing::debug!(
            request_id = ?request.id,
            method = %request.method,
            path = %request.url,
            actions = actions.len(),
            "Dispatching request"
        );

        let request = Arc::new(request);
        let result = execute(&actions, &request, response).await;
        (request, result)
    }

    /// Shape the outcome into an HTTP response.
    fn answer(
        &self,
        request: &Request,
        response: &Response,
        result: Result<Value, PistachioError>,
    ) -> HttpResponse {
        let envelope = match result {
            Ok(payload) => Envelope::success(payload),
            Err(e) => {
                self.logger.error(&e.to_string());
                let meta = json!({});
                let reply = self.error_action(&e.identifier())(request, response, &meta);
                Envelope::failure(reply, meta)
            }
        };

        let renderer = self.renderer(&request.url);
        envelope.into_http(&self.content_type, response.headers(), &renderer)
    }

    /// Error route for `identifier`, else the `BadGateway` route, else 502.
    fn error_action(&self, identifier: &str) -> ErrorAction {
        let routed = |key: &str| {
            self.error_routes
                .get(key)
                .and_then(|name| self.error_actions.get(name))
        };
        routed(identifier)
            .or_else(|| {
                tracing::debug!(identifier, "No error route, falling back to BadGateway");
                routed(BAD_GATEWAY)
            })
            .unwrap_or_else(errors::bad_gateway)
    }

    /// Renderer matched on `path`, else `default`, else the built-in envelope.
    fn renderer(&self, path: &str) -> Renderer {
        let registered = |name: &String| self.renderers.get(name);
        find_route(path, &self.answers)
            .handler
            .and_then(registered)
            .or_else(|| self.answers.get(answers::DEFAULT_ANSWER).and_then(registered))
            .unwrap_or_else(answers::fallback)
    }
}

/// Axum fallback: every request lands here.
async fn dispatch(State(core): State<Arc<Core>>, request: http::Request<Body>) -> HttpResponse {
    let response = Response::new();
    let method = request.method().clone();
    let raw_url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let (request, result) = match prepare(request, core.max_body_size).await {
        Ok(prepared) => core.process(prepared, &response).await,
        Err(e) => (Arc::new(Request::new(method, raw_url)), Err(e)),
    };

    core.answer(&request, &response, result)
}

/// The Pistachio server: configuration plus capabilities, ready to serve.
pub struct Pistachio {
    core: Arc<Core>,
    port: u16,
}

impl Pistachio {
    /// Merge `config` over the defaults, validate it and freeze the tables.
    pub fn new(config: PistachioConfig, capabilities: Capabilities) -> Result<Self, PistachioError> {
        let config = config.with_defaults();
        validate_config(&config).map_err(ConfigError::Validation)?;

        let content_type = HeaderValue::from_str(&config.content_type).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidContentType(
                config.content_type.clone(),
            )])
        })?;

        let db = config
            .db_name
            .as_ref()
            .and_then(|name| match capabilities.storage.get(name) {
                Some(storage) => Some(Arc::clone(storage)),
                None => {
                    tracing::warn!(db_name = %name, "No storage registered under db_name");
                    None
                }
            });

        let logger = capabilities.logger.unwrap_or_else(|| {
            Arc::new(TracingLogger::new(config.logger.clone())) as Arc<dyn Logger>
        });

        let core = Core {
            routes: config.routes,
            error_routes: config.errors,
            answers: config.answers,
            content_type,
            max_body_size: config.limits.max_body_size,
            logger,
            actions: capabilities.actions,
            error_actions: capabilities.error_actions,
            renderers: capabilities.renderers,
            middleware: capabilities.middleware,
            db,
        };

        Ok(Self {
            core: Arc::new(core),
            port: config.port,
        })
    }

    /// The storage collaborator named by `db_name`, if any.
    pub fn db(&self) -> Option<&Storage> {
        self.core.db.as_ref()
    }

    /// Build the Axum router with all layers.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&self.core))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind `0.0.0.0:port` and serve in the background.
    pub async fn start(self) -> Result<RunningServer, PistachioError> {
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], self.port))).await?;
        let local_addr = listener.local_addr()?;
        self.core
            .logger
            .info(&format!("listen on port {}", local_addr.port()));

        let shutdown = Shutdown::new();
        let task = tokio::spawn(self.serve(listener, shutdown.signalled()));

        Ok(RunningServer {
            local_addr,
            shutdown,
            task,
        })
    }
}

/// Handle to a server started with [`Pistachio::start`].
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, drain in-flight requests, then run `callback`.
    pub async fn stop<F: FnOnce()>(self, callback: F) -> Result<(), PistachioError> {
        self.shutdown.trigger();
        let result = self.task.await.map_err(std::io::Error::other)?;
        callback();
        Ok(result?)
    }
}
