use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Extension, Router,
};
use constant_time_eq::constant_time_eq;
use http::{header, HeaderValue, Method};
use hyper::Body;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(crate) mod artworks;

use crate::config::AccessGateConfig;
use crate::errors::{Error, Result};
use crate::gallery::Gallery;
use crate::objects::ObjectStore;

/// The shared-secret check gating mutating routes. Listing stays public.
#[derive(Clone)]
pub struct AccessGate {
    enabled: bool,
    token: String,
}

impl AccessGate {
    pub fn new(config: &AccessGateConfig) -> Self {
        Self {
            enabled: config.enabled,
            token: config.token.clone(),
        }
    }

    fn authorizes(&self, authorization: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }
        let expected = format!("Bearer {}", self.token);
        match authorization {
            Some(header) => constant_time_eq(header.as_bytes(), expected.as_bytes()),
            None => false,
        }
    }
}

async fn require_authorization(
    State(gate): State<AccessGate>,
    request: Request<Body>,
    next: Next<Body>,
) -> Result<Response> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if gate.authorizes(authorization) {
        Ok(next.run(request).await)
    } else {
        Err(Error::Unauthorized)
    }
}

/// Assembles the application router: the public listing route merged with
/// the gated mutating routes, plus optional static serving of the local
/// object directory.
pub fn router<O: ObjectStore>(
    gallery: Gallery<O>,
    gate: AccessGate,
    cors_origins: &[String],
    static_files: Option<(String, PathBuf)>,
) -> Result<Router> {
    let public = Router::new().route("/api/artworks", get(artworks::list::<O>));

    let gated = Router::new()
        .route("/api/upload", post(artworks::upload::<O>))
        .route("/api/artworks/:id", delete(artworks::remove::<O>))
        .route_layer(middleware::from_fn_with_state(gate, require_authorization));

    let mut app = Router::new()
        .merge(public)
        .merge(gated)
        .layer(Extension(gallery));

    if let Some((route, directory)) = static_files {
        app = app.nest_service(&route, ServeDir::new(directory));
    }

    Ok(app
        .layer(cors_layer(cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60))))
}

/// Credentialed CORS over an exact-origin allow list. Requests without an
/// Origin header are not CORS requests and pass through untouched.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::InvalidCorsOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub async fn serve(router: Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}
