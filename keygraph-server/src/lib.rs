// Copyright 2025 Keygraph Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Keygraph HTTP server.
//!
//! Serves keyword co-occurrence graphs computed on the fly from a remote
//! SPARQL endpoint. The server itself holds no data; every request is
//! answered by querying the configured store and reshaping the result.

pub mod api;
pub mod auth;
pub mod config;

use anyhow::Result;
use axum::{http::HeaderValue, middleware as axum_middleware, routing::get, Extension, Router};
use keygraph_query::{QueryEngine, QuerySettings, SparqlClient};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{co_occurrence, health_check, list_predicates, AppState};
use auth::{auth_middleware, ApiKeyAuth, Authenticator, BearerTokenAuth, MultiAuth, NoAuth};
use config::ServerConfig;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keygraph_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Keygraph Server");

    config.validate()?;
    tracing::info!(
        endpoint = %config.store.endpoint_url,
        template = %config.store.template,
        "Using SPARQL endpoint"
    );

    let state = build_state(&config)?;
    let authenticator = build_authenticator(&config)?;
    let app = app_router(state, authenticator, &config);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the query engine and shared state from configuration.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let client = SparqlClient::new(
        config.store.endpoint_url.clone(),
        Duration::from_secs(config.store.request_timeout_secs),
    )?;
    let settings = QuerySettings {
        template: config.store.template,
        keyword_predicate: config.store.keyword_predicate.clone(),
        minimum_amount: config.store.min_amount,
    };
    Ok(AppState {
        engine: Arc::new(QueryEngine::new(client, settings)),
        topic: config.store.topic.clone(),
    })
}

/// Select the authentication strategy from configuration.
pub fn build_authenticator(config: &ServerConfig) -> Result<Arc<dyn Authenticator>> {
    if !config.auth.enabled {
        tracing::info!("Authentication disabled, all endpoints are public");
        return Ok(Arc::new(NoAuth));
    }

    let mut strategies: Vec<Arc<dyn Authenticator>> = vec![];

    if let Some(jwt_secret) = config.auth.jwt_secret.clone() {
        tracing::info!("JWT authentication enabled");
        strategies.push(Arc::new(BearerTokenAuth::new(jwt_secret)));
    }

    if !config.auth.api_keys.is_empty() {
        tracing::info!(
            "API key authentication enabled ({} keys)",
            config.auth.api_keys.len()
        );
        strategies.push(Arc::new(ApiKeyAuth::new(config.auth.api_keys.clone())));
    }

    if strategies.is_empty() {
        anyhow::bail!("Authentication enabled but no strategies configured");
    }

    Ok(Arc::new(MultiAuth::new(strategies)))
}

/// Assemble the application router. Split out from `run_server` so
/// integration tests can drive the full stack without binding a socket.
pub fn app_router(
    state: AppState,
    authenticator: Arc<dyn Authenticator>,
    config: &ServerConfig,
) -> Router {
    let data_routes = Router::new()
        .route("/", get(co_occurrence))
        .route("/predicate", get(list_predicates))
        .layer(axum_middleware::from_fn(auth_middleware))
        .layer(Extension(authenticator));

    Router::new()
        .route("/health", get(health_check))
        .merge(data_routes)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.server.enable_cors {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(86400));

    if config.server.cors_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
