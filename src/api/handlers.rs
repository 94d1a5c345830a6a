//! API Handlers
//!
//! HTTP request handlers for each badge server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::{BadgeError, Result};
use crate::models::{BadgeRequest, HealthResponse, StatsResponse};
use crate::pipeline::{BadgePipeline, BadgeService};
use crate::render::ShieldsRenderer;
use crate::upstream::BitbucketProvider;

const USAGE: &str = "Requires a request of the form: '<owner>/<repository>/<type>' \
     where <type> can be 'open-pr-count', 'avg-pr-time', 'oldest-pr-time', or 'avg-pr-merge-time'";

/// Application state shared across all handlers.
///
/// Holds the badge service, whose result cache is the only shared mutable
/// state of the server.
#[derive(Clone)]
pub struct AppState {
    pub service: BadgeService,
}

impl AppState {
    /// Creates a new AppState with the given service.
    pub fn new(service: BadgeService) -> Self {
        Self { service }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the Bitbucket provider and shields.io renderer behind a cache
    /// using the configured policy.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = BitbucketProvider::new(
            config.upstream_api_url.clone(),
            config.username.clone(),
            config.password.clone(),
            config.http_timeout(),
        )?;
        let renderer = ShieldsRenderer::new(config.badge_service_url.clone(), config.http_timeout())?;

        let pipeline = BadgePipeline::new(Arc::new(provider), Arc::new(renderer));
        let cache = ResultCache::new(config.cache_policy());

        Ok(Self::new(BadgeService::new(cache, pipeline)))
    }

    pub fn cache(&self) -> &ResultCache {
        self.service.cache()
    }
}

/// Handler for GET /:owner/:repository/*badge_type
///
/// Serves the badge image, from the cache when possible. Anything after the
/// badge type segment is ignored.
pub async fn badge_handler(
    State(state): State<AppState>,
    Path((owner, repository, rest)): Path<(String, String, String)>,
) -> Result<Response> {
    let badge_type = rest.split_once('/').map_or(rest.as_str(), |(first, _)| first);
    let request = BadgeRequest::parse(&owner, &repository, badge_type).map_err(|e| {
        warn!("Invalid request for {}/{}/{}: {}", owner, repository, badge_type, e);
        e
    })?;

    let image = state.service.lookup_or_build(&request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, image.content_type()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        image.data,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current cache statistics and policy.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache().stats().await;
    let policy = state.cache().policy().await;

    Json(StatsResponse::new(&stats, &policy))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for paths that do not name a badge.
pub async fn usage_handler(uri: Uri) -> BadgeError {
    warn!("Invalid request with: {}", uri);
    BadgeError::InvalidRequest(USAGE.to_string())
}
