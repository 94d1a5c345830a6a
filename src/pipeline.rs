//! Badge Generation Pipeline
//!
//! Fetch metrics, format them, render the image. [`BadgeService`] puts the
//! result cache in front of the pipeline.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::cache::ResultCache;
use crate::error::Result;
use crate::formatter;
use crate::models::{BadgeImage, BadgeRequest};
use crate::render::BadgeRenderer;
use crate::upstream::PullRequestProvider;

// == Badge Pipeline ==
/// Generates badge images from upstream data.
///
/// Stages run in order and the first failure aborts the run; nothing is
/// retried.
#[derive(Clone)]
pub struct BadgePipeline {
    provider: Arc<dyn PullRequestProvider>,
    renderer: Arc<dyn BadgeRenderer>,
}

impl BadgePipeline {
    pub fn new(provider: Arc<dyn PullRequestProvider>, renderer: Arc<dyn BadgeRenderer>) -> Self {
        Self { provider, renderer }
    }

    /// Builds the badge image for `request`.
    pub async fn generate(&self, request: &BadgeRequest) -> Result<BadgeImage> {
        let info = self.provider.fetch(request).await.map_err(|e| {
            error!(
                "Error while retrieving pull request info from {}: {}",
                self.provider.name(),
                e
            );
            e
        })?;

        let badge = formatter::badge_info(request.badge_type, &info);
        debug!(
            "Badge for {}: {} / {} / {}",
            request, badge.label, badge.message, badge.color
        );

        self.renderer.render(&badge).await.map_err(|e| {
            error!("Error rendering badge with {}: {}", self.renderer.name(), e);
            e
        })
    }
}

// == Badge Service ==
/// Serves badges from the cache, generating them on a miss.
#[derive(Clone)]
pub struct BadgeService {
    cache: ResultCache,
    pipeline: BadgePipeline,
}

impl BadgeService {
    pub fn new(cache: ResultCache, pipeline: BadgePipeline) -> Self {
        Self { cache, pipeline }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Returns the cached badge for `request`, or generates and caches it.
    ///
    /// The cache lock is never held while the pipeline runs, so concurrent
    /// misses on the same request may each generate the badge; the last
    /// write wins. Failed generations are not cached.
    pub async fn lookup_or_build(&self, request: &BadgeRequest) -> Result<BadgeImage> {
        if let Some(image) = self.cache.get(request).await {
            debug!("Cache hit for {}", request);
            return Ok(image);
        }

        info!("Creating badge for {}", request);
        let image = self.pipeline.generate(request).await?;
        self.cache.put(request.clone(), image.clone()).await;

        Ok(image)
    }
}
