//! Upstream Module
//!
//! Sources of pull-request metrics for a badge request.

mod bitbucket;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BadgeRequest, PullRequestsInfo};

pub use bitbucket::BitbucketProvider;

/// Fetches aggregate pull-request metrics for a repository.
///
/// Any failure (transport, non-success status, undecodable payload) is
/// reported as [`BadgeError::Upstream`](crate::error::BadgeError::Upstream).
#[async_trait]
pub trait PullRequestProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn fetch(&self, request: &BadgeRequest) -> Result<PullRequestsInfo>;
}
