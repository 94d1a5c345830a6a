//! Bitbucket Cloud pull-request provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use reqwest::Url;
use tracing::{debug, error, warn};

use super::PullRequestProvider;
use crate::error::{BadgeError, Result};
use crate::models::{BadgeRequest, PullRequestsInfo};

/// One page of the `pullrequests` listing.
#[derive(Debug, Default, Deserialize)]
struct PullRequestPage {
    /// Total number of pull requests matching the query
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    values: Vec<PullRequestSummary>,
}

#[derive(Debug, Deserialize)]
struct PullRequestSummary {
    #[serde(default)]
    created_on: Option<String>,
    #[serde(default)]
    updated_on: Option<String>,
}

/// Queries the Bitbucket Cloud 2.0 API.
#[derive(Debug, Clone)]
pub struct BitbucketProvider {
    client: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl BitbucketProvider {
    /// Creates a provider for the API rooted at `base_url`.
    ///
    /// Requests are sent without authentication when `username` is empty.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bitbadger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BadgeError::Internal(format!("HTTP client setup failed: {}", e)))?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| BadgeError::Internal(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BadgeError::Internal(format!("Invalid API URL '{}'", base_url)));
        }

        Ok(Self {
            client,
            base_url,
            username: username.into(),
            password: password.into(),
        })
    }

    /// Listing URL for `request`, with owner and repository encoded as single
    /// path segments.
    fn pull_requests_url(&self, request: &BadgeRequest, state: &str) -> Result<Url> {
        for segment in [&request.owner, &request.repository] {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(BadgeError::InvalidRequest(format!(
                    "'{}' is not a repository path segment",
                    segment
                )));
            }
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BadgeError::Internal(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend([
                "repositories",
                request.owner.as_str(),
                request.repository.as_str(),
                "pullrequests",
            ]);
        url.query_pairs_mut().append_pair("state", state);
        Ok(url)
    }

    async fn query(&self, request: &BadgeRequest, state: &str) -> Result<PullRequestPage> {
        let url = self.pull_requests_url(request, state)?;
        debug!("Querying {}", url);

        let mut builder = self.client.get(url.clone());
        if !self.username.is_empty() {
            builder = builder.basic_auth(&self.username, Some(&self.password));
        }

        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            BadgeError::Upstream(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Non-success response {} from {}: {}", status, url, body);
            return Err(BadgeError::Upstream(format!(
                "{} returned {}",
                request, status
            )));
        }

        response.json::<PullRequestPage>().await.map_err(|e| {
            error!("Answer decoding failed for {}: {}", url, e);
            BadgeError::Upstream(format!("malformed payload: {}", e))
        })
    }
}

#[async_trait]
impl PullRequestProvider for BitbucketProvider {
    fn name(&self) -> &str {
        "bitbucket"
    }

    async fn fetch(&self, request: &BadgeRequest) -> Result<PullRequestsInfo> {
        let open = self.query(request, "OPEN").await?;
        let merged = self.query(request, "MERGED").await?;

        Ok(summarize(&open, &merged, Utc::now()))
    }
}

fn summarize(open: &PullRequestPage, merged: &PullRequestPage, now: DateTime<Utc>) -> PullRequestsInfo {
    let ages: Vec<Duration> = open
        .values
        .iter()
        .filter_map(|pr| parse_time(pr.created_on.as_deref()))
        .map(|created| elapsed(created, now))
        .collect();

    let merge_times: Vec<Duration> = merged
        .values
        .iter()
        .filter_map(|pr| {
            let created = parse_time(pr.created_on.as_deref())?;
            let updated = parse_time(pr.updated_on.as_deref())?;
            Some(elapsed(created, updated))
        })
        .collect();

    PullRequestsInfo {
        open_count: open.size.unwrap_or(open.values.len() as u64),
        oldest_open: ages.iter().max().copied().unwrap_or_default(),
        open_average: average_minutes(&ages),
        average_merge_time: average_minutes(&merge_times),
    }
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(e) => {
            warn!("Failed to parse time '{}': {}", value, e);
            None
        }
    }
}

/// Non-negative time between `from` and `to`.
fn elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or_default()
}

/// Mean of `durations`, truncated to whole minutes.
fn average_minutes(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    let total: u64 = durations.iter().map(Duration::as_secs).sum();
    let average = total / durations.len() as u64;
    Duration::from_secs(average / 60 * 60)
}
