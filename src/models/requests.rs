//! Badge request types
//!
//! A badge request identifies one badge: repository owner, repository slug
//! and the metric to display. It is the exact-match key of the result cache.

use std::fmt;
use std::str::FromStr;

use crate::error::BadgeError;

/// Metric displayed by a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeType {
    /// Number of open pull requests
    OpenPrCount,
    /// Average age of the currently open pull requests
    AveragePrTime,
    /// Age of the oldest open pull request
    OldestPrTime,
    /// Average time between creation and merge of recent pull requests
    AveragePrMergeTime,
}

impl BadgeType {
    /// All badge types, in display order.
    pub const ALL: [BadgeType; 4] = [
        BadgeType::OpenPrCount,
        BadgeType::AveragePrTime,
        BadgeType::OldestPrTime,
        BadgeType::AveragePrMergeTime,
    ];

    /// Path segment naming this badge type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::OpenPrCount => "open-pr-count",
            BadgeType::AveragePrTime => "avg-pr-time",
            BadgeType::OldestPrTime => "oldest-pr-time",
            BadgeType::AveragePrMergeTime => "avg-pr-merge-time",
        }
    }
}

impl FromStr for BadgeType {
    type Err = BadgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BadgeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BadgeError::InvalidBadgeType(s.to_string()))
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client badge request.
///
/// Compared field by field, without any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BadgeRequest {
    /// Repository owner (user or workspace)
    pub owner: String,
    /// Repository slug
    pub repository: String,
    /// Requested metric
    pub badge_type: BadgeType,
}

impl BadgeRequest {
    /// Creates a new BadgeRequest
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        badge_type: BadgeType,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            badge_type,
        }
    }

    /// Builds a request from raw path segments, validating the badge type.
    pub fn parse(owner: &str, repository: &str, badge_type: &str) -> Result<Self, BadgeError> {
        if owner.is_empty() || repository.is_empty() {
            return Err(BadgeError::InvalidRequest(
                "Owner and repository cannot be empty".to_string(),
            ));
        }
        if is_dot_segment(owner) || is_dot_segment(repository) {
            return Err(BadgeError::InvalidRequest(format!(
                "'{}/{}' is not a repository",
                owner, repository
            )));
        }

        Ok(Self::new(owner, repository, badge_type.parse()?))
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

impl fmt::Display for BadgeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repository, self.badge_type)
    }
}
