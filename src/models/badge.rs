//! Badge and metric data types
//!
//! Values passed between the upstream provider, the formatter and the
//! renderer.

use std::time::Duration;

/// Aggregate pull-request metrics for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestsInfo {
    /// Number of open pull requests
    pub open_count: u64,
    /// Age of the oldest open pull request
    pub oldest_open: Duration,
    /// Average age of the open pull requests
    pub open_average: Duration,
    /// Average creation-to-merge time of merged pull requests
    pub average_merge_time: Duration,
}

/// Label, message and color of a badge, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeInfo {
    pub label: String,
    pub message: String,
    pub color: String,
}

impl BadgeInfo {
    /// Creates a new BadgeInfo
    pub fn new(
        label: impl Into<String>,
        message: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
            color: color.into(),
        }
    }
}

/// A rendered badge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Image subtype, e.g. `svg+xml`
    pub extension: String,
}

impl BadgeImage {
    /// Creates a new BadgeImage
    pub fn new(data: impl Into<Vec<u8>>, extension: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            extension: extension.into(),
        }
    }

    /// Wraps SVG markup.
    pub fn svg(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, "svg+xml")
    }

    /// MIME type to serve this image with.
    pub fn content_type(&self) -> String {
        format!("image/{}", self.extension)
    }
}
