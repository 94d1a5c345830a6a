//! shields.io static badge renderer.

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use super::BadgeRenderer;
use crate::error::{BadgeError, Result};
use crate::models::{BadgeImage, BadgeInfo};

/// Downloads static SVG badges from a shields.io compatible service.
#[derive(Debug, Clone)]
pub struct ShieldsRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl ShieldsRenderer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bitbadger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BadgeError::Internal(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of the static badge for `badge`.
    pub fn badge_url(&self, badge: &BadgeInfo) -> String {
        format!(
            "{}/badge/{}-{}-{}",
            self.base_url,
            escape_component(&badge.label),
            escape_component(&badge.message),
            escape_component(&badge.color)
        )
    }
}

#[async_trait]
impl BadgeRenderer for ShieldsRenderer {
    fn name(&self) -> &str {
        "shields"
    }

    async fn render(&self, badge: &BadgeInfo) -> Result<BadgeImage> {
        let url = self.badge_url(badge);
        debug!("Badge URL = {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Error while retrieving badge at '{}': {}", url, e);
            BadgeError::Render(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Badge service returned {} for '{}'", status, url);
            return Err(BadgeError::Render(format!("badge service returned {}", status)));
        }

        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read badge image response: {}", e);
            BadgeError::Render(format!("failed to read image: {}", e))
        })?;

        Ok(BadgeImage::svg(body.to_vec()))
    }
}

/// Escapes one dash-separated component of a static badge path.
///
/// Dashes and underscores are doubled, spaces become `%20`, and anything
/// outside the unreserved set is percent-encoded.
fn escape_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '-' => out.push_str("--"),
            '_' => out.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '.' || c == '~' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "%{:02X}", byte);
                }
            }
        }
    }
    out
}
