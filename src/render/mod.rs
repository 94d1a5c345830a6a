//! Render Module
//!
//! Turns badge content into image bytes.

mod shields;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BadgeImage, BadgeInfo};

pub use shields::ShieldsRenderer;

/// Renders a label/message/color triple into an image.
///
/// Failures are reported as [`BadgeError::Render`](crate::error::BadgeError::Render).
#[async_trait]
pub trait BadgeRenderer: Send + Sync {
    /// Renderer name for logging.
    fn name(&self) -> &str;

    async fn render(&self, badge: &BadgeInfo) -> Result<BadgeImage>;
}
