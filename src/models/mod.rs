//! Domain and response models for the badge server
//!
//! Badge requests (the cache key), pull-request metrics, rendered images
//! and the JSON DTOs served by the auxiliary endpoints.

pub mod badge;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use badge::{BadgeImage, BadgeInfo, PullRequestsInfo};
pub use requests::{BadgeRequest, BadgeType};
pub use responses::{HealthResponse, StatsResponse};
