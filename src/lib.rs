//! BitBadger - Pull-request metric badges for Bitbucket repositories
//!
//! Serves SVG badges (open PR count, PR ages, merge time) rendered through a
//! static badge service, with an in-memory result cache in front of the
//! upstream API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{CachePolicy, ResultCache};
pub use config::{Config, ListenMode};
pub use error::{BadgeError, Result};
pub use pipeline::{BadgePipeline, BadgeService};
