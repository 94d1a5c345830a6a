//! Metrics Formatter
//!
//! Maps pull-request metrics to badge labels, messages and colors.

use std::time::Duration;

use crate::models::{BadgeInfo, BadgeType, PullRequestsInfo};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Builds the badge content for `badge_type` from `info`.
pub fn badge_info(badge_type: BadgeType, info: &PullRequestsInfo) -> BadgeInfo {
    match badge_type {
        BadgeType::OpenPrCount => BadgeInfo::new(
            "Open PRs",
            info.open_count.to_string(),
            count_color(info.open_count),
        ),
        BadgeType::AveragePrTime => duration_badge("Avg. current PRs age", info.open_average),
        BadgeType::OldestPrTime => duration_badge("Oldest PR age", info.oldest_open),
        BadgeType::AveragePrMergeTime => {
            duration_badge("Avg. PR merge time", info.average_merge_time)
        }
    }
}

fn duration_badge(label: &str, duration: Duration) -> BadgeInfo {
    BadgeInfo::new(label, format_duration(duration), duration_color(duration))
}

/// Color for an open pull-request count.
pub fn count_color(count: u64) -> &'static str {
    match count {
        0..=3 => "green",
        4..=5 => "yellowgreen",
        6..=7 => "yellow",
        8..=9 => "orange",
        _ => "red",
    }
}

/// Color for an elapsed time, one step per started day.
pub fn duration_color(duration: Duration) -> &'static str {
    match duration.as_secs() / SECS_PER_DAY {
        0 => "green",
        1 => "yellowgreen",
        2 => "yellow",
        3 => "orange",
        _ => "red",
    }
}

/// Renders the two largest non-zero units of `duration`, e.g. "1 day 3 hours".
///
/// Sub-second precision is dropped; a zero duration renders as "0 secs".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let units = [
        ("day", total / SECS_PER_DAY),
        ("hour", total % SECS_PER_DAY / SECS_PER_HOUR),
        ("min", total % SECS_PER_HOUR / SECS_PER_MINUTE),
        ("sec", total % SECS_PER_MINUTE),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(_, amount)| *amount > 0)
        .take(2)
        .map(|(name, amount)| plural(*amount, name))
        .collect();

    if parts.is_empty() {
        plural(0, "sec")
    } else {
        parts.join(" ")
    }
}

fn plural(amount: u64, name: &str) -> String {
    if amount == 1 {
        format!("{} {}", amount, name)
    } else {
        format!("{} {}s", amount, name)
    }
}
