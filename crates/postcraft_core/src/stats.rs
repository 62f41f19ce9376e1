//! crates/postcraft_core/src/stats.rs
//!
//! Counters shown in the dashboard header.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::domain::{Post, PostStatus, Prompt};
use crate::streak::day_streak;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: usize,
    pub used_posts: usize,
    pub draft_posts: usize,
    pub archived_posts: usize,
    pub available_prompts: usize,
    /// Unused prompts scheduled today or later.
    pub upcoming_scheduled_prompts: usize,
    pub day_streak: u32,
}

pub fn dashboard_stats<Tz: TimeZone>(
    prompts: &[Prompt],
    posts: &[Post],
    today: NaiveDate,
    tz: &Tz,
) -> DashboardStats {
    let count_status = |status: PostStatus| posts.iter().filter(|p| p.status == status).count();
    let available = prompts.iter().filter(|p| !p.is_used);

    DashboardStats {
        total_posts: posts.len(),
        used_posts: count_status(PostStatus::Used),
        draft_posts: count_status(PostStatus::Draft),
        archived_posts: count_status(PostStatus::Archived),
        available_prompts: available.clone().count(),
        upcoming_scheduled_prompts: available
            .filter(|p| p.scheduled_date.is_some_and(|d| d.date() >= today))
            .count(),
        day_streak: day_streak(posts, today, tz),
    }
}
