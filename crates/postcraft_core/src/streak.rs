//! crates/postcraft_core/src/streak.rs
//!
//! Consecutive-day posting streak.
//!
//! A day counts when at least one `used` post lands on it. The streak is the run of
//! counted days ending today, or ending yesterday when nothing has been posted yet
//! today. Any missing day ends the run.

use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeSet;

use crate::calendar::post_local_date_in;
use crate::domain::{Post, PostStatus};

pub fn day_streak<Tz: TimeZone>(posts: &[Post], today: NaiveDate, tz: &Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = posts
        .iter()
        .filter(|post| post.status == PostStatus::Used)
        .map(|post| post_local_date_in(post, tz))
        .filter(|day| *day <= today)
        .collect();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}
