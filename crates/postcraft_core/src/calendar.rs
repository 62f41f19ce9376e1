//! crates/postcraft_core/src/calendar.rs
//!
//! Folds a user's prompts and posts into one `CalendarDay` per date key.
//!
//! Each source only ever appends to its own list and raises its own flag, so the
//! order in which posts and prompts are added does not change the result.

use chrono::{Local, NaiveDate, TimeZone};
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::domain::{CalendarDay, Post, PostStatus, Prompt};
pub use crate::schedule::date_key;

/// Calendar days keyed by their `YYYY-MM-DD` date key.
pub type Calendar = BTreeMap<String, CalendarDay>;

/// The local calendar date of a post: `posted_at` when set, otherwise `created_at`.
pub fn post_local_date_in<Tz: TimeZone>(post: &Post, tz: &Tz) -> NaiveDate {
    post.posted_at
        .unwrap_or(post.created_at)
        .with_timezone(tz)
        .date_naive()
}

pub fn post_date_key_in<Tz: TimeZone>(post: &Post, tz: &Tz) -> String {
    date_key(post_local_date_in(post, tz))
}

//=========================================================================================
// CalendarBuilder
//=========================================================================================

/// Incrementally builds a [`Calendar`]. Inputs are borrowed and cloned into the
/// days they belong to.
pub struct CalendarBuilder<Tz: TimeZone> {
    tz: Tz,
    days: Calendar,
}

impl<Tz: TimeZone> CalendarBuilder<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            days: BTreeMap::new(),
        }
    }

    fn day_mut(&mut self, key: String) -> &mut CalendarDay {
        self.days
            .entry(key)
            .or_insert_with_key(|key| CalendarDay::empty(key.clone()))
    }

    pub fn add_post(&mut self, post: &Post) -> &mut Self {
        let key = post_date_key_in(post, &self.tz);
        let day = self.day_mut(key);
        day.posts.push(post.clone());
        if post.status == PostStatus::Used {
            day.has_completed_post = true;
        }
        self
    }

    /// Adds a prompt to its scheduled day. Unscheduled prompts are not on the
    /// calendar and are skipped.
    pub fn add_prompt(&mut self, prompt: &Prompt) -> &mut Self {
        let Some(date) = prompt.scheduled_date else {
            return self;
        };
        let day = self.day_mut(date.key());
        day.prompts.push(prompt.clone());
        if !prompt.is_used {
            day.has_available_prompt = true;
        }
        self
    }

    pub fn extend_posts<'a>(&mut self, posts: impl IntoIterator<Item = &'a Post>) -> &mut Self {
        for post in posts {
            self.add_post(post);
        }
        self
    }

    pub fn extend_prompts<'a>(
        &mut self,
        prompts: impl IntoIterator<Item = &'a Prompt>,
    ) -> &mut Self {
        for prompt in prompts {
            self.add_prompt(prompt);
        }
        self
    }

    pub fn build(self) -> Calendar {
        self.days
    }
}

//=========================================================================================
// Convenience Entry Points
//=========================================================================================

/// Builds the calendar using the machine's local timezone for post dates.
pub fn build_calendar(prompts: &[Prompt], posts: &[Post]) -> Calendar {
    build_calendar_in(prompts, posts, &Local)
}

pub fn build_calendar_in<Tz: TimeZone>(prompts: &[Prompt], posts: &[Post], tz: &Tz) -> Calendar {
    let mut builder = CalendarBuilder::new(tz.clone());
    builder.extend_posts(posts).extend_prompts(prompts);
    builder.build()
}

/// The days of `calendar` whose dates fall within `from..=to`. A missing bound
/// leaves that side open.
pub fn calendar_range(
    calendar: &Calendar,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&CalendarDay> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Vec::new();
        }
    }
    let lower = from.map_or(Bound::Unbounded, |d| Bound::Included(date_key(d)));
    let upper = to.map_or(Bound::Unbounded, |d| Bound::Included(date_key(d)));
    calendar
        .range::<String, _>((lower, upper))
        .map(|(_, day)| day)
        .collect()
}
