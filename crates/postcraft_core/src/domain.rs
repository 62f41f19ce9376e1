//! crates/postcraft_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Prompts, posts and profiles are owned by the persistence layer; the core only
//! consumes them. `CalendarDay` is derived and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::schedule::ScheduleDate;

//=========================================================================================
// Prompts
//=========================================================================================

/// A suggested piece of content a user may schedule and later mark as used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: Uuid,
    pub category: String,
    pub hook: String,
    pub prompt_text: String,
    pub is_used: bool,
    pub scheduled_date: Option<ScheduleDate>,
    pub pushed_to_calendar: bool,
    pub pillar_number: Option<i32>,
}

/// A prompt as returned by the generation service, before it has a date or an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompt {
    pub category: String,
    pub hook: String,
    pub prompt_text: String,
    pub pillar_number: Option<i32>,
}

/// A generated prompt stamped with its schedule date, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrompt {
    pub prompt: GeneratedPrompt,
    pub scheduled_date: ScheduleDate,
}

//=========================================================================================
// Posts
//=========================================================================================

/// Lifecycle status of an authored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Used,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Used => "used",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "used" => Ok(PostStatus::Used),
            "archived" => Ok(PostStatus::Archived),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

/// A piece of content authored by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub content_type: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Calendar
//=========================================================================================

/// Everything scheduled or posted on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub has_completed_post: bool,
    pub has_available_prompt: bool,
    pub prompts: Vec<Prompt>,
    pub posts: Vec<Post>,
}

impl CalendarDay {
    /// An empty day for the given date key.
    pub fn empty(date: String) -> Self {
        Self {
            date,
            has_completed_post: false,
            has_available_prompt: false,
            prompts: Vec::new(),
            posts: Vec::new(),
        }
    }
}

//=========================================================================================
// Profiles
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The slice of a user's profile the service needs for gating requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub onboarding_completed: bool,
    pub subscription_status: Option<String>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
