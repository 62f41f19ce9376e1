//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Prompt and post rows are read loosely and handed to the core's row parser, which
//! drops (and logs) anything that does not fit the domain model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postcraft_core::domain::{NewPrompt, Post, Profile, Prompt, Role};
use postcraft_core::ports::{DatabaseService, PortError, PortResult};
use postcraft_core::rows::{parse_rows, PostRow, PromptRow};
use postcraft_core::schedule::ScheduleDate;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

const PROMPT_COLUMNS: &str =
    "id, category, hook, prompt_text, is_used, scheduled_date, pushed_to_calendar, pillar_number";

const POST_COLUMNS: &str = "id, title, content, status, content_type, posted_at, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    email: Option<String>,
    role: String,
    onboarding_completed: bool,
    subscription_status: Option<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        let role = if self.role.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        };
        Profile {
            user_id: self.user_id,
            email: self.email,
            role,
            onboarding_completed: self.onboarding_completed,
            subscription_status: self.subscription_status,
        }
    }
}

#[derive(FromRow)]
struct PromptRecord {
    id: Uuid,
    category: Option<String>,
    hook: Option<String>,
    prompt_text: Option<String>,
    is_used: Option<bool>,
    scheduled_date: Option<String>,
    pushed_to_calendar: Option<bool>,
    pillar_number: Option<i32>,
}
impl PromptRecord {
    fn to_row(self) -> PromptRow {
        PromptRow {
            id: Some(self.id),
            category: self.category,
            hook: self.hook,
            prompt_text: self.prompt_text,
            is_used: self.is_used,
            scheduled_date: self.scheduled_date,
            pushed_to_calendar: self.pushed_to_calendar,
            pillar_number: self.pillar_number,
        }
    }

    fn to_domain(self) -> PortResult<Prompt> {
        Prompt::try_from(self.to_row()).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[derive(FromRow)]
struct PostRecord {
    id: Uuid,
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
    content_type: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl PostRecord {
    fn to_row(self) -> PostRow {
        PostRow {
            id: Some(self.id),
            title: self.title,
            content: self.content,
            status: self.status,
            content_type: self.content_type,
            posted_at: self.posted_at,
            created_at: Some(self.created_at),
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT user_id, email, role, onboarding_completed, subscription_status FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Profile {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_prompts_for_user(&self, user_id: Uuid) -> PortResult<Vec<Prompt>> {
        let records = sqlx::query_as::<_, PromptRecord>(&format!(
            "SELECT {} FROM prompts WHERE user_id = $1 ORDER BY scheduled_date ASC NULLS LAST, created_at ASC",
            PROMPT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(parse_rows("prompt", records.into_iter().map(PromptRecord::to_row)))
    }

    async fn get_posts_for_user(&self, user_id: Uuid) -> PortResult<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {} FROM posts WHERE user_id = $1 ORDER BY COALESCE(posted_at, created_at) ASC",
            POST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(parse_rows("post", records.into_iter().map(PostRecord::to_row)))
    }

    async fn insert_prompts(
        &self,
        user_id: Uuid,
        prompts: Vec<NewPrompt>,
    ) -> PortResult<Vec<Prompt>> {
        let sql = format!(
            "INSERT INTO prompts (user_id, category, hook, prompt_text, is_used, scheduled_date, pushed_to_calendar, pillar_number) \
             VALUES ($1, $2, $3, $4, FALSE, $5, TRUE, $6) RETURNING {}",
            PROMPT_COLUMNS
        );

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let mut inserted = Vec::with_capacity(prompts.len());
        for new in prompts {
            let record = sqlx::query_as::<_, PromptRecord>(&sql)
                .bind(user_id)
                .bind(&new.prompt.category)
                .bind(&new.prompt.hook)
                .bind(&new.prompt.prompt_text)
                .bind(new.scheduled_date.key())
                .bind(new.prompt.pillar_number)
                .fetch_one(&mut *tx)
                .await
                .map_err(unexpected)?;
            inserted.push(record.to_domain()?);
        }
        tx.commit().await.map_err(unexpected)?;

        info!(%user_id, count = inserted.len(), "Inserted scheduled prompts");
        Ok(inserted)
    }

    async fn reschedule_prompt(
        &self,
        user_id: Uuid,
        prompt_id: Uuid,
        date: ScheduleDate,
    ) -> PortResult<Prompt> {
        sqlx::query_as::<_, PromptRecord>(&format!(
            "UPDATE prompts SET scheduled_date = $1, pushed_to_calendar = TRUE WHERE id = $2 AND user_id = $3 RETURNING {}",
            PROMPT_COLUMNS
        ))
        .bind(date.key())
        .bind(prompt_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Prompt {} not found", prompt_id)))?
        .to_domain()
    }

    async fn mark_prompt_used(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Prompt> {
        sqlx::query_as::<_, PromptRecord>(&format!(
            "UPDATE prompts SET is_used = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            PROMPT_COLUMNS
        ))
        .bind(prompt_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Prompt {} not found", prompt_id)))?
        .to_domain()
    }
}
