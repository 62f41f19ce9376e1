//! crates/postcraft_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the database, the LLM provider and the cache backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GeneratedPrompt, NewPrompt, Post, Profile, Prompt};
use crate::schedule::ScheduleDate;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth ---
    /// Resolves a session cookie value to the id of the signed-in user.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile>;

    // --- Content ---
    async fn get_prompts_for_user(&self, user_id: Uuid) -> PortResult<Vec<Prompt>>;

    async fn get_posts_for_user(&self, user_id: Uuid) -> PortResult<Vec<Post>>;

    /// Inserts a batch of dated prompts and returns the stored rows.
    async fn insert_prompts(&self, user_id: Uuid, prompts: Vec<NewPrompt>)
        -> PortResult<Vec<Prompt>>;

    async fn reschedule_prompt(
        &self,
        user_id: Uuid,
        prompt_id: Uuid,
        date: ScheduleDate,
    ) -> PortResult<Prompt>;

    async fn mark_prompt_used(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Prompt>;
}

#[async_trait]
pub trait PromptGenerationService: Send + Sync {
    /// Writes `count` new prompts, optionally focused on one content pillar.
    async fn generate_prompts(
        &self,
        count: usize,
        pillar_hint: Option<i32>,
    ) -> PortResult<Vec<GeneratedPrompt>>;
}

/// A short-lived cache of user profiles consulted by the auth gate.
pub trait ProfileCache: Send + Sync {
    fn get(&self, user_id: Uuid) -> Option<Profile>;
    fn set(&self, profile: Profile);
    fn expire(&self, user_id: Uuid);
}
