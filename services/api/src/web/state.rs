//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use postcraft_core::domain::Profile;
use postcraft_core::ports::{DatabaseService, PortResult, ProfileCache, PromptGenerationService};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    /// `None` when no LLM key is configured; generation requests are refused.
    pub prompt_adapter: Option<Arc<dyn PromptGenerationService>>,
    pub profile_cache: Arc<dyn ProfileCache>,
}

impl AppState {
    /// Loads a profile through the cache, filling it on a miss.
    pub async fn load_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        if let Some(profile) = self.profile_cache.get(user_id) {
            return Ok(profile);
        }
        debug!(%user_id, "Profile cache miss");
        let profile = self.db.get_profile(user_id).await?;
        self.profile_cache.set(profile.clone());
        Ok(profile)
    }
}
