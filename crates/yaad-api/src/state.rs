//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use yaad_core::config::YaadConfig;
use yaad_dialogue::Skill;

/// Shared application state. Cloned into every handler task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<YaadConfig>,
    pub skill: Arc<Skill>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: YaadConfig, skill: Skill) -> Self {
        Self {
            config: Arc::new(config),
            skill: Arc::new(skill),
            start_time: Instant::now(),
        }
    }
}
