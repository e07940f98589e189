//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use serenica_core::mood::MoodDetector;
use serenica_core::ports::{ChatService, DatabaseService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub chat_adapter: Arc<dyn ChatService>,
    /// One mood detection state machine per authenticated user. Detector
    /// state is in-memory only and lost on restart, matching the ephemeral
    /// nature of mood samples.
    pub mood_detectors: Arc<Mutex<HashMap<Uuid, MoodDetector>>>,
}
