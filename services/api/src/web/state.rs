//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use night_ops_core::ports::NightOpsStore;

use crate::config::Config;

/// The shared application state, created once at startup and passed to
/// all handlers. The storage backend hides behind the port trait, so the
/// handlers are identical for every backend.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NightOpsStore>,
    pub config: Arc<Config>,
}
