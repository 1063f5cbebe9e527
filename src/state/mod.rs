/// State management module
///
/// This module handles all application state, including:
/// - The converter session and its select/convert state machine (session.rs)
/// - Shared data structures for sources and outcomes (data.rs)
/// - Startup settings loaded from JSON (settings.rs)

pub mod data;
pub mod session;
pub mod settings;
