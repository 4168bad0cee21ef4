/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The two image slots and the in-flight comparison (session.rs)

pub mod data;
pub mod session;
