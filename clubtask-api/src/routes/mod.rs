/// API route handlers
///
/// Organized by audience:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, first-user bootstrap
/// - `me`: The caller's own tasks
/// - `tasks`: Task assignment for Core, Domain and Associate Heads
/// - `members`: Member management for Devs
/// - `admin`: Bulk maintenance for Devs

pub mod admin;
pub mod auth;
pub mod health;
pub mod me;
pub mod members;
pub mod tasks;
