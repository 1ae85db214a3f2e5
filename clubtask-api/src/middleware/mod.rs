/// Middleware for the API server
///
/// - `security`: Response hardening headers

pub mod security;
