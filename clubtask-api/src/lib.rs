//! # ClubTask API Server Library
//!
//! HTTP presentation layer over the ClubTask shared library.
//!
//! ## Modules
//!
//! - `app`: Application state, store connection and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
